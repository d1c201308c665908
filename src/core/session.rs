//! Review session: the one object that owns a project's state.
//!
//! A session holds the current `Snapshot` (parsed events, indexed clips and
//! their join) behind an `Arc`, plus the review store. Re-indexing builds a
//! complete new snapshot first and only then swaps it in, so a failed or
//! interrupted re-index leaves the previous snapshot active.

use crate::config::Config;
use crate::core::indexer::{IndexOptions, VideoIndex, index_videos};
use crate::core::matcher::match_events;
use crate::core::parser::{ParseOptions, find_log_file, parse_log_file};
use crate::db::store::{ReconcileReport, ReviewStore};
use crate::errors::{AppError, AppResult};
use crate::models::diagnostics::Diagnostics;
use crate::models::event::EventRecord;
use crate::models::event_id::normalize_id;
use crate::models::matched::MatchedEvent;
use crate::models::review::{Counts, ReviewDecision, ReviewUpdate};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Everything a session needs, resolved from `Config` and CLI overrides.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub project_root: PathBuf,
    pub video_index_root: PathBuf,
    pub video_library_root: Option<PathBuf>,
    pub database: PathBuf,
    pub parse: ParseOptions,
    pub index: IndexOptions,
}

impl SessionConfig {
    pub fn from_config(cfg: &Config) -> AppResult<Self> {
        Ok(Self {
            project_root: cfg.project_root()?,
            video_index_root: cfg.video_index_root()?,
            video_library_root: Some(cfg.video_library_root()?),
            database: cfg.database_path()?,
            parse: ParseOptions {
                default_year: cfg.default_year,
            },
            index: IndexOptions::new(&cfg.video_extensions, &cfg.video_id_pattern)?,
        })
    }
}

/// Immutable result of one parse + index + match run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub log_path: PathBuf,
    pub events: Vec<EventRecord>,
    pub videos: VideoIndex,
    pub matched: Vec<MatchedEvent>,
    pub diagnostics: Diagnostics,
    /// Normalised id to its first position in `matched`.
    positions: HashMap<String, usize>,
}

impl Snapshot {
    /// Build a complete snapshot, or fail without side effects.
    pub fn build(cfg: &SessionConfig) -> AppResult<Self> {
        let log_path = find_log_file(&cfg.project_root)?;
        let parsed = parse_log_file(&log_path, &cfg.parse)?;
        let videos = index_videos(
            &cfg.video_index_root,
            cfg.video_library_root.as_deref(),
            &cfg.index,
        )?;
        let matched = match_events(&parsed.events, &videos);

        let mut positions = HashMap::with_capacity(matched.len());
        for (i, m) in matched.iter().enumerate() {
            positions.entry(normalize_id(m.id())).or_insert(i);
        }

        let mut warnings = parsed.warnings;
        warnings.extend(videos.warnings.iter().cloned());

        let diagnostics = Diagnostics {
            log_path: Some(log_path.clone()),
            folder_stamp: parsed.folder_stamp,
            events_parsed: parsed.events.len(),
            videos_indexed: videos.len(),
            videos_matched: matched.iter().filter(|m| m.has_video()).count(),
            warnings,
        };

        Ok(Self {
            log_path,
            events: parsed.events,
            videos,
            matched,
            diagnostics,
            positions,
        })
    }

    pub fn event_ids(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|e| e.id.as_str())
    }

    /// Position of `id` in match order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(&normalize_id(id)).copied()
    }
}

/// Build a snapshot on a worker thread; install it with `ReviewSession::install`.
pub fn spawn_snapshot(cfg: SessionConfig) -> JoinHandle<AppResult<Snapshot>> {
    thread::spawn(move || Snapshot::build(&cfg))
}

/// Project totals shown by `summary` and the session header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_events: usize,
    pub with_video: usize,
    pub reviewed: usize,
    pub remaining: usize,
    pub orphaned: usize,
    pub false_triggers: usize,
    pub fish_counted: u64,
}

pub struct ReviewSession {
    config: SessionConfig,
    snapshot: Arc<Snapshot>,
    store: ReviewStore,
}

impl ReviewSession {
    /// Index the project and open its store. Stored decisions are reconciled
    /// against the fresh snapshot.
    pub fn open(config: SessionConfig) -> AppResult<(Self, ReconcileReport)> {
        let snapshot = Snapshot::build(&config)?;
        let mut store = ReviewStore::open(&config.database)?;
        let report = store.reconcile(snapshot.event_ids())?;

        Ok((
            Self {
                config,
                snapshot: Arc::new(snapshot),
                store,
            },
            report,
        ))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn store(&self) -> &ReviewStore {
        &self.store
    }

    /// Rebuild the snapshot from disk and swap it in.
    pub fn reindex(&mut self) -> AppResult<ReconcileReport> {
        let fresh = Snapshot::build(&self.config)?;
        self.install(fresh)
    }

    /// Swap in a snapshot built elsewhere (e.g. by `spawn_snapshot`).
    /// The store is reconciled first; if that fails the old snapshot stays.
    pub fn install(&mut self, snapshot: Snapshot) -> AppResult<ReconcileReport> {
        let report = self.store.reconcile(snapshot.event_ids())?;
        self.snapshot = Arc::new(snapshot);
        Ok(report)
    }

    pub fn find(&self, id: &str) -> Option<&MatchedEvent> {
        self.snapshot.position(id).map(|i| &self.snapshot.matched[i])
    }

    pub fn previous(&self, id: &str) -> Option<&MatchedEvent> {
        let pos = self.snapshot.position(id)?;
        pos.checked_sub(1).map(|i| &self.snapshot.matched[i])
    }

    pub fn next(&self, id: &str) -> Option<&MatchedEvent> {
        let pos = self.snapshot.position(id)?;
        self.snapshot.matched.get(pos + 1)
    }

    /// Stored decisions keyed by normalised id.
    pub fn decisions(&self) -> AppResult<HashMap<String, ReviewDecision>> {
        Ok(self
            .store
            .export_all()?
            .into_iter()
            .map(|(id, d)| (normalize_id(&id), d))
            .collect())
    }

    pub fn decision(&self, id: &str) -> AppResult<Option<ReviewDecision>> {
        let ev = self
            .find(id)
            .ok_or_else(|| AppError::UnknownEvent(id.to_string()))?;
        self.store.get(ev.id())
    }

    pub fn counts(&self, id: &str) -> AppResult<Counts> {
        let ev = self
            .find(id)
            .ok_or_else(|| AppError::UnknownEvent(id.to_string()))?;
        self.store.counts(ev.id())
    }

    /// Ids without a review, in match order.
    pub fn unreviewed_ids(&self) -> AppResult<Vec<String>> {
        let decisions = self.decisions()?;
        Ok(self
            .snapshot
            .matched
            .iter()
            .filter(|m| {
                !decisions
                    .get(&normalize_id(m.id()))
                    .map(ReviewDecision::is_reviewed)
                    .unwrap_or(false)
            })
            .map(|m| m.id().to_string())
            .collect())
    }

    /// First unreviewed event after `after` (in match order), wrapping around
    /// to the start. `None` once everything is reviewed.
    pub fn next_unreviewed(&self, after: Option<&str>) -> AppResult<Option<String>> {
        let queue = self.unreviewed_ids()?;
        let Some(after) = after else {
            return Ok(queue.into_iter().next());
        };
        let Some(pos) = self.snapshot.position(after) else {
            return Ok(queue.into_iter().next());
        };

        let later = queue
            .iter()
            .find(|id| self.snapshot.position(id).is_some_and(|p| p > pos))
            .cloned();

        Ok(later.or_else(|| queue.into_iter().next()))
    }

    /// Store a decision for an event of the current log. Only fields set in
    /// `update` change.
    pub fn review(&mut self, id: &str, update: &ReviewUpdate) -> AppResult<ReviewDecision> {
        let key = self.resolve(id)?;
        let stored = self.store.upsert(&key, update)?;
        self.store
            .log("review", &key, &describe(&stored, None));
        Ok(stored)
    }

    /// Store a decision together with the event's full tally.
    pub fn save(
        &mut self,
        id: &str,
        update: &ReviewUpdate,
        counts: &Counts,
    ) -> AppResult<ReviewDecision> {
        let key = self.resolve(id)?;
        let stored = self.store.save_review(&key, update, counts)?;
        self.store
            .log("review", &key, &describe(&stored, Some(counts)));
        Ok(stored)
    }

    pub fn summary(&self) -> AppResult<Summary> {
        let decisions = self.decisions()?;
        let all_counts = self.store.all_counts()?;

        let mut s = Summary {
            total_events: self.snapshot.matched.len(),
            with_video: self.snapshot.matched.iter().filter(|m| m.has_video()).count(),
            ..Default::default()
        };

        for m in &self.snapshot.matched {
            if let Some(d) = decisions.get(&normalize_id(m.id())) {
                if d.is_reviewed() {
                    s.reviewed += 1;
                }
                if d.false_trigger {
                    s.false_triggers += 1;
                }
            }
            if let Some(c) = all_counts.get(&normalize_id(m.id())) {
                s.fish_counted += c.values().map(|v| *v as u64).sum::<u64>();
            }
        }

        s.remaining = s.total_events.saturating_sub(s.reviewed);
        s.orphaned = decisions.values().filter(|d| d.orphaned).count();
        Ok(s)
    }

    /// Event id as written in the log, for an id typed by the operator.
    fn resolve(&self, id: &str) -> AppResult<String> {
        self.find(id)
            .map(|m| m.id().to_string())
            .ok_or_else(|| AppError::UnknownEvent(id.to_string()))
    }
}

fn describe(d: &ReviewDecision, counts: Option<&Counts>) -> String {
    let mut msg = format!(
        "species={} direction={}",
        d.species_str(),
        d.direction.as_str()
    );
    if d.false_trigger {
        msg.push_str(" false_trigger");
    }
    if let Some(c) = counts {
        msg.push_str(&format!(" counts=[{}]", crate::models::review::format_counts(c)));
    }
    msg
}
