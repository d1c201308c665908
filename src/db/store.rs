//! Review store: durable review decisions keyed by normalised event id.
//!
//! Every write runs in its own transaction and is committed (WAL, full sync)
//! before the call returns. Nothing here ever deletes a decision: re-indexing
//! only toggles the `orphaned` flag.

use crate::db::initialize::init_db;
use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::direction::Direction;
use crate::models::event_id::{compare_ids, normalize_id};
use crate::models::review::{Counts, ReviewDecision, ReviewUpdate};
use chrono::{Local, SecondsFormat};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of `ReviewStore::reconcile`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Ids flagged orphaned by this run.
    pub orphaned: Vec<String>,
    /// Ids that reappeared in the log and lost the flag.
    pub restored: Vec<String>,
    /// Orphaned decisions after the run.
    pub total_orphaned: usize,
}

pub struct ReviewStore {
    pool: DbPool,
    path: PathBuf,
}

impl ReviewStore {
    /// Open (creating if needed) the store file and bring the schema up to date.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .map_err(|e| AppError::StoreUnavailable(format!("{}: {e}", dir.display())))?;
        }

        let pool = DbPool::new(path).map_err(|e| store_error("open", e))?;
        init_db(&pool.conn)?;

        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    /// Append to the internal audit log; failures only warn.
    pub fn log(&self, operation: &str, target: &str, message: &str) {
        ttlog_quiet(&self.pool.conn, operation, target, message);
    }

    pub fn get(&self, id: &str) -> AppResult<Option<ReviewDecision>> {
        get_decision(&self.pool.conn, &normalize_id(id))
    }

    /// Apply `update` to the decision for `id` and stamp `reviewed_at`.
    /// Returns the decision as stored.
    pub fn upsert(&mut self, id: &str, update: &ReviewUpdate) -> AppResult<ReviewDecision> {
        let id = normalize_id(id);
        let tx = self
            .pool
            .conn
            .transaction()
            .map_err(|e| store_error("upsert", e))?;

        let stored = upsert_in(&tx, &id, update)?;
        tx.commit().map_err(|e| store_error("upsert", e))?;

        Ok(stored)
    }

    /// Upsert the decision and replace the event's counts in one transaction.
    pub fn save_review(
        &mut self,
        id: &str,
        update: &ReviewUpdate,
        counts: &Counts,
    ) -> AppResult<ReviewDecision> {
        let id = normalize_id(id);
        let tx = self
            .pool
            .conn
            .transaction()
            .map_err(|e| store_error("save", e))?;

        let stored = upsert_in(&tx, &id, update)?;

        tx.execute("DELETE FROM counts WHERE event_id = ?1", [&id])
            .map_err(|e| store_error("save", e))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO counts (event_id, species, direction, count)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(|e| store_error("save", e))?;

            for ((species, direction), count) in counts {
                let Some(dir) = direction.to_db() else {
                    continue;
                };
                if *count == 0 {
                    continue;
                }
                stmt.execute(params![id, species, dir, count])
                    .map_err(|e| store_error("save", e))?;
            }
        }

        tx.commit().map_err(|e| store_error("save", e))?;
        Ok(stored)
    }

    pub fn counts(&self, id: &str) -> AppResult<Counts> {
        let mut stmt = self.pool.conn.prepare_cached(
            "SELECT species, direction, count FROM counts WHERE event_id = ?1",
        )?;
        let rows = stmt.query_map([normalize_id(id)], |row| map_count_at(row, 0))?;

        let mut out = Counts::new();
        for r in rows {
            let (species, dir, count) = r?;
            out.insert((species, dir), count);
        }
        Ok(out)
    }

    /// Counts of every event, keyed by normalised event id.
    pub fn all_counts(&self) -> AppResult<HashMap<String, Counts>> {
        let mut stmt = self
            .pool
            .conn
            .prepare("SELECT event_id, species, direction, count FROM counts")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let (species, dir, count) = map_count_at(row, 1)?;
            Ok((id, species, dir, count))
        })?;

        let mut out: HashMap<String, Counts> = HashMap::new();
        for r in rows {
            let (id, species, dir, count) = r?;
            out.entry(id).or_default().insert((species, dir), count);
        }
        Ok(out)
    }

    /// Flag decisions whose id is not in `current_ids` as orphaned and clear
    /// the flag on the others. Ids are compared in normalised form.
    pub fn reconcile<'a, I>(&mut self, current_ids: I) -> AppResult<ReconcileReport>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let current: HashSet<String> = current_ids.into_iter().map(normalize_id).collect();

        let tx = self
            .pool
            .conn
            .transaction()
            .map_err(|e| store_error("reconcile", e))?;

        let existing: Vec<(String, bool)> = {
            let mut stmt = tx.prepare("SELECT event_id, orphaned FROM reviews")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? != 0))
            })?;
            let mut v = Vec::new();
            for r in rows {
                v.push(r?);
            }
            v
        };

        let mut report = ReconcileReport::default();
        {
            let mut flag = tx.prepare("UPDATE reviews SET orphaned = ?2 WHERE event_id = ?1")?;
            for (id, was_orphaned) in existing {
                let present = current.contains(&normalize_id(&id));
                if present && was_orphaned {
                    flag.execute(params![id, 0])
                        .map_err(|e| store_error("reconcile", e))?;
                    report.restored.push(id);
                } else if !present {
                    if !was_orphaned {
                        flag.execute(params![id, 1])
                            .map_err(|e| store_error("reconcile", e))?;
                        report.orphaned.push(id);
                    }
                    report.total_orphaned += 1;
                }
            }
        }

        tx.commit().map_err(|e| store_error("reconcile", e))?;

        report.orphaned.sort_by(|a, b| compare_ids(a, b));
        report.restored.sort_by(|a, b| compare_ids(a, b));
        Ok(report)
    }

    /// Every stored decision, ordered by id.
    pub fn export_all(&self) -> AppResult<Vec<(String, ReviewDecision)>> {
        let mut stmt = self.pool.conn.prepare(
            "SELECT event_id, species, direction, reviewed_at, notes, false_trigger, orphaned
             FROM reviews",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, map_decision(row)?)))?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        out.sort_by(|a, b| compare_ids(&a.0, &b.0));
        Ok(out)
    }

    pub fn orphans(&self) -> AppResult<Vec<(String, ReviewDecision)>> {
        Ok(self
            .export_all()?
            .into_iter()
            .filter(|(_, d)| d.orphaned)
            .collect())
    }
}

fn get_decision(conn: &Connection, id: &str) -> AppResult<Option<ReviewDecision>> {
    let mut stmt = conn.prepare_cached(
        "SELECT event_id, species, direction, reviewed_at, notes, false_trigger, orphaned
         FROM reviews WHERE event_id = ?1",
    )?;
    Ok(stmt.query_row([id], map_decision).optional()?)
}

fn upsert_in(conn: &Connection, id: &str, update: &ReviewUpdate) -> AppResult<ReviewDecision> {
    let existing = get_decision(conn, id)?;
    let mut merged = update.apply_to(existing);
    merged.reviewed_at = Some(Local::now().to_rfc3339_opts(SecondsFormat::Secs, false));

    conn.execute(
        "INSERT INTO reviews (event_id, species, direction, reviewed_at, notes, false_trigger, orphaned)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(event_id) DO UPDATE SET
            species = excluded.species,
            direction = excluded.direction,
            reviewed_at = excluded.reviewed_at,
            notes = excluded.notes,
            false_trigger = excluded.false_trigger",
        params![
            id,
            merged.species,
            merged.direction.to_db(),
            merged.reviewed_at,
            merged.notes,
            merged.false_trigger as i64,
            merged.orphaned as i64,
        ],
    )
    .map_err(|e| store_error("upsert", e))?;

    Ok(merged)
}

/// Mapping DB → ReviewDecision. Column 0 is the event id and is skipped.
fn map_decision(row: &Row) -> rusqlite::Result<ReviewDecision> {
    let dir_raw: Option<String> = row.get(2)?;
    let direction = Direction::from_db(dir_raw.as_deref()).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDirection(dir_raw.clone().unwrap_or_default())),
        )
    })?;

    Ok(ReviewDecision {
        species: row.get::<_, Option<String>>(1)?.filter(|s| !s.is_empty()),
        direction,
        reviewed_at: row.get(3)?,
        notes: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        false_trigger: row.get::<_, i64>(5)? != 0,
        orphaned: row.get::<_, i64>(6)? != 0,
    })
}

/// Reads `species, direction, count` starting at column `base`.
fn map_count_at(row: &Row, base: usize) -> rusqlite::Result<(String, Direction, u32)> {
    let species: String = row.get(base)?;
    let dir_raw: String = row.get(base + 1)?;
    let direction = Direction::from_db(Some(&dir_raw)).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            base + 1,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDirection(dir_raw.clone())),
        )
    })?;
    let count: u32 = row.get(base + 2)?;
    Ok((species, direction, count))
}

/// Storage conditions the operator can fix (lock, disk space, permissions)
/// become `StoreUnavailable`; anything else stays a plain DB error.
fn store_error(op: &str, e: rusqlite::Error) -> AppError {
    if let rusqlite::Error::SqliteFailure(failure, msg) = &e
        && matches!(
            failure.code,
            ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::DiskFull
                | ErrorCode::ReadOnly
                | ErrorCode::CannotOpen
                | ErrorCode::PermissionDenied
                | ErrorCode::SystemIoFailure
        )
    {
        let detail = msg.clone().unwrap_or_else(|| e.to_string());
        return AppError::StoreUnavailable(format!("{op}: {detail}"));
    }
    AppError::Db(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_tmp() -> (tempfile::TempDir, ReviewStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ReviewStore::open(&dir.path().join("fishcounter.sqlite")).unwrap();
        (dir, store)
    }

    fn coho_up() -> ReviewUpdate {
        ReviewUpdate {
            species: Some("Coho".into()),
            direction: Some(Direction::Up),
            ..Default::default()
        }
    }

    #[test]
    fn get_returns_what_upsert_wrote() {
        let (_dir, mut store) = open_tmp();
        assert!(store.get("1002").unwrap().is_none());

        let written = store.upsert("1002", &coho_up()).unwrap();
        let read = store.get("1002").unwrap().unwrap();

        assert_eq!(read, written);
        assert_eq!(read.species.as_deref(), Some("Coho"));
        assert_eq!(read.direction, Direction::Up);
        assert!(read.reviewed_at.is_some());
    }

    #[test]
    fn zero_padded_ids_share_one_decision() {
        let (_dir, mut store) = open_tmp();
        store.upsert("0042", &coho_up()).unwrap();

        let d = store.get("42").unwrap().unwrap();
        assert_eq!(d.species.as_deref(), Some("Coho"));
        assert_eq!(store.export_all().unwrap()[0].0, "42");
    }

    #[test]
    fn decisions_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fishcounter.sqlite");

        {
            let mut store = ReviewStore::open(&path).unwrap();
            store.upsert("7", &coho_up()).unwrap();
        }

        let store = ReviewStore::open(&path).unwrap();
        let d = store.get("7").unwrap().unwrap();
        assert_eq!(d.species.as_deref(), Some("Coho"));
    }

    #[test]
    fn partial_upsert_keeps_other_fields() {
        let (_dir, mut store) = open_tmp();
        store.upsert("1", &coho_up()).unwrap();
        store
            .upsert(
                "1",
                &ReviewUpdate {
                    notes: Some("second look".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let d = store.get("1").unwrap().unwrap();
        assert_eq!(d.species.as_deref(), Some("Coho"));
        assert_eq!(d.direction, Direction::Up);
        assert_eq!(d.notes, "second look");
    }

    #[test]
    fn reconcile_flags_but_never_deletes() {
        let (_dir, mut store) = open_tmp();
        for id in ["1", "2", "3"] {
            store.upsert(id, &coho_up()).unwrap();
        }

        let report = store.reconcile(["1", "3"]).unwrap();
        assert_eq!(report.orphaned, vec!["2".to_string()]);
        assert_eq!(report.total_orphaned, 1);
        assert_eq!(store.export_all().unwrap().len(), 3);
        assert!(store.get("2").unwrap().unwrap().orphaned);

        // id comes back (zero padded this time)
        let report = store.reconcile(["1", "002", "3"]).unwrap();
        assert_eq!(report.restored, vec!["2".to_string()]);
        assert_eq!(report.total_orphaned, 0);
        assert!(!store.get("2").unwrap().unwrap().orphaned);
    }

    #[test]
    fn upsert_does_not_clear_orphan_flag() {
        let (_dir, mut store) = open_tmp();
        store.upsert("9", &coho_up()).unwrap();
        store.reconcile(std::iter::empty()).unwrap();
        store.upsert("9", &ReviewUpdate::default()).unwrap();
        assert!(store.get("9").unwrap().unwrap().orphaned);
    }

    #[test]
    fn save_review_replaces_counts() {
        let (_dir, mut store) = open_tmp();

        let mut counts = Counts::new();
        counts.insert(("Coho".into(), Direction::Up), 2);
        counts.insert(("Brown".into(), Direction::Down), 1);
        counts.insert(("Unknown".into(), Direction::Unset), 4);
        store.save_review("5", &ReviewUpdate::default(), &counts).unwrap();

        let stored = store.counts("5").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored.get(&("Coho".to_string(), Direction::Up)), Some(&2));

        let mut fewer = Counts::new();
        fewer.insert(("Coho".into(), Direction::Stay), 1);
        store.save_review("5", &ReviewUpdate::default(), &fewer).unwrap();
        assert_eq!(store.counts("5").unwrap(), fewer);
        assert_eq!(store.all_counts().unwrap().get("5"), Some(&fewer));
    }

    #[test]
    fn export_all_orders_ids_numerically() {
        let (_dir, mut store) = open_tmp();
        for id in ["10", "9", "100"] {
            store.upsert(id, &ReviewUpdate::default()).unwrap();
        }
        let ids: Vec<String> = store.export_all().unwrap().into_iter().map(|(i, _)| i).collect();
        assert_eq!(ids, vec!["9", "10", "100"]);
    }

    #[test]
    fn locked_store_is_unavailable_and_the_update_can_be_retried() {
        let (dir, mut store) = open_tmp();
        store
            .conn()
            .busy_timeout(std::time::Duration::from_millis(50))
            .unwrap();

        let other = Connection::open(dir.path().join("fishcounter.sqlite")).unwrap();
        other.execute_batch("BEGIN IMMEDIATE;").unwrap();

        let err = store.upsert("1", &coho_up()).unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)), "{err}");

        other.execute_batch("ROLLBACK;").unwrap();
        assert!(store.get("1").unwrap().is_none());

        store.upsert("1", &coho_up()).unwrap();
        assert_eq!(store.get("1").unwrap().unwrap().species.as_deref(), Some("Coho"));
    }
}
