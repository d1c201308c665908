pub mod backup;
pub mod config;
pub mod db;
pub mod export;
pub mod index;
pub mod init;
pub mod list;
pub mod log;
pub mod next;
pub mod orphans;
pub mod review;
pub mod session;
pub mod show;
pub mod summary;

use crate::config::Config;
use crate::core::session::{ReviewSession, SessionConfig};
use crate::db::store::{ReconcileReport, ReviewStore};
use crate::errors::AppResult;
use crate::models::diagnostics::Diagnostics;
use crate::ui::messages::{info, warning};

/// Index the project, open its store and report anything worth knowing
/// (warnings, newly orphaned reviews) in one line each.
pub(crate) fn open_session(cfg: &Config) -> AppResult<ReviewSession> {
    let (session, report) = ReviewSession::open(SessionConfig::from_config(cfg)?)?;
    report_reconcile(&report);

    let snapshot = session.snapshot();
    if !snapshot.diagnostics.is_clean() {
        warning(format!(
            "{} warning(s) while indexing; run `fishreview index` for details.",
            snapshot.diagnostics.warnings.len()
        ));
    }

    Ok(session)
}

/// Store only, for commands that do not need the log or the clips.
pub(crate) fn open_store(cfg: &Config) -> AppResult<ReviewStore> {
    ReviewStore::open(&cfg.database_path()?)
}

pub(crate) fn report_reconcile(report: &ReconcileReport) {
    if !report.orphaned.is_empty() {
        warning(format!(
            "{} stored review(s) no longer match an event in the log: {}",
            report.orphaned.len(),
            report.orphaned.join(", ")
        ));
    }
    if !report.restored.is_empty() {
        info(format!(
            "{} previously orphaned review(s) matched again: {}",
            report.restored.len(),
            report.restored.join(", ")
        ));
    }
}

/// Every collected warning, grouped by kind.
pub(crate) fn print_diagnostics(d: &Diagnostics) {
    if d.is_clean() {
        return;
    }
    for kind in ["parse", "duplicate", "video-name", "walk"] {
        let n = d.count(kind);
        if n == 0 {
            continue;
        }
        warning(format!("{n} {kind} warning(s):"));
        for w in d.warnings.iter().filter(|w| w.kind() == kind) {
            println!("    {w}");
        }
    }
}
