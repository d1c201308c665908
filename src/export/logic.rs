// src/export/logic.rs

use crate::core::export::{ExportRow, build_count_rows, build_rows};
use crate::core::session::ReviewSession;
use crate::errors::AppResult;
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::ui::messages::warning;
use std::path::Path;

const EVENT_HEADERS: [&str; 6] = ["id", "timestamp", "species", "direction", "videoPath", "notes"];
const COUNT_HEADERS: [&str; 4] = ["id", "timestamp", "species", "direction"];

/// High level export of the current session.
pub struct ExportLogic;

impl ExportLogic {
    /// Export one row per log event (or one row per counted fish with
    /// `counts`). Returns the number of rows written.
    pub fn export(
        session: &ReviewSession,
        format: ExportFormat,
        path: &Path,
        counts: bool,
        force: bool,
    ) -> AppResult<usize> {
        ensure_writable(path, force)?;

        let snapshot = session.snapshot();

        let written = if counts {
            let rows = build_count_rows(&snapshot.matched, &session.store().all_counts()?);
            if rows.is_empty() {
                warning("No fish counted yet; the export only has a header.");
            }
            match format {
                ExportFormat::Csv => export_csv(&rows, &COUNT_HEADERS, path)?,
                ExportFormat::Json => export_json(&rows, path)?,
            }
            rows.len()
        } else {
            let rows: Vec<ExportRow> = build_rows(&snapshot.matched, &session.decisions()?);
            match format {
                ExportFormat::Csv => export_csv(&rows, &EVENT_HEADERS, path)?,
                ExportFormat::Json => export_json(&rows, path)?,
            }
            rows.len()
        };

        session.store().log(
            "export",
            &path.to_string_lossy(),
            &format!(
                "{} {} row(s){}",
                format.as_str(),
                written,
                if counts { " (counts)" } else { "" }
            ),
        );

        Ok(written)
    }
}
