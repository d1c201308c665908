// src/export/json_csv.rs

use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::write_atomic;
use crate::export::notify_export_success;
use crate::ui::messages::info;
use serde::Serialize;
use std::path::Path;

/// Export JSON pretty-printed.
pub(crate) fn export_json<T: Serialize>(rows: &[T], path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    write_atomic(path, |file| {
        serde_json::to_writer_pretty(&mut *file, rows)
            .map_err(|e| AppError::export_write(path, format!("JSON serialization error: {e}")))
    })?;

    notify_export_success("JSON", rows.len(), path);
    Ok(())
}

/// Export CSV. The header comes from the row type; it is written even when
/// there are no rows.
pub(crate) fn export_csv<T: Serialize>(
    rows: &[T],
    headers: &[&str],
    path: &Path,
) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    write_atomic(path, |file| {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut *file);

        wtr.write_record(headers)
            .map_err(|e| AppError::export_write(path, format!("CSV write error: {e}")))?;

        for item in rows {
            wtr.serialize(item)
                .map_err(|e| AppError::export_write(path, format!("CSV write error: {e}")))?;
        }

        wtr.flush()
            .map_err(|e| AppError::export_write(path, format!("CSV flush error: {e}")))?;
        Ok(())
    })?;

    notify_export_success("CSV", rows.len(), path);
    Ok(())
}
