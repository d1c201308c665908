//! Unified application error type.
//! All modules (parser, indexer, db, export, cli) return AppError to keep the
//! error handling consistent. Recoverable problems are not errors: they are
//! collected as diagnostics (see `models::diagnostics`).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    /// The review store could not accept a write (locked, full, read-only...).
    /// The pending change was NOT applied and may be retried.
    #[error("Review store unavailable: {0}")]
    StoreUnavailable(String),

    // ---------------------------
    // Log parsing / indexing
    // ---------------------------
    #[error("No [data] section found in {0}")]
    MissingSection(String),

    #[error("No .log file found in project root {}", .0.display())]
    LogNotFound(PathBuf),

    #[error("Video root not found or unreadable: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Invalid video id pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ---------------------------
    // Review input
    // ---------------------------
    #[error("Invalid direction: {0} (expected up, down, stay/x or unset)")]
    InvalidDirection(String),

    #[error("Invalid count spec: {0} (expected SPECIES:DIRECTION[:N])")]
    InvalidCount(String),

    #[error("Event {0} not found in the current log")]
    UnknownEvent(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export to {} failed: {reason}", .path.display())]
    ExportWrite { path: PathBuf, reason: String },

    #[error("Export cancelled: {0}")]
    ExportCancelled(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn export_write<E: std::fmt::Display>(path: &std::path::Path, err: E) -> Self {
        AppError::ExportWrite {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}
