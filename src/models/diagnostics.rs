//! Recoverable problems found while parsing or indexing. They never abort a
//! batch; they are collected and shown to the operator afterwards.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum Diagnostic {
    /// A `[data]` line that does not follow the grammar; the line was skipped.
    ParseWarning {
        line: usize,
        content: String,
        reason: String,
    },
    /// Two clips share an id; `kept` wins (first by path order).
    DuplicateId {
        id: String,
        kept: PathBuf,
        ignored: PathBuf,
    },
    /// A media file whose name does not yield an id.
    UnrecognizedVideoName { path: PathBuf },
    /// An entry below the video root could not be read.
    WalkWarning { path: Option<PathBuf>, reason: String },
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::ParseWarning { .. } => "parse",
            Diagnostic::DuplicateId { .. } => "duplicate",
            Diagnostic::UnrecognizedVideoName { .. } => "video-name",
            Diagnostic::WalkWarning { .. } => "walk",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ParseWarning {
                line,
                content,
                reason,
            } => write!(f, "line {line}: {reason} ('{content}')"),
            Diagnostic::DuplicateId { id, kept, ignored } => write!(
                f,
                "duplicate video id {id}: kept {}, ignored {}",
                kept.display(),
                ignored.display()
            ),
            Diagnostic::UnrecognizedVideoName { path } => {
                write!(f, "no event id in video name {}", path.display())
            }
            Diagnostic::WalkWarning { path, reason } => match path {
                Some(p) => write!(f, "cannot read {}: {reason}", p.display()),
                None => write!(f, "cannot read entry: {reason}"),
            },
        }
    }
}

/// Summary of one parse/index batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub log_path: Option<PathBuf>,
    pub folder_stamp: Option<String>,
    pub events_parsed: usize,
    pub videos_indexed: usize,
    pub videos_matched: usize,
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn count(&self, kind: &str) -> usize {
        self.warnings.iter().filter(|w| w.kind() == kind).count()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
