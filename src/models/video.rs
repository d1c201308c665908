use serde::Serialize;
use std::path::PathBuf;

/// A clip found by the video indexer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VideoEntry {
    pub id: String,
    pub absolute_path: PathBuf,
    /// Path relative to the library root, or the absolute path when the clip
    /// lives outside it.
    pub relative_path: PathBuf,
}

impl VideoEntry {
    pub fn display_path(&self) -> String {
        self.relative_path.to_string_lossy().to_string()
    }
}
