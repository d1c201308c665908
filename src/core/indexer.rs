//! Video indexer: walk a folder, pick up clips, map event id → clip.

use crate::errors::{AppError, AppResult};
use crate::models::diagnostics::Diagnostic;
use crate::models::event_id::normalize_id;
use crate::models::video::VideoEntry;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// How clip file names are turned into event ids.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub extensions: Vec<String>,
    pub id_pattern: Regex,
}

impl IndexOptions {
    pub fn new(extensions: &[String], id_pattern: &str) -> AppResult<Self> {
        let id_pattern = Regex::new(id_pattern).map_err(|e| AppError::InvalidPattern {
            pattern: id_pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            extensions: extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            id_pattern,
        })
    }

    fn is_media(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }

    /// Event id encoded in a clip's file stem: the `id` group, else group 1,
    /// else the whole match.
    pub fn extract_id(&self, path: &Path) -> Option<String> {
        let stem = path.file_stem()?.to_string_lossy();
        let caps = self.id_pattern.captures(stem.trim())?;
        let m = caps
            .name("id")
            .or_else(|| caps.get(1))
            .or_else(|| caps.get(0))?;
        let id = m.as_str().trim();
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }
}

/// Result of one scan. Keys are normalised event ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoIndex {
    pub entries: BTreeMap<String, VideoEntry>,
    pub warnings: Vec<Diagnostic>,
}

impl VideoIndex {
    pub fn get(&self, id: &str) -> Option<&VideoEntry> {
        self.entries.get(&normalize_id(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scan `root` recursively. Clips are visited in lexicographic path order so
/// the first-match-wins rule for duplicate ids is deterministic.
pub fn index_videos(
    root: &Path,
    library_root: Option<&Path>,
    opts: &IndexOptions,
) -> AppResult<VideoIndex> {
    if !root.is_dir() || fs::read_dir(root).is_err() {
        return Err(AppError::RootNotFound(root.to_path_buf()));
    }

    let mut index = VideoIndex::default();
    let mut candidates: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                index.warnings.push(Diagnostic::WalkWarning {
                    path: e.path().map(Path::to_path_buf),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_file() && opts.is_media(path) {
            candidates.push(path.to_path_buf());
        }
    }

    candidates.sort();

    for path in candidates {
        let Some(id) = opts.extract_id(&path) else {
            index
                .warnings
                .push(Diagnostic::UnrecognizedVideoName { path });
            continue;
        };

        let key = normalize_id(&id);
        if let Some(kept) = index.entries.get(&key) {
            index.warnings.push(Diagnostic::DuplicateId {
                id,
                kept: kept.absolute_path.clone(),
                ignored: path,
            });
            continue;
        }

        let relative_path = library_root
            .and_then(|lib| path.strip_prefix(lib).ok())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| path.clone());

        index.entries.insert(
            key,
            VideoEntry {
                id,
                absolute_path: path,
                relative_path,
            },
        );
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> IndexOptions {
        IndexOptions::new(&["mp4".to_string(), ".MOV".to_string()], r"^(?P<id>\d+)").unwrap()
    }

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"").unwrap();
    }

    #[test]
    fn indexes_nested_clips_by_id() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "day1/1001.mp4");
        touch(dir.path(), "day2/1002_cam2.MOV");
        touch(dir.path(), "day2/readme.txt");

        let idx = index_videos(dir.path(), Some(dir.path()), &opts()).unwrap();

        assert_eq!(idx.len(), 2);
        assert_eq!(
            idx.get("1001").unwrap().relative_path,
            PathBuf::from("day1").join("1001.mp4")
        );
        assert!(idx.get("1002").is_some());
        assert!(idx.warnings.is_empty());
    }

    #[test]
    fn duplicates_keep_the_first_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b/0042.mp4");
        touch(dir.path(), "a/42.mp4");

        let idx = index_videos(dir.path(), None, &opts()).unwrap();

        assert_eq!(idx.len(), 1);
        let kept = idx.get("42").unwrap();
        assert!(kept.absolute_path.ends_with(Path::new("a").join("42.mp4")));
        assert_eq!(kept.relative_path, kept.absolute_path);
        assert_eq!(idx.warnings.len(), 1);
        assert!(matches!(idx.warnings[0], Diagnostic::DuplicateId { .. }));
    }

    #[test]
    fn unnamed_clips_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "overview.mp4");

        let idx = index_videos(dir.path(), None, &opts()).unwrap();
        assert!(idx.is_empty());
        assert!(matches!(
            idx.warnings[0],
            Diagnostic::UnrecognizedVideoName { .. }
        ));
    }

    #[test]
    fn rescanning_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["3.mp4", "1.mp4", "x/2.mp4", "x/y/10.mp4"] {
            touch(dir.path(), name);
        }

        let first = index_videos(dir.path(), Some(dir.path()), &opts()).unwrap();
        let second = index_videos(dir.path(), Some(dir.path()), &opts()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            index_videos(&missing, None, &opts()),
            Err(AppError::RootNotFound(_))
        ));
    }

    #[test]
    fn bad_pattern_is_rejected() {
        assert!(matches!(
            IndexOptions::new(&["mp4".to_string()], "(unclosed"),
            Err(AppError::InvalidPattern { .. })
        ));
    }
}
