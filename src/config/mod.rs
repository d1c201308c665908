use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod migrate; // use submodule at src/config/migrate.rs

/// User configuration, stored as YAML in `fishreview.conf`.
/// Every path can be overridden from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Folder containing the Riverwatcher `.log` export.
    #[serde(default)]
    pub project_root: Option<String>,
    /// Folder scanned for clips (defaults to the project root).
    #[serde(default)]
    pub video_index_root: Option<String>,
    /// Base for relative video paths (defaults to the video index root).
    #[serde(default)]
    pub video_library_root: Option<String>,
    /// Review store file name, relative to the project root unless absolute.
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
    /// Regex applied to the clip file stem; named group `id` (or group 1).
    #[serde(default = "default_video_id_pattern")]
    pub video_id_pattern: String,
    /// Year used when the log has no folder stamp line.
    #[serde(default)]
    pub default_year: Option<i32>,
    /// Species offered as quick-entry choices in the review session.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_export_file")]
    pub export_file: String,
}

fn default_database() -> String {
    "fishcounter.sqlite".to_string()
}
fn default_video_extensions() -> Vec<String> {
    vec!["mp4".to_string()]
}
fn default_video_id_pattern() -> String {
    r"^(?P<id>\d+)".to_string()
}
fn default_categories() -> Vec<String> {
    [
        "Chinook", "Rainbow", "Atlantic", "Brown", "Coho", "Unknown", "Non fish",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_export_file() -> String {
    "fish_counts_export.csv".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: None,
            video_index_root: None,
            video_library_root: None,
            database: default_database(),
            video_extensions: default_video_extensions(),
            video_id_pattern: default_video_id_pattern(),
            default_year: None,
            categories: default_categories(),
            export_file: default_export_file(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform.
    /// `FISHREVIEW_CONFIG_DIR` takes precedence.
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var("FISHREVIEW_CONFIG_DIR")
            && !dir.trim().is_empty()
        {
            return PathBuf::from(dir);
        }

        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("fishreview")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".fishreview")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("fishreview.conf")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    /// Project root, required by every command that touches a project.
    pub fn project_root(&self) -> AppResult<PathBuf> {
        match self.project_root.as_deref().map(clean_path) {
            Some(p) if !p.is_empty() => Ok(expand_tilde(&p)),
            _ => Err(AppError::Config(
                "no project root set (use --project or set project_root in the config file)"
                    .to_string(),
            )),
        }
    }

    pub fn video_index_root(&self) -> AppResult<PathBuf> {
        match self.video_index_root.as_deref().map(clean_path) {
            Some(p) if !p.is_empty() => Ok(expand_tilde(&p)),
            _ => self.project_root(),
        }
    }

    pub fn video_library_root(&self) -> AppResult<PathBuf> {
        match self.video_library_root.as_deref().map(clean_path) {
            Some(p) if !p.is_empty() => Ok(expand_tilde(&p)),
            _ => self.video_index_root(),
        }
    }

    /// Review store location: `database` joined to the project root unless absolute.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        let db = expand_tilde(&clean_path(&self.database));
        if db.is_absolute() {
            Ok(db)
        } else {
            Ok(self.project_root()?.join(db))
        }
    }

    pub fn export_path(&self) -> AppResult<PathBuf> {
        let out = expand_tilde(&clean_path(&self.export_file));
        if out.is_absolute() {
            Ok(out)
        } else {
            Ok(self.project_root()?.join(out))
        }
    }

    /// Fields that are missing or suspicious, reported by `config --check`.
    pub fn problems(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.project_root.is_none() {
            out.push("project_root is not set".to_string());
        }
        if self.video_extensions.is_empty() {
            out.push("video_extensions is empty: no clips will be indexed".to_string());
        }
        if let Err(e) = regex::Regex::new(&self.video_id_pattern) {
            out.push(format!("video_id_pattern is not a valid regex: {e}"));
        }
        if self.categories.is_empty() {
            out.push("categories is empty".to_string());
        }
        out
    }
}

/// Paths pasted from Explorer often come quoted.
pub fn clean_path(s: &str) -> String {
    s.trim().trim_matches('"').to_string()
}
