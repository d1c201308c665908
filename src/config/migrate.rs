//! Config file upgrades.
//!
//! Older config files lack keys added in later versions. serde fills them with
//! defaults at load time, but `config --migrate` writes them back so the file
//! documents every option.

use super::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Keys present in a freshly written config but absent from the file at `path`.
pub fn missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let current = read_mapping(path)?;
    let defaults = default_mapping()?;

    Ok(defaults
        .keys()
        .filter(|k| !current.contains_key(*k))
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect())
}

/// Add missing keys with their default values; existing values are kept as they are.
/// Returns the keys that were added.
pub fn fill_missing_keys(path: &Path) -> AppResult<Vec<String>> {
    if !path.exists() {
        info(format!(
            "No config file at {}; nothing to migrate.",
            path.display()
        ));
        return Ok(Vec::new());
    }

    let mut current = read_mapping(path)?;
    let defaults = default_mapping()?;
    let mut added = Vec::new();

    for (k, v) in defaults {
        if !current.contains_key(&k) {
            if let Some(name) = k.as_str() {
                added.push(name.to_string());
            }
            current.insert(k, v);
        }
    }

    if added.is_empty() {
        return Ok(added);
    }

    let serialized = serde_yaml::to_string(&Value::Mapping(current))?;
    fs::write(path, serialized).map_err(|e| {
        AppError::Config(format!("failed to write {}: {e}", path.display()))
    })?;

    success(format!(
        "Config migrated: added {} to {}",
        added.join(", "),
        path.display()
    ));

    Ok(added)
}

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    if !path.exists() {
        return Ok(Mapping::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(&content)? {
        Value::Mapping(m) => Ok(m),
        _ => Err(AppError::Config(format!(
            "{} is not a YAML mapping",
            path.display()
        ))),
    }
}

fn default_mapping() -> AppResult<Mapping> {
    match serde_yaml::to_value(Config::default())? {
        Value::Mapping(m) => Ok(m),
        _ => Err(AppError::Other("default config is not a mapping".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_only_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fishreview.conf");
        fs::write(&path, "project_root: /srv/weir\ndatabase: custom.sqlite\n").unwrap();

        let missing = missing_keys(&path).unwrap();
        assert!(missing.contains(&"video_id_pattern".to_string()));
        assert!(!missing.contains(&"database".to_string()));

        let added = fill_missing_keys(&path).unwrap();
        assert_eq!(added, missing);

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.database, "custom.sqlite");
        assert_eq!(cfg.project_root.as_deref(), Some("/srv/weir"));
        assert!(missing_keys(&path).unwrap().is_empty());
    }
}
