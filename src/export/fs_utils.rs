// src/export/fs_utils.rs

use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, warning};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Check whether `path` may be created or overwritten.
///
/// - file does not exist → Ok
/// - file exists and `force` → Ok
/// - file exists and `force == false` → ask the operator.
pub fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if !path.exists() || force {
        return Ok(());
    }

    warning(format!("The file '{}' already exists.", path.display()));

    print!("Overwrite? [y/N]: ");
    io::stdout().flush().ok();

    let mut answer = String::new();
    io::stdin().read_line(&mut answer).map_err(AppError::from)?;
    let ans = answer.trim().to_ascii_lowercase();

    if ans == "y" || ans == "yes" {
        info("Existing file will be overwritten.");
        Ok(())
    } else {
        Err(AppError::ExportCancelled(format!(
            "{} not overwritten",
            path.display()
        )))
    }
}

/// Sibling temp file used while `target` is being written.
fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "export".to_string());
    target.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

/// Write `target` atomically: `write` fills a temp file in the same
/// directory, which is flushed, synced and renamed over `target`.
/// On any failure the temp file is removed and `target` is untouched.
pub fn write_atomic<F>(target: &Path, write: F) -> AppResult<()>
where
    F: FnOnce(&mut File) -> AppResult<()>,
{
    if let Some(dir) = target.parent()
        && !dir.as_os_str().is_empty()
        && !dir.is_dir()
    {
        return Err(AppError::export_write(target, "target directory does not exist"));
    }

    let tmp = temp_path_for(target);

    let result = (|| -> AppResult<()> {
        let mut file = File::create(&tmp)?;
        write(&mut file)?;
        file.flush()?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, target)?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(match e {
            AppError::ExportWrite { .. } => e,
            other => AppError::export_write(target, other),
        });
    }

    Ok(())
}
