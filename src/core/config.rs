use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use std::fs;
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(path: &Path) -> AppResult<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        println!("{}", content);
        Ok(())
    }

    /// Open the config file in an editor: `--editor`, then `$EDITOR`, then the
    /// platform default.
    pub fn edit(path: &Path, editor: &Option<String>) -> AppResult<()> {
        let default_editor = if cfg!(target_os = "windows") {
            "notepad".to_string()
        } else {
            "nano".to_string()
        };

        let requested = editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| default_editor.clone());

        match Command::new(&requested).arg(path).status() {
            Ok(status) if status.success() => {
                success(format!("Configuration edited with '{requested}'."));
                Ok(())
            }
            Ok(_) | Err(_) if requested != default_editor => {
                warning(format!(
                    "Editor '{requested}' failed, falling back to '{default_editor}'."
                ));
                Command::new(&default_editor)
                    .arg(path)
                    .status()
                    .map_err(|e| AppError::Config(format!("{default_editor}: {e}")))?;
                Ok(())
            }
            Ok(status) => Err(AppError::Config(format!(
                "editor '{requested}' exited with {status}"
            ))),
            Err(e) => Err(AppError::Config(format!("{requested}: {e}"))),
        }
    }

    /// Print the problems `Config::problems` finds, if any.
    pub fn check(cfg: &Config) -> bool {
        let problems = cfg.problems();
        if problems.is_empty() {
            success("Configuration looks good.");
            return true;
        }
        for p in &problems {
            warning(p);
        }
        info(format!("{} problem(s) found.", problems.len()));
        false
    }
}
