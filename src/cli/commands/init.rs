use crate::cli::commands::open_store;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::parser::find_log_file;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use std::path::{self, Path};

/// Handle the `init` command
///
/// This initializes:
///  - the configuration file (skipped in test mode)
///  - the project's review store
///  - all pending store migrations
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let project = cfg.project_root()?;
    if !project.is_dir() {
        return Err(AppError::Config(format!(
            "project folder not found: {}",
            project.display()
        )));
    }

    //
    // 1️⃣ CONFIGURATION
    //
    let path = Config::config_file();
    if cli.test {
        info("Test mode: configuration file not written.");
    } else {
        let mut saved = cfg.clone();
        saved.project_root = Some(absolute_str(&project)?);
        if let Some(v) = &cfg.video_index_root {
            saved.video_index_root = Some(absolute_str(Path::new(v))?);
        }
        if let Some(l) = &cfg.video_library_root {
            saved.video_library_root = Some(absolute_str(Path::new(l))?);
        }
        saved.save_to(&path)?;
        success(format!("Config file : {}", path.display()));
    }

    //
    // 2️⃣ STORE (tables + migrations)
    //
    let store = open_store(cfg)?;
    success(format!("Review store: {}", store.path().display()));

    //
    // 3️⃣ LOG FILE (not required yet)
    //
    match find_log_file(&project) {
        Ok(log) => info(format!("Log file    : {}", log.display())),
        Err(e) => warning(e),
    }

    store.log(
        "init",
        &project.to_string_lossy(),
        &format!("Store initialized at {}", store.path().display()),
    );

    success("fishreview initialization completed!");
    Ok(())
}

fn absolute_str(p: &Path) -> AppResult<String> {
    Ok(path::absolute(p)?.to_string_lossy().to_string())
}
