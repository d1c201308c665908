use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::{Config, clean_path};
use crate::core::backup::BackupLogic;
use crate::errors::AppResult;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup {
        file,
        compress,
        force,
    } = cmd
    {
        let store = open_store(cfg)?;
        let dest = expand_tilde(&clean_path(file));
        BackupLogic::backup(&store, &dest, *compress, *force)?;
    }

    Ok(())
}
