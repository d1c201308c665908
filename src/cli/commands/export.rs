use crate::cli::commands::open_session;
use crate::cli::parser::Commands;
use crate::config::{Config, clean_path};
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        counts,
        force,
    } = cmd
    {
        // --file is taken as given (relative to the working directory);
        // the configured export_file lives in the project root.
        let path = match file {
            Some(f) => expand_tilde(&clean_path(f)),
            None => cfg.export_path()?,
        };

        let session = open_session(cfg)?;
        ExportLogic::export(&session, *format, &path, *counts, *force)?;
    }
    Ok(())
}
