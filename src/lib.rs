//! fishreview library root.
//! Exposes the CLI parser, the high-level run() function and the internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli, cfg),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Index => cli::commands::index::handle(&cli.command, cfg),
        Commands::List { .. } => cli::commands::list::handle(&cli.command, cfg),
        Commands::Show { .. } => cli::commands::show::handle(&cli.command, cfg),
        Commands::Review { .. } => cli::commands::review::handle(&cli.command, cfg),
        Commands::Next { .. } => cli::commands::next::handle(&cli.command, cfg),
        Commands::Session { .. } => cli::commands::session::handle(&cli.command, cfg),
        Commands::Summary => cli::commands::summary::handle(&cli.command, cfg),
        Commands::Orphans => cli::commands::orphans::handle(&cli.command, cfg),
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cfg),
        Commands::Backup { .. } => cli::commands::backup::handle(&cli.command, cfg),
    }
}

/// Apply the global command line overrides on top of the loaded config.
pub fn apply_overrides(cli: &Cli, cfg: &mut Config) {
    if let Some(project) = &cli.project {
        cfg.project_root = Some(project.clone());
    }
    if let Some(videos) = &cli.videos {
        cfg.video_index_root = Some(videos.clone());
    }
    if let Some(library) = &cli.library {
        cfg.video_library_root = Some(library.clone());
    }
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    // 1️⃣ parse CLI
    let cli = Cli::parse();

    // 2️⃣ load config once (test mode never reads the user's file)
    let mut cfg = if cli.test {
        Config::default()
    } else {
        Config::load()?
    };

    // 3️⃣ command line wins over the config file
    apply_overrides(&cli, &mut cfg);

    // 4️⃣ hand everything to the dispatcher
    dispatch(&cli, &cfg)
}
