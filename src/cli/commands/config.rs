use crate::cli::parser::Commands;
use crate::config::Config;
use crate::config::migrate::{fill_missing_keys, missing_keys};
use crate::core::config::ConfigLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        migrate,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        // ---- PRINT CONFIG ----
        if *print_config {
            if path.exists() {
                println!("📄 {}:\n", path.display());
                ConfigLogic::print(&path)?;
            } else {
                info(format!(
                    "No config file at {}; effective settings:",
                    path.display()
                ));
                println!("{}", serde_yaml::to_string(cfg)?);
            }
        }

        // ---- CHECK CONFIG ----
        if *check {
            ConfigLogic::check(cfg);
            if path.exists() {
                let missing = missing_keys(&path)?;
                if missing.is_empty() {
                    success("Config file has every key.");
                } else {
                    warning(format!(
                        "Config file lacks: {} (run `fishreview config --migrate`)",
                        missing.join(", ")
                    ));
                }
            }
        }

        // ---- MIGRATE CONFIG ----
        if *migrate {
            let added = fill_missing_keys(&path)?;
            if added.is_empty() && path.exists() {
                info("Config file already up to date.");
            }
        }

        // ---- EDIT CONFIG ----
        if *edit_config {
            ConfigLogic::edit(&path, editor)?;
        }
    }

    Ok(())
}
