use crate::cli::commands::open_session;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::review::format_counts;
use crate::ui::messages::{info, success};
use crate::utils::colors::colorize_optional;
use crate::utils::table::{Column, Table};

/// Orphans are reconciled against the current log before listing, so the
/// project must be indexable.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Orphans = cmd {
        let session = open_session(cfg)?;
        let orphans = session.store().orphans()?;

        if orphans.is_empty() {
            success("No orphaned reviews.");
            return Ok(());
        }

        let counts = session.store().all_counts()?;
        let mut table = Table::new(vec![
            Column::new("ID"),
            Column::new("SPECIES"),
            Column::new("DIR"),
            Column::new("COUNTS"),
            Column::new("REVIEWED AT"),
            Column::new("NOTES"),
        ]);

        for (id, d) in &orphans {
            table.add_row(vec![
                id.clone(),
                colorize_optional(d.species_str()),
                colorize_optional(d.direction.as_str()),
                counts.get(id).map(format_counts).unwrap_or_default(),
                d.reviewed_at.clone().unwrap_or_default(),
                d.notes.clone(),
            ]);
        }

        print!("{}", table.render());
        println!();
        info(format!(
            "{} orphaned review(s) kept; they reattach if the id reappears in the log.",
            orphans.len()
        ));
    }
    Ok(())
}
