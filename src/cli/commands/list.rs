use crate::cli::commands::open_session;
use crate::cli::parser::{Commands, ListFilter};
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::event_id::normalize_id;
use crate::models::review::format_counts;
use crate::ui::messages::info;
use crate::utils::colors::{GREEN, GREY, RESET, YELLOW, color_for_direction, colorize_optional};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { filter } = cmd {
        let session = open_session(cfg)?;
        let snapshot = session.snapshot();
        let decisions = session.decisions()?;
        let counts = session.store().all_counts()?;

        let mut table = Table::new(vec![
            Column::new("ID"),
            Column::new("TIMESTAMP"),
            Column::new("STATUS"),
            Column::new("SPECIES"),
            Column::new("DIR"),
            Column::new("COUNTS"),
            Column::new("VIDEO"),
        ]);

        let mut shown = 0;
        for m in &snapshot.matched {
            let decision = decisions.get(&normalize_id(m.id()));
            let reviewed = decision.is_some_and(|d| d.is_reviewed());

            let keep = match filter {
                ListFilter::All => true,
                ListFilter::Unreviewed => !reviewed,
                ListFilter::Reviewed => reviewed,
                ListFilter::Missing => !m.has_video(),
            };
            if !keep {
                continue;
            }

            let status = match decision {
                Some(d) if d.false_trigger => format!("{YELLOW}false trigger{RESET}"),
                Some(d) if d.is_reviewed() => format!("{GREEN}reviewed{RESET}"),
                _ => format!("{GREY}--{RESET}"),
            };
            let species = decision.map(|d| d.species_str()).unwrap_or("");
            let direction = decision.map(|d| d.direction.as_str()).unwrap_or("");
            let tally = counts
                .get(&normalize_id(m.id()))
                .map(format_counts)
                .unwrap_or_default();
            let video = if m.has_video() {
                m.video_path()
            } else {
                format!("{GREY}missing{RESET}")
            };

            table.add_row(vec![
                m.id().to_string(),
                m.event.timestamp_str(),
                status,
                colorize_optional(species),
                format!("{}{}{RESET}", color_for_direction(direction), direction),
                colorize_optional(&tally),
                video,
            ]);
            shown += 1;
        }

        if shown == 0 {
            info("No events match the selected filter.");
            return Ok(());
        }

        print!("{}", table.render());
        println!();
        info(format!("{shown} of {} event(s) shown.", snapshot.matched.len()));
    }
    Ok(())
}
