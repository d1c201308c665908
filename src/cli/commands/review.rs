use crate::cli::commands::open_session;
use crate::cli::commands::show::print_event;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::tally::{Tally, parse_count_spec};
use crate::errors::AppResult;
use crate::models::direction::Direction;
use crate::models::review::ReviewUpdate;
use crate::ui::messages::{info, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Review {
        id,
        species,
        direction,
        notes,
        counts,
        false_trigger,
    } = cmd
    {
        // Validate everything before touching the store
        let update = ReviewUpdate {
            species: species.clone(),
            direction: direction.as_deref().map(Direction::parse).transpose()?,
            notes: notes.clone(),
            false_trigger: *false_trigger,
        };

        let mut tally = Tally::default();
        for spec in counts {
            let (sp, dir, n) = parse_count_spec(spec)?;
            tally.add_n(&sp, dir, n)?;
        }

        if update.is_empty() && counts.is_empty() {
            info("No fields given: the event is only marked as reviewed.");
        }

        let mut session = open_session(cfg)?;

        if counts.is_empty() {
            session.review(id, &update)?;
        } else {
            session.save(id, &update, tally.counts())?;
        }

        success(format!("Event {id} saved."));
        print_event(&session, id)?;
    }
    Ok(())
}
