use crate::cli::commands::open_session;
use crate::cli::commands::show::print_event;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Next { after } = cmd {
        let session = open_session(cfg)?;

        match session.next_unreviewed(after.as_deref())? {
            Some(id) => {
                let remaining = session.unreviewed_ids()?.len();
                print_event(&session, &id)?;
                println!();
                println!("{remaining} event(s) left to review.");
            }
            None => success("All events reviewed."),
        }
    }
    Ok(())
}
