use crate::cli::commands::open_session;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::session::ReviewSession;
use crate::errors::{AppError, AppResult};
use crate::models::review::format_counts;
use crate::utils::colors::{CYAN, GREY, RESET, YELLOW, color_for_direction};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Show { id } = cmd {
        let session = open_session(cfg)?;
        print_event(&session, id)?;
    }
    Ok(())
}

/// Event card used by `show`, `next`, `review` and the interactive session.
pub(crate) fn print_event(session: &ReviewSession, id: &str) -> AppResult<()> {
    let m = session
        .find(id)
        .ok_or_else(|| AppError::UnknownEvent(id.to_string()))?;
    let decision = session.decision(id)?.unwrap_or_default();
    let counts = session.counts(id)?;
    let snapshot = session.snapshot();
    let position = snapshot.position(id).map(|p| p + 1).unwrap_or(0);

    println!(
        "{CYAN}Event {}{RESET}  ({} of {})",
        m.id(),
        position,
        snapshot.matched.len()
    );
    println!("  time      : {}", m.event.timestamp_str());
    println!(
        "  raw       : {}  {GREY}(line {}){RESET}",
        m.event.to_data_line(),
        m.event.line
    );
    match &m.video {
        Some(v) => println!("  video     : {}", v.absolute_path.display()),
        None => println!("  video     : {YELLOW}missing{RESET}"),
    }

    let species = decision.species_str();
    println!(
        "  species   : {}",
        if species.is_empty() { "--" } else { species }
    );
    let dir = decision.direction.as_str();
    println!(
        "  direction : {}{}{RESET}",
        color_for_direction(dir),
        if dir.is_empty() { "--" } else { dir }
    );
    println!("  counts    : {}", format_counts(&counts));
    if decision.false_trigger {
        println!("  {YELLOW}false trigger{RESET}");
    }
    match &decision.reviewed_at {
        Some(at) => println!("  reviewed  : {at}"),
        None => println!("  reviewed  : {GREY}not yet{RESET}"),
    }
    if !decision.notes.is_empty() {
        let opts = textwrap::Options::new(72)
            .initial_indent("  notes     : ")
            .subsequent_indent("              ");
        println!("{}", textwrap::fill(&decision.notes, opts));
    }
    Ok(())
}
