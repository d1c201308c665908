use crate::cli::commands::open_session;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::header;
use crate::utils::colors::{CYAN, GREEN, RESET, YELLOW};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Summary = cmd {
        let session = open_session(cfg)?;
        let s = session.summary()?;

        let pct = if s.total_events == 0 {
            100.0
        } else {
            s.reviewed as f64 * 100.0 / s.total_events as f64
        };

        header("Summary");
        println!("{CYAN}• Events:{RESET}         {}", s.total_events);
        println!("{CYAN}• With video:{RESET}     {}", s.with_video);
        println!(
            "{CYAN}• Reviewed:{RESET}       {GREEN}{}{RESET} ({pct:.0}%)",
            s.reviewed
        );
        println!("{CYAN}• Remaining:{RESET}      {}", s.remaining);
        println!("{CYAN}• False triggers:{RESET} {}", s.false_triggers);
        println!("{CYAN}• Fish counted:{RESET}   {}", s.fish_counted);
        if s.orphaned > 0 {
            println!("{CYAN}• Orphaned:{RESET}       {YELLOW}{}{RESET}", s.orphaned);
        }
    }
    Ok(())
}
