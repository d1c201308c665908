use crate::cli::commands::{print_diagnostics, report_reconcile};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::session::{ReviewSession, SessionConfig};
use crate::errors::AppResult;
use crate::ui::messages::{header, success};
use crate::utils::colors::{CYAN, RESET};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Index = cmd {
        let (session, report) = ReviewSession::open(SessionConfig::from_config(cfg)?)?;
        let snapshot = session.snapshot();
        let d = &snapshot.diagnostics;

        header("Index");
        println!("{CYAN}• Log file:{RESET}      {}", snapshot.log_path.display());
        if let Some(stamp) = &d.folder_stamp {
            println!("{CYAN}• Folder stamp:{RESET}  {stamp}");
        }
        println!("{CYAN}• Events:{RESET}        {}", d.events_parsed);
        println!(
            "{CYAN}• Videos:{RESET}        {} in {}",
            d.videos_indexed,
            session.config().video_index_root.display()
        );
        println!(
            "{CYAN}• Matched:{RESET}       {} ({} without video)",
            d.videos_matched,
            d.events_parsed.saturating_sub(d.videos_matched)
        );
        println!();

        print_diagnostics(d);
        report_reconcile(&report);

        session.store().log(
            "index",
            &snapshot.log_path.to_string_lossy(),
            &format!(
                "{} events, {} videos, {} matched, {} warnings, {} orphaned",
                d.events_parsed,
                d.videos_indexed,
                d.videos_matched,
                d.warnings.len(),
                report.total_orphaned
            ),
        );

        success(format!(
            "Indexed {} event(s) and {} video(s).",
            d.events_parsed, d.videos_indexed
        ));
    }
    Ok(())
}
