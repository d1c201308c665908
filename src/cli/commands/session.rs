use crate::cli::commands::show::print_event;
use crate::cli::commands::{open_session, print_diagnostics, report_reconcile};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::session::{ReviewSession, spawn_snapshot};
use crate::core::tally::Tally;
use crate::errors::{AppError, AppResult};
use crate::models::direction::Direction;
use crate::models::review::ReviewUpdate;
use crate::ui::messages::{error, info, success, warning};
use std::io::{self, BufRead, Write};

const HELP: &str = "\
Commands:
  1u, 2d, 3x        add one fish of category 1/2/3 going up / down / stay
  a <species> <dir> [n]
                    add n fish (species name or category number)
  u | undo          remove the last fish added
  c | clear         remove every fish of this event
  sp <species>      set the event species (sp - to clear)
  d <dir>           set the event direction (up, down, stay/x, unset)
  note <text>       set the notes (note - to clear)
  f                 toggle false trigger
  w | save          save and go to the next unreviewed event
  n | next, p | prev, s | skip, g <id>
                    move without saving
  r | reindex       re-read the log and the video folder
  show, sum, h | ?, q | quit";

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Session { start } = cmd {
        let mut session = open_session(cfg)?;
        let stdin = io::stdin();
        run(
            &mut session,
            &cfg.categories,
            stdin.lock(),
            start.as_deref(),
        )?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Add {
        species: String,
        direction: Direction,
        n: u32,
    },
    Undo,
    Clear,
    Species(String),
    Direction(Direction),
    Note(String),
    FalseTrigger,
    Save,
    Next,
    Prev,
    Skip,
    Goto(String),
    Reindex,
    Show,
    Summary,
    Help,
    Quit,
}

/// Category by 1-based number, or the text itself.
fn species_arg(arg: &str, categories: &[String]) -> Result<String, String> {
    if let Ok(n) = arg.parse::<usize>() {
        return categories
            .get(n.wrapping_sub(1))
            .cloned()
            .ok_or_else(|| format!("no category {n} (1..={})", categories.len()));
    }
    Ok(arg.to_string())
}

fn parse_action(line: &str, categories: &[String]) -> Result<Action, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let action = match word.to_ascii_lowercase().as_str() {
        "u" | "undo" => Action::Undo,
        "c" | "clear" => Action::Clear,
        "f" => Action::FalseTrigger,
        "w" | "save" => Action::Save,
        "n" | "next" => Action::Next,
        "p" | "prev" | "back" => Action::Prev,
        "s" | "skip" => Action::Skip,
        "r" | "reindex" => Action::Reindex,
        "show" => Action::Show,
        "sum" | "summary" => Action::Summary,
        "h" | "?" | "help" => Action::Help,
        "q" | "quit" | "exit" => Action::Quit,
        "g" | "goto" if !rest.is_empty() => Action::Goto(rest.to_string()),
        "sp" | "species" if !rest.is_empty() => {
            let s = if rest == "-" { "" } else { rest };
            Action::Species(species_arg(s, categories)?)
        }
        "d" | "dir" if !rest.is_empty() => {
            Action::Direction(Direction::parse(rest).map_err(|e| e.to_string())?)
        }
        "note" => Action::Note(if rest == "-" { String::new() } else { rest.to_string() }),
        "a" | "add" => {
            let mut tokens: Vec<&str> = rest.split_whitespace().collect();
            let n = match tokens.last().map(|t| t.parse::<u32>()) {
                Some(Ok(n)) if tokens.len() > 2 => {
                    tokens.pop();
                    n
                }
                _ => 1,
            };
            let dir = tokens.pop().ok_or("usage: a <species> <dir> [n]")?;
            let direction = Direction::parse(dir).map_err(|e| e.to_string())?;
            if tokens.is_empty() || !direction.is_set() || n == 0 {
                return Err("usage: a <species> <up|down|stay> [n]".to_string());
            }
            Action::Add {
                species: species_arg(&tokens.join(" "), categories)?,
                direction,
                n,
            }
        }
        // shortcut: <category number><u|d|x>
        w if w.is_ascii() && w.len() >= 2 && w[..w.len() - 1].chars().all(|c| c.is_ascii_digit()) => {
            let (num, dir) = w.split_at(w.len() - 1);
            let direction = Direction::parse(dir).map_err(|e| e.to_string())?;
            if !direction.is_set() {
                return Err(format!("unknown command '{line}'"));
            }
            Action::Add {
                species: species_arg(num, categories)?,
                direction,
                n: 1,
            }
        }
        _ => return Err(format!("unknown command '{line}' (h for help)")),
    };

    Ok(action)
}

/// Edits for the event on screen; nothing is stored before `save`.
struct Pending {
    id: Option<String>,
    tally: Tally,
    update: ReviewUpdate,
    dirty: bool,
}

impl Pending {
    fn open(session: &ReviewSession, id: Option<String>) -> AppResult<Self> {
        let tally = match &id {
            Some(id) => Tally::from_counts(session.counts(id)?),
            None => Tally::default(),
        };
        Ok(Self {
            id,
            tally,
            update: ReviewUpdate::default(),
            dirty: false,
        })
    }

    fn print(&self, session: &ReviewSession, categories: &[String]) -> AppResult<()> {
        let Some(id) = &self.id else {
            success("All events reviewed.");
            return Ok(());
        };
        println!();
        print_event(session, id)?;
        println!("  tally     : {}", self.tally.format());
        let menu: Vec<String> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}={c}", i + 1))
            .collect();
        println!("  categories: {}", menu.join("  "));
        Ok(())
    }
}

fn run<R: BufRead>(
    session: &mut ReviewSession,
    categories: &[String],
    input: R,
    start: Option<&str>,
) -> AppResult<()> {
    let first = match start {
        Some(id) => {
            session
                .find(id)
                .ok_or_else(|| AppError::UnknownEvent(id.to_string()))?;
            Some(id.to_string())
        }
        None => session
            .next_unreviewed(None)?
            .or_else(|| session.snapshot().matched.first().map(|m| m.id().to_string())),
    };

    let mut pending = Pending::open(session, first)?;
    if pending.id.is_none() {
        info("The log has no events.");
        return Ok(());
    }
    info("Type h for help.");
    pending.print(session, categories)?;

    let mut lines = input.lines();
    loop {
        print!("[{}] > ", pending.id.as_deref().unwrap_or("-"));
        io::stdout().flush().ok();

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let action = match parse_action(&line, categories) {
            Ok(a) => a,
            Err(msg) => {
                warning(msg);
                continue;
            }
        };

        match apply(session, categories, &mut pending, action) {
            Ok(true) => {}
            Ok(false) => break,
            // a failed save keeps the pending edits so it can be retried
            Err(e) => error(e),
        }
    }

    if pending.dirty {
        warning("Unsaved changes discarded.");
    }
    Ok(())
}

/// Returns `false` when the session should end.
fn apply(
    session: &mut ReviewSession,
    categories: &[String],
    pending: &mut Pending,
    action: Action,
) -> AppResult<bool> {
    let current = pending.id.clone();

    match action {
        Action::Add {
            species,
            direction,
            n,
        } => {
            pending.tally.add_n(&species, direction, n)?;
            pending.dirty = true;
            println!("  tally     : {}", pending.tally.format());
        }
        Action::Undo => {
            match pending.tally.undo() {
                Some((sp, dir)) => {
                    pending.dirty = true;
                    info(format!("Removed one {sp} {}", dir.short()));
                }
                None => info("Nothing to undo."),
            }
            println!("  tally     : {}", pending.tally.format());
        }
        Action::Clear => {
            pending.tally.clear();
            pending.dirty = true;
            println!("  tally     : {}", pending.tally.format());
        }
        Action::Species(s) => {
            pending.update.species = Some(s);
            pending.dirty = true;
        }
        Action::Direction(d) => {
            pending.update.direction = Some(d);
            pending.dirty = true;
        }
        Action::Note(n) => {
            pending.update.notes = Some(n);
            pending.dirty = true;
        }
        Action::FalseTrigger => {
            let now = match pending.update.false_trigger {
                Some(v) => v,
                None => match &current {
                    Some(id) => session.decision(id)?.is_some_and(|d| d.false_trigger),
                    None => false,
                },
            };
            pending.update.false_trigger = Some(!now);
            pending.dirty = true;
            info(format!("False trigger: {}", if now { "off" } else { "on" }));
        }
        Action::Save => {
            let Some(id) = current else {
                return Ok(true);
            };
            session.save(&id, &pending.update, pending.tally.counts())?;
            success(format!("Event {id} saved: {}", pending.tally.format()));
            let next = session.next_unreviewed(Some(&id))?;
            *pending = Pending::open(session, next)?;
            pending.print(session, categories)?;
        }
        Action::Next | Action::Prev | Action::Skip | Action::Goto(_) => {
            let target = match (&action, &current) {
                (Action::Next, Some(id)) => session.next(id).map(|m| m.id().to_string()),
                (Action::Prev, Some(id)) => session.previous(id).map(|m| m.id().to_string()),
                (Action::Skip, _) => session.next_unreviewed(current.as_deref())?,
                (Action::Goto(id), _) => session.find(id).map(|m| m.id().to_string()),
                _ => None,
            };
            let Some(target) = target else {
                info("No event there.");
                return Ok(true);
            };
            if pending.dirty {
                warning("Unsaved changes discarded.");
            }
            *pending = Pending::open(session, Some(target))?;
            pending.print(session, categories)?;
        }
        Action::Reindex => {
            info("Re-indexing...");
            let handle = spawn_snapshot(session.config().clone());
            let built = handle
                .join()
                .map_err(|_| AppError::Other("indexing thread panicked".into()))?;

            match built.and_then(|snapshot| session.install(snapshot)) {
                Ok(report) => {
                    let snapshot = session.snapshot();
                    print_diagnostics(&snapshot.diagnostics);
                    report_reconcile(&report);
                    success(format!(
                        "Indexed {} event(s), {} video(s).",
                        snapshot.diagnostics.events_parsed, snapshot.diagnostics.videos_indexed
                    ));
                    if current.as_deref().is_some_and(|id| session.find(id).is_none()) {
                        warning("Current event is gone from the log.");
                        let next = session.next_unreviewed(None)?;
                        *pending = Pending::open(session, next)?;
                        pending.print(session, categories)?;
                    }
                }
                Err(e) => warning(format!("Re-index failed, previous index kept: {e}")),
            }
        }
        Action::Show => pending.print(session, categories)?,
        Action::Summary => {
            let s = session.summary()?;
            info(format!(
                "{} reviewed, {} remaining, {} with video, {} orphaned",
                s.reviewed, s.remaining, s.with_video, s.orphaned
            ));
        }
        Action::Help => println!("{HELP}"),
        Action::Quit => return Ok(false),
    }

    Ok(true)
}
