use crate::export::ExportFormat;
use clap::{Parser, Subcommand, ValueEnum};

/// Command-line interface definition for fishreview
/// Review tool for Riverwatcher fish counter logs and their video clips
#[derive(Parser)]
#[command(
    name = "fishreview",
    version = env!("CARGO_PKG_VERSION"),
    about = "Review Riverwatcher fish counter events against their video clips and export the counts",
    long_about = None
)]
pub struct Cli {
    /// Project folder holding the Riverwatcher .log export
    #[arg(global = true, long = "project", value_name = "DIR")]
    pub project: Option<String>,

    /// Folder scanned for video clips (default: the project folder)
    #[arg(global = true, long = "videos", value_name = "DIR")]
    pub videos: Option<String>,

    /// Base folder for relative video paths (default: the videos folder)
    #[arg(global = true, long = "library", value_name = "DIR")]
    pub library: Option<String>,

    /// Override review store path (useful for tests or a shared store)
    #[arg(global = true, long = "db", value_name = "FILE")]
    pub db: Option<String>,

    /// Run in test mode (no config file read or written)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListFilter {
    All,
    Unreviewed,
    Reviewed,
    /// Events without a video clip
    Missing,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration and the project's review store
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing keys to the configuration file")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the review store (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending store migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check store integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the store using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show store information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Parse the log, index the clips and reconcile stored reviews
    Index,

    /// List events in chronological order
    List {
        #[arg(long, short, value_enum, default_value = "all")]
        filter: ListFilter,
    },

    /// Show one event with its clip, decision and counts
    Show {
        /// Event id as written in the log (leading zeros optional)
        id: String,
    },

    /// Record a decision for one event
    Review {
        id: String,

        #[arg(long, short, help = "Species (empty string clears it)")]
        species: Option<String>,

        #[arg(long, short, help = "Direction: up, down, stay (x) or unset")]
        direction: Option<String>,

        #[arg(long, short, help = "Free text notes (empty string clears them)")]
        notes: Option<String>,

        #[arg(
            long = "count",
            short = 'c',
            value_name = "SPECIES:DIR[:N]",
            help = "Fish counted; repeat for several. Replaces the event's saved counts"
        )]
        counts: Vec<String>,

        #[arg(
            long = "false-trigger",
            num_args = 0..=1,
            default_missing_value = "true",
            value_name = "BOOL",
            help = "Flag the event as a false trigger (--false-trigger false to clear)"
        )]
        false_trigger: Option<bool>,
    },

    /// Show the next event still to review
    Next {
        #[arg(long, value_name = "ID", help = "Start after this event")]
        after: Option<String>,
    },

    /// Interactive review session on stdin
    Session {
        #[arg(long, value_name = "ID", help = "Open this event first")]
        start: Option<String>,
    },

    /// Review progress for the current project
    Summary,

    /// Stored reviews whose event is no longer in the log
    Orphans,

    /// Export the reviewed events
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE", help = "Output file (default: export_file from config)")]
        file: Option<String>,

        #[arg(long, help = "One row per counted fish instead of one row per event")]
        counts: bool,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Create a backup copy of the review store
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f')]
        force: bool,
    },
}
