use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for dayclock
#[derive(Parser)]
#[command(
    name = "dayclock",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track what you spend your day on: one running log at a time, stored in SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Enable debug diagnostics on stderr
    #[arg(global = true, long, short = 'v')]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use with --edit")]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Start a log now (no-op when one is already running)
    Start {
        /// Category code, e.g. `c_intern` or `intern` (default from config)
        category: Option<String>,

        #[arg(long = "task", value_name = "ID")]
        task: Option<String>,

        #[arg(long = "note")]
        note: Option<String>,
    },

    /// Stop the running log
    Stop,

    /// Show the running log, if any
    Status,

    /// Insert a log with explicit times
    Add {
        category: String,

        #[arg(long = "start", value_name = "TS", help = "RFC 3339 or YYYY-MM-DD HH:MM")]
        start: String,

        #[arg(long = "end", value_name = "TS", help = "Omit to insert a running log")]
        end: Option<String>,

        #[arg(long = "task", value_name = "ID")]
        task: Option<String>,

        #[arg(long = "note")]
        note: Option<String>,
    },

    /// Change fields of an existing log
    Edit {
        id: String,

        #[arg(long = "category")]
        category: Option<String>,

        #[arg(long = "start", value_name = "TS")]
        start: Option<String>,

        #[arg(long = "end", value_name = "TS", conflicts_with = "reopen")]
        end: Option<String>,

        #[arg(long = "reopen", help = "Clear the end time")]
        reopen: bool,

        #[arg(long = "task", value_name = "ID", conflicts_with = "no_task")]
        task: Option<String>,

        #[arg(long = "no-task", help = "Detach the log from its task")]
        no_task: bool,

        #[arg(long = "note")]
        note: Option<String>,
    },

    /// List logs
    List {
        #[arg(long = "day", value_name = "YYYY-MM-DD", conflicts_with = "today")]
        day: Option<String>,

        #[arg(long = "today", help = "Only logs whose day is today")]
        today: bool,

        #[arg(long = "category")]
        category: Option<String>,

        #[arg(long = "task", value_name = "ID")]
        task: Option<String>,

        #[arg(long = "json", help = "Print JSON instead of a table")]
        json: bool,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Export logs
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a custom range"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}
