//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
    /// Comma-separated values
    Csv,
}

pub mod commands;

/// Issue timeline - change histories from issue tracker records
#[derive(Parser, Debug)]
#[command(name = "timeline", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: ~/.issue-timeline/config.json)
    #[arg(long, global = true, env = "TIMELINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read fields and issues from a JSON dump instead of the tracker
    #[arg(long, global = true, value_name = "DUMP")]
    pub from_file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json, csv)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print version information
    Version,

    /// List the tracker's field directory
    Fields,

    /// Find issues and show their configured attributes
    Search {
        /// Tracker query, e.g. `project = ABC`
        query: String,
    },

    /// Replay changelogs into per-field snapshots
    Changes(ChangesArgs),

    /// Resolve current attribute values
    Resolve(ResolveArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Args, Debug)]
pub struct ChangesArgs {
    /// Tracker query
    pub query: String,

    /// Field to track, by changelog name (repeatable; default: tracked_fields from config)
    #[arg(long = "field", short = 'f')]
    pub fields: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Tracker query
    pub query: String,

    /// Attribute to resolve (repeatable; default: all configured attributes)
    #[arg(long = "attribute", short = 'a')]
    pub attributes: Vec<String>,
}
