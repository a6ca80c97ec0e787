//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Log WakaTime activity to Jira.
///
/// Rebuilds work sessions from a day of editor and browser heartbeats, maps
/// them to tickets, and records them as Jira work logs.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the sessions reconstructed for a day.
    Sessions {
        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Resolve tickets and log work for a day.
    Log {
        #[command(flatten)]
        source: SourceArgs,

        /// Resolve tickets without submitting work logs.
        #[arg(long)]
        dry_run: bool,
    },

    /// Verify Jira credentials.
    Check,
}

/// Where heartbeats come from.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Project to track. Defaults to `default_project`, otherwise prompted.
    #[arg(short, long)]
    pub project: Option<String>,

    /// Day to process: YYYY-MM-DD, today, yesterday, or "N days ago".
    #[arg(short, long, default_value = "today")]
    pub date: String,

    /// Read heartbeats from a JSON file instead of the WakaTime API.
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}
