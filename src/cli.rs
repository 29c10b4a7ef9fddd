//! Command-line interface definitions.

use clap::{Parser, Subcommand};

/// Lectern - turn lecture recordings into structured study notes.
#[derive(Parser)]
#[command(name = "lectern", version, about)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process one lecture job end to end.
    ///
    /// The exit status is the per-job success/failure signal for whatever
    /// delivers jobs to this worker.
    Process {
        /// Caller-supplied lecture identifier.
        #[arg(long, required_unless_present = "job_file")]
        lecture_id: Option<String>,

        /// Direct URL of the source audio file.
        #[arg(long, required_unless_present = "job_file")]
        url: Option<String>,

        /// Owner of the resulting notes.
        #[arg(long)]
        owner: Option<String>,

        /// Extract a topic map first and enforce coverage of every item.
        #[arg(long)]
        strict_coverage: bool,

        /// Read the whole job payload from a JSON file instead.
        #[arg(long, conflicts_with_all = ["lecture_id", "url", "owner", "strict_coverage"])]
        job_file: Option<String>,
    },

    /// Check that external requirements are in place.
    Doctor,
}

/// Resolve the effective log level: verbosity flags win, otherwise the
/// configured level applies.
pub fn resolve_log_level<'a>(verbose: u8, configured: &'a str) -> &'a str {
    match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
