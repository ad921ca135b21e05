//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros. Every option that has an environment variable
//! reads it through clap's `env` support, so flags win over the environment
//! and both win over `config.toml`.

pub mod serve;
pub mod stats;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Chat and message service.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding the database and config.toml.
    #[arg(long, env = "PARLEY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database URL (default: <data-dir>/parley.db).
    #[arg(long, env = "PARLEY_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Suppress all logs except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Verbosity for the tracing filter: -1 when quiet, else the `-v` count.
    pub fn verbosity(&self) -> i8 {
        if self.quiet {
            -1
        } else {
            self.verbose.min(i8::MAX as u8) as i8
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server and background workers.
    Serve(ServeArgs),

    /// Print chat and message totals once.
    Stats {
        /// Output machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Overrides for `parley serve`.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Host to bind to.
    #[arg(long, env = "PARLEY_HOST")]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(short, long, env = "PARLEY_PORT")]
    pub port: Option<u16>,

    /// Seconds between metrics collections. Invalid values fall back to 15.
    #[arg(long, env = "PARLEY_METRICS_INTERVAL")]
    pub metrics_interval: Option<String>,
}
