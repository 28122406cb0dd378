// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::FailurePolicy;

/// Command-line arguments for `dagpool`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagpool",
    version,
    about = "Run a dependency graph of tasks on a fixed pool of worker threads.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the graph: a `.toml` config, or a text file with lines like
    /// `C -> A, B` (a bare `A` is a task without dependencies).
    #[arg(value_name = "GRAPH")]
    pub graph: String,

    /// Number of worker threads (overrides `[pool].pool_size`).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Idle worker wake-up interval in seconds.
    #[arg(long, value_name = "SECS")]
    pub keep_alive_secs: Option<u64>,

    /// Maximum time to wait for the whole schedule, in seconds.
    #[arg(long, value_name = "SECS")]
    pub max_wait_secs: Option<u64>,

    /// What to do with dependents of a failed task.
    #[arg(long, value_name = "POLICY", value_parser = parse_failure_policy)]
    pub failure_policy: Option<FailurePolicy>,

    /// Duration of one unit of simulated work, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub work_unit_ms: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGPOOL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the dependency index, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_failure_policy(s: &str) -> Result<FailurePolicy, String> {
    s.parse()
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
