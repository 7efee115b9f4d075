// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::OutputPolicy;

/// Command-line arguments for `syncroute`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "syncroute",
    version,
    about = "Plan and run rsync routes declared in a TOML file.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the route file (TOML).
    ///
    /// Default: `$SYNCROUTE_CONFIG`, else `Syncroute.toml` in the current
    /// working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Route to run; repeat for several. All routes when omitted.
    #[arg(long = "route", value_name = "NAME")]
    pub routes: Vec<String>,

    /// Print the planned commands and hooks without executing anything.
    #[arg(long)]
    pub plan: bool,

    /// Pass `--dry-run` to rsync.
    #[arg(long)]
    pub dry_run: bool,

    /// Force `--delete` on every route.
    #[arg(long, conflicts_with = "no_delete")]
    pub delete: bool,

    /// Never pass `--delete`, whatever the routes say.
    #[arg(long)]
    pub no_delete: bool,

    /// Output mode: verbose, quiet or quiet-until-failure.
    ///
    /// Overrides `[config].output`.
    #[arg(long, value_name = "MODE")]
    pub output: Option<OutputPolicy>,

    /// Extra rsync flag (repeatable), e.g. `--flag=--checksum`.
    #[arg(long = "flag", value_name = "RSYNC_FLAG", allow_hyphen_values = true)]
    pub flags: Vec<String>,

    /// List host aliases from the SSH client config and exit.
    #[arg(long)]
    pub list_hosts: bool,

    /// SSH client config read by `--list-hosts` (default `~/.ssh/config`).
    #[arg(long, value_name = "PATH", requires = "list_hosts")]
    pub ssh_config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SYNCROUTE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// `Some(true)` for `--delete`, `Some(false)` for `--no-delete`.
    pub fn delete_override(&self) -> Option<bool> {
        match (self.delete, self.no_delete) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
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

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
