// src/logging.rs

//! Log setup. Logs go to stderr; stdout belongs to rsync and `--plan`.
//!
//! `--log-level` sets one level for everything. Without it, `SYNCROUTE_LOG`
//! takes full `EnvFilter` directives, so a noisy module can be singled out:
//!
//! ```text
//! SYNCROUTE_LOG=warn,syncroute::exec=debug syncroute backup
//! ```

use anyhow::Result;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "SYNCROUTE_LOG";

/// Used when neither the flag nor the variable says otherwise.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let (filter, rejected) = build_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    if let Some(directives) = rejected {
        warn!(env = LOG_ENV, %directives, "invalid log directives, using {DEFAULT_DIRECTIVES}");
    }
    Ok(())
}

/// Filter for the given flag and `SYNCROUTE_LOG` value, plus the env value
/// when it failed to parse.
fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> (EnvFilter, Option<String>) {
    if let Some(level) = cli_level {
        return (EnvFilter::new(directive(level)), None);
    }
    match env.map(str::trim).filter(|d| !d.is_empty()) {
        None => (EnvFilter::new(DEFAULT_DIRECTIVES), None),
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new(DEFAULT_DIRECTIVES), Some(directives.to_string())),
        },
    }
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn cli_level_beats_the_environment() {
        let (filter, rejected) = build_filter(Some(LogLevel::Warn), Some("trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
        assert!(rejected.is_none());
    }

    #[test]
    fn module_directives_from_the_environment_are_honoured() {
        let (filter, rejected) = build_filter(None, Some("warn,syncroute::exec=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert!(rejected.is_none());
    }

    #[test]
    fn unset_or_blank_environment_uses_info() {
        for env in [None, Some("  ")] {
            let (filter, _) = build_filter(None, env);
            assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        }
    }

    #[test]
    fn invalid_directives_fall_back_and_are_reported() {
        let (filter, rejected) = build_filter(None, Some("syncroute=shouting"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(rejected.as_deref(), Some("syncroute=shouting"));
    }
}
