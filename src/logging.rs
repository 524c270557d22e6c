// src/logging.rs

//! Logging setup for `paperboy-dag` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` (a single level for every target)
//! 2. `PAPERBOY_LOG`, either a level (`debug`) or filter directives such as
//!    `info,paperboy_dag::dag::scheduler=trace`
//! 3. `info`

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PAPERBOY_LOG";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let directives = filter_directives(cli_level, env.as_deref());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid {LOG_ENV} filter '{directives}'"))?;

    // Send logs to stderr; stdout carries only the rendered graph.
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

/// Filter directives for the given CLI level and `PAPERBOY_LOG` value.
fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return level_name(level).to_string();
    }

    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) if s.eq_ignore_ascii_case("warning") => "warn".to_string(),
        Some(s) => s.to_string(),
        None => "info".to_string(),
    }
}

fn level_name(level: LogLevel) -> &'static str {
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
    use super::*;

    #[test]
    fn cli_level_beats_environment() {
        assert_eq!(
            filter_directives(Some(LogLevel::Debug), Some("trace")),
            "debug"
        );
    }

    #[test]
    fn environment_directives_pass_through() {
        let directives = "info,paperboy_dag::dag::scheduler=trace";
        assert_eq!(filter_directives(None, Some(directives)), directives);
        assert_eq!(filter_directives(None, Some(" Warning ")), "warn");
        assert!(EnvFilter::try_new(filter_directives(None, Some(directives))).is_ok());
    }

    #[test]
    fn blank_or_missing_environment_means_info() {
        assert_eq!(filter_directives(None, None), "info");
        assert_eq!(filter_directives(None, Some("   ")), "info");
    }
}
