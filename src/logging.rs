// src/logging.rs

//! Logging setup for `ursm-launch` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` (applies to the whole process)
//! 2. `URSM_LAUNCH_LOG`, which takes full `EnvFilter` directives, e.g.
//!    `info,ursm_launch::exec::process=debug` to see the child's output
//!    lines without the rest of the debug noise
//! 3. `info`
//!
//! Logs go to stderr; the external program's output goes to its log file.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "URSM_LAUNCH_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = env_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("installing the tracing subscriber")
}

/// Build the filter from the CLI level and the raw `URSM_LAUNCH_LOG` value.
///
/// Directives that fail to parse fall back to the default level.
pub fn env_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    let directives = filter_directives(cli_level, env);
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// The directive string the filter is built from.
pub fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return level.as_directive().to_string();
    }
    match env.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

