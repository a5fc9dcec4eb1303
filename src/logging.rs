// src/logging.rs

//! `tracing` setup.
//!
//! The level comes from `--log-level`, else `MONOBUILD_LOG`, else `info`.
//! It applies to monobuild's own targets; dependencies only log warnings.
//! Everything goes to stderr, leaving stdout to the console report, and
//! ANSI colours are off in CI where logs end up in a build log viewer.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "MONOBUILD_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>, ci: bool) -> Result<()> {
    let level = effective_level(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref());

    fmt()
        .with_env_filter(filter_for(level))
        .with_target(true)
        .with_ansi(!ci)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("initialising logging: {e}"))?;

    Ok(())
}

/// Resolve the level from the CLI flag, then the env value, then `info`.
///
/// An env value that is not a level name is ignored.
pub fn effective_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> tracing::Level {
    cli_level
        .map(LogLevel::as_level)
        .or_else(|| env_value.and_then(parse_level_str))
        .unwrap_or(tracing::Level::INFO)
}

/// `warn` for everything, `level` for monobuild itself.
pub fn filter_for(level: tracing::Level) -> EnvFilter {
    let directive = level.as_str().to_ascii_lowercase();
    EnvFilter::new(format!("warn,monobuild={directive}"))
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "warning" => Some(tracing::Level::WARN),
        other => other.parse().ok(),
    }
}
