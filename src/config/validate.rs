// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, ConfigSection, ProjectsSection, RawConfigFile, RawConfigSection};
use crate::errors::{MonobuildError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = MonobuildError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let config = validate_config_section(raw.config)?;
        validate_projects_section(&raw.projects)?;
        Ok(ConfigFile::new_unchecked(config, raw.projects))
    }
}

fn validate_config_section(raw: RawConfigSection) -> Result<ConfigSection> {
    if raw.main_branch.trim().is_empty() {
        return Err(MonobuildError::ConfigError(
            "[config].main_branch must not be empty".to_string(),
        ));
    }

    if raw.worker_count == 0 {
        return Err(MonobuildError::ConfigError(
            "[config].worker_count must be >= 1 (got 0)".to_string(),
        ));
    }

    if raw.ci_worker_count == 0 {
        return Err(MonobuildError::ConfigError(
            "[config].ci_worker_count must be >= 1 (got 0)".to_string(),
        ));
    }

    let timeout = parse_duration(&raw.timeout)
        .map_err(|e| MonobuildError::ConfigError(format!("[config].timeout: {e}")))?;
    if timeout.is_zero() {
        return Err(MonobuildError::ConfigError(
            "[config].timeout must be greater than zero".to_string(),
        ));
    }

    Ok(ConfigSection {
        main_branch: raw.main_branch.trim().to_string(),
        worker_count: raw.worker_count,
        ci_worker_count: raw.ci_worker_count,
        timeout,
        output_dir: raw.output_dir,
    })
}

fn validate_projects_section(projects: &ProjectsSection) -> Result<()> {
    if projects.markers.is_empty() {
        return Err(MonobuildError::ConfigError(
            "[projects].markers must list at least one file name".to_string(),
        ));
    }

    for name in projects
        .markers
        .iter()
        .chain(std::iter::once(&projects.declaration_file))
    {
        if name.trim().is_empty() || name.contains('/') || name.contains('\\') {
            return Err(MonobuildError::ConfigError(format!(
                "[projects] file names must be plain names without a directory (got '{name}')"
            )));
        }
    }

    Ok(())
}

/// Parse a duration like `"250ms"`, `"90s"`, `"30m"` or `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs = |factor: u64| {
        value
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{s}' is too large"))
    };

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => secs(1),
        "m" => secs(60),
        "h" => secs(60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
