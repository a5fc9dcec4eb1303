// src/config/settings.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::model::ConfigFile;

/// Everything a run needs to know, resolved once at startup and passed
/// down explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub repo_dir: PathBuf,
    pub ci: bool,
    /// Effective worker count for every pass (the CI value when `ci`).
    pub worker_count: usize,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    /// Ref changes are compared against.
    pub base_ref: String,
    pub markers: Vec<String>,
    pub declaration_file: String,
}

impl Settings {
    /// Resolve settings for a run. `base_ref` defaults to the configured
    /// main branch.
    pub fn new(repo_dir: impl Into<PathBuf>, config: &ConfigFile, ci: bool, base_ref: Option<String>) -> Self {
        let repo_dir = repo_dir.into();
        let output_dir = if config.config.output_dir.is_absolute() {
            config.config.output_dir.clone()
        } else {
            repo_dir.join(&config.config.output_dir)
        };
        let worker_count = if ci {
            config.config.ci_worker_count
        } else {
            config.config.worker_count
        };

        Self {
            repo_dir,
            ci,
            worker_count,
            timeout: config.config.timeout,
            output_dir,
            base_ref: base_ref.unwrap_or_else(|| config.config.main_branch.clone()),
            markers: config.projects.markers.clone(),
            declaration_file: config.projects.declaration_file.clone(),
        }
    }

    /// `<output_dir>/logs`
    pub fn log_dir(&self) -> PathBuf {
        self.output_dir.join("logs")
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }
}

/// Whether the `CI` environment variable is set to a true value.
pub fn ci_from_env() -> bool {
    is_truthy(std::env::var("CI").ok().as_deref())
}

/// `true`, `1` and `yes` (any case) are true; anything else is false.
pub fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}
