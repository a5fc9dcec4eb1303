// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from `.monobuild/config.toml`.
///
/// ```toml
/// [config]
/// main_branch = "main"
/// worker_count = 4
/// ci_worker_count = 1
/// timeout = "30m"
/// output_dir = "/tmp/monobuild"
///
/// [projects]
/// markers = ["settings.gradle", "package.json"]
/// declaration_file = "settings.gradle"
/// ```
///
/// All sections and keys are optional. This is the unvalidated form; turn it
/// into a [`ConfigFile`] with `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: RawConfigSection,

    #[serde(default)]
    pub projects: ProjectsSection,
}

/// `[config]` section as written.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigSection {
    /// Branch changes are compared against when no `--tag`/`--branch` is given.
    #[serde(default = "default_main_branch")]
    pub main_branch: String,

    /// Concurrent actions per pass outside CI.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Concurrent actions per pass when `CI` is set.
    #[serde(default = "default_worker_count")]
    pub ci_worker_count: usize,

    /// Deadline for each pass, e.g. `"30m"`, `"90s"`.
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Where logs and project lists are written. Relative paths are
    /// resolved against the repository root.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for RawConfigSection {
    fn default() -> Self {
        Self {
            main_branch: default_main_branch(),
            worker_count: default_worker_count(),
            ci_worker_count: default_worker_count(),
            timeout: default_timeout(),
            output_dir: default_output_dir(),
        }
    }
}

/// `[projects]` section: how projects and their dependencies are found.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectsSection {
    /// A directory is a project only if it contains one of these files.
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,

    /// File in each project holding `includeBuild` declarations.
    #[serde(default = "default_declaration_file")]
    pub declaration_file: String,
}

impl Default for ProjectsSection {
    fn default() -> Self {
        Self {
            markers: default_markers(),
            declaration_file: default_declaration_file(),
        }
    }
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_worker_count() -> usize {
    1
}

fn default_timeout() -> String {
    "30m".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/tmp/monobuild")
}

fn default_markers() -> Vec<String> {
    [
        "settings.gradle",
        "settings.gradle.kts",
        "local_requirements.txt",
        "setup.cfg",
        "package.json",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_declaration_file() -> String {
    "settings.gradle".to_string()
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub projects: ProjectsSection,
}

/// Validated `[config]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSection {
    pub main_branch: String,
    pub worker_count: usize,
    pub ci_worker_count: usize,
    pub timeout: Duration,
    pub output_dir: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, projects: ProjectsSection) -> Self {
        Self { config, projects }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigSection::default();
        Self {
            config: ConfigSection {
                main_branch: raw.main_branch,
                worker_count: raw.worker_count,
                ci_worker_count: raw.ci_worker_count,
                timeout: Duration::from_secs(30 * 60),
                output_dir: raw.output_dir,
            },
            projects: ProjectsSection::default(),
        }
    }
}
