// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{MonobuildError, Result};
use crate::fs::FileSystem;
use crate::project::normalize_path;

/// Directory marking a repository root, holding `projects.txt` and
/// `config.toml`.
pub const MONOBUILD_DIR: &str = ".monobuild";

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file yields the defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(ConfigFile::default());
    }
    load_and_validate(path)
}

/// `<repo_root>/.monobuild/config.toml`
pub fn default_config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(MONOBUILD_DIR).join(CONFIG_FILE_NAME)
}

/// Find the repository root: `start` or the closest ancestor holding a
/// `.monobuild` directory.
///
/// A relative `start` is resolved against the working directory, so the
/// root (and every project path below it) is absolute and normalised.
pub fn find_repo_root(fs: &dyn FileSystem, start: &Path) -> Result<PathBuf> {
    let start = normalize_path(&std::path::absolute(start)?);
    for dir in start.ancestors() {
        if fs.is_dir(&dir.join(MONOBUILD_DIR)) {
            debug!(root = %dir.display(), "found repository root");
            return Ok(dir.to_path_buf());
        }
    }
    Err(MonobuildError::ConfigError(format!(
        "no {MONOBUILD_DIR} directory found in {} or any parent directory",
        start.display()
    )))
}
