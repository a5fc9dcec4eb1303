// src/config/mod.rs

//! Configuration loading and validation for monobuild.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load `.monobuild/config.toml` and locate the repository root (`loader.rs`).
//! - Validate value ranges and durations (`validate.rs`).
//! - Resolve the per-run [`Settings`] (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{default_config_path, find_repo_root, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, ConfigSection, ProjectsSection, RawConfigFile};
pub use settings::{ci_from_env, Settings};
pub use validate::parse_duration;
