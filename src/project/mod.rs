// src/project/mod.rs

//! Projects: the buildable units of the monorepo.
//!
//! - [`discovery`] finds candidate directories from `.monobuild/projects.txt`.
//! - [`registry`] turns those directories into canonical [`Project`] values.

pub mod discovery;
pub mod registry;

pub use discovery::{discover_project_dirs, ProjectPatterns};
pub use registry::ProjectRegistry;

use std::cmp::Ordering;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A buildable unit identified by its directory name and root path.
///
/// Equality is by `(name, path)`; ordering is by name first so listings are
/// deterministic, with the path as a tie-breaker for duplicate names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Project {
    name: String,
    path: PathBuf,
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Build a project for `dir`: the name is the directory basename and the
    /// path is lexically normalised.
    pub fn from_dir(dir: &Path) -> Self {
        let path = normalize_path(dir);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { name, path }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `file` lies inside this project's directory.
    ///
    /// This compares whole path components, so `/repo/lib-a2/x` is not
    /// inside `/repo/lib-a`.
    pub fn contains(&self, file: &Path) -> bool {
        normalize_path(file).starts_with(&self.path)
    }
}

impl Ord for Project {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for Project {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolve `.` and `..` components without touching the file system.
///
/// `..` directly below the root stays at the root; leading `..` components
/// of a relative path are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `path` relative to `root`, with forward slashes.
///
/// Falls back to the full path when `path` is not below `root`.
pub fn relative_display(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}
