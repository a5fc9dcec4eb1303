// src/project/registry.rs

//! The set of projects known for one run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::project::{normalize_path, Project};

/// Known projects, sorted by name and unique by path.
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: Vec<Project>,
    by_path: HashMap<PathBuf, usize>,
}

impl ProjectRegistry {
    /// Build the registry from candidate directories.
    ///
    /// Relative directories are resolved against `base` (the repository
    /// root). Directories that normalise to the same path collapse into one
    /// project.
    pub fn from_dirs<I, P>(base: &Path, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut seen: HashMap<PathBuf, Project> = HashMap::new();
        for dir in dirs {
            let project = Project::from_dir(&base.join(dir.as_ref()));
            seen.entry(project.path().to_path_buf()).or_insert(project);
        }

        let mut projects: Vec<Project> = seen.into_values().collect();
        projects.sort();

        let by_path = projects
            .iter()
            .enumerate()
            .map(|(i, p)| (p.path().to_path_buf(), i))
            .collect();

        debug!(count = projects.len(), "project registry built");

        Self { projects, by_path }
    }

    /// All projects, sorted by name.
    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    /// Look up the project rooted at `path` (after normalisation).
    pub fn get(&self, path: &Path) -> Option<&Project> {
        self.by_path
            .get(&normalize_path(path))
            .map(|&i| &self.projects[i])
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
