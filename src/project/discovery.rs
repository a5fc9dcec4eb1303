// src/project/discovery.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, trace};

use crate::fs::FileSystem;

/// Location of the project pattern list, relative to the repository root.
pub const PROJECTS_FILE: &str = ".monobuild/projects.txt";

/// Directory names never descended into while discovering projects.
const SKIPPED_DIRS: &[&str] = &[".git", ".monobuild", "node_modules"];

/// Compiled include/exclude globs from `.monobuild/projects.txt`.
///
/// The file holds one pattern per line, relative to the repository root:
///
/// ```text
/// # services
/// services/*
/// libs/**
/// !libs/legacy/*
/// ```
///
/// Lines starting with `#` and blank lines are ignored; a leading `!` turns
/// the pattern into an exclusion. `*` never crosses a `/`.
#[derive(Clone)]
pub struct ProjectPatterns {
    include: Vec<String>,
    exclude: Vec<String>,
    include_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for ProjectPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectPatterns")
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .finish_non_exhaustive()
    }
}

impl ProjectPatterns {
    /// Parse the contents of a `projects.txt` file.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.strip_prefix('!') {
                Some(pattern) => exclude.push(pattern.trim().to_string()),
                None => include.push(line.to_string()),
            }
        }

        Self::from_lists(include, exclude)
    }

    pub fn from_lists(include: Vec<String>, exclude: Vec<String>) -> Result<Self> {
        let include_set = build_globset(&include).context("building project include globset")?;
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(&exclude).context("building project exclude globset")?)
        };

        Ok(Self {
            include,
            exclude,
            include_set,
            exclude_set,
        })
    }

    /// Returns true if `rel_path` (relative to the repository root, forward
    /// slashes) is included and not excluded.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat.trim_end_matches('/'))
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Read and compile `<repo_dir>/.monobuild/projects.txt`.
pub fn load_patterns(fs: &dyn FileSystem, repo_dir: &Path) -> Result<ProjectPatterns> {
    let path = repo_dir.join(PROJECTS_FILE);
    let contents = fs
        .read_to_string(&path)
        .with_context(|| format!("reading project patterns from {:?}", path))?;
    ProjectPatterns::parse(&contents)
        .with_context(|| format!("parsing project patterns in {:?}", path))
}

/// Walk the repository and return every directory that matches `patterns`
/// and contains at least one of the `markers` files.
///
/// Symlinked directories are neither returned nor descended into.
///
/// Returned paths are absolute when `repo_dir` is, sorted.
pub fn discover_project_dirs(
    fs: &dyn FileSystem,
    repo_dir: &Path,
    patterns: &ProjectPatterns,
    markers: &[String],
) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut stack = vec![repo_dir.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if !fs.is_dir(&path) {
                continue;
            }
            // Links may point back up the tree.
            if fs.is_symlink(&path) {
                trace!(dir = %path.display(), "not following symlinked directory");
                continue;
            }
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| SKIPPED_DIRS.contains(&name));
            if skipped {
                continue;
            }

            if let Ok(rel) = path.strip_prefix(repo_dir) {
                let rel_str = rel.to_string_lossy().replace('\\', "/");
                if patterns.matches(&rel_str) && has_marker(fs, &path, markers) {
                    debug!(dir = %rel_str, "discovered project directory");
                    found.push(path.clone());
                } else {
                    trace!(dir = %rel_str, "not a project directory");
                }
            }

            stack.push(path);
        }
    }

    found.sort();
    Ok(found)
}

fn has_marker(fs: &dyn FileSystem, dir: &Path, markers: &[String]) -> bool {
    markers.iter().any(|m| fs.exists(&dir.join(m)))
}
