// src/impact/mod.rs

//! Change-impact analysis: which projects changed, and which must be
//! rebuilt because of it.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::dag::DependencyGraph;
use crate::project::{normalize_path, Project};

/// Projects owning at least one of `changed_files`, sorted by name.
///
/// Each file is resolved against `repo_root` and matched by whole path
/// components, so `lib-a2/x` does not belong to `lib-a`. A file inside
/// nested projects marks every project that contains it. Files inside no
/// project (root-level files, for example) are ignored.
pub fn changed_projects<I, P>(projects: &[Project], changed_files: I, repo_root: &Path) -> Vec<Project>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut changed: BTreeSet<&Project> = BTreeSet::new();
    for file in changed_files {
        let resolved = normalize_path(&repo_root.join(file.as_ref()));
        let owners: Vec<&Project> = projects.iter().filter(|p| p.contains(&resolved)).collect();
        if owners.is_empty() {
            debug!(file = %file.as_ref().display(), "changed file belongs to no project");
        }
        changed.extend(owners);
    }
    changed.into_iter().cloned().collect()
}

/// `changed` plus all their ancestors and descendants, sorted by name.
///
/// An empty `changed` yields an empty result.
pub fn affected(graph: &DependencyGraph, changed: &[Project]) -> Vec<Project> {
    let mut affected: BTreeSet<&Project> = BTreeSet::new();
    for project in changed {
        affected.insert(project);
        affected.extend(graph.ancestors(project));
        affected.extend(graph.descendants(project));
    }
    affected.into_iter().cloned().collect()
}

/// Result of analysing one set of changed files.
///
/// Both sets are kept because reporting distinguishes what changed from
/// what must be rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactAnalysis {
    pub changed: Vec<Project>,
    pub affected: Vec<Project>,
}

impl ImpactAnalysis {
    pub fn analyze<I, P>(graph: &DependencyGraph, changed_files: I, repo_root: &Path) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let projects: Vec<Project> = graph.projects().into_iter().cloned().collect();
        let changed = changed_projects(&projects, changed_files, repo_root);
        let affected = affected(graph, &changed);
        debug!(
            changed = changed.len(),
            affected = affected.len(),
            "impact analysis complete"
        );
        Self { changed, affected }
    }

    /// Whether nothing changed, i.e. there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// `graph` pruned to the affected projects.
    pub fn affected_graph(&self, graph: &DependencyGraph) -> DependencyGraph {
        graph.retain_only(&self.affected)
    }
}
