// src/dag/builder.rs

use std::path::PathBuf;

use tracing::{debug, info};

use crate::dag::declarations::{referenced_paths, DeclarationSource};
use crate::dag::graph::DependencyGraph;
use crate::errors::GraphError;
use crate::project::{normalize_path, ProjectRegistry};

/// Builds the dependency graph of all registered projects.
///
/// For every project the declaration lines are matched, each referenced
/// path is resolved against the project's root and looked up in the
/// registry, and an edge `referenced -> declaring` is added. Referenced
/// paths are sorted before insertion so edge order is stable across runs.
///
/// Fails with:
/// - [`GraphError::Declarations`] if a project's declarations cannot be read,
/// - [`GraphError::DanglingReference`] if a reference names no known project,
/// - [`GraphError::Cycle`] if the declarations form a cycle.
pub struct GraphBuilder<'a> {
    source: &'a dyn DeclarationSource,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(source: &'a dyn DeclarationSource) -> Self {
        Self { source }
    }

    pub fn build(&self, registry: &ProjectRegistry) -> Result<DependencyGraph, GraphError> {
        let mut graph = DependencyGraph::new();
        for project in registry.list() {
            graph.add_project(project.clone());
        }

        for project in registry.list() {
            let lines = self
                .source
                .declaration_lines(project)
                .map_err(|source| GraphError::Declarations {
                    project: project.name().to_string(),
                    source,
                })?;

            let mut targets: Vec<PathBuf> = referenced_paths(lines.iter().map(String::as_str))
                .into_iter()
                .map(|rel| normalize_path(&project.path().join(rel)))
                .collect();
            targets.sort();
            targets.dedup();

            for target in targets {
                let Some(prerequisite) = registry.get(&target) else {
                    return Err(GraphError::DanglingReference {
                        from: project.name().to_string(),
                        to: target,
                    });
                };
                if graph.add_dependency(prerequisite, project)? {
                    debug!(
                        project = %project,
                        dependency = %prerequisite,
                        "added dependency edge"
                    );
                }
            }
        }

        if let Some(cycle) = graph.find_cycle() {
            return Err(GraphError::Cycle(cycle));
        }

        info!(
            projects = graph.len(),
            edges = graph.edge_count(),
            "dependency graph built"
        );
        Ok(graph)
    }
}
