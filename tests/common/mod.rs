#![allow(dead_code)]

use monobuild::dag::DependencyGraph;
use monobuild::project::Project;

pub use monobuild_test_utils::init_tracing;

/// Names of `projects`, in order.
pub fn names<'a, I>(projects: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Project>,
{
    projects.into_iter().map(|p| p.name().to_string()).collect()
}

/// Every `(prerequisite, dependent)` name pair of `graph`.
pub fn edges(graph: &DependencyGraph) -> Vec<(String, String)> {
    let mut edges = Vec::new();
    for project in graph.projects() {
        for dep in graph.dependencies_of(project) {
            edges.push((dep.name().to_string(), project.name().to_string()));
        }
    }
    edges.sort();
    edges
}
