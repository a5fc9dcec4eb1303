// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;

use crate::errors::GraphError;
use crate::project::Project;

/// Directed dependency graph over projects.
///
/// Edge direction: prerequisite -> dependent. For
///
/// ```text
/// app/settings.gradle:  includeBuild('../core')
/// ```
///
/// we add the edge `core -> app`: `core` must complete before `app`.
///
/// Nodes are keyed by project path. Edges are deduplicated and self-loops
/// are rejected; acyclicity is checked by [`DependencyGraph::find_cycle`],
/// which the builder runs before handing a graph out.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<Project, ()>,
    index: HashMap<PathBuf, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project node. Adding the same path twice is a no-op.
    pub fn add_project(&mut self, project: Project) -> NodeIndex {
        if let Some(&idx) = self.index.get(project.path()) {
            return idx;
        }
        let path = project.path().to_path_buf();
        let idx = self.graph.add_node(project);
        self.index.insert(path, idx);
        idx
    }

    /// Record that `dependent` requires `prerequisite` to complete first.
    ///
    /// Missing nodes are added. Returns `Ok(false)` when the edge already
    /// existed.
    pub fn add_dependency(
        &mut self,
        prerequisite: &Project,
        dependent: &Project,
    ) -> Result<bool, GraphError> {
        if prerequisite.path() == dependent.path() {
            return Err(GraphError::Cycle(vec![
                dependent.name().to_string(),
                dependent.name().to_string(),
            ]));
        }

        let from = self.add_project(prerequisite.clone());
        let to = self.add_project(dependent.clone());
        if self.graph.contains_edge(from, to) {
            return Ok(false);
        }
        self.graph.add_edge(from, to, ());
        Ok(true)
    }

    pub fn contains(&self, project: &Project) -> bool {
        self.index.contains_key(project.path())
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All projects, sorted by name.
    pub fn projects(&self) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self.graph.node_weights().collect();
        projects.sort();
        projects
    }

    /// Direct dependencies of `project` (what it declares), sorted by name.
    pub fn dependencies_of(&self, project: &Project) -> Vec<&Project> {
        self.neighbors(project, Direction::Incoming)
    }

    /// Direct dependents of `project` (who declares it), sorted by name.
    pub fn dependents_of(&self, project: &Project) -> Vec<&Project> {
        self.neighbors(project, Direction::Outgoing)
    }

    /// Transitive dependencies of `project`, excluding itself, sorted by name.
    pub fn ancestors(&self, project: &Project) -> Vec<&Project> {
        let Some(&start) = self.index.get(project.path()) else {
            return Vec::new();
        };
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut found = Vec::new();
        while let Some(node) = dfs.next(reversed) {
            if node != start {
                found.push(&self.graph[node]);
            }
        }
        found.sort();
        found
    }

    /// Transitive dependents of `project`, excluding itself, sorted by name.
    pub fn descendants(&self, project: &Project) -> Vec<&Project> {
        let Some(&start) = self.index.get(project.path()) else {
            return Vec::new();
        };
        let mut dfs = Dfs::new(&self.graph, start);
        let mut found = Vec::new();
        while let Some(node) = dfs.next(&self.graph) {
            if node != start {
                found.push(&self.graph[node]);
            }
        }
        found.sort();
        found
    }

    /// Projection onto `keep`: a new graph holding only the retained
    /// projects and the edges between them. Unknown projects are ignored.
    pub fn retain_only<'a, I>(&self, keep: I) -> DependencyGraph
    where
        I: IntoIterator<Item = &'a Project>,
    {
        let keep: HashSet<NodeIndex> = keep
            .into_iter()
            .filter_map(|p| self.index.get(p.path()).copied())
            .collect();

        let graph = self.graph.filter_map(
            |idx, project| keep.contains(&idx).then(|| project.clone()),
            |_, _| Some(()),
        );
        let index = graph
            .node_indices()
            .map(|idx| (graph[idx].path().to_path_buf(), idx))
            .collect();

        DependencyGraph { graph, index }
    }

    /// Map of project name to the sorted names of its direct dependencies.
    ///
    /// This is the shape consumed by graph reports.
    pub fn dependency_map(&self) -> BTreeMap<String, Vec<String>> {
        self.graph
            .node_weights()
            .map(|project| {
                let deps = self
                    .dependencies_of(project)
                    .into_iter()
                    .map(|d| d.name().to_string())
                    .collect();
                (project.name().to_string(), deps)
            })
            .collect()
    }

    /// Find one dependency cycle, if any.
    ///
    /// Returns project names in dependency order with the first name
    /// repeated at the end, e.g. `["a", "b", "a"]`.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.iter().any(|&n| self.graph.contains_edge(n, n))
            })
            .collect();
        components.sort_by_key(|scc| self.min_name(scc));

        components.first().map(|scc| self.cycle_through(scc))
    }

    pub(crate) fn inner(&self) -> &DiGraph<Project, ()> {
        &self.graph
    }

    fn neighbors(&self, project: &Project, dir: Direction) -> Vec<&Project> {
        let Some(&idx) = self.index.get(project.path()) else {
            return Vec::new();
        };
        let mut found: Vec<&Project> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|n| &self.graph[n])
            .collect();
        found.sort();
        found
    }

    fn min_name(&self, scc: &[NodeIndex]) -> Option<&Project> {
        scc.iter().map(|&n| &self.graph[n]).min()
    }

    /// Shortest cycle through the alphabetically first member of a strongly
    /// connected component.
    fn cycle_through(&self, scc: &[NodeIndex]) -> Vec<String> {
        let members: HashSet<NodeIndex> = scc.iter().copied().collect();
        let Some(&start) = scc.iter().min_by(|a, b| self.graph[**a].cmp(&self.graph[**b])) else {
            return Vec::new();
        };

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if next == start {
                    let mut path = vec![node];
                    let mut cur = node;
                    while let Some(&p) = parent.get(&cur) {
                        path.push(p);
                        cur = p;
                    }
                    path.reverse();
                    path.push(start);
                    return path
                        .into_iter()
                        .map(|n| self.graph[n].name().to_string())
                        .collect();
                }
                if members.contains(&next) && visited.insert(next) {
                    parent.insert(next, node);
                    queue.push_back(next);
                }
            }
        }

        vec![self.graph[start].name().to_string()]
    }
}
