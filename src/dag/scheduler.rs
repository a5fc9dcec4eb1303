// src/dag/scheduler.rs

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::dag::graph::DependencyGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::StateManager;
use crate::dag::task_info::{NodeInfo, NodeState};
use crate::engine::{PassReport, TaskOutcome};
use crate::project::Project;

/// Per-pass state machine over a dependency graph.
///
/// It is responsible for:
/// - deciding when a node is `Ready` (all direct dependencies succeeded)
/// - handing out `Ready` nodes to workers (`Ready -> Running`)
/// - recording completions and promoting dependents
/// - fail-fast: after the first failure no node is handed out any more, and
///   once in-flight work drains every unstarted node is `Skipped`
///
/// The scheduler performs no IO and owns no threads; the async pass runner
/// in `engine::runner` drives it and is the only place it is mutated, so
/// node state is never touched concurrently.
#[derive(Debug)]
pub struct Scheduler {
    nodes: Vec<NodeInfo>,
    by_path: HashMap<PathBuf, usize>,
    /// Ready nodes in the order they became ready.
    ready: VecDeque<usize>,
    failed_fast: bool,
}

impl Scheduler {
    /// Start a pass over every node of `graph`.
    ///
    /// Nodes with no dependencies are `Ready` immediately.
    pub fn new(graph: &DependencyGraph) -> Self {
        let inner = graph.inner();
        let nodes: Vec<NodeInfo> = inner
            .node_indices()
            .map(|idx| NodeInfo {
                project: inner[idx].clone(),
                deps: inner
                    .neighbors_directed(idx, petgraph::Direction::Incoming)
                    .map(|n| n.index())
                    .collect(),
                dependents: inner
                    .neighbors_directed(idx, petgraph::Direction::Outgoing)
                    .map(|n| n.index())
                    .collect(),
                state: NodeState::Pending,
            })
            .collect();

        let by_path = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.project.path().to_path_buf(), i))
            .collect();

        let mut scheduler = Self {
            nodes,
            by_path,
            ready: VecDeque::new(),
            failed_fast: false,
        };

        let mut initial = StateManager::new(&mut scheduler.nodes).promote_ready();
        // Deterministic start order; later readiness follows completion order.
        initial.sort_by(|a, b| scheduler.nodes[*a].project.cmp(&scheduler.nodes[*b].project));
        scheduler.ready.extend(initial);

        debug!(
            nodes = scheduler.nodes.len(),
            ready = scheduler.ready.len(),
            "scheduler: starting pass"
        );
        scheduler
    }

    /// Number of nodes in the pass.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether every node is in a terminal state.
    pub fn is_finished(&self) -> bool {
        self.nodes.iter().all(|n| n.state.is_terminal())
    }

    /// Whether any node has failed in this pass.
    pub fn has_failed(&self) -> bool {
        self.failed_fast
    }

    pub fn running_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.state == NodeState::Running)
            .count()
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    /// Current state of `project`, or `None` if it is not part of the pass.
    pub fn state_of(&self, project: &Project) -> Option<NodeState> {
        self.by_path
            .get(project.path())
            .map(|&i| self.nodes[i].state)
    }

    /// Whether all direct dependencies of `project` have succeeded.
    ///
    /// Returns `None` if the project is not part of the pass.
    pub fn deps_satisfied(&self, project: &Project) -> Option<bool> {
        let &i = self.by_path.get(project.path())?;
        let satisfied = self.nodes[i]
            .deps
            .iter()
            .all(|&d| self.nodes[d].state == NodeState::Succeeded);
        Some(satisfied)
    }

    /// Claim the next `Ready` node for a worker, marking it `Running`.
    ///
    /// Returns `None` when nothing is ready or the pass has already failed.
    pub fn claim_next(&mut self) -> Option<Project> {
        if self.failed_fast {
            return None;
        }
        while let Some(i) = self.ready.pop_front() {
            if StateManager::new(&mut self.nodes).claim(i) {
                debug!(project = %self.nodes[i].project, "scheduler: node Running");
                return Some(self.nodes[i].project.clone());
            }
        }
        None
    }

    /// Record the outcome of a `Running` node.
    pub fn complete(&mut self, project: &Project, outcome: TaskOutcome) -> SchedulerStep {
        let Some(&i) = self.by_path.get(project.path()) else {
            warn!(project = %project, "completion for project outside this pass; ignoring");
            return SchedulerStep {
                pass_finished: self.is_finished(),
                ..SchedulerStep::default()
            };
        };

        let mut step = SchedulerStep::default();
        let succeeded = outcome == TaskOutcome::Success;

        let mut manager = StateManager::new(&mut self.nodes);
        if manager.finish(i, succeeded) {
            if succeeded {
                if !self.failed_fast {
                    let mut newly_ready = manager.promote_dependents(i);
                    newly_ready.sort_by(|a, b| self.nodes[*a].project.cmp(&self.nodes[*b].project));
                    self.ready.extend(newly_ready.iter().copied());
                    step.newly_ready = newly_ready
                        .into_iter()
                        .map(|n| self.nodes[n].project.clone())
                        .collect();
                }
            } else {
                warn!(project = %project, "node failed; no further nodes will start in this pass");
                self.failed_fast = true;
            }
        }

        if self.failed_fast && self.running_count() == 0 {
            self.ready.clear();
            let skipped = StateManager::new(&mut self.nodes).skip_unstarted();
            step.newly_skipped = skipped
                .into_iter()
                .map(|n| self.nodes[n].project.clone())
                .collect();
            step.newly_skipped.sort();
        }

        step.pass_finished = self.is_finished();
        if step.pass_finished {
            info!(failed = self.failed_fast, "scheduler: all nodes terminal");
        }
        step
    }

    /// Snapshot of node outcomes, each list sorted by name.
    pub fn report(&self) -> PassReport {
        let mut report = PassReport::default();
        for node in &self.nodes {
            let bucket = match node.state {
                NodeState::Succeeded => &mut report.succeeded,
                NodeState::Failed => &mut report.failed,
                NodeState::Skipped => &mut report.skipped,
                NodeState::Pending | NodeState::Ready | NodeState::Running => {
                    &mut report.unfinished
                }
            };
            bucket.push(node.project.clone());
        }
        report.succeeded.sort();
        report.failed.sort();
        report.skipped.sort();
        report.unfinished.sort();
        report
    }
}
