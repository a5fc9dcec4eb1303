// src/dag/task_info.rs

//! Per-node state for one scheduling pass.

use crate::project::Project;

/// State of a node within one pass.
///
/// `Pending -> Ready -> Running -> {Succeeded, Failed}`; nodes that never
/// start because the pass failed end as `Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Waiting on at least one dependency.
    Pending,
    /// All dependencies succeeded; waiting for a free worker.
    Ready,
    /// Claimed by a worker; the action is executing.
    Running,
    Succeeded,
    Failed,
    /// Never started because the pass failed first.
    Skipped,
}

impl NodeState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NodeState::Succeeded | NodeState::Failed | NodeState::Skipped
        )
    }
}

/// A node of the pass: its project, adjacency by node position, and state.
#[derive(Debug, Clone)]
pub(crate) struct NodeInfo {
    pub project: Project,
    /// Positions of direct dependencies.
    pub deps: Vec<usize>,
    /// Positions of direct dependents.
    pub dependents: Vec<usize>,
    pub state: NodeState,
}
