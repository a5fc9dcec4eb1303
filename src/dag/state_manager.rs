// src/dag/state_manager.rs

//! State transitions for the nodes of one pass.

use tracing::{debug, warn};

use crate::dag::task_info::{NodeInfo, NodeState};

/// Applies state transitions to the nodes of a pass.
///
/// All transitions go through here so the scheduler never moves a node
/// along an edge of the state machine that does not exist.
pub struct StateManager<'a> {
    nodes: &'a mut [NodeInfo],
}

impl<'a> StateManager<'a> {
    pub fn new(nodes: &'a mut [NodeInfo]) -> Self {
        Self { nodes }
    }

    /// Promote every `Pending` node whose dependencies have all succeeded.
    ///
    /// Returns the positions of the newly `Ready` nodes.
    pub fn promote_ready(&mut self) -> Vec<usize> {
        let candidates: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| self.nodes[i].state == NodeState::Pending && self.deps_satisfied(i))
            .collect();

        for &i in &candidates {
            debug!(project = %self.nodes[i].project, "dependencies satisfied; marking Ready");
            self.nodes[i].state = NodeState::Ready;
        }
        candidates
    }

    /// Promote the `Pending` dependents of `finished` that became ready.
    pub fn promote_dependents(&mut self, finished: usize) -> Vec<usize> {
        let dependents = self.nodes[finished].dependents.clone();
        let mut ready = Vec::new();
        for i in dependents {
            if self.nodes[i].state == NodeState::Pending && self.deps_satisfied(i) {
                debug!(project = %self.nodes[i].project, "dependencies satisfied; marking Ready");
                self.nodes[i].state = NodeState::Ready;
                ready.push(i);
            }
        }
        ready
    }

    /// Whether every direct dependency of node `i` has succeeded.
    pub fn deps_satisfied(&self, i: usize) -> bool {
        self.nodes[i]
            .deps
            .iter()
            .all(|&d| self.nodes[d].state == NodeState::Succeeded)
    }

    /// `Ready -> Running`. Returns false for any other starting state.
    pub fn claim(&mut self, i: usize) -> bool {
        let node = &mut self.nodes[i];
        if node.state != NodeState::Ready {
            warn!(project = %node.project, state = ?node.state, "cannot claim node that is not Ready");
            return false;
        }
        node.state = NodeState::Running;
        true
    }

    /// `Running -> Succeeded | Failed`. Returns false if the node was not running.
    pub fn finish(&mut self, i: usize, succeeded: bool) -> bool {
        let node = &mut self.nodes[i];
        if node.state != NodeState::Running {
            warn!(
                project = %node.project,
                state = ?node.state,
                "completion for node that is not Running; ignoring"
            );
            return false;
        }
        node.state = if succeeded {
            NodeState::Succeeded
        } else {
            NodeState::Failed
        };
        true
    }

    /// Mark every node that never started as `Skipped`.
    pub fn skip_unstarted(&mut self) -> Vec<usize> {
        let mut skipped = Vec::new();
        for (i, node) in self.nodes.iter_mut().enumerate() {
            if matches!(node.state, NodeState::Pending | NodeState::Ready) {
                debug!(project = %node.project, "skipping node after pass failure");
                node.state = NodeState::Skipped;
                skipped.push(i);
            }
        }
        skipped
    }
}
