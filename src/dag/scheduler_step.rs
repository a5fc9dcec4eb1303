// src/dag/scheduler_step.rs

//! Step result type for the scheduler.

use crate::project::Project;

/// Structured result of reporting one completion to the scheduler.
///
/// Useful for tests that step a pass by hand and assert on what changed.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Nodes that became `Ready` as a result of this step, sorted by name.
    pub newly_ready: Vec<Project>,
    /// Nodes marked `Skipped` because the pass failed and drained, sorted by name.
    pub newly_skipped: Vec<Project>,
    /// Whether every node is now in a terminal state.
    pub pass_finished: bool,
}
