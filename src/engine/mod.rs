// src/engine/mod.rs

//! Orchestration engine for monobuild.
//!
//! This module ties together:
//! - the pure per-pass scheduler from [`crate::dag`]
//! - the async pass driver in [`runner`], which owns the worker set, the
//!   deadline and the fail-fast drain
//! - the top-level [`pipeline`]: discover, analyse, then run the build,
//!   test and deploy passes in sequence

use std::fmt;

use crate::project::Project;

pub mod pipeline;
pub mod runner;

pub use pipeline::{Pipeline, PipelineOutcome, Workspace};
pub use runner::run_pass;

/// Outcome of one action for the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Final node outcomes of one scheduling pass.
///
/// Every list is sorted by project name. `unfinished` is only non-empty
/// for a pass that hit its deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub succeeded: Vec<Project>,
    pub failed: Vec<Project>,
    pub skipped: Vec<Project>,
    pub unfinished: Vec<Project>,
}

impl PassReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty() && self.unfinished.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len() + self.unfinished.len()
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} skipped",
            self.succeeded.len(),
            self.failed.len(),
            self.skipped.len()
        )?;
        if !self.unfinished.is_empty() {
            write!(f, ", {} unfinished", self.unfinished.len())?;
        }
        Ok(())
    }
}
