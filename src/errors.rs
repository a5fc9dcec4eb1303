// src/errors.rs

//! Crate-wide error types.
//!
//! - [`MonobuildError`] is what the top-level run loop reports.
//! - [`GraphError`] covers configuration problems found while building the
//!   dependency graph; these abort a run before any scheduling starts.
//! - [`TaskError`] is returned by a single build/test/deploy action.
//! - [`SchedulerError`] describes how a whole scheduling pass ended.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::engine::PassReport;

#[derive(Error, Debug)]
pub enum MonobuildError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Fatal problems with the declared dependency graph.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Project names along the cycle, in dependency order; the first name is
    /// repeated at the end.
    #[error("Cycle detected in dependency graph: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("project '{from}' declares a dependency on '{}', which is not a known project", .to.display())]
    DanglingReference { from: String, to: PathBuf },

    #[error("reading dependency declarations of project '{project}'")]
    Declarations {
        project: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Failure of one per-project action.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("{kind} of '{project}' failed ({})", describe_exit(.code))]
    Failed {
        project: String,
        kind: String,
        code: Option<i32>,
    },

    #[error("could not start {kind} of '{project}'")]
    Spawn {
        project: String,
        kind: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running {kind} of '{project}'")]
    Io {
        project: String,
        kind: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("action for '{project}' ended abnormally: {reason}")]
    Aborted { project: String, reason: String },
}

/// How a scheduling pass ended when it did not succeed.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("worker count must be >= 1 (got {0})")]
    InvalidWorkerCount(usize),

    #[error(
        "{} project(s) failed and {} were skipped",
        .0.failed.len(),
        .0.skipped.len()
    )]
    Failed(PassReport),

    #[error("pass did not finish within {deadline:?}")]
    Timeout {
        deadline: Duration,
        report: PassReport,
    },
}

impl SchedulerError {
    /// Node outcomes at the moment the pass ended, if any work was attempted.
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            SchedulerError::InvalidWorkerCount(_) => None,
            SchedulerError::Failed(report) => Some(report),
            SchedulerError::Timeout { report, .. } => Some(report),
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MonobuildError>;
