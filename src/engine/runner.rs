// src/engine/runner.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::dag::{DependencyGraph, Scheduler};
use crate::errors::{SchedulerError, TaskError};
use crate::exec::ProjectAction;
use crate::project::Project;

use super::{PassReport, TaskOutcome};

type Completion = (Project, Result<(), TaskError>);

/// Run `action` once for every project of `graph`, in dependency order.
///
/// This is the async IO shell around [`Scheduler`]: it keeps at most
/// `worker_count` actions in flight, feeds completions back into the
/// scheduler, and is the only code that mutates node state during the pass.
///
/// - A failed action stops new work from starting; actions already running
///   finish and everything never started is reported as skipped.
/// - A panicking action counts as a failure of that project.
/// - If `deadline` elapses first the pass returns
///   [`SchedulerError::Timeout`]. Running actions are detached, not killed.
pub async fn run_pass<A>(
    graph: &DependencyGraph,
    action: Arc<A>,
    worker_count: usize,
    deadline: Option<Duration>,
) -> Result<PassReport, SchedulerError>
where
    A: ProjectAction + ?Sized + 'static,
{
    if worker_count == 0 {
        return Err(SchedulerError::InvalidWorkerCount(worker_count));
    }

    let mut scheduler = Scheduler::new(graph);
    if scheduler.is_empty() {
        debug!(action = action.name(), "empty graph; nothing to run");
        return Ok(PassReport::default());
    }

    info!(
        action = action.name(),
        projects = scheduler.len(),
        workers = worker_count,
        ?deadline,
        "starting pass"
    );

    let started = Instant::now();
    let deadline_at = deadline.map(|d| started + d);
    let mut workers: JoinSet<Completion> = JoinSet::new();

    loop {
        while workers.len() < worker_count {
            let Some(project) = scheduler.claim_next() else {
                break;
            };
            debug!(project = %project, action = action.name(), "dispatching");
            spawn_action(&mut workers, Arc::clone(&action), project);
        }

        if scheduler.is_finished() {
            break;
        }

        if workers.is_empty() {
            // Only reachable if the graph handed to us was not acyclic.
            error!(
                action = action.name(),
                "no running or ready projects but the pass is not finished"
            );
            return Err(SchedulerError::Failed(scheduler.report()));
        }

        let joined = match deadline_at {
            Some(at) => match tokio::time::timeout_at(at, workers.join_next()).await {
                Ok(joined) => joined,
                Err(_) => {
                    let report = scheduler.report();
                    warn!(
                        action = action.name(),
                        running = scheduler.running_count(),
                        "pass deadline exceeded; detaching running actions"
                    );
                    workers.detach_all();
                    return Err(SchedulerError::Timeout {
                        deadline: deadline.unwrap_or_default(),
                        report,
                    });
                }
            },
            None => workers.join_next().await,
        };

        let Some(joined) = joined else {
            continue;
        };

        let (project, result) = match joined {
            Ok(completion) => completion,
            Err(err) => {
                error!(error = %err, "worker task was lost; aborting pass");
                workers.abort_all();
                return Err(SchedulerError::Failed(scheduler.report()));
            }
        };

        let outcome = match result {
            Ok(()) => TaskOutcome::Success,
            Err(err) => {
                error!(project = %project, action = action.name(), error = %err, "action failed");
                TaskOutcome::Failed
            }
        };

        let step = scheduler.complete(&project, outcome);
        if !step.newly_ready.is_empty() {
            debug!(ready = ?step.newly_ready.iter().map(Project::name).collect::<Vec<_>>(), "projects became ready");
        }
        if !step.newly_skipped.is_empty() {
            info!(
                skipped = ?step.newly_skipped.iter().map(Project::name).collect::<Vec<_>>(),
                "skipping projects after failure"
            );
        }
    }

    let report = scheduler.report();
    info!(
        action = action.name(),
        elapsed = ?started.elapsed(),
        %report,
        "pass finished"
    );

    if scheduler.has_failed() {
        Err(SchedulerError::Failed(report))
    } else {
        Ok(report)
    }
}

/// Spawn one action.
///
/// The action runs in its own task so a panic surfaces as a `JoinError`
/// for that project instead of tearing down the worker set.
fn spawn_action<A>(workers: &mut JoinSet<Completion>, action: Arc<A>, project: Project)
where
    A: ProjectAction + ?Sized + 'static,
{
    workers.spawn(async move {
        let inner_project = project.clone();
        let handle = tokio::spawn(async move { action.run(&inner_project).await });
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => Err(aborted(&project, err)),
        };
        (project, result)
    });
}

fn aborted(project: &Project, err: JoinError) -> TaskError {
    let reason = if err.is_panic() {
        "action panicked".to_string()
    } else {
        err.to_string()
    };
    TaskError::Aborted {
        project: project.name().to_string(),
        reason,
    }
}
