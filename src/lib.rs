// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod impact;
pub mod logging;
pub mod project;
pub mod report;
pub mod types;
pub mod vcs;

use std::sync::Arc;

use tracing::{info, warn};

use crate::cli::{CliArgs, Command};
use crate::config::{
    ci_from_env, default_config_path, find_repo_root, load_and_validate, load_or_default, Settings,
};
use crate::engine::{Pipeline, PipelineOutcome};
use crate::errors::{MonobuildError, Result, SchedulerError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::Console;
use crate::types::TaskKind;
use crate::vcs::{ChangedFiles, GitRepo};

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every pass succeeded (or the command ran nothing, like `graph`).
    Success,
    /// No changed or deployable projects; nothing was run.
    NothingToDo,
}

/// Process exit status for the result of [`run`].
///
/// - `0`: success, or nothing to do
/// - `1`: a pass failed
/// - `2`: configuration, git or I/O error
/// - `124`: a pass hit its deadline
pub fn exit_code(result: &Result<RunStatus>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(MonobuildError::Scheduler(SchedulerError::Timeout { .. })) => 124,
        Err(MonobuildError::Scheduler(_)) => 1,
        Err(_) => 2,
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - repository root discovery and config loading
/// - git change detection
/// - project discovery and the dependency graph
/// - the build / test / deploy pipeline
pub async fn run(args: CliArgs) -> Result<RunStatus> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let start_dir = match &args.repo {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let repo_dir = find_repo_root(fs.as_ref(), &start_dir)?;

    let config = match &args.config {
        Some(path) => load_and_validate(path)?,
        None => load_or_default(default_config_path(&repo_dir))?,
    };
    let settings = Settings::new(repo_dir, &config, ci_from_env(), args.base_ref());
    info!(
        repo = %settings.repo_dir.display(),
        ci = settings.ci,
        workers = settings.worker_count,
        base = %settings.base_ref,
        "settings resolved"
    );

    let git = GitRepo::new(&settings.repo_dir);
    let diff_context = format!("{}..HEAD", settings.base_ref);
    let pipeline = Pipeline::new(settings, fs, Console::stdout());

    match args.command() {
        Command::Version => {
            pipeline.print_banner(&diff_context);
            Ok(RunStatus::Success)
        }
        Command::Graph => {
            let workspace = pipeline.load_workspace()?;
            pipeline.graph(&workspace)?;
            Ok(RunStatus::Success)
        }
        Command::Affected => {
            let changed = changed_files(&pipeline, &git).await?;
            let workspace = pipeline.load_workspace()?;
            let impact = pipeline.analyze(&workspace, changed.all());
            Ok(if impact.is_empty() {
                RunStatus::NothingToDo
            } else {
                RunStatus::Success
            })
        }
        Command::Build { args } => {
            pipeline.print_banner(&diff_context);
            let changed = changed_files(&pipeline, &git).await?;
            let workspace = pipeline.load_workspace()?;
            let outcome = pipeline
                .build_and_test(
                    &workspace,
                    changed.all(),
                    pipeline.script_action(TaskKind::Build, &args),
                    pipeline.script_action(TaskKind::Test, &args),
                )
                .await?;
            Ok(status_of(&outcome))
        }
        Command::Deploy { args } => {
            pipeline.print_banner(&diff_context);
            let changed = changed_files(&pipeline, &git).await?;
            let workspace = pipeline.load_workspace()?;
            let outcome = pipeline
                .deploy(
                    &workspace,
                    changed.all(),
                    pipeline.script_action(TaskKind::Deploy, &args),
                )
                .await?;
            Ok(status_of(&outcome))
        }
    }
}

/// Collect changed files relative to the base ref and print them.
async fn changed_files(pipeline: &Pipeline, git: &GitRepo) -> Result<ChangedFiles> {
    let base = &pipeline.settings().base_ref;

    match git.remote_main_branch().await {
        Ok(Some(remote_main)) if &remote_main != base => {
            info!(remote_main = %remote_main, base = %base, "comparing against a ref other than the remote default branch");
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "could not determine the remote default branch"),
    }

    let changed = git.changed_files(base).await?;
    let console = pipeline.console();
    console.left_right("Current branch", &changed.current_branch);
    console.left_right(
        "Branched from hash",
        changed.base_point.as_deref().unwrap_or("-"),
    );
    pipeline.print_changed_files(&changed.committed, &changed.uncommitted);
    Ok(changed)
}

fn status_of(outcome: &PipelineOutcome) -> RunStatus {
    match outcome {
        PipelineOutcome::NothingToDo => RunStatus::NothingToDo,
        PipelineOutcome::Completed { .. } => RunStatus::Success,
    }
}
