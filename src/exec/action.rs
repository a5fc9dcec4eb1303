// src/exec/action.rs

//! Pluggable per-project action abstraction.
//!
//! The pass runner talks to a `ProjectAction` instead of spawning processes
//! itself. Production code uses [`super::ScriptAction`]; tests provide their
//! own implementation that records calls and never touches the OS.

use std::future::Future;
use std::pin::Pin;

use crate::errors::TaskError;
use crate::project::Project;

/// Boxed future returned by [`ProjectAction::run`].
pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'a>>;

/// The work performed for one project in one pass (build, test, deploy...).
///
/// Implementations must be safe to invoke concurrently for independent
/// projects; the runner calls `run` at most once per project per pass.
pub trait ProjectAction: Send + Sync {
    /// Short label used in logs, e.g. `"build"`.
    fn name(&self) -> &str;

    fn run<'a>(&'a self, project: &'a Project) -> ActionFuture<'a>;
}
