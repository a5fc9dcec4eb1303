// src/exec/mod.rs

//! Per-project actions.
//!
//! - [`action`] provides the `ProjectAction` trait the pass runner drives;
//!   tests replace it with a recording fake.
//! - [`task_runner`] holds `ScriptAction`, the production implementation
//!   that runs `build.sh` / `test.sh` / `deploy.sh` via `tokio::process`.

pub mod action;
pub mod task_runner;

pub use action::{ActionFuture, ProjectAction};
pub use task_runner::ScriptAction;
