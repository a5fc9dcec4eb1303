// src/dag/mod.rs

//! Dependency graph construction and pass scheduling.
//!
//! - [`graph`] holds the directed acyclic graph of projects.
//! - [`declarations`] parses the `includeBuild` lines that declare edges.
//! - [`builder`] turns a project registry plus declarations into a graph.
//! - [`scheduler`] contains the per-pass state machine that decides
//!   which projects are ready to run and when dependents may start.
//! - [`task_info`] provides per-node state.
//! - [`scheduler_step`] defines the result type for scheduler steps.
//! - [`state_manager`] manages per-pass state transitions.

pub mod builder;
pub mod declarations;
pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use builder::GraphBuilder;
pub use declarations::{DeclarationSource, FileDeclarationSource};
pub use graph::DependencyGraph;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::NodeState;
