// src/dag/mod.rs

//! Task graph construction and run tracking.
//!
//! - [`task`] defines the four task roles and the work each produces.
//! - [`policy`] merges defaults into a per-task execution policy.
//! - [`graph`] holds the directed acyclic graph of tasks.
//! - [`builder`] turns a job and its reports into a graph.
//! - [`scheduler`] tracks one run of a built graph and decides which tasks
//!   are ready, including retries and upstream failure.
//! - [`task_info`] provides per-run states and dispatch records.
//! - [`scheduler_step`] defines the result type for scheduler steps.

pub mod builder;
pub mod graph;
pub mod policy;
pub mod scheduler;
pub mod scheduler_step;
pub mod task;
pub mod task_info;

pub use builder::{build, build_from_encoded};
pub use graph::{DagSpec, TaskGraph, TaskNode};
pub use policy::{RetryPolicy, TaskPolicy};
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task::{ProduceWork, Task, TaskId, TaskRole, WorkItem};
pub use task_info::{ScheduledTask, TaskOutcome, TaskRunState};
