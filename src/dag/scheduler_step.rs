// src/dag/scheduler_step.rs

//! Step-by-step execution result types for the scheduler.

use crate::dag::task::TaskId;
use crate::dag::task_info::ScheduledTask;

/// Structured result of a single scheduler "step".
///
/// This is useful for tests that want to manually step the graph and make
/// assertions about what changed.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Tasks that became ready to run (or are being retried) as a result of
    /// this step.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// Tasks newly marked `Failed` or `UpstreamFailed` in this step.
    pub newly_failed: Vec<TaskId>,
    /// Whether this step caused every task in the run to become terminal.
    pub run_just_finished: bool,
}
