// src/dag/task_info.rs

//! Per-run task state and the dispatch records handed out by the scheduler.

use std::time::Duration;

use crate::dag::task::{TaskId, TaskRole};

/// State of a task within one run of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Waiting on upstream tasks.
    Pending,
    /// Dispatched to the backend (first attempt or a retry).
    Running,
    Success,
    /// Failed with no retries left.
    Failed,
    /// Will never run because an upstream task failed and the trigger rule
    /// requires success.
    UpstreamFailed,
}

impl TaskRunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskRunState::Success | TaskRunState::Failed | TaskRunState::UpstreamFailed
        )
    }

    /// Finished without success.
    pub fn is_unsuccessful(&self) -> bool {
        matches!(self, TaskRunState::Failed | TaskRunState::UpstreamFailed)
    }
}

/// Outcome of one task attempt, reported back by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// A task the scheduler wants the backend to run now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub task_id: TaskId,
    pub role: TaskRole,
    /// 1 for the first attempt, 2 for the first retry, and so on.
    pub attempt: u32,
    /// How long the backend should wait before starting this attempt.
    pub delay: Duration,
}
