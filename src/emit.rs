// src/emit.rs

//! Rendering a built [`TaskGraph`] for a backend or a human.
//!
//! JSON is the backend-facing form: the graph settings plus one entry per
//! task, in insertion order, each listing the task ids it depends on.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::dag::graph::{DagSpec, TaskGraph};
use crate::dag::policy::RetryPolicySpec;
use crate::dag::task::{ProduceWork, TaskId, TaskRole, WorkItem};
use crate::errors::Result;
use crate::types::TriggerRule;

/// Serializable description of a whole graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSpec<'a> {
    pub dag: &'a DagSpec,
    pub tasks: Vec<TaskSpec<'a>>,
}

/// Serializable description of one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSpec<'a> {
    pub task_id: &'a TaskId,
    pub role: TaskRole,
    pub depends_on: Vec<&'a TaskId>,
    pub retry_policy: RetryPolicySpec,
    /// `None` means no limit.
    pub timeout_secs: Option<u64>,
    pub queue: &'a str,
    /// Effective priority after applying the graph's weight rule.
    pub priority: u64,
    pub owner: &'a str,
    pub email: &'a [String],
    pub email_on_failure: bool,
    pub email_on_retry: bool,
    pub trigger_rule: TriggerRule,
    pub work: WorkItem,
}

impl<'a> GraphSpec<'a> {
    pub fn from_graph(graph: &'a TaskGraph) -> Self {
        let tasks = graph
            .tasks()
            .map(|node| {
                let policy = &node.policy;
                TaskSpec {
                    task_id: &node.id,
                    role: node.role(),
                    depends_on: graph.dependencies_of(node.id.as_str()),
                    retry_policy: RetryPolicySpec::from(&policy.retry),
                    timeout_secs: policy.timeout.as_secs(),
                    queue: &policy.queue,
                    priority: graph
                        .effective_priority(node.id.as_str())
                        .unwrap_or(u64::from(policy.priority_weight)),
                    owner: &policy.owner,
                    email: &policy.email,
                    email_on_failure: policy.email_on_failure,
                    email_on_retry: policy.email_on_retry,
                    trigger_rule: policy.trigger_rule,
                    work: node.task.work_item(),
                }
            })
            .collect();

        Self {
            dag: graph.dag(),
            tasks,
        }
    }
}

pub fn to_json(graph: &TaskGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&GraphSpec::from_graph(graph))?)
}

pub fn render(graph: &TaskGraph, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(graph),
        OutputFormat::Dot => Ok(graph.to_dot()),
    }
}

/// Human-readable overview used by `--dry-run`.
pub fn summary(graph: &TaskGraph) -> String {
    let dag = graph.dag();
    let mut out = String::new();

    let _ = writeln!(out, "paperboy-dag dry-run");
    let _ = writeln!(out, "  dag_id = {}", dag.dag_id);
    let _ = writeln!(
        out,
        "  schedule_interval = {}",
        dag.schedule_interval.as_deref().unwrap_or("none")
    );
    let _ = writeln!(out, "  start_date = {}", format_date(&dag.start_date));
    if let Some(end) = &dag.end_date {
        let _ = writeln!(out, "  end_date = {}", format_date(end));
    }
    let _ = writeln!(out, "  concurrency = {}", dag.concurrency);
    let _ = writeln!(out);

    let _ = writeln!(out, "tasks ({}):", graph.len());
    for node in graph.tasks() {
        let policy = &node.policy;
        let _ = writeln!(out, "  - {} [{}]", node.id, node.role());
        let deps = graph.dependencies_of(node.id.as_str());
        if !deps.is_empty() {
            let deps: Vec<&str> = deps.iter().map(|d| d.as_str()).collect();
            let _ = writeln!(out, "      after: {:?}", deps);
        }
        let _ = writeln!(
            out,
            "      queue: {}, retries: {}, timeout: {}, trigger_rule: {:?}",
            policy.queue, policy.retry.retries, policy.timeout, policy.trigger_rule
        );
    }

    out
}

fn format_date(d: &NaiveDateTime) -> String {
    d.format("%m/%d/%Y %H:%M:%S").to_string()
}
