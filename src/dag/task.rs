// src/dag/task.rs

//! The four task roles and the work each one hands to the backend.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::job::{EntityId, Job, Report};

/// Role of a task in a job graph. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskRole {
    /// Prepares the environment for a job's reports.
    JobSetup,
    /// Generates one report.
    ReportRun,
    /// Post-processes one report (delivery, publishing).
    ReportPost,
    /// Runs once every report of the job is done.
    JobCleanup,
}

impl TaskRole {
    /// Prefix used for task ids: `<prefix>-<entity id>`.
    pub fn prefix(&self) -> &'static str {
        match self {
            TaskRole::JobSetup => "Job",
            TaskRole::ReportRun => "Report",
            TaskRole::ReportPost => "ReportPost",
            TaskRole::JobCleanup => "JobCleanup",
        }
    }

    /// Name used for `[role.<name>]` override sections.
    pub fn config_name(&self) -> &'static str {
        match self {
            TaskRole::JobSetup => "job_setup",
            TaskRole::ReportRun => "report_run",
            TaskRole::ReportPost => "report_post",
            TaskRole::JobCleanup => "cleanup",
        }
    }
}

impl fmt::Display for TaskRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Stable task identifier, `role prefix + "-" + entity id`.
///
/// Building the same job twice yields the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(role: TaskRole, entity: &EntityId) -> Self {
        Self(format!("{}-{}", role.prefix(), entity))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TaskId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Unit of work the backend executes for one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkItem {
    pub role: TaskRole,
    pub entity_id: EntityId,
    pub payload: Value,
}

/// Capability shared by every role: describe the work to perform.
pub trait ProduceWork {
    fn role(&self) -> TaskRole;

    /// Id of the job or report this task acts on.
    fn entity_id(&self) -> &EntityId;

    fn work_item(&self) -> WorkItem;

    fn task_id(&self) -> TaskId {
        TaskId::new(self.role(), self.entity_id())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobSetup {
    pub job_id: EntityId,
    pub document: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRun {
    pub job_id: EntityId,
    pub report_id: EntityId,
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportPost {
    pub job_id: EntityId,
    pub report_id: EntityId,
    pub post: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobCleanup {
    pub job_id: EntityId,
    pub report_ids: Vec<EntityId>,
}

impl JobSetup {
    pub fn for_job(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            document: job.document.clone(),
        }
    }
}

impl ReportRun {
    pub fn for_report(report: &Report) -> Self {
        Self {
            job_id: report.job.clone(),
            report_id: report.id.clone(),
            parameters: report.parameters.clone(),
        }
    }
}

impl ReportPost {
    pub fn for_report(report: &Report) -> Self {
        Self {
            job_id: report.job.clone(),
            report_id: report.id.clone(),
            post: report.post.clone(),
        }
    }
}

impl JobCleanup {
    pub fn for_job(job: &Job, reports: &[Report]) -> Self {
        Self {
            job_id: job.id.clone(),
            report_ids: reports.iter().map(|r| r.id.clone()).collect(),
        }
    }
}

impl ProduceWork for JobSetup {
    fn role(&self) -> TaskRole {
        TaskRole::JobSetup
    }

    fn entity_id(&self) -> &EntityId {
        &self.job_id
    }

    fn work_item(&self) -> WorkItem {
        WorkItem {
            role: self.role(),
            entity_id: self.job_id.clone(),
            payload: json!({ "job": self.document }),
        }
    }
}

impl ProduceWork for ReportRun {
    fn role(&self) -> TaskRole {
        TaskRole::ReportRun
    }

    fn entity_id(&self) -> &EntityId {
        &self.report_id
    }

    fn work_item(&self) -> WorkItem {
        WorkItem {
            role: self.role(),
            entity_id: self.report_id.clone(),
            payload: json!({
                "job_id": self.job_id,
                "report_id": self.report_id,
                "parameters": self.parameters,
            }),
        }
    }
}

impl ProduceWork for ReportPost {
    fn role(&self) -> TaskRole {
        TaskRole::ReportPost
    }

    fn entity_id(&self) -> &EntityId {
        &self.report_id
    }

    fn work_item(&self) -> WorkItem {
        WorkItem {
            role: self.role(),
            entity_id: self.report_id.clone(),
            payload: json!({
                "job_id": self.job_id,
                "report_id": self.report_id,
                "post": self.post,
            }),
        }
    }
}

impl ProduceWork for JobCleanup {
    fn role(&self) -> TaskRole {
        TaskRole::JobCleanup
    }

    fn entity_id(&self) -> &EntityId {
        &self.job_id
    }

    fn work_item(&self) -> WorkItem {
        WorkItem {
            role: self.role(),
            entity_id: self.job_id.clone(),
            payload: json!({
                "job_id": self.job_id,
                "report_ids": self.report_ids,
            }),
        }
    }
}

/// A task of any role.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    JobSetup(JobSetup),
    ReportRun(ReportRun),
    ReportPost(ReportPost),
    JobCleanup(JobCleanup),
}

impl Task {
    fn inner(&self) -> &dyn ProduceWork {
        match self {
            Task::JobSetup(t) => t,
            Task::ReportRun(t) => t,
            Task::ReportPost(t) => t,
            Task::JobCleanup(t) => t,
        }
    }
}

impl ProduceWork for Task {
    fn role(&self) -> TaskRole {
        self.inner().role()
    }

    fn entity_id(&self) -> &EntityId {
        self.inner().entity_id()
    }

    fn work_item(&self) -> WorkItem {
        self.inner().work_item()
    }
}
