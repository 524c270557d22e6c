// src/dag/builder.rs

//! Graph construction: `(job, reports) -> TaskGraph`.
//!
//! ```text
//! Job -> Report -> ReportPost --\
//!   \--> Report -> ReportPost ---> JobCleanup
//!    \-> Report -> ReportPost --/
//! ```
//!
//! With no reports, `JobCleanup` depends directly on `Job`.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::model::{Defaults, RoleOverride};
use crate::config::validate::check_retry_cap;
use crate::dag::graph::{DagSpec, TaskGraph};
use crate::dag::policy::TaskPolicy;
use crate::dag::task::{JobCleanup, JobSetup, ReportPost, ReportRun, Task, TaskRole};
use crate::errors::{PaperboyError, Result};
use crate::job::decode::{decode_job, decode_reports};
use crate::job::validate::validate_reports;
use crate::job::{Job, Report};

/// Build the task graph for `job` and its `reports`.
///
/// Pure: no I/O and no state survives the call. On error nothing is
/// returned, so a partial graph can never reach a backend.
pub fn build(job: &Job, reports: &[Report], defaults: &Defaults) -> Result<TaskGraph> {
    check_reports(job, reports)?;

    let mut graph = TaskGraph::new(dag_spec(job, defaults));

    let setup = graph.add_task(
        Task::JobSetup(JobSetup::for_job(job)),
        policy_for(TaskRole::JobSetup, job, defaults)?,
    )?;
    debug!(task = %setup, "added setup task");

    let mut branch_tails = Vec::with_capacity(reports.len());
    for report in reports {
        let run = graph.add_task(
            Task::ReportRun(ReportRun::for_report(report)),
            policy_for(TaskRole::ReportRun, job, defaults)?,
        )?;
        let post = graph.add_task(
            Task::ReportPost(ReportPost::for_report(report)),
            policy_for(TaskRole::ReportPost, job, defaults)?,
        )?;

        graph.add_dependency(setup.as_str(), run.as_str())?;
        graph.add_dependency(run.as_str(), post.as_str())?;
        debug!(report = %report.id, run = %run, post = %post, "added report branch");

        branch_tails.push(post);
    }

    let cleanup = graph.add_task(
        Task::JobCleanup(JobCleanup::for_job(job, reports)),
        policy_for(TaskRole::JobCleanup, job, defaults)?,
    )?;

    // Cleanup is a join over every branch; with no branches it joins setup.
    if branch_tails.is_empty() {
        graph.add_dependency(setup.as_str(), cleanup.as_str())?;
    }
    for tail in &branch_tails {
        graph.add_dependency(tail.as_str(), cleanup.as_str())?;
    }

    graph.ensure_acyclic()?;

    info!(
        dag_id = %graph.dag().dag_id,
        tasks = graph.len(),
        edges = graph.edge_count(),
        reports = reports.len(),
        "built task graph"
    );

    Ok(graph)
}

/// Decode, validate and build in one step from base64 transport strings.
pub fn build_from_encoded(
    job_b64: &str,
    reports_b64: &str,
    defaults: &Defaults,
) -> Result<TaskGraph> {
    let (raw_job, document) = decode_job(job_b64)?;
    let raw_reports = decode_reports(reports_b64)?;

    let job = Job::from_raw(raw_job, document)?;
    let reports = validate_reports(raw_reports, &job.id)?;

    build(&job, &reports, defaults)
}

/// Report ids must be unique and every report must belong to `job`.
fn check_reports(job: &Job, reports: &[Report]) -> Result<()> {
    let mut seen = HashSet::with_capacity(reports.len());

    for report in reports {
        if report.job != job.id {
            return Err(PaperboyError::ValidationError(format!(
                "report {}: belongs to job {} but was submitted with job {}",
                report.id, report.job, job.id
            )));
        }
        if !seen.insert(&report.id) {
            return Err(PaperboyError::ValidationError(format!(
                "job {}: duplicate report id {}",
                job.id, report.id
            )));
        }
    }

    Ok(())
}

fn dag_spec(job: &Job, defaults: &Defaults) -> DagSpec {
    DagSpec {
        dag_id: format!("DAG_{}", job.id),
        description: defaults.dag.description.clone(),
        schedule_interval: job.schedule.interval.expression(),
        start_date: job.schedule.start_date,
        end_date: job.schedule.end_date,
        concurrency: job.concurrency.unwrap_or(defaults.dag.concurrency),
        max_active_runs: defaults.dag.max_active_runs,
        catchup: defaults.dag.catchup,
        dagrun_timeout_secs: defaults.dag.dagrun_timeout.map(|d| d.as_secs()),
        weight_rule: defaults.operator.weight_rule,
    }
}

fn policy_for(role: TaskRole, job: &Job, defaults: &Defaults) -> Result<TaskPolicy> {
    let policy = TaskPolicy::resolve(
        &defaults.operator,
        &job.overrides,
        role_override(role, defaults),
    );

    // A job-level retry_delay can outgrow a cap set in the defaults file.
    check_retry_cap(
        &format!("job {} ({})", job.id, role.config_name()),
        policy.retry.delay,
        policy.retry.max_delay,
    )?;

    Ok(policy)
}

fn role_override(role: TaskRole, defaults: &Defaults) -> &RoleOverride {
    match role {
        TaskRole::JobSetup => &defaults.roles.job_setup,
        TaskRole::ReportRun => &defaults.roles.report_run,
        TaskRole::ReportPost => &defaults.roles.report_post,
        TaskRole::JobCleanup => &defaults.roles.cleanup,
    }
}
