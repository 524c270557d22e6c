// tests/integration/run_tracking.rs

use std::time::Duration;

use paperboy_dag::config::Defaults;
use paperboy_dag::dag::{Scheduler, TaskOutcome, TaskRunState, build_from_encoded};
use paperboy_dag_test_utils::builders::{JobBuilder, build_graph, encode_reports, reports_with_ids};
use paperboy_dag_test_utils::init_tracing;

#[test]
fn report_branches_run_in_parallel() {
    init_tracing();
    let graph = build_graph(JobBuilder::new(1), &[1, 2, 3]);
    let mut s = Scheduler::new(&graph);

    s.start();
    s.handle_completion("Job-1", TaskOutcome::Success);

    let running: Vec<&str> = s.running().into_iter().map(|id| id.as_str()).collect();
    assert_eq!(running, vec!["Report-1", "Report-2", "Report-3"]);
}

#[test]
fn empty_job_runs_setup_then_cleanup() {
    let graph = build_graph(JobBuilder::new(1), &[]);
    let mut s = Scheduler::new(&graph);

    let first = s.start();
    assert_eq!(first.newly_scheduled.len(), 1);
    assert!(!first.run_just_finished);

    let next = s.handle_completion("Job-1", TaskOutcome::Success);
    assert_eq!(next[0].task_id, "JobCleanup-1");

    let last = s.step_completion("JobCleanup-1", TaskOutcome::Success);
    assert!(last.run_just_finished);
}

#[test]
fn job_level_retries_with_exponential_backoff() {
    let mut defaults = Defaults::default();
    defaults.operator.retry_exponential_backoff = true;
    defaults.operator.max_retry_delay = Some(Duration::from_secs(90));

    let graph = build_from_encoded(
        &JobBuilder::new(1)
            .field("retries", 3)
            .field("retry_delay", "30s")
            .encoded(),
        &encode_reports(reports_with_ids(&[1])),
        &defaults,
    )
    .unwrap();

    let mut s = Scheduler::new(&graph);
    s.start();

    let delays: Vec<Duration> = (0..3)
        .map(|_| s.handle_completion("Job-1", TaskOutcome::Failed)[0].delay)
        .collect();
    assert_eq!(
        delays,
        vec![
            Duration::from_secs(30),
            Duration::from_secs(60),
            Duration::from_secs(90)
        ]
    );
    assert_eq!(s.attempts_of("Job-1"), Some(4));

    let step = s.step_completion("Job-1", TaskOutcome::Failed);
    assert!(step.newly_scheduled.is_empty());
    assert!(step.run_just_finished);
    assert_eq!(s.run_state_of("Report-1"), Some(TaskRunState::UpstreamFailed));
}

#[test]
fn deps_satisfied_tracks_barrier() {
    let graph = build_graph(JobBuilder::new(1), &[1, 2]);
    let mut s = Scheduler::new(&graph);
    s.start();
    s.handle_completion("Job-1", TaskOutcome::Success);
    s.handle_completion("Report-1", TaskOutcome::Success);
    s.handle_completion("ReportPost-1", TaskOutcome::Success);

    assert_eq!(s.deps_satisfied("JobCleanup-1"), Some(false));
    s.handle_completion("Report-2", TaskOutcome::Success);
    s.handle_completion("ReportPost-2", TaskOutcome::Success);
    assert_eq!(s.deps_satisfied("JobCleanup-1"), Some(true));
    assert_eq!(s.deps_satisfied("Nope"), None);
}
