use std::collections::{HashSet, VecDeque};

use proptest::prelude::*;

use paperboy_dag::config::Defaults;
use paperboy_dag::dag::{
    Scheduler, TaskGraph, TaskOutcome, TaskRole, TaskRunState, build_from_encoded,
};
use paperboy_dag::types::TriggerRule;
use paperboy_dag_test_utils::builders::{JobBuilder, encode_reports, reports_with_ids};

fn graph_for(n: usize, retries: u32, cleanup_all_done: bool) -> TaskGraph {
    let mut defaults = Defaults::default();
    defaults.operator.retries = retries;
    if cleanup_all_done {
        defaults.roles.cleanup.trigger_rule = Some(TriggerRule::AllDone);
    }
    let ids: Vec<i64> = (1..=n as i64).collect();
    build_from_encoded(
        &JobBuilder::new(1).encoded(),
        &encode_reports(reports_with_ids(&ids)),
        &defaults,
    )
    .unwrap()
}

proptest! {
    #[test]
    fn run_always_terminates_and_respects_barrier(
        n in 0..8usize,
        retries in 0..3u32,
        cleanup_all_done in any::<bool>(),
        failing in proptest::collection::vec(0..20usize, 0..6),
        pick_last in any::<bool>(),
    ) {
        let graph = graph_for(n, retries, cleanup_all_done);
        let names: Vec<String> = graph.task_ids().map(|id| id.to_string()).collect();
        let failing: HashSet<String> = failing
            .into_iter()
            .filter(|&i| i < names.len())
            .map(|i| names[i].clone())
            .collect();

        let mut scheduler = Scheduler::new(&graph);
        let mut executing: VecDeque<String> = scheduler
            .start()
            .newly_scheduled
            .into_iter()
            .map(|t| t.task_id.to_string())
            .collect();

        let max_steps = 1000;
        let mut steps = 0;
        loop {
            let next = if pick_last { executing.pop_back() } else { executing.pop_front() };
            let Some(task) = next else { break };
            steps += 1;
            prop_assert!(steps < max_steps, "run did not terminate");

            let node = graph.task(&task).unwrap();
            if node.role() == TaskRole::JobCleanup {
                // Cleanup only ever runs once every ReportPost is terminal.
                for post in graph.tasks().filter(|t| t.role() == TaskRole::ReportPost) {
                    let state = scheduler.run_state_of(post.id.as_str()).unwrap();
                    prop_assert!(state.is_terminal(), "{} ran while {} was {:?}", task, post.id, state);
                }
            }

            let outcome = if failing.contains(&task) {
                TaskOutcome::Failed
            } else {
                TaskOutcome::Success
            };
            for next in scheduler.handle_completion(&task, outcome) {
                executing.push_back(next.task_id.to_string());
            }
        }

        prop_assert!(scheduler.is_finished());
        for name in &names {
            let state = scheduler.run_state_of(name).unwrap();
            prop_assert!(state.is_terminal(), "{} left in {:?}", name, state);
        }

        // A failing task is retried exactly `retries` times.
        for name in &failing {
            let attempts = scheduler.attempts_of(name).unwrap();
            if scheduler.run_state_of(name) == Some(TaskRunState::Failed) {
                prop_assert_eq!(attempts, retries + 1);
            }
        }

        if failing.is_empty() {
            for name in &names {
                prop_assert_eq!(scheduler.run_state_of(name), Some(TaskRunState::Success));
            }
        }
    }
}
