use std::collections::HashSet;

use proptest::prelude::*;

use paperboy_dag::config::Defaults;
use paperboy_dag::dag::{TaskRole, build_from_encoded};
use paperboy_dag::errors::PaperboyError;
use paperboy_dag_test_utils::builders::{JobBuilder, encode_reports, reports_with_ids};

// Distinct report ids in a random order.
fn report_ids_strategy(max_reports: usize) -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::hash_set(0..10_000i64, 0..=max_reports)
        .prop_map(|ids| ids.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #[test]
    fn shape_holds_for_any_report_list(
        job_id in 1..100_000i64,
        ids in report_ids_strategy(12),
    ) {
        let graph = build_from_encoded(
            &JobBuilder::new(job_id).encoded(),
            &encode_reports(reports_with_ids(&ids)),
            &Defaults::default(),
        ).unwrap();

        let n = ids.len();
        let setup = format!("Job-{job_id}");
        let cleanup = format!("JobCleanup-{job_id}");

        prop_assert_eq!(graph.len(), 2 + 2 * n);
        prop_assert_eq!(graph.in_degree(&cleanup), n.max(1));
        prop_assert_eq!(graph.out_degree(&setup), n.max(1));
        prop_assert_eq!(graph.in_degree(&setup), 0);
        prop_assert_eq!(graph.out_degree(&cleanup), 0);

        let posts = graph.tasks().filter(|t| t.role() == TaskRole::ReportPost).count();
        prop_assert_eq!(posts, n);

        for id in &ids {
            let run = format!("Report-{id}");
            let post = format!("ReportPost-{id}");
            prop_assert!(graph.all_paths_pass_through(&setup, &run, &post));
            prop_assert!(graph.all_paths_pass_through(&run, &post, &cleanup));
            prop_assert_eq!(graph.dependencies_of(&post).len(), 1);
        }

        // Topological order exists and starts at setup, ends at cleanup.
        let order = graph.topological_order().unwrap();
        prop_assert_eq!(order.first().map(|id| id.as_str()), Some(setup.as_str()));
        prop_assert_eq!(order.last().map(|id| id.as_str()), Some(cleanup.as_str()));
    }

    #[test]
    fn task_ids_are_unique_and_stable(ids in report_ids_strategy(10)) {
        let build = || build_from_encoded(
            &JobBuilder::new(7).encoded(),
            &encode_reports(reports_with_ids(&ids)),
            &Defaults::default(),
        ).unwrap();

        let first = build();
        let second = build();

        let a: Vec<String> = first.task_ids().map(|id| id.to_string()).collect();
        let b: Vec<String> = second.task_ids().map(|id| id.to_string()).collect();
        prop_assert_eq!(&a, &b);

        let unique: HashSet<&String> = a.iter().collect();
        prop_assert_eq!(unique.len(), a.len());
    }

    #[test]
    fn repeated_report_id_is_always_rejected(
        ids in report_ids_strategy(8).prop_filter("need one report", |ids| !ids.is_empty()),
        pick in any::<prop::sample::Index>(),
    ) {
        let dup = ids[pick.index(ids.len())];
        let mut with_dup = ids.clone();
        with_dup.push(dup);

        let result = build_from_encoded(
            &JobBuilder::new(1).encoded(),
            &encode_reports(reports_with_ids(&with_dup)),
            &Defaults::default(),
        );

        match result {
            Err(PaperboyError::ValidationError(msg)) => {
                prop_assert!(msg.contains(&format!("duplicate report id {dup}")), "got: {}", msg);
            }
            other => prop_assert!(false, "expected ValidationError, got {:?}", other.map(|g| g.len())),
        }
    }
}
