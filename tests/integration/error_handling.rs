// tests/integration/error_handling.rs

use std::io::Write;

use tempfile::NamedTempFile;

use paperboy_dag::config::{Defaults, load_and_validate};
use paperboy_dag::dag::build_from_encoded;
use paperboy_dag::errors::PaperboyError;
use paperboy_dag_test_utils::builders::{JobBuilder, ReportBuilder, encode, encode_reports};
use serde_json::json;

fn build(job: String, reports: Vec<serde_json::Value>) -> Result<(), PaperboyError> {
    build_from_encoded(&job, &encode_reports(reports), &Defaults::default()).map(|_| ())
}

#[test]
fn test_invalid_toml_returns_structured_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[operator\nretries = 1\n").unwrap();

    match load_and_validate(file.path()) {
        Err(PaperboyError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_trigger_rule_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[role.cleanup]
trigger_rule = "one_success"
"#
    )
    .unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(PaperboyError::TomlError(_))
    ));
}

#[test]
fn test_missing_start_date_names_job() {
    match build(JobBuilder::new(17).without("start_date").encoded(), vec![]) {
        Err(PaperboyError::ValidationError(msg)) => {
            assert!(msg.contains("job 17"));
            assert!(msg.contains("start_date"));
        }
        other => panic!("Expected ValidationError, got: {:?}", other),
    }
}

#[test]
fn test_unparsable_start_date_is_validation_error() {
    let job = JobBuilder::new(17).field("start_date", "yesterday").encoded();
    assert!(matches!(
        build(job, vec![]),
        Err(PaperboyError::ValidationError(msg)) if msg.contains("yesterday")
    ));
}

#[test]
fn test_bad_interval_is_config_error() {
    let job = JobBuilder::new(17).interval("@sometimes").encoded();
    assert!(matches!(
        build(job, vec![]),
        Err(PaperboyError::ConfigError(msg)) if msg.contains("@sometimes")
    ));
}

#[test]
fn test_report_without_id_is_rejected() {
    let reports = vec![
        ReportBuilder::new(1).build(),
        json!({ "parameters": { "region": "emea" } }),
    ];
    assert!(matches!(
        build(JobBuilder::new(2).encoded(), reports),
        Err(PaperboyError::ValidationError(msg)) if msg.contains("position 1")
    ));
}

#[test]
fn test_report_with_scalar_post_is_rejected() {
    let reports = vec![ReportBuilder::new(5).field("post", "email").build()];
    assert!(matches!(
        build(JobBuilder::new(2).encoded(), reports),
        Err(PaperboyError::ValidationError(msg)) if msg.contains("report 5")
    ));
}

#[test]
fn test_report_naming_other_job_is_rejected() {
    let reports = vec![ReportBuilder::new(5).field("job", 3).build()];
    assert!(matches!(
        build(JobBuilder::new(2).encoded(), reports),
        Err(PaperboyError::ValidationError(msg)) if msg.contains("report 5")
    ));
}

#[test]
fn test_job_must_be_an_object() {
    assert!(matches!(
        build(encode(&json!([1, 2, 3])), vec![]),
        Err(PaperboyError::DecodeError(msg)) if msg.contains("object")
    ));
}

#[test]
fn test_wrongly_typed_field_names_the_job() {
    let job = JobBuilder::new(1).field("concurrency", "lots").encoded();
    assert!(matches!(
        build(job, vec![]),
        Err(PaperboyError::ValidationError(msg)) if msg.contains("job 1") && msg.contains("concurrency")
    ));

    let job = JobBuilder::new(42).field("owner", 5).encoded();
    assert!(matches!(
        build(job, vec![]),
        Err(PaperboyError::ValidationError(msg)) if msg.contains("job 42")
    ));
}

#[test]
fn test_wrongly_typed_report_field_names_the_report() {
    let reports = vec![ReportBuilder::new(7).field("job", true).build()];
    match build(JobBuilder::new(42).encoded(), reports) {
        Err(PaperboyError::ValidationError(msg)) => assert!(msg.contains("report 7"), "got: {msg}"),
        other => panic!("Expected ValidationError, got: {:?}", other),
    }
}

#[test]
fn test_non_scalar_job_id_is_validation_error() {
    let job = JobBuilder::new(true).encoded();
    assert!(matches!(
        build(job, vec![]),
        Err(PaperboyError::ValidationError(msg)) if msg.contains("'id'")
    ));
}

#[test]
fn test_blank_job_email_keeps_default_addresses() {
    let mut defaults = Defaults::default();
    defaults.operator.email = vec!["reports@example.com".to_string()];

    for email in [json!(""), json!([]), json!(["  "])] {
        let graph = build_from_encoded(
            &JobBuilder::new(3).field("email", email.clone()).encoded(),
            &encode_reports(vec![]),
            &defaults,
        )
        .unwrap();
        assert_eq!(
            graph.task("Job-3").unwrap().policy.email,
            vec!["reports@example.com".to_string()],
            "email = {email}"
        );
    }
}
