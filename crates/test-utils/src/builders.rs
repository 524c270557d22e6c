#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};

use paperboy_dag::config::Defaults;
use paperboy_dag::dag::{TaskGraph, build_from_encoded};

/// Base64-encode a JSON value the way a rendered template carries it.
pub fn encode(value: &Value) -> String {
    STANDARD.encode(value.to_string())
}

/// Builder for job documents to simplify test setup.
pub struct JobBuilder {
    doc: Map<String, Value>,
}

impl JobBuilder {
    /// A minimal valid job: id, owner and the template's start date.
    pub fn new(id: impl Into<Value>) -> Self {
        let mut doc = Map::new();
        doc.insert("id".into(), id.into());
        doc.insert("owner".into(), json!("a"));
        doc.insert("start_date".into(), json!("01/01/2024 00:00:00"));
        Self { doc }
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.doc.insert(key.to_string(), value.into());
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.doc.remove(key);
        self
    }

    pub fn interval(self, expr: &str) -> Self {
        self.field("interval", expr)
    }

    pub fn end_date(self, date: &str) -> Self {
        self.field("end_date", date)
    }

    pub fn build(self) -> Value {
        Value::Object(self.doc)
    }

    pub fn encoded(self) -> String {
        encode(&self.build())
    }
}

/// Builder for a single report document.
pub struct ReportBuilder {
    doc: Map<String, Value>,
}

impl ReportBuilder {
    pub fn new(id: impl Into<Value>) -> Self {
        let mut doc = Map::new();
        doc.insert("id".into(), id.into());
        Self { doc }
    }

    pub fn parameter(mut self, key: &str, value: impl Into<Value>) -> Self {
        insert_nested(&mut self.doc, "parameters", key, value.into());
        self
    }

    pub fn post(mut self, key: &str, value: impl Into<Value>) -> Self {
        insert_nested(&mut self.doc, "post", key, value.into());
        self
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.doc.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.doc)
    }
}

fn insert_nested(doc: &mut Map<String, Value>, section: &str, key: &str, value: Value) {
    let entry = doc
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(map) = entry {
        map.insert(key.to_string(), value);
    }
}

/// Encode a list of report documents.
pub fn encode_reports(reports: Vec<Value>) -> String {
    encode(&Value::Array(reports))
}

/// Report documents carrying only the given integer ids.
pub fn reports_with_ids(ids: &[i64]) -> Vec<Value> {
    ids.iter().map(|id| ReportBuilder::new(*id).build()).collect()
}

/// Build a graph from a job and report ids with built-in defaults.
pub fn build_graph(job: JobBuilder, report_ids: &[i64]) -> TaskGraph {
    build_from_encoded(
        &job.encoded(),
        &encode_reports(reports_with_ids(report_ids)),
        &Defaults::default(),
    )
    .expect("Failed to build graph from builder input")
}
