// src/job/model.rs

//! Job and report documents.
//!
//! `RawJob` / `RawReport` mirror the JSON as it arrives and are deliberately
//! lenient (every field optional). `Job` / `Report` are the validated forms
//! produced by `job::validate`; the graph builder only ever sees those.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Timeout;

/// Identifier of a job or report.
///
/// JSON documents carry ids as either strings or integers; both normalize to
/// the same textual form, so `42` and `"42"` are the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Id as it appears in a JSON document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Str(String),
}

impl RawId {
    /// Normalize to an [`EntityId`]; blank strings count as missing.
    pub fn normalize(&self) -> Option<EntityId> {
        match self {
            RawId::Int(n) => Some(EntityId(n.to_string())),
            RawId::UInt(n) => Some(EntityId(n.to_string())),
            RawId::Str(s) if s.trim().is_empty() => None,
            RawId::Str(s) => Some(EntityId(s.trim().to_string())),
        }
    }
}

/// `email` may be a single address or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawEmail {
    One(String),
    Many(Vec<String>),
}

impl RawEmail {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            RawEmail::One(s) => vec![s],
            RawEmail::Many(v) => v,
        }
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
    }
}

/// Job document as decoded from JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJob {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub email: Option<RawEmail>,
    /// Schedule expression: a preset (`@daily`), a 5-field cron line, or a
    /// fixed interval such as `"30m"`.
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(default)]
    pub retry_delay: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
}

/// Report document as decoded from JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReport {
    #[serde(default)]
    pub id: Option<RawId>,
    /// Owning job, when the document names it.
    #[serde(default)]
    pub job: Option<RawId>,
    /// Generation parameters; must be a JSON object when present.
    #[serde(default)]
    pub parameters: Option<Value>,
    /// Post-processing parameters; must be a JSON object when present.
    #[serde(default)]
    pub post: Option<Value>,
}

/// When and how often a job runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Interval {
    /// No schedule: runs only when triggered externally.
    Unscheduled,
    /// One of `@once`, `@hourly`, `@daily`, `@weekly`, `@monthly`, `@yearly`.
    Preset(String),
    /// Five-field cron expression.
    Cron(String),
    /// Fixed period between runs.
    Every(Duration),
}

impl Interval {
    /// Schedule expression as handed to the backend; `None` when unscheduled.
    pub fn expression(&self) -> Option<String> {
        match self {
            Interval::Unscheduled => None,
            Interval::Preset(s) | Interval::Cron(s) => Some(s.clone()),
            Interval::Every(d) => Some(format!("{}s", d.as_secs())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub interval: Interval,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
}

/// Job-level values that take precedence over operator defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobOverrides {
    pub owner: Option<String>,
    pub email: Option<Vec<String>>,
    pub queue: Option<String>,
    pub priority: Option<u32>,
    pub retries: Option<u32>,
    pub retry_delay: Option<Duration>,
    pub timeout: Option<Timeout>,
}

/// Validated job.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: EntityId,
    pub schedule: Schedule,
    pub concurrency: Option<usize>,
    pub overrides: JobOverrides,
    /// The job document exactly as received; handed to the setup task.
    pub document: Value,
}

/// Validated report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: EntityId,
    pub job: EntityId,
    pub parameters: Map<String, Value>,
    pub post: Map<String, Value>,
}
