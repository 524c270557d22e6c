// src/job/validate.rs

//! Raw → validated conversion for jobs and reports.
//!
//! Missing or malformed required fields are `ValidationError`s; scheduling
//! values that are individually well-formed but inconsistent (or an interval
//! expression that cannot be understood) are `ConfigError`s. Every message
//! names the job or report it concerns.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Value};

use crate::errors::{PaperboyError, Result};
use crate::job::model::{
    EntityId, Interval, Job, JobOverrides, RawJob, RawReport, Report, Schedule,
};
use crate::types::{Timeout, parse_duration};

/// Date format used by rendered job templates, e.g. `01/31/2024 13:45:00`.
pub const TEMPLATE_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

const INTERVAL_PRESETS: [&str; 6] = [
    "@once", "@hourly", "@daily", "@weekly", "@monthly", "@yearly",
];

static CRON_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z*/,?#-]+$").expect("static cron regex"));

impl Job {
    /// Validate a decoded job. `document` is the JSON the job came from.
    pub fn from_raw(raw: RawJob, document: Value) -> Result<Self> {
        let id = raw
            .id
            .as_ref()
            .and_then(|id| id.normalize())
            .ok_or_else(|| {
                PaperboyError::ValidationError(
                    "job document is missing required field 'id'".to_string(),
                )
            })?;

        let schedule = validate_schedule(&id, &raw)?;

        if raw.concurrency == Some(0) {
            return Err(PaperboyError::ConfigError(format!(
                "job {}: concurrency must be >= 1 (got 0)",
                id
            )));
        }

        let overrides = validate_overrides(&id, &raw)?;

        Ok(Job {
            id,
            schedule,
            concurrency: raw.concurrency,
            overrides,
            document,
        })
    }
}

impl Report {
    /// Validate a decoded report belonging to `job`.
    ///
    /// `position` is the report's index in the incoming list; it is only used
    /// to identify reports that have no id.
    pub fn from_raw(raw: RawReport, job: &EntityId, position: usize) -> Result<Self> {
        let id = raw
            .id
            .as_ref()
            .and_then(|id| id.normalize())
            .ok_or_else(|| {
                PaperboyError::ValidationError(format!(
                    "job {}: report at position {} is missing required field 'id'",
                    job, position
                ))
            })?;

        if let Some(parent) = raw.job.as_ref().and_then(|j| j.normalize()) {
            if &parent != job {
                return Err(PaperboyError::ValidationError(format!(
                    "report {}: belongs to job {} but was submitted with job {}",
                    id, parent, job
                )));
            }
        }

        let parameters = object_field(&id, "parameters", raw.parameters)?;
        let post = object_field(&id, "post", raw.post)?;

        Ok(Report {
            id,
            job: job.clone(),
            parameters,
            post,
        })
    }
}

/// Validate every report of `job`, preserving order.
pub fn validate_reports(raws: Vec<RawReport>, job: &EntityId) -> Result<Vec<Report>> {
    raws.into_iter()
        .enumerate()
        .map(|(position, raw)| Report::from_raw(raw, job, position))
        .collect()
}

fn validate_schedule(id: &EntityId, raw: &RawJob) -> Result<Schedule> {
    let start_raw = raw.start_date.as_deref().ok_or_else(|| {
        PaperboyError::ValidationError(format!(
            "job {}: missing required field 'start_date'",
            id
        ))
    })?;
    let start_date = parse_timestamp(start_raw).ok_or_else(|| {
        PaperboyError::ValidationError(format!(
            "job {}: start_date '{}' is not a valid timestamp (expected {})",
            id, start_raw, TEMPLATE_DATE_FORMAT
        ))
    })?;

    let end_date = match raw.end_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(end_raw) => Some(parse_timestamp(end_raw).ok_or_else(|| {
            PaperboyError::ValidationError(format!(
                "job {}: end_date '{}' is not a valid timestamp (expected {})",
                id, end_raw, TEMPLATE_DATE_FORMAT
            ))
        })?),
    };

    if let Some(end) = end_date {
        if end < start_date {
            return Err(PaperboyError::ConfigError(format!(
                "job {}: end_date {} is before start_date {}",
                id, end, start_date
            )));
        }
    }

    let interval = parse_interval(raw.interval.as_deref().unwrap_or(""))
        .map_err(|e| PaperboyError::ConfigError(format!("job {}: {}", id, e)))?;

    Ok(Schedule {
        interval,
        start_date,
        end_date,
    })
}

fn validate_overrides(id: &EntityId, raw: &RawJob) -> Result<JobOverrides> {
    let retry_delay = raw
        .retry_delay
        .as_deref()
        .map(parse_duration)
        .transpose()
        .map_err(|e| PaperboyError::ConfigError(format!("job {}: retry_delay: {}", id, e)))?;

    let timeout = raw
        .timeout
        .as_deref()
        .map(str::parse::<Timeout>)
        .transpose()
        .map_err(|e| PaperboyError::ConfigError(format!("job {}: timeout: {}", id, e)))?;

    let queue = match raw.queue.as_deref().map(str::trim) {
        Some("") => {
            return Err(PaperboyError::ConfigError(format!(
                "job {}: queue must not be empty",
                id
            )));
        }
        other => other.map(str::to_string),
    };

    Ok(JobOverrides {
        owner: raw
            .owner
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        // An empty list means "not set", so the defaults still notify.
        email: raw
            .email
            .clone()
            .map(|e| e.into_vec())
            .filter(|addrs| !addrs.is_empty()),
        queue,
        priority: raw.priority,
        retries: raw.retries,
        retry_delay,
        timeout,
    })
}

/// Parse a template timestamp, also accepting RFC 3339 and ISO 8601 forms.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, TEMPLATE_DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok())
}

/// Parse a schedule expression. Blank means unscheduled.
pub fn parse_interval(expr: &str) -> std::result::Result<Interval, String> {
    let expr = expr.trim();
    if expr.is_empty() || expr.eq_ignore_ascii_case("none") {
        return Ok(Interval::Unscheduled);
    }

    if expr.starts_with('@') {
        let lower = expr.to_lowercase();
        return if INTERVAL_PRESETS.contains(&lower.as_str()) {
            Ok(Interval::Preset(lower))
        } else {
            Err(format!(
                "unknown interval preset '{}' (expected one of {:?})",
                expr, INTERVAL_PRESETS
            ))
        };
    }

    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() > 1 {
        return if fields.len() == 5 && fields.iter().all(|f| CRON_FIELD.is_match(f)) {
            Ok(Interval::Cron(fields.join(" ")))
        } else {
            Err(format!("interval '{}' is not a 5-field cron expression", expr))
        };
    }

    match parse_duration(expr) {
        Ok(d) if d.is_zero() => Err(format!("interval '{}' must be longer than zero", expr)),
        Ok(d) => Ok(Interval::Every(d)),
        Err(e) => Err(format!("interval '{}' is not understood: {}", expr, e)),
    }
}

fn object_field(
    report: &EntityId,
    field: &str,
    value: Option<Value>,
) -> Result<Map<String, Value>> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(PaperboyError::ValidationError(format!(
            "report {}: '{}' must be a JSON object",
            report, field
        ))),
    }
}
