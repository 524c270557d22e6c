// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{
    DagDefaults, DagSection, Defaults, OperatorDefaults, OperatorSection, ROLE_NAMES,
    RawDefaults, RoleOverride, RoleOverrides, RoleSection,
};
use crate::errors::{PaperboyError, Result};
use crate::types::{Timeout, parse_duration};

impl TryFrom<RawDefaults> for Defaults {
    type Error = PaperboyError;

    fn try_from(raw: RawDefaults) -> std::result::Result<Self, Self::Error> {
        let dag = validate_dag_section(&raw.dag)?;
        let operator = validate_operator_section(&raw.operator)?;
        let roles = validate_roles(&raw)?;

        let defaults = Defaults {
            dag,
            operator,
            roles,
        };
        validate_retry_caps(&defaults)?;
        Ok(defaults)
    }
}

fn validate_dag_section(section: &DagSection) -> Result<DagDefaults> {
    if section.concurrency == 0 {
        return Err(PaperboyError::ConfigError(
            "[dag].concurrency must be >= 1 (got 0)".to_string(),
        ));
    }
    if section.max_active_runs == 0 {
        return Err(PaperboyError::ConfigError(
            "[dag].max_active_runs must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(DagDefaults {
        description: section.description.clone(),
        concurrency: section.concurrency,
        max_active_runs: section.max_active_runs,
        catchup: section.catchup,
        dagrun_timeout: duration_field("[dag].dagrun_timeout", &section.dagrun_timeout)?,
    })
}

fn validate_operator_section(section: &OperatorSection) -> Result<OperatorDefaults> {
    let builtin = OperatorDefaults::default();

    let queue = section.queue.clone().unwrap_or(builtin.queue);
    if queue.trim().is_empty() {
        return Err(PaperboyError::ConfigError(
            "[operator].queue must not be empty".to_string(),
        ));
    }

    Ok(OperatorDefaults {
        owner: section.owner.clone().unwrap_or(builtin.owner),
        email: section.email.clone(),
        email_on_failure: section.email_on_failure.unwrap_or(builtin.email_on_failure),
        email_on_retry: section.email_on_retry.unwrap_or(builtin.email_on_retry),
        retries: section.retries.unwrap_or(builtin.retries),
        retry_delay: duration_field("[operator].retry_delay", &section.retry_delay)?
            .unwrap_or(builtin.retry_delay),
        retry_exponential_backoff: section
            .retry_exponential_backoff
            .unwrap_or(builtin.retry_exponential_backoff),
        max_retry_delay: duration_field("[operator].max_retry_delay", &section.max_retry_delay)?,
        priority_weight: section.priority_weight.unwrap_or(builtin.priority_weight),
        queue,
        execution_timeout: timeout_field(
            "[operator].execution_timeout",
            &section.execution_timeout,
        )?
        .unwrap_or(builtin.execution_timeout),
        trigger_rule: section.trigger_rule.unwrap_or(builtin.trigger_rule),
        weight_rule: section.weight_rule.unwrap_or(builtin.weight_rule),
    })
}

fn validate_roles(raw: &RawDefaults) -> Result<RoleOverrides> {
    let mut roles = RoleOverrides::default();

    for (name, section) in raw.role.iter() {
        let parsed = validate_role_section(name, section)?;
        match name.as_str() {
            "job_setup" => roles.job_setup = parsed,
            "report_run" => roles.report_run = parsed,
            "report_post" => roles.report_post = parsed,
            "cleanup" => roles.cleanup = parsed,
            other => {
                return Err(PaperboyError::ConfigError(format!(
                    "unknown role '{}' in [role.{}] (expected one of {:?})",
                    other, other, ROLE_NAMES
                )));
            }
        }
    }

    Ok(roles)
}

fn validate_role_section(name: &str, section: &RoleSection) -> Result<RoleOverride> {
    if let Some(queue) = &section.queue {
        if queue.trim().is_empty() {
            return Err(PaperboyError::ConfigError(format!(
                "[role.{}].queue must not be empty",
                name
            )));
        }
    }

    Ok(RoleOverride {
        owner: section.owner.clone(),
        retries: section.retries,
        retry_delay: duration_field(&format!("[role.{name}].retry_delay"), &section.retry_delay)?,
        retry_exponential_backoff: section.retry_exponential_backoff,
        max_retry_delay: duration_field(
            &format!("[role.{name}].max_retry_delay"),
            &section.max_retry_delay,
        )?,
        priority_weight: section.priority_weight,
        queue: section.queue.clone(),
        execution_timeout: timeout_field(
            &format!("[role.{name}].execution_timeout"),
            &section.execution_timeout,
        )?,
        trigger_rule: section.trigger_rule,
    })
}

/// `max_retry_delay` must not be shorter than the delay it caps, for the
/// operator defaults and for every role after inheriting them.
fn validate_retry_caps(defaults: &Defaults) -> Result<()> {
    let op = &defaults.operator;
    check_retry_cap("[operator]", op.retry_delay, op.max_retry_delay)?;

    let roles = [
        ("job_setup", &defaults.roles.job_setup),
        ("report_run", &defaults.roles.report_run),
        ("report_post", &defaults.roles.report_post),
        ("cleanup", &defaults.roles.cleanup),
    ];
    for (name, role) in roles {
        let delay = role.retry_delay.unwrap_or(op.retry_delay);
        let cap = role.max_retry_delay.or(op.max_retry_delay);
        check_retry_cap(&format!("[role.{name}]"), delay, cap)?;
    }

    Ok(())
}

pub(crate) fn check_retry_cap(scope: &str, delay: Duration, cap: Option<Duration>) -> Result<()> {
    match cap {
        Some(cap) if cap < delay => Err(PaperboyError::ConfigError(format!(
            "{}: max_retry_delay ({}s) is shorter than retry_delay ({}s)",
            scope,
            cap.as_secs(),
            delay.as_secs()
        ))),
        _ => Ok(()),
    }
}

fn duration_field(field: &str, value: &Option<String>) -> Result<Option<Duration>> {
    value
        .as_deref()
        .map(|s| {
            parse_duration(s)
                .map_err(|e| PaperboyError::ConfigError(format!("{}: {}", field, e)))
        })
        .transpose()
}

fn timeout_field(field: &str, value: &Option<String>) -> Result<Option<Timeout>> {
    value
        .as_deref()
        .map(|s| {
            s.parse::<Timeout>()
                .map_err(|e| PaperboyError::ConfigError(format!("{}: {}", field, e)))
        })
        .transpose()
}
