// src/dag/policy.rs

//! Per-task execution policy and the defaults merge that produces it.
//!
//! Precedence for every field: role override > job value > operator default.
//! The merge is total: a resolved [`TaskPolicy`] has no unset fields.

use std::time::Duration;

use serde::Serialize;

use crate::config::model::{OperatorDefaults, RoleOverride};
use crate::job::JobOverrides;
use crate::types::{Timeout, TriggerRule};

/// How the backend retries a failed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` means a single attempt.
    pub retries: u32,
    pub delay: Duration,
    pub exponential_backoff: bool,
    pub max_delay: Option<Duration>,
}

impl RetryPolicy {
    /// Total attempts allowed, first try included.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay before the retry that follows failed attempt `attempt`
    /// (1-based), or `None` when no retries remain.
    ///
    /// With exponential backoff the delay doubles per attempt. Either way it
    /// never exceeds `max_delay`.
    pub fn delay_after_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.retries {
            return None;
        }

        let delay = if self.exponential_backoff {
            let factor = 2u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
            self.delay.saturating_mul(factor)
        } else {
            self.delay
        };

        Some(match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        })
    }
}

/// Fully resolved execution settings of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPolicy {
    pub owner: String,
    pub email: Vec<String>,
    pub email_on_failure: bool,
    pub email_on_retry: bool,
    pub retry: RetryPolicy,
    pub timeout: Timeout,
    pub queue: String,
    /// Own weight, before the weight rule is applied.
    pub priority_weight: u32,
    pub trigger_rule: TriggerRule,
}

impl TaskPolicy {
    pub fn resolve(
        defaults: &OperatorDefaults,
        job: &JobOverrides,
        role: &RoleOverride,
    ) -> Self {
        let retry = RetryPolicy {
            retries: role.retries.or(job.retries).unwrap_or(defaults.retries),
            delay: role
                .retry_delay
                .or(job.retry_delay)
                .unwrap_or(defaults.retry_delay),
            exponential_backoff: role
                .retry_exponential_backoff
                .unwrap_or(defaults.retry_exponential_backoff),
            max_delay: role.max_retry_delay.or(defaults.max_retry_delay),
        };

        Self {
            owner: role
                .owner
                .clone()
                .or_else(|| job.owner.clone())
                .unwrap_or_else(|| defaults.owner.clone()),
            email: job.email.clone().unwrap_or_else(|| defaults.email.clone()),
            email_on_failure: defaults.email_on_failure,
            email_on_retry: defaults.email_on_retry,
            retry,
            timeout: role
                .execution_timeout
                .or(job.timeout)
                .unwrap_or(defaults.execution_timeout),
            queue: role
                .queue
                .clone()
                .or_else(|| job.queue.clone())
                .unwrap_or_else(|| defaults.queue.clone()),
            priority_weight: role
                .priority_weight
                .or(job.priority)
                .unwrap_or(defaults.priority_weight),
            trigger_rule: role.trigger_rule.unwrap_or(defaults.trigger_rule),
        }
    }
}

/// Serializable view of a [`RetryPolicy`].
#[derive(Debug, Clone, Serialize)]
pub struct RetryPolicySpec {
    pub retries: u32,
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
    pub exponential_backoff: bool,
    pub max_retry_delay_secs: Option<u64>,
}

impl From<&RetryPolicy> for RetryPolicySpec {
    fn from(p: &RetryPolicy) -> Self {
        Self {
            retries: p.retries,
            max_attempts: p.max_attempts(),
            retry_delay_secs: p.delay.as_secs(),
            exponential_backoff: p.exponential_backoff,
            max_retry_delay_secs: p.max_delay.map(|d| d.as_secs()),
        }
    }
}
