// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{Timeout, TriggerRule, WeightRule};

pub const DEFAULT_CONCURRENCY: usize = 16;
pub const DEFAULT_MAX_ACTIVE_RUNS: usize = 16;
pub const DEFAULT_OWNER: &str = "paperboy";
pub const DEFAULT_QUEUE: &str = "default";
pub const DEFAULT_RETRIES: u32 = 1;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);
pub const DEFAULT_PRIORITY_WEIGHT: u32 = 1;

/// Role names accepted under `[role.<name>]`.
pub const ROLE_NAMES: [&str; 4] = ["job_setup", "report_run", "report_post", "cleanup"];

/// Defaults file as read from TOML, before validation.
///
/// ```toml
/// [dag]
/// concurrency = 16
///
/// [operator]
/// owner = "paperboy"
/// retries = 1
/// retry_delay = "1m"
///
/// [role.cleanup]
/// trigger_rule = "all_done"
/// ```
///
/// All sections are optional. Use `Defaults::try_from` to obtain the
/// validated, fully-resolved form.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDefaults {
    #[serde(default)]
    pub dag: DagSection,

    #[serde(default)]
    pub operator: OperatorSection,

    /// Per-role overrides keyed by role name (see [`ROLE_NAMES`]).
    #[serde(default)]
    pub role: BTreeMap<String, RoleSection>,
}

/// `[dag]` section: settings applied to the graph as a whole.
#[derive(Debug, Clone, Deserialize)]
pub struct DagSection {
    #[serde(default)]
    pub description: String,

    /// Maximum number of tasks of one graph running at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_max_active_runs")]
    pub max_active_runs: usize,

    /// Whether the backend should back-fill missed intervals.
    #[serde(default)]
    pub catchup: bool,

    #[serde(default)]
    pub dagrun_timeout: Option<String>,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_max_active_runs() -> usize {
    DEFAULT_MAX_ACTIVE_RUNS
}

impl Default for DagSection {
    fn default() -> Self {
        Self {
            description: String::new(),
            concurrency: default_concurrency(),
            max_active_runs: default_max_active_runs(),
            catchup: false,
            dagrun_timeout: None,
        }
    }
}

/// `[operator]` section: defaults every task inherits.
///
/// Durations are strings such as `"1m"`; `None` falls back to the
/// built-in constants.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OperatorSection {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub email: Vec<String>,
    #[serde(default)]
    pub email_on_failure: Option<bool>,
    #[serde(default)]
    pub email_on_retry: Option<bool>,
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(default)]
    pub retry_delay: Option<String>,
    #[serde(default)]
    pub retry_exponential_backoff: Option<bool>,
    #[serde(default)]
    pub max_retry_delay: Option<String>,
    #[serde(default)]
    pub priority_weight: Option<u32>,
    #[serde(default)]
    pub queue: Option<String>,
    /// `"none"` or absent means no limit.
    #[serde(default)]
    pub execution_timeout: Option<String>,
    #[serde(default)]
    pub trigger_rule: Option<TriggerRule>,
    #[serde(default)]
    pub weight_rule: Option<WeightRule>,
}

/// `[role.<name>]` section: overrides for one task role.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RoleSection {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(default)]
    pub retry_delay: Option<String>,
    #[serde(default)]
    pub retry_exponential_backoff: Option<bool>,
    #[serde(default)]
    pub max_retry_delay: Option<String>,
    #[serde(default)]
    pub priority_weight: Option<u32>,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub execution_timeout: Option<String>,
    #[serde(default)]
    pub trigger_rule: Option<TriggerRule>,
}

/// Validated defaults. Construct through `Defaults::try_from(RawDefaults)`
/// or `Defaults::default()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    pub dag: DagDefaults,
    pub operator: OperatorDefaults,
    pub roles: RoleOverrides,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DagDefaults {
    pub description: String,
    pub concurrency: usize,
    pub max_active_runs: usize,
    pub catchup: bool,
    pub dagrun_timeout: Option<Duration>,
}

/// Operator defaults with every field resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDefaults {
    pub owner: String,
    pub email: Vec<String>,
    pub email_on_failure: bool,
    pub email_on_retry: bool,
    pub retries: u32,
    pub retry_delay: Duration,
    pub retry_exponential_backoff: bool,
    pub max_retry_delay: Option<Duration>,
    pub priority_weight: u32,
    pub queue: String,
    pub execution_timeout: Timeout,
    pub trigger_rule: TriggerRule,
    pub weight_rule: WeightRule,
}

/// Parsed overrides for one role; `None` means "inherit".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleOverride {
    pub owner: Option<String>,
    pub retries: Option<u32>,
    pub retry_delay: Option<Duration>,
    pub retry_exponential_backoff: Option<bool>,
    pub max_retry_delay: Option<Duration>,
    pub priority_weight: Option<u32>,
    pub queue: Option<String>,
    pub execution_timeout: Option<Timeout>,
    pub trigger_rule: Option<TriggerRule>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleOverrides {
    pub job_setup: RoleOverride,
    pub report_run: RoleOverride,
    pub report_post: RoleOverride,
    pub cleanup: RoleOverride,
}

impl Default for DagDefaults {
    fn default() -> Self {
        Self {
            description: String::new(),
            concurrency: DEFAULT_CONCURRENCY,
            max_active_runs: DEFAULT_MAX_ACTIVE_RUNS,
            catchup: false,
            dagrun_timeout: None,
        }
    }
}

impl Default for OperatorDefaults {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            email: Vec::new(),
            email_on_failure: true,
            email_on_retry: false,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_exponential_backoff: false,
            max_retry_delay: None,
            priority_weight: DEFAULT_PRIORITY_WEIGHT,
            queue: DEFAULT_QUEUE.to_string(),
            execution_timeout: Timeout::Unlimited,
            trigger_rule: TriggerRule::AllSuccess,
            weight_rule: WeightRule::Downstream,
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            dag: DagDefaults::default(),
            operator: OperatorDefaults::default(),
            roles: RoleOverrides::default(),
        }
    }
}
