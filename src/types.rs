use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// When a task becomes runnable relative to its upstream tasks.
///
/// Both rules are barriers: a task never runs until *every* upstream task
/// has reached a terminal state.
///
/// - `AllSuccess`: every upstream task succeeded (default).
/// - `AllDone`: every upstream task finished, whether it succeeded or not.
///   Useful for cleanup that must run even when a report failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerRule {
    AllSuccess,
    AllDone,
}

impl Default for TriggerRule {
    fn default() -> Self {
        TriggerRule::AllSuccess
    }
}

impl FromStr for TriggerRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all_success" => Ok(TriggerRule::AllSuccess),
            "all_done" => Ok(TriggerRule::AllDone),
            other => Err(format!(
                "invalid trigger_rule: {other} (expected \"all_success\" or \"all_done\")"
            )),
        }
    }
}

/// How a task's emitted priority is derived from the `priority_weight`
/// values in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightRule {
    /// Own weight plus the weights of every transitive downstream task.
    Downstream,
    /// Own weight plus the weights of every transitive upstream task.
    Upstream,
    /// Own weight only.
    Absolute,
}

impl Default for WeightRule {
    fn default() -> Self {
        WeightRule::Downstream
    }
}

/// Upper bound on a single task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    Unlimited,
    After(Duration),
}

impl Timeout {
    /// Seconds until timeout, or `None` when unlimited.
    pub fn as_secs(&self) -> Option<u64> {
        match self {
            Timeout::Unlimited => None,
            Timeout::After(d) => Some(d.as_secs()),
        }
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeout::Unlimited => write!(f, "none"),
            Timeout::After(d) => write!(f, "{}s", d.as_secs()),
        }
    }
}

impl FromStr for Timeout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "unlimited" => Ok(Timeout::Unlimited),
            _ => parse_duration(s).map(Timeout::After),
        }
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`, `"1d"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{}' missing unit suffix", s))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value.saturating_mul(60))),
        "h" => Ok(Duration::from_secs(value.saturating_mul(60 * 60))),
        "d" => Ok(Duration::from_secs(value.saturating_mul(60 * 60 * 24))),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, h, or d",
            unit
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration(" 1m "), Ok(Duration::from_secs(60)));
        assert_eq!(parse_duration("2h"), Ok(Duration::from_secs(7200)));
        assert_eq!(parse_duration("1d"), Ok(Duration::from_secs(86_400)));
    }

    #[test]
    fn rejects_missing_or_unknown_units() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("5w").is_err());
        assert!(parse_duration("m").is_err());
    }

    #[test]
    fn timeout_accepts_none() {
        assert_eq!("none".parse::<Timeout>(), Ok(Timeout::Unlimited));
        assert_eq!(
            "30m".parse::<Timeout>(),
            Ok(Timeout::After(Duration::from_secs(1800)))
        );
        assert_eq!(Timeout::Unlimited.as_secs(), None);
    }

    #[test]
    fn trigger_rule_from_str() {
        assert_eq!("ALL_DONE".parse::<TriggerRule>(), Ok(TriggerRule::AllDone));
        assert!("one_success".parse::<TriggerRule>().is_err());
    }
}
