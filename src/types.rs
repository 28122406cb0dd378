// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What happens to the dependents of a task whose body failed.
///
/// - `SkipDependents`: every task that (transitively) depends on the failed
///   task is marked `Skipped` and never runs (default behaviour).
/// - `Continue`: the failed task still releases its dependents, exactly as a
///   successful completion would. The failure is only recorded in the status
///   tracker and the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    #[default]
    SkipDependents,
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "skip-dependents" | "skip" => Ok(FailurePolicy::SkipDependents),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(format!(
                "invalid failure_policy: {other} (expected \"skip-dependents\" or \"continue\")"
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::SkipDependents => f.write_str("skip-dependents"),
            FailurePolicy::Continue => f.write_str("continue"),
        }
    }
}
