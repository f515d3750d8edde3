//! Metric helpers for assertion and scenario outcomes.
//!
//! Counters are recorded through the [`metrics`](https://docs.rs/metrics)
//! crate when the `metrics` feature is enabled. Without the feature every
//! helper compiles to a no-op.

use crate::status::Status;

/// Name of the counter tracking recorded soft assertions.
pub const ASSERTIONS_TOTAL: &str = "vividus_assertions_total";
/// Name of the counter tracking finalised scenarios by status.
pub const SCENARIOS_TOTAL: &str = "vividus_scenarios_total";

/// Outcome of a single soft assertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    /// Failed, but matched a known issue that is not fixed yet.
    KnownIssue,
}

impl Outcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::KnownIssue => "known_issue",
        }
    }
}

/// Record a soft assertion with the given outcome.
pub fn inc_assertions(outcome: Outcome) {
    #[cfg(feature = "metrics")]
    metrics::counter!(ASSERTIONS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}

/// Record a scenario finalised with `status`.
pub fn inc_scenarios(status: Status) {
    #[cfg(feature = "metrics")]
    metrics::counter!(SCENARIOS_TOTAL, "status" => status.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = status;
}
