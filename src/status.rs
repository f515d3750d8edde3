//! Scenario and step outcome classification.
//!
//! [`Status`] is a closed set of outcomes with an explicit rank table. Lower
//! ranks are more severe, so combining two outcomes always keeps the one with
//! the lower rank. [`Status::from_failure`] and [`Status::from_event`] map a
//! failed step or a failed soft assertion onto exactly one status.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    assertion::{SoftAssertionError, StepFailure},
    event::AssertionFailedEvent,
    status_priority::StatusPriority,
};

/// Outcome of a story, scenario or step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The step could not run to completion because of an unexpected error.
    Broken,
    /// At least one assertion failed.
    Failed,
    /// The step has no implementation yet.
    Pending,
    /// Every failure is a recognised, not yet fixed defect.
    KnownIssuesOnly,
    /// The step was ignored, commented out or not performed.
    Skipped,
    /// Every assertion passed.
    Passed,
    /// Nothing was observed yet.
    NotCovered,
}

impl Status {
    /// Every status, indexed by its rank.
    pub const ALL: [Status; 7] = [
        Status::Broken,
        Status::Failed,
        Status::Pending,
        Status::KnownIssuesOnly,
        Status::Skipped,
        Status::Passed,
        Status::NotCovered,
    ];

    /// Rank of the status; lower is more severe.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Status::Broken => 0,
            Status::Failed => 1,
            Status::Pending => 2,
            Status::KnownIssuesOnly => 3,
            Status::Skipped => 4,
            Status::Passed => 5,
            Status::NotCovered => 6,
        }
    }

    /// Look a status up by its rank.
    #[must_use]
    pub fn from_priority(priority: u8) -> Option<Status> {
        Self::ALL.get(usize::from(priority)).copied()
    }

    /// The least severe status, used as the neutral starting value.
    #[must_use]
    pub const fn lowest() -> Status { Status::NotCovered }

    /// Return the more severe of `a` and `b`.
    #[must_use]
    pub fn worse_of(a: Status, b: Status) -> Status {
        if b.priority() < a.priority() { b } else { a }
    }

    /// Combine `self` with `other`, keeping the more severe outcome.
    #[must_use]
    pub fn worse(self, other: Status) -> Status { Self::worse_of(self, other) }

    /// Returns `true` if `self` is strictly more severe than `other`.
    #[must_use]
    pub fn is_worse_than(self, other: Status) -> bool { self.priority() < other.priority() }

    /// Classify a failed step.
    ///
    /// Plain assertion failures are [`Status::Failed`]. A verification error
    /// whose collected failures are all known issues that are not fixed yet
    /// is [`Status::KnownIssuesOnly`]; one with any unrecognised or fixed
    /// failure is [`Status::Failed`]. Every other error is [`Status::Broken`].
    #[must_use]
    pub fn from_failure(failure: &StepFailure) -> Status {
        match failure {
            StepFailure::Assertion(_) => Status::Failed,
            StepFailure::Verification(error) => {
                if !error.errors().is_empty()
                    && error
                        .errors()
                        .iter()
                        .all(SoftAssertionError::is_not_fixed_known_issue)
                {
                    Status::KnownIssuesOnly
                } else {
                    Status::Failed
                }
            }
            StepFailure::Error(_) => Status::Broken,
        }
    }

    /// Classify a failed soft assertion.
    ///
    /// Only a known issue that has not been fixed yields
    /// [`Status::KnownIssuesOnly`]. A fixed known issue that fails again is a
    /// regression and escalates to [`Status::Failed`].
    #[must_use]
    pub fn from_event(event: &AssertionFailedEvent) -> Status {
        if event.soft_assertion_error().is_not_fixed_known_issue() {
            Status::KnownIssuesOnly
        } else {
            Status::Failed
        }
    }

    /// Canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Broken => "BROKEN",
            Status::Failed => "FAILED",
            Status::Pending => "PENDING",
            Status::KnownIssuesOnly => "KNOWN_ISSUES_ONLY",
            Status::Skipped => "SKIPPED",
            Status::Passed => "PASSED",
            Status::NotCovered => "NOT_COVERED",
        }
    }
}

impl PartialOrd for Status {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}

/// Orders by rank, so the minimum of a set of statuses is the worst one.
impl Ord for Status {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering { self.priority().cmp(&other.priority()) }
}

impl From<StatusPriority> for Status {
    fn from(priority: StatusPriority) -> Self {
        match priority {
            StatusPriority::Broken => Status::Broken,
            StatusPriority::Failed => Status::Failed,
            StatusPriority::KnownIssuesOnly => Status::KnownIssuesOnly,
            StatusPriority::Skipped => Status::Skipped,
            StatusPriority::Passed => Status::Passed,
            StatusPriority::NotCovered => Status::NotCovered,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Error returned when parsing an unknown status name.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::Status;
    use crate::{
        assertion::{AssertionError, SoftAssertionError, StepFailure, VerificationError},
        event::AssertionFailedEvent,
        known_issue::{KnownIssue, KnownIssueType},
        session::SessionId,
    };

    fn soft_error(known: bool, fixed: bool) -> SoftAssertionError {
        let issue = known.then(|| {
            KnownIssue::new("VVD-1", KnownIssueType::External, false).with_fixed(fixed)
        });
        SoftAssertionError::new(AssertionError::new("boom"), issue)
    }

    #[rstest]
    #[case(Status::Broken, 0)]
    #[case(Status::Failed, 1)]
    #[case(Status::Pending, 2)]
    #[case(Status::KnownIssuesOnly, 3)]
    #[case(Status::Skipped, 4)]
    #[case(Status::Passed, 5)]
    #[case(Status::NotCovered, 6)]
    fn priorities_follow_rank_table(#[case] status: Status, #[case] priority: u8) {
        assert_eq!(status.priority(), priority);
        assert_eq!(Status::from_priority(priority), Some(status));
    }

    #[test]
    fn lowest_has_highest_priority_value() {
        assert_eq!(Status::lowest(), Status::NotCovered);
        assert!(
            Status::ALL
                .iter()
                .all(|s| s.priority() <= Status::lowest().priority())
        );
        assert_eq!(Status::from_priority(7), None);
    }

    #[test]
    fn worse_of_keeps_more_severe() {
        assert_eq!(Status::worse_of(Status::Passed, Status::Failed), Status::Failed);
        assert_eq!(Status::worse_of(Status::Broken, Status::Failed), Status::Broken);
        assert_eq!(Status::Pending.worse(Status::Pending), Status::Pending);
        assert_eq!(Status::ALL.iter().min(), Some(&Status::Broken));
    }

    #[test]
    fn assertion_failure_is_failed() {
        let failure = StepFailure::Assertion(AssertionError::new("expected 1"));
        assert_eq!(Status::from_failure(&failure), Status::Failed);
    }

    #[test]
    fn unknown_error_is_broken() {
        let failure = StepFailure::Error(Arc::new(std::io::Error::other("socket closed")));
        assert_eq!(Status::from_failure(&failure), Status::Broken);
    }

    #[rstest]
    #[case(vec![(true, false), (true, false)], Status::KnownIssuesOnly)]
    #[case(vec![(true, false), (false, false)], Status::Failed)]
    #[case(vec![(false, false)], Status::Failed)]
    #[case(vec![(true, true), (true, true)], Status::Failed)]
    #[case(vec![(true, false), (true, true)], Status::Failed)]
    #[case(vec![], Status::Failed)]
    fn verification_error_classification(
        #[case] errors: Vec<(bool, bool)>,
        #[case] expected: Status,
    ) {
        let errors = errors
            .into_iter()
            .map(|(known, fixed)| soft_error(known, fixed))
            .collect();
        let failure = StepFailure::Verification(VerificationError::new("verification", errors));
        assert_eq!(Status::from_failure(&failure), expected);
    }

    #[rstest]
    #[case(false, false, Status::Failed)]
    #[case(true, false, Status::KnownIssuesOnly)]
    #[case(true, true, Status::Failed)]
    fn event_classification(#[case] known: bool, #[case] fixed: bool, #[case] expected: Status) {
        let event = AssertionFailedEvent::new(SessionId::new(1), soft_error(known, fixed));
        assert_eq!(Status::from_event(&event), expected);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("known_issues_only".parse::<Status>(), Ok(Status::KnownIssuesOnly));
        assert_eq!(" PASSED ".parse::<Status>(), Ok(Status::Passed));
        assert!("green".parse::<Status>().is_err());
    }

    #[test]
    fn serializes_upper_case_names() {
        let json = serde_json::to_string(&Status::KnownIssuesOnly).expect("serialize status");
        assert_eq!(json, "\"KNOWN_ISSUES_ONLY\"");
        assert_eq!(Status::NotCovered.to_string(), "NOT_COVERED");
    }
}
