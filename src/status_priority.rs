//! Ordering-only projection of [`Status`] used by report backends.
//!
//! Report backends know fewer outcomes than the run itself: pending steps are
//! rendered as skipped and there is no dedicated known-issue status in the
//! report model. [`StatusPriority`] keeps the rank needed to decide whether a
//! report item must be downgraded while [`ReportStatus`] is what gets
//! rendered.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{assertion::StepFailure, event::AssertionFailedEvent, status::Status};

/// Status model understood by report backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Broken,
    Failed,
    Passed,
    Skipped,
    Unknown,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportStatus::Broken => "broken",
            ReportStatus::Failed => "failed",
            ReportStatus::Passed => "passed",
            ReportStatus::Skipped => "skipped",
            ReportStatus::Unknown => "unknown",
        })
    }
}

/// Severity rank of a report item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusPriority {
    Broken,
    Failed,
    KnownIssuesOnly,
    Skipped,
    Passed,
    NotCovered,
}

impl StatusPriority {
    /// Rank of the priority; lower is more severe.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            StatusPriority::Broken => 0,
            StatusPriority::Failed => 1,
            StatusPriority::KnownIssuesOnly => 2,
            StatusPriority::Skipped => 3,
            StatusPriority::Passed => 4,
            StatusPriority::NotCovered => 5,
        }
    }

    /// The least severe priority, assigned to report items before any outcome
    /// is known.
    #[must_use]
    pub const fn lowest() -> StatusPriority { StatusPriority::NotCovered }

    /// Classify a failed soft assertion with the same known-issue escalation
    /// rule as [`Status::from_event`].
    #[must_use]
    pub fn from_event(event: &AssertionFailedEvent) -> StatusPriority {
        Status::from_event(event).into()
    }

    /// Classify a failed step.
    #[must_use]
    pub fn from_failure(failure: &StepFailure) -> StatusPriority {
        Status::from_failure(failure).into()
    }

    /// Report model rendered for this priority.
    #[must_use]
    pub const fn report_status(self) -> ReportStatus {
        match self {
            StatusPriority::Broken => ReportStatus::Broken,
            StatusPriority::Failed | StatusPriority::KnownIssuesOnly => ReportStatus::Failed,
            StatusPriority::Skipped => ReportStatus::Skipped,
            StatusPriority::Passed => ReportStatus::Passed,
            StatusPriority::NotCovered => ReportStatus::Unknown,
        }
    }

    /// Map a rendered report status back onto its priority.
    #[must_use]
    pub const fn from_report_status(status: ReportStatus) -> StatusPriority {
        match status {
            ReportStatus::Broken => StatusPriority::Broken,
            ReportStatus::Failed => StatusPriority::Failed,
            ReportStatus::Skipped => StatusPriority::Skipped,
            ReportStatus::Passed => StatusPriority::Passed,
            ReportStatus::Unknown => StatusPriority::NotCovered,
        }
    }

    /// Returns `true` when a report item currently showing `current` must be
    /// overwritten with `incoming`.
    #[must_use]
    pub fn is_update_needed(current: ReportStatus, incoming: ReportStatus) -> bool {
        Self::from_report_status(current).priority() > Self::from_report_status(incoming).priority()
    }
}

impl From<Status> for StatusPriority {
    fn from(status: Status) -> Self {
        match status {
            Status::Broken => StatusPriority::Broken,
            Status::Failed => StatusPriority::Failed,
            Status::KnownIssuesOnly => StatusPriority::KnownIssuesOnly,
            Status::Pending | Status::Skipped => StatusPriority::Skipped,
            Status::Passed => StatusPriority::Passed,
            Status::NotCovered => StatusPriority::NotCovered,
        }
    }
}
