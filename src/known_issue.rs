//! Known-issue model and resolution.
//!
//! A [`KnownIssue`] is a pre-registered defect that a failed assertion was
//! matched to. Issues are described by [`KnownIssueIdentifier`]s loaded into a
//! [`KnownIssueRegistry`] at configuration time, and a [`KnownIssueChecker`]
//! resolves failure descriptions against that registry without mutating it.

mod checker;
mod identifier;
mod registry;
mod state;

use std::fmt;

pub use checker::{KnownIssueChecker, KnownIssueDataProvider};
pub use identifier::{IdentifierDefinition, KnownIssueIdentifier, Pattern};
pub use registry::{KnownIssueError, KnownIssueRegistry};
use serde::{Deserialize, Serialize};
pub use state::{FixPolicy, IssueState, IssueStateProvider, StaticIssueStates};

/// Origin of a known issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KnownIssueType {
    /// A defect in the system under test.
    External,
    /// A defect in the automation itself.
    Automation,
}

impl fmt::Display for KnownIssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KnownIssueType::External => "EXTERNAL",
            KnownIssueType::Automation => "AUTOMATION",
        })
    }
}

/// A recognised defect matched to an assertion failure.
///
/// Values are immutable once built; the `with_*` methods consume and return
/// the issue so construction reads as a single expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnownIssue {
    identifier: String,
    issue_type: KnownIssueType,
    potentially_known: bool,
    status: Option<String>,
    resolution: Option<String>,
    fixed: bool,
    fail_scenario_fast: bool,
    fail_story_fast: bool,
}

impl KnownIssue {
    /// Create an issue that is not fixed and carries no tracker state.
    ///
    /// `potentially_known` marks a match whose assertion pattern matched but
    /// whose story, scenario or step patterns did not.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        issue_type: KnownIssueType,
        potentially_known: bool,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            issue_type,
            potentially_known,
            status: None,
            resolution: None,
            fixed: false,
            fail_scenario_fast: false,
            fail_story_fast: false,
        }
    }

    /// Attach the issue tracker state.
    #[must_use]
    pub fn with_state(mut self, state: IssueState) -> Self {
        self.status = state.status;
        self.resolution = state.resolution;
        self
    }

    #[must_use]
    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    /// Request that the scenario and/or story stop on this failure.
    #[must_use]
    pub fn with_fail_fast(mut self, scenario: bool, story: bool) -> Self {
        self.fail_scenario_fast = scenario;
        self.fail_story_fast = story;
        self
    }

    #[must_use]
    pub fn identifier(&self) -> &str { &self.identifier }

    #[must_use]
    pub fn issue_type(&self) -> KnownIssueType { self.issue_type }

    #[must_use]
    pub fn is_potentially_known(&self) -> bool { self.potentially_known }

    #[must_use]
    pub fn status(&self) -> Option<&str> { self.status.as_deref() }

    #[must_use]
    pub fn resolution(&self) -> Option<&str> { self.resolution.as_deref() }

    /// Returns `true` when the tracker reports the issue as fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool { self.fixed }

    #[must_use]
    pub fn is_fail_scenario_fast(&self) -> bool { self.fail_scenario_fast }

    #[must_use]
    pub fn is_fail_story_fast(&self) -> bool { self.fail_story_fast }
}
