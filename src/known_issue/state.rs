//! Issue tracker state attached to matched known issues.

use std::collections::HashMap;

use serde::Deserialize;

/// Status and resolution reported by an issue tracker.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct IssueState {
    pub status: Option<String>,
    pub resolution: Option<String>,
}

impl IssueState {
    #[must_use]
    pub fn new(status: Option<&str>, resolution: Option<&str>) -> Self {
        Self {
            status: status.map(str::to_owned),
            resolution: resolution.map(str::to_owned),
        }
    }

    /// Returns `true` when the state means the defect has been fixed.
    #[must_use]
    pub fn is_fixed(&self, policy: &FixPolicy) -> bool { policy.is_fixed(self) }
}

/// Decides which tracker states count as fixed.
///
/// An issue is fixed when its status is one of `closed_statuses` and its
/// resolution, if the tracker reports one, is one of `fixed_resolutions`.
/// Both comparisons ignore ASCII case.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixPolicy {
    pub closed_statuses: Vec<String>,
    pub fixed_resolutions: Vec<String>,
}

impl Default for FixPolicy {
    fn default() -> Self {
        Self {
            closed_statuses: vec!["Closed".into(), "Resolved".into(), "Done".into()],
            fixed_resolutions: vec!["Fixed".into(), "Done".into()],
        }
    }
}

impl FixPolicy {
    #[must_use]
    pub fn is_fixed(&self, state: &IssueState) -> bool {
        let contains = |values: &[String], value: &str| {
            values.iter().any(|v| v.eq_ignore_ascii_case(value))
        };
        let closed = state
            .status
            .as_deref()
            .is_some_and(|status| contains(&self.closed_statuses, status));
        closed
            && state
                .resolution
                .as_deref()
                .is_none_or(|resolution| contains(&self.fixed_resolutions, resolution))
    }
}

/// Source of issue tracker state.
pub trait IssueStateProvider: Send + Sync {
    /// Tracker status of the issue, if known.
    fn issue_status(&self, identifier: &str) -> Option<String>;

    /// Tracker resolution of the issue, if known.
    fn issue_resolution(&self, _identifier: &str) -> Option<String> { None }
}

/// Issue states supplied up front, typically from configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticIssueStates(HashMap<String, IssueState>);

impl StaticIssueStates {
    pub fn insert(&mut self, identifier: impl Into<String>, state: IssueState) {
        self.0.insert(identifier.into(), state);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl IssueStateProvider for StaticIssueStates {
    fn issue_status(&self, identifier: &str) -> Option<String> {
        self.0.get(identifier).and_then(|s| s.status.clone())
    }

    fn issue_resolution(&self, identifier: &str) -> Option<String> {
        self.0.get(identifier).and_then(|s| s.resolution.clone())
    }
}
