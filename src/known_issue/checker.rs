//! Runtime resolution of failure descriptions to known issues.

use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use super::{
    FixPolicy,
    IssueState,
    IssueStateProvider,
    KnownIssue,
    KnownIssueRegistry,
    identifier::KnownIssueIdentifier,
};
use crate::session::TestInfo;

/// Supplies runtime data matched by an identifier's dynamic patterns, such as
/// the URL of the page under test.
pub trait KnownIssueDataProvider: Send + Sync {
    fn data(&self) -> Option<String>;
}

impl<F> KnownIssueDataProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn data(&self) -> Option<String> { self() }
}

/// Resolves failure descriptions against a [`KnownIssueRegistry`].
///
/// Resolution never mutates the registry and may be shared by every running
/// session.
#[derive(Clone)]
pub struct KnownIssueChecker {
    registry: Arc<KnownIssueRegistry>,
    state_provider: Option<Arc<dyn IssueStateProvider>>,
    data_providers: HashMap<String, Arc<dyn KnownIssueDataProvider>>,
    fix_policy: FixPolicy,
}

impl KnownIssueChecker {
    #[must_use]
    pub fn new(registry: Arc<KnownIssueRegistry>) -> Self {
        Self {
            registry,
            state_provider: None,
            data_providers: HashMap::new(),
            fix_policy: FixPolicy::default(),
        }
    }

    /// Use `provider` to look up tracker status and resolution.
    #[must_use]
    pub fn with_state_provider(mut self, provider: Arc<dyn IssueStateProvider>) -> Self {
        self.state_provider = Some(provider);
        self
    }

    /// Register the data provider referenced by dynamic patterns as `name`.
    #[must_use]
    pub fn with_data_provider(
        mut self,
        name: impl Into<String>,
        provider: Arc<dyn KnownIssueDataProvider>,
    ) -> Self {
        self.data_providers.insert(name.into(), provider);
        self
    }

    #[must_use]
    pub fn with_fix_policy(mut self, policy: FixPolicy) -> Self {
        self.fix_policy = policy;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &KnownIssueRegistry { &self.registry }

    /// Find the known issue matching a failure `description` raised while
    /// running the test described by `info`.
    ///
    /// Candidates must match the assertion pattern and every dynamic pattern.
    /// A candidate whose story, scenario, step and variable patterns all
    /// match beats one that only partially matches; among equals the one
    /// with more matched patterns wins and ties go to the first key. A
    /// partial match is reported as potentially known.
    #[must_use]
    pub fn known_issue(&self, description: &str, info: &TestInfo) -> Option<KnownIssue> {
        let mut best: Option<((bool, usize), &str, &KnownIssueIdentifier)> = None;
        for (key, identifier) in self.registry.iter() {
            if !identifier.assertion_pattern().matches(description)
                || !self.dynamic_patterns_match(identifier)
            {
                continue;
            }
            let scored = identifier.match_test_info(info);
            let rank = (scored.mismatched == 0, scored.matched);
            if best.is_none_or(|(best_rank, _, _)| rank > best_rank) {
                best = Some((rank, key, identifier));
            }
        }

        let ((fully_matched, _), key, identifier) = best?;
        let state = self.issue_state(key);
        let fixed = state.is_fixed(&self.fix_policy);
        debug!(
            issue = key,
            potentially_known = !fully_matched,
            fixed,
            "assertion failure matched known issue"
        );
        Some(
            KnownIssue::new(key, identifier.issue_type(), !fully_matched)
                .with_state(state)
                .with_fixed(fixed)
                .with_fail_fast(identifier.is_fail_scenario_fast(), identifier.is_fail_story_fast()),
        )
    }

    fn dynamic_patterns_match(&self, identifier: &KnownIssueIdentifier) -> bool {
        identifier.dynamic_patterns().iter().all(|(name, pattern)| {
            self.data_providers
                .get(name)
                .and_then(|provider| provider.data())
                .is_some_and(|data| pattern.matches(&data))
        })
    }

    fn issue_state(&self, key: &str) -> IssueState {
        self.state_provider
            .as_ref()
            .map_or_else(IssueState::default, |provider| IssueState {
                status: provider.issue_status(key),
                resolution: provider.issue_resolution(key),
            })
    }
}

impl std::fmt::Debug for KnownIssueChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut providers: Vec<_> = self.data_providers.keys().collect();
        providers.sort();
        f.debug_struct("KnownIssueChecker")
            .field("identifiers", &self.registry.len())
            .field("state_provider", &self.state_provider.is_some())
            .field("data_providers", &providers)
            .field("fix_policy", &self.fix_policy)
            .finish()
    }
}
