//! Running test sessions.
//!
//! A session is one independently executing unit of work, such as a story
//! run on a worker thread. Scenarios inside a session run sequentially, while
//! sessions run concurrently. Every piece of per-session state is keyed by
//! [`SessionId`] or carried explicitly in a [`Session`], never looked up by
//! thread identity.

use std::{
    collections::BTreeMap,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::test_context::TestContext;

/// Identifier assigned to a running session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl From<u64> for SessionId {
    fn from(value: u64) -> Self { Self(value) }
}

impl SessionId {
    /// Create a new [`SessionId`] with the provided value.
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Allocate a process-unique identifier.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Return the inner `u64` representation.
    #[must_use]
    pub fn as_u64(&self) -> u64 { self.0 }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "SessionId({})", self.0) }
}

/// Names of the story, scenario and step currently running, plus the
/// scenario variables in scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestInfo {
    story: Option<String>,
    scenario: Option<String>,
    step: Option<String>,
    variables: BTreeMap<String, String>,
}

impl TestInfo {
    #[must_use]
    pub fn with_story(mut self, story: impl Into<String>) -> Self {
        self.story = Some(story.into());
        self
    }

    #[must_use]
    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn story(&self) -> Option<&str> { self.story.as_deref() }

    #[must_use]
    pub fn scenario(&self) -> Option<&str> { self.scenario.as_deref() }

    #[must_use]
    pub fn step(&self) -> Option<&str> { self.step.as_deref() }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn set_story(&mut self, story: Option<String>) { self.story = story; }

    /// Enter a new scenario; the previous step and variables are dropped.
    pub fn set_scenario(&mut self, scenario: Option<String>) {
        self.scenario = scenario;
        self.step = None;
        self.variables.clear();
    }

    pub fn set_step(&mut self, step: Option<String>) { self.step = step; }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }
}

/// Explicit per-session state carried through the scenario call chain.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    info: TestInfo,
    context: TestContext,
}

impl Session {
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            info: TestInfo::default(),
            context: TestContext::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId { self.id }

    #[must_use]
    pub fn info(&self) -> &TestInfo { &self.info }

    pub fn info_mut(&mut self) -> &mut TestInfo { &mut self.info }

    #[must_use]
    pub fn context(&self) -> &TestContext { &self.context }

    pub fn context_mut(&mut self) -> &mut TestContext { &mut self.context }
}

impl Default for Session {
    fn default() -> Self { Self::new(SessionId::next()) }
}
