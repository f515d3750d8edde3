//! Story lifecycle callbacks.
//!
//! The runner drives a [`StoryReporter`] through the life of every story it
//! executes. Each callback names the session it belongs to, so one reporter
//! instance serves every concurrently running session.

use std::sync::Arc;

use crate::{assertion::StepFailure, session::SessionId};

/// A story about to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Story {
    pub path: String,
    /// `true` when the story runs as a precondition of another story.
    pub given: bool,
}

impl Story {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            given: false,
        }
    }

    #[must_use]
    pub fn given(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            given: true,
        }
    }
}

/// A scenario about to run, with the steps it declares.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scenario {
    pub title: String,
    pub steps: Vec<String>,
}

impl Scenario {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }
}

/// Receives story, scenario and step lifecycle notifications.
///
/// Every method has an empty default. Step outcome callbacks (`successful`,
/// `ignorable`, `comment`, `pending`, `not_performed` and `failed`) are
/// invoked once per step after [`StoryReporter::before_step`].
pub trait StoryReporter: Send + Sync {
    fn before_story(&self, _session: SessionId, _story: &Story) {}

    fn after_story(&self, _session: SessionId, _story: &Story) {}

    fn before_scenario(&self, _session: SessionId, _scenario: &Scenario) {}

    fn after_scenario(&self, _session: SessionId) {}

    fn before_step(&self, _session: SessionId, _step: &str) {}

    fn successful(&self, _session: SessionId, _step: &str) {}

    fn ignorable(&self, _session: SessionId, _step: &str) {}

    /// A commented-out step. No [`StoryReporter::before_step`] precedes it.
    fn comment(&self, _session: SessionId, _step: &str) {}

    fn pending(&self, _session: SessionId, _step: &str) {}

    fn not_performed(&self, _session: SessionId, _step: &str) {}

    fn failed(&self, _session: SessionId, _step: &str, _failure: &StepFailure) {}
}

/// Forwards every callback to each reporter in registration order.
#[derive(Clone, Default)]
pub struct ReporterChain {
    reporters: Vec<Arc<dyn StoryReporter>>,
}

impl ReporterChain {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn StoryReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize { self.reporters.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.reporters.is_empty() }

    fn each(&self, mut f: impl FnMut(&dyn StoryReporter)) {
        for reporter in &self.reporters {
            f(reporter.as_ref());
        }
    }
}

impl std::fmt::Debug for ReporterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterChain")
            .field("reporters", &self.reporters.len())
            .finish()
    }
}

impl StoryReporter for ReporterChain {
    fn before_story(&self, session: SessionId, story: &Story) {
        self.each(|r| r.before_story(session, story));
    }

    fn after_story(&self, session: SessionId, story: &Story) {
        self.each(|r| r.after_story(session, story));
    }

    fn before_scenario(&self, session: SessionId, scenario: &Scenario) {
        self.each(|r| r.before_scenario(session, scenario));
    }

    fn after_scenario(&self, session: SessionId) { self.each(|r| r.after_scenario(session)); }

    fn before_step(&self, session: SessionId, step: &str) {
        self.each(|r| r.before_step(session, step));
    }

    fn successful(&self, session: SessionId, step: &str) {
        self.each(|r| r.successful(session, step));
    }

    fn ignorable(&self, session: SessionId, step: &str) {
        self.each(|r| r.ignorable(session, step));
    }

    fn comment(&self, session: SessionId, step: &str) { self.each(|r| r.comment(session, step)); }

    fn pending(&self, session: SessionId, step: &str) { self.each(|r| r.pending(session, step)); }

    fn not_performed(&self, session: SessionId, step: &str) {
        self.each(|r| r.not_performed(session, step));
    }

    fn failed(&self, session: SessionId, step: &str, failure: &StepFailure) {
        self.each(|r| r.failed(session, step, failure));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{ReporterChain, Scenario, Story, StoryReporter};
    use crate::session::SessionId;

    #[derive(Default)]
    struct Journal {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl StoryReporter for Journal {
        fn before_scenario(&self, _session: SessionId, scenario: &Scenario) {
            self.log
                .lock()
                .expect("journal lock")
                .push(format!("{}:{}", self.name, scenario.title));
        }
    }

    #[test]
    fn chain_preserves_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = ReporterChain::new()
            .with_reporter(Arc::new(Journal {
                name: "first",
                log: log.clone(),
            }))
            .with_reporter(Arc::new(Journal {
                name: "second",
                log: log.clone(),
            }));
        chain.before_story(SessionId::new(1), &Story::new("a.story"));
        chain.before_scenario(SessionId::new(1), &Scenario::new("Login"));
        assert_eq!(
            *log.lock().expect("journal lock"),
            vec!["first:Login", "second:Login"]
        );
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn scenario_builder_collects_steps() {
        let scenario = Scenario::new("Search")
            .with_step("Given I open the page")
            .with_step("Then the title is shown");
        assert_eq!(scenario.steps.len(), 2);
        assert!(Story::given("pre.story").given);
    }
}
