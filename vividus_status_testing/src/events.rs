//! Builders for assertion failures and a listener that records what it
//! receives.

use std::sync::{Mutex, PoisonError};

use vividus_status::{
    AssertionFailedEvent,
    AssertionListener,
    SessionId,
    SoftAssertionError,
    assertion::AssertionError,
    event::{AssertionPassedEvent, FailFastEvent},
    known_issue::{KnownIssue, KnownIssueType},
};

/// A failed soft assertion, matched to a known issue when `known` is set.
#[must_use]
pub fn soft_error(message: &str, known: bool, fixed: bool) -> SoftAssertionError {
    let issue = known
        .then(|| KnownIssue::new("VVD-1", KnownIssueType::External, false).with_fixed(fixed));
    SoftAssertionError::new(AssertionError::new(message), issue)
}

/// A failure event raised by `session`.
#[must_use]
pub fn failed_event(session: SessionId, known: bool, fixed: bool) -> AssertionFailedEvent {
    AssertionFailedEvent::new(session, soft_error("assertion failed", known, fixed))
}

/// Listener keeping every event it is handed, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingListener {
    failed: Mutex<Vec<AssertionFailedEvent>>,
    passed: Mutex<Vec<AssertionPassedEvent>>,
    fail_fast: Mutex<Vec<FailFastEvent>>,
}

impl RecordingListener {
    #[must_use]
    pub fn failed(&self) -> Vec<AssertionFailedEvent> {
        self.failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn passed(&self) -> Vec<AssertionPassedEvent> {
        self.passed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn fail_fast(&self) -> Vec<FailFastEvent> {
        self.fail_fast
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AssertionListener for RecordingListener {
    fn on_assertion_failed(&self, event: &AssertionFailedEvent) {
        self.failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn on_assertion_passed(&self, event: &AssertionPassedEvent) {
        self.passed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*event);
    }

    fn on_fail_fast(&self, event: &FailFastEvent) {
        self.fail_fast
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*event);
    }
}
