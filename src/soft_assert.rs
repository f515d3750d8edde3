//! Soft assertions.
//!
//! A failed soft assertion does not stop the running step. It is recorded in
//! the session's [`AssertionCollection`], matched against known issues and
//! published as an [`AssertionFailedEvent`]. [`SoftAssert::verify`] later
//! turns the collected failures into a single [`VerificationError`].

mod builder;

use std::{any::type_name, fmt::Debug, sync::Arc};

pub use builder::SoftAssertBuilder;
use tracing::{error, info};

use crate::{
    assertion::{AssertionCollection, AssertionError, Cause, SoftAssertionError, VerificationError},
    event::{AssertionEvent, AssertionFailedEvent, AssertionPassedEvent, EventBus, FailFastEvent},
    formatter::AssertionFormatter,
    known_issue::{KnownIssueChecker, Pattern},
    metrics::Outcome,
    session::Session,
};

const IS_TRUE: &str = "The condition is true";
const IS_FALSE: &str = "The condition is false";
const IS_PRESENT: &str = "The value is present";
const IS_ABSENT: &str = "The value is absent";

/// Records soft assertions for any number of sessions.
///
/// `SoftAssert` holds no per-session state itself; every operation takes the
/// running [`Session`] explicitly.
#[derive(Debug)]
pub struct SoftAssert {
    bus: Arc<EventBus>,
    checker: Option<KnownIssueChecker>,
    formatter: AssertionFormatter,
    fail_scenario_fast: bool,
}

impl SoftAssert {
    #[must_use]
    pub fn builder() -> SoftAssertBuilder { SoftAssertBuilder::default() }

    #[must_use]
    pub fn event_bus(&self) -> &Arc<EventBus> { &self.bus }

    pub fn assert_true(&self, session: &mut Session, description: &str, condition: bool) -> bool {
        self.record_described(session, condition, description, if condition { IS_TRUE } else { IS_FALSE })
    }

    pub fn assert_false(&self, session: &mut Session, description: &str, condition: bool) -> bool {
        self.record_described(session, !condition, description, if condition { IS_TRUE } else { IS_FALSE })
    }

    pub fn assert_equals<T>(&self, session: &mut Session, description: &str, expected: &T, actual: &T) -> bool
    where
        T: PartialEq + Debug + ?Sized,
    {
        self.assert_equality(session, description, true, expected, actual)
    }

    pub fn assert_not_equals<T>(
        &self,
        session: &mut Session,
        description: &str,
        expected: &T,
        actual: &T,
    ) -> bool
    where
        T: PartialEq + Debug + ?Sized,
    {
        self.assert_equality(session, description, false, expected, actual)
    }

    /// Pass when `expected` and `actual` differ by no more than `delta`.
    pub fn assert_equals_within(
        &self,
        session: &mut Session,
        description: &str,
        expected: f64,
        actual: f64,
        delta: f64,
    ) -> bool {
        self.assert_delta(session, description, true, expected, actual, delta)
    }

    /// Pass when `expected` and `actual` differ by more than `delta`.
    pub fn assert_not_equals_within(
        &self,
        session: &mut Session,
        description: &str,
        expected: f64,
        actual: f64,
        delta: f64,
    ) -> bool {
        self.assert_delta(session, description, false, expected, actual, delta)
    }

    pub fn assert_some<T>(&self, session: &mut Session, description: &str, value: Option<&T>) -> bool {
        let present = value.is_some();
        self.record_described(session, present, description, if present { IS_PRESENT } else { IS_ABSENT })
    }

    pub fn assert_none<T>(&self, session: &mut Session, description: &str, value: Option<&T>) -> bool {
        let present = value.is_some();
        self.record_described(session, !present, description, if present { IS_PRESENT } else { IS_ABSENT })
    }

    pub fn record_passed_assertion(&self, session: &mut Session, description: &str) -> bool {
        self.record_assertion(session, true, description)
    }

    pub fn record_failed_assertion(&self, session: &mut Session, description: &str) -> bool {
        self.record_assertion(session, false, description)
    }

    /// Record `error` as a failed assertion described by its message.
    pub fn record_failed_error(&self, session: &mut Session, error: Cause) -> bool {
        let description = error.to_string();
        self.record(session, false, description, Some(error))
    }

    pub fn record_assertion(&self, session: &mut Session, passed: bool, description: &str) -> bool {
        self.record(session, passed, description.to_owned(), None)
    }

    /// Drain the assertions recorded for `session`.
    ///
    /// # Errors
    ///
    /// Returns a [`VerificationError`] carrying every collected failure when
    /// at least one assertion failed.
    pub fn verify(&self, session: &mut Session) -> Result<(), VerificationError> {
        let (assertions, errors) = session.context_mut().update_or_insert_with(
            AssertionCollection::default,
            |collection: &mut AssertionCollection| {
                let drained = (collection.assertions_count(), collection.errors().to_vec());
                collection.clear();
                drained
            },
        );

        if errors.is_empty() {
            info!(
                session = %session.id(),
                "{}",
                self.formatter.passed_verification_message(assertions)
            );
            return Ok(());
        }
        let message = self.formatter.errors_message(&errors, true);
        error!(
            session = %session.id(),
            "{}{message}",
            self.formatter.failed_verification_message(&errors, assertions)
        );
        Err(VerificationError::new(message, errors))
    }

    /// Verify only when some recorded failure message fully matches
    /// `pattern`; otherwise the collected assertions are left untouched.
    ///
    /// # Errors
    ///
    /// Returns the [`VerificationError`] of [`SoftAssert::verify`].
    pub fn verify_matching(&self, session: &mut Session, pattern: &Pattern) -> Result<(), VerificationError> {
        let matched = session
            .context()
            .get::<AssertionCollection>()
            .is_some_and(|collection| {
                collection
                    .errors()
                    .iter()
                    .any(|e| pattern.matches(e.error().message()))
            });
        if matched { self.verify(session) } else { Ok(()) }
    }

    fn assert_equality<T>(
        &self,
        session: &mut Session,
        description: &str,
        equals: bool,
        expected: &T,
        actual: &T,
    ) -> bool
    where
        T: PartialEq + Debug + ?Sized,
    {
        let expected_text = format!("{expected:?}");
        let actual_text = format!("{actual:?}");
        if expected == actual {
            let assertion = expected_actual(&expected_text, &actual_text);
            return self.record_described(session, equals, description, &assertion);
        }
        // Distinct values that render alike get their type name so the
        // message does not read as a contradiction.
        let assertion = if expected_text == actual_text {
            let name = type_name::<T>();
            format!("Expected: {name}<{expected_text}> Actual: {name}<{actual_text}>")
        } else {
            expected_actual(&expected_text, &actual_text)
        };
        self.record_described(session, !equals, description, &assertion)
    }

    fn assert_delta(
        &self,
        session: &mut Session,
        description: &str,
        equals: bool,
        expected: f64,
        actual: f64,
        delta: f64,
    ) -> bool {
        if expected.total_cmp(&actual).is_eq() {
            let assertion = expected_actual(&format!("{expected:?}"), &format!("{actual:?}"));
            return self.record_described(session, equals, description, &assertion);
        }
        let within = (expected - actual).abs() <= delta;
        let assertion = format!(
            "|Expected <{expected:?}> - actual <{actual:?}>| is{} more than delta <{delta:?}>",
            if within { " not" } else { "" }
        );
        self.record_described(session, within == equals, description, &assertion)
    }

    fn record_described(&self, session: &mut Session, passed: bool, description: &str, assertion: &str) -> bool {
        self.record(session, passed, describe(description, assertion), None)
    }

    fn record(&self, session: &mut Session, passed: bool, description: String, cause: Option<Cause>) -> bool {
        let id = session.id();
        if passed {
            info!(session = %id, "Pass: {description}");
            session
                .context_mut()
                .update_or_insert_with(AssertionCollection::default, AssertionCollection::add_passed);
            crate::metrics::inc_assertions(Outcome::Passed);
            self.bus
                .publish(&AssertionEvent::Passed(AssertionPassedEvent { session: id }));
            return true;
        }

        let issue = self
            .checker
            .as_ref()
            .and_then(|checker| checker.known_issue(&description, session.info()));
        let message = issue.as_ref().map_or_else(
            || description.clone(),
            |issue| self.formatter.message(&description, issue),
        );
        error!(session = %id, "Fail: {message}");

        let mut assertion = AssertionError::new(message);
        if let Some(cause) = cause {
            assertion = assertion.with_cause(cause);
        }
        let failure = SoftAssertionError::new(assertion, issue);
        let fail_scenario =
            (self.fail_scenario_fast && !failure.is_known_issue()) || failure.is_fail_scenario_fast();
        let fail_story = failure.is_fail_story_fast();
        crate::metrics::inc_assertions(if failure.is_not_fixed_known_issue() {
            Outcome::KnownIssue
        } else {
            Outcome::Failed
        });

        session.context_mut().update_or_insert_with(
            AssertionCollection::default,
            |collection: &mut AssertionCollection| collection.add_failed(failure.clone()),
        );
        self.bus
            .publish(&AssertionEvent::Failed(AssertionFailedEvent::new(id, failure)));
        if fail_scenario || fail_story {
            self.bus.publish(&AssertionEvent::FailFast(FailFastEvent {
                session: id,
                fail_scenario,
                fail_story,
            }));
        }
        false
    }
}

fn expected_actual(expected: &str, actual: &str) -> String {
    format!("Expected: <{expected}> Actual: <{actual}>")
}

/// Join a user description with the generated assertion text.
fn describe(description: &str, assertion: &str) -> String {
    match (description.is_empty(), assertion.is_empty()) {
        (_, true) => description.to_owned(),
        (true, false) => assertion.to_owned(),
        (false, false) => format!("{description} [{assertion}]"),
    }
}
