//! Assertion failure values.
//!
//! A failed check is captured at the assertion boundary as a tagged
//! [`StepFailure`] instead of being reconstructed later from an error type.
//! [`SoftAssertionError`] annotates a single failure with the known issue it
//! was matched to, and [`VerificationError`] aggregates every soft failure
//! collected during a scenario.

use std::{error::Error, fmt, sync::Arc};

use crate::known_issue::KnownIssue;

/// Shared, type-erased cause of an assertion failure.
pub type Cause = Arc<dyn Error + Send + Sync>;

/// A failed assertion.
#[derive(Clone, Debug)]
pub struct AssertionError {
    message: String,
    cause: Option<Cause>,
}

impl AssertionError {
    /// Create an assertion error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the error that caused the assertion to fail.
    #[must_use]
    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    #[must_use]
    pub fn message(&self) -> &str { &self.message }

    #[must_use]
    pub fn cause(&self) -> Option<&Cause> { self.cause.as_ref() }
}

impl fmt::Display for AssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.message) }
}

impl Error for AssertionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

/// An assertion failure recorded without aborting the scenario.
#[derive(Clone, Debug)]
pub struct SoftAssertionError {
    error: AssertionError,
    known_issue: Option<KnownIssue>,
}

impl SoftAssertionError {
    #[must_use]
    pub fn new(error: AssertionError, known_issue: Option<KnownIssue>) -> Self {
        Self { error, known_issue }
    }

    #[must_use]
    pub fn error(&self) -> &AssertionError { &self.error }

    #[must_use]
    pub fn known_issue(&self) -> Option<&KnownIssue> { self.known_issue.as_ref() }

    /// Returns `true` when the failure matched a known issue.
    #[must_use]
    pub fn is_known_issue(&self) -> bool { self.known_issue.is_some() }

    /// Returns `true` when the failure matched a known issue that is not
    /// fixed yet.
    #[must_use]
    pub fn is_not_fixed_known_issue(&self) -> bool {
        self.known_issue.as_ref().is_some_and(|issue| !issue.is_fixed())
    }

    /// Returns `true` when the matched issue requires the scenario to stop.
    #[must_use]
    pub fn is_fail_scenario_fast(&self) -> bool {
        self.known_issue
            .as_ref()
            .is_some_and(KnownIssue::is_fail_scenario_fast)
    }

    /// Returns `true` when the matched issue requires the story to stop.
    #[must_use]
    pub fn is_fail_story_fast(&self) -> bool {
        self.known_issue
            .as_ref()
            .is_some_and(KnownIssue::is_fail_story_fast)
    }
}

impl fmt::Display for SoftAssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.error.fmt(f) }
}

impl Error for SoftAssertionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> { Some(&self.error) }
}

/// Raised when a scenario's collected soft assertions are verified and at
/// least one of them failed.
#[derive(Clone, Debug)]
pub struct VerificationError {
    message: String,
    errors: Vec<SoftAssertionError>,
}

impl VerificationError {
    #[must_use]
    pub fn new(message: impl Into<String>, errors: Vec<SoftAssertionError>) -> Self {
        Self {
            message: message.into(),
            errors,
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[SoftAssertionError] { &self.errors }

    /// Known issues matched by the collected failures.
    pub fn known_issues(&self) -> impl Iterator<Item = &KnownIssue> {
        self.errors.iter().filter_map(SoftAssertionError::known_issue)
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.message) }
}

impl Error for VerificationError {}

/// Tagged outcome of a failed step.
#[derive(Clone, Debug)]
pub enum StepFailure {
    /// A hard assertion failed.
    Assertion(AssertionError),
    /// Collected soft assertions failed verification.
    Verification(VerificationError),
    /// Any other error raised while running the step.
    Error(Cause),
}

impl StepFailure {
    /// Tag an arbitrary error.
    ///
    /// The error and its `source()` chain are searched once for an assertion
    /// type, so wrapping an assertion failure in another error does not
    /// change its classification.
    #[must_use]
    pub fn classify(error: Cause) -> StepFailure {
        let mut current: Option<&(dyn Error + 'static)> = Some(&*error);
        while let Some(candidate) = current {
            if let Some(verification) = candidate.downcast_ref::<VerificationError>() {
                return StepFailure::Verification(verification.clone());
            }
            if let Some(assertion) = candidate.downcast_ref::<AssertionError>() {
                return StepFailure::Assertion(assertion.clone());
            }
            if let Some(soft) = candidate.downcast_ref::<SoftAssertionError>() {
                return StepFailure::Assertion(soft.error().clone());
            }
            current = candidate.source();
        }
        StepFailure::Error(error)
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepFailure::Assertion(error) => write!(f, "assertion failed: {error}"),
            StepFailure::Verification(error) => write!(f, "verification failed: {error}"),
            StepFailure::Error(error) => write!(f, "step error: {error}"),
        }
    }
}

impl From<AssertionError> for StepFailure {
    fn from(error: AssertionError) -> Self { StepFailure::Assertion(error) }
}

impl From<VerificationError> for StepFailure {
    fn from(error: VerificationError) -> Self { StepFailure::Verification(error) }
}

/// Soft assertions recorded for the running scenario.
#[derive(Debug, Default)]
pub struct AssertionCollection {
    passed: usize,
    errors: Vec<SoftAssertionError>,
}

impl AssertionCollection {
    pub fn add_passed(&mut self) { self.passed += 1; }

    pub fn add_failed(&mut self, error: SoftAssertionError) { self.errors.push(error); }

    #[must_use]
    pub fn errors(&self) -> &[SoftAssertionError] { &self.errors }

    /// Total number of recorded assertions.
    #[must_use]
    pub fn assertions_count(&self) -> usize { self.passed + self.errors.len() }

    pub fn clear(&mut self) {
        self.passed = 0;
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error, fmt, sync::Arc};

    use super::{AssertionError, SoftAssertionError, StepFailure, VerificationError};
    use crate::known_issue::{KnownIssue, KnownIssueType};

    #[derive(Debug)]
    struct Wrapper(Box<dyn Error + Send + Sync>);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("step wrapper") }
    }

    impl Error for Wrapper {
        fn source(&self) -> Option<&(dyn Error + 'static)> { Some(self.0.as_ref()) }
    }

    fn issue(fixed: bool) -> KnownIssue {
        KnownIssue::new("VVD-7", KnownIssueType::Automation, false).with_fixed(fixed)
    }

    #[test]
    fn known_issue_predicates() {
        let plain = SoftAssertionError::new(AssertionError::new("a"), None);
        assert!(!plain.is_known_issue());
        assert!(!plain.is_not_fixed_known_issue());

        let open = SoftAssertionError::new(AssertionError::new("b"), Some(issue(false)));
        assert!(open.is_known_issue());
        assert!(open.is_not_fixed_known_issue());

        let fixed = SoftAssertionError::new(AssertionError::new("c"), Some(issue(true)));
        assert!(fixed.is_known_issue());
        assert!(!fixed.is_not_fixed_known_issue());
    }

    #[test]
    fn classify_unwraps_nested_assertion() {
        let wrapped = Wrapper(Box::new(Wrapper(Box::new(AssertionError::new("deep")))));
        match StepFailure::classify(Arc::new(wrapped)) {
            StepFailure::Assertion(error) => assert_eq!(error.message(), "deep"),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn classify_prefers_verification_error() {
        let verification = VerificationError::new("2 failures", Vec::new());
        let wrapped = Wrapper(Box::new(verification));
        assert!(matches!(
            StepFailure::classify(Arc::new(wrapped)),
            StepFailure::Verification(_)
        ));
    }

    #[test]
    fn classify_keeps_foreign_errors() {
        let failure = StepFailure::classify(Arc::new(std::io::Error::other("timeout")));
        assert!(matches!(failure, StepFailure::Error(_)));
        assert_eq!(failure.to_string(), "step error: timeout");
    }

    #[test]
    fn assertion_cause_is_exposed_as_source() {
        let error =
            AssertionError::new("outer").with_cause(Arc::new(std::io::Error::other("inner")));
        let source = error.source().expect("cause should be the source");
        assert_eq!(source.to_string(), "inner");
    }

    #[test]
    fn verification_lists_known_issues() {
        let error = VerificationError::new(
            "failed",
            vec![
                SoftAssertionError::new(AssertionError::new("a"), Some(issue(false))),
                SoftAssertionError::new(AssertionError::new("b"), None),
            ],
        );
        let ids: Vec<_> = error.known_issues().map(KnownIssue::identifier).collect();
        assert_eq!(ids, vec!["VVD-7"]);
    }
}
