//! Human-readable messages for soft assertion results.

use std::fmt::Write as _;

use crate::{assertion::SoftAssertionError, known_issue::KnownIssue};

/// Builds the messages logged for failures and verification summaries.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssertionFormatter;

impl AssertionFormatter {
    /// Prefix a failure description with the known issue it matched.
    #[must_use]
    pub fn message(&self, description: &str, issue: &KnownIssue) -> String {
        let mut message = String::new();
        if issue.is_potentially_known() {
            message.push_str("Potentially known issue: ");
        } else {
            message.push_str("Known issue: ");
        }
        write!(message, "{} (Type: {}", issue.identifier(), issue.issue_type()).ok();
        if let Some(status) = issue.status() {
            write!(message, ", Status: {status}").ok();
        }
        if let Some(resolution) = issue.resolution() {
            write!(message, ", Resolution: {resolution}").ok();
        }
        write!(message, "). {description}").ok();
        message
    }

    /// Summary logged when verification finds no failures.
    #[must_use]
    pub fn passed_verification_message(&self, assertions: usize) -> String {
        format!("Verification passed: {assertions} of {assertions} assertions passed")
    }

    /// Summary logged when verification finds failures.
    #[must_use]
    pub fn failed_verification_message(
        &self,
        errors: &[SoftAssertionError],
        assertions: usize,
    ) -> String {
        let known = errors.iter().filter(|e| e.is_known_issue()).count();
        format!(
            "Verification failed: {failed} of {assertions} assertions failed, {known} of them \
             known issues",
            failed = errors.len()
        )
    }

    /// Numbered list of failure messages, one per line.
    ///
    /// When `with_known_issues` is `false` failures matched to a known issue
    /// are left out.
    #[must_use]
    pub fn errors_message(&self, errors: &[SoftAssertionError], with_known_issues: bool) -> String {
        errors
            .iter()
            .filter(|e| with_known_issues || !e.is_known_issue())
            .enumerate()
            .fold(String::new(), |mut out, (index, error)| {
                write!(out, "\n {}) {}", index + 1, error.error().message()).ok();
                out
            })
    }
}
