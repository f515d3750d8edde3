//! Builder for configuring [`SoftAssert`].

use std::sync::Arc;

use super::SoftAssert;
use crate::{
    config::SoftAssertConfig,
    event::EventBus,
    formatter::AssertionFormatter,
    known_issue::KnownIssueChecker,
};

/// Builder for [`SoftAssert`].
///
/// Without an explicit bus the recorder publishes to a private [`EventBus`]
/// nobody listens to. Without a checker no failure is ever matched to a
/// known issue.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use vividus_status::{event::EventBus, session::Session, soft_assert::SoftAssert};
///
/// let bus = Arc::new(EventBus::new());
/// let soft_assert = SoftAssert::builder().event_bus(bus).build();
/// let mut session = Session::default();
/// assert!(soft_assert.assert_true(&mut session, "Flag is set", true));
/// assert!(soft_assert.verify(&mut session).is_ok());
/// ```
#[derive(Debug, Default)]
pub struct SoftAssertBuilder {
    event_bus: Option<Arc<EventBus>>,
    checker: Option<KnownIssueChecker>,
    formatter: AssertionFormatter,
    fail_scenario_fast: bool,
}

impl SoftAssertBuilder {
    /// Publish assertion events on `bus`.
    #[must_use]
    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Match failures against known issues with `checker`.
    #[must_use]
    pub fn known_issue_checker(mut self, checker: KnownIssueChecker) -> Self {
        self.checker = Some(checker);
        self
    }

    #[must_use]
    pub fn formatter(mut self, formatter: AssertionFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Request the scenario to stop on the first failure that is not a known
    /// issue.
    #[must_use]
    pub fn fail_scenario_fast(mut self, enabled: bool) -> Self {
        self.fail_scenario_fast = enabled;
        self
    }

    /// Apply the recorder settings from `config`.
    #[must_use]
    pub fn config(self, config: &SoftAssertConfig) -> Self {
        self.fail_scenario_fast(config.fail_scenario_fast)
    }

    #[must_use]
    pub fn build(self) -> SoftAssert {
        SoftAssert {
            bus: self.event_bus.unwrap_or_default(),
            checker: self.checker,
            formatter: self.formatter,
            fail_scenario_fast: self.fail_scenario_fast,
        }
    }
}
