//! Optional convenience imports for wiring a test run.
//!
//! Only the types most runners touch are re-exported here. Prefer importing
//! specialised APIs directly from their owning modules.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use vividus_status::prelude::*;
//!
//! let bus = Arc::new(EventBus::new());
//! let aggregator = Arc::new(StatusAggregator::new());
//! bus.subscribe(aggregator.clone());
//!
//! let soft_assert = SoftAssert::builder().event_bus(bus).build();
//! let mut session = Session::default();
//! let scope = aggregator.begin(session.id());
//! soft_assert.assert_equals(&mut session, "Answer", &42, &41);
//! assert_eq!(scope.finish(), Status::Failed);
//! ```

pub use crate::{
    aggregator::StatusAggregator,
    assertion::{SoftAssertionError, StepFailure},
    config::SoftAssertConfig,
    event::{AssertionListener, EventBus},
    known_issue::{KnownIssue, KnownIssueChecker, KnownIssueRegistry},
    reporter::{ReporterChain, StoryReporter},
    session::{Session, SessionId},
    soft_assert::SoftAssert,
    status::Status,
};
