//! Public API for the `vividus_status` library.
//!
//! This crate classifies the outcome of BDD test runs. Failed soft assertions
//! are matched against known issues, published as session-tagged events and
//! folded into one worst-observed [`Status`] per running scenario, ready for
//! reporting.

pub mod aggregator;
pub mod assertion;
pub mod config;
pub mod event;
pub mod formatter;
pub mod known_issue;
pub mod metrics;
pub mod prelude;
pub mod reporter;
pub mod session;
pub mod soft_assert;
pub mod statistics;
pub mod status;
pub mod status_priority;
pub mod test_context;

pub use aggregator::{ScenarioScope, StatusAggregator, StatusCell};
pub use assertion::{AssertionError, SoftAssertionError, StepFailure, VerificationError};
pub use event::{AssertionFailedEvent, AssertionListener, EventBus};
pub use known_issue::{KnownIssue, KnownIssueChecker, KnownIssueError, KnownIssueRegistry};
pub use session::{Session, SessionId, TestInfo};
pub use status::{ParseStatusError, Status};
pub use status_priority::{ReportStatus, StatusPriority};
