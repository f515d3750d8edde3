//! Test utilities for `vividus_status`.
//!
//! Provides a serialised log capture fixture, builders for assertion events,
//! a recording listener, and helpers for reading counters from a debugging
//! metrics recorder.
//!
//! ```rust
//! use vividus_status::{SessionId, Status};
//! use vividus_status_testing::failed_event;
//!
//! let event = failed_event(SessionId::new(1), true, false);
//! assert_eq!(Status::from_event(&event), Status::KnownIssuesOnly);
//! ```

pub mod counters;
pub mod events;
pub mod logging;

pub use counters::{counter_value, record_with};
pub use events::{RecordingListener, failed_event, soft_error};
pub use logging::{Level, LoggerHandle, logger};
