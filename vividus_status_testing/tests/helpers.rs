//! Integration coverage for `vividus_status_testing` helpers.

use std::sync::Arc;

use rstest::rstest;
use vividus_status::{
    EventBus,
    SessionId,
    Status,
    StatusAggregator,
    event::AssertionEvent,
    metrics::{ASSERTIONS_TOTAL, Outcome, inc_assertions},
};
use vividus_status_testing::{
    Level,
    LoggerHandle,
    RecordingListener,
    counter_value,
    failed_event,
    logger,
    record_with,
    soft_error,
};

#[test]
fn recording_listener_keeps_delivery_order() {
    let bus = EventBus::new();
    let listener = Arc::new(RecordingListener::default());
    bus.subscribe(listener.clone());

    for id in 1..=3 {
        bus.publish(&AssertionEvent::Failed(failed_event(SessionId::new(id), false, false)));
    }
    let sessions: Vec<_> = listener
        .failed()
        .iter()
        .map(|event| event.session().as_u64())
        .collect();
    assert_eq!(sessions, vec![1, 2, 3]);
    assert!(listener.passed().is_empty());
}

#[rstest]
#[case(false, false, Status::Failed)]
#[case(true, true, Status::Failed)]
#[case(true, false, Status::KnownIssuesOnly)]
fn soft_errors_classify_like_events(#[case] known: bool, #[case] fixed: bool, #[case] expected: Status) {
    let error = soft_error("boom", known, fixed);
    assert_eq!(error.is_known_issue(), known);
    assert_eq!(Status::from_event(&failed_event(SessionId::new(9), known, fixed)), expected);
}

#[test]
fn counters_are_isolated_per_recorder() {
    let first = record_with(|| inc_assertions(Outcome::Failed));
    let second = record_with(|| {});
    assert_eq!(counter_value(&first, ASSERTIONS_TOTAL, "outcome", "failed"), Some(1));
    assert_eq!(counter_value(&second, ASSERTIONS_TOTAL, "outcome", "failed"), None);
}

#[rstest]
fn logger_captures_library_warnings(mut logger: LoggerHandle) {
    StatusAggregator::new().finalize_status(SessionId::new(77));
    assert!(logger.drain_contains(Level::Warn, "never started"));
    assert!(!logger.drain_contains(Level::Warn, "never started"));
}
