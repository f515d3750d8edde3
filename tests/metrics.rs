#![cfg(all(not(loom), feature = "metrics"))]
//! Tests for `vividus_status` metrics helpers.
//!
//! Counters are read back from a thread-local
//! `metrics_util::debugging::DebuggingRecorder`.

use std::sync::Arc;

use rstest::rstest;
use vividus_status::{
    EventBus,
    Session,
    SessionId,
    Status,
    StatusAggregator,
    known_issue::{KnownIssueChecker, KnownIssueRegistry},
    metrics::{ASSERTIONS_TOTAL, Outcome, SCENARIOS_TOTAL, inc_assertions, inc_scenarios},
    soft_assert::SoftAssert,
};
use vividus_status_testing::{counter_value, record_with};

#[rstest]
#[case(Outcome::Passed, "passed")]
#[case(Outcome::Failed, "failed")]
#[case(Outcome::KnownIssue, "known_issue")]
fn assertion_counter_is_labelled_by_outcome(#[case] outcome: Outcome, #[case] label: &str) {
    let snapshotter = record_with(|| inc_assertions(outcome));
    assert_eq!(counter_value(&snapshotter, ASSERTIONS_TOTAL, "outcome", label), Some(1));
}

#[test]
fn scenario_counter_is_labelled_by_status() {
    let snapshotter = record_with(|| {
        inc_scenarios(Status::KnownIssuesOnly);
        inc_scenarios(Status::KnownIssuesOnly);
        inc_scenarios(Status::Broken);
    });
    assert_eq!(
        counter_value(&snapshotter, SCENARIOS_TOTAL, "status", "KNOWN_ISSUES_ONLY"),
        Some(2)
    );
    assert_eq!(counter_value(&snapshotter, SCENARIOS_TOTAL, "status", "BROKEN"), Some(1));
    assert_eq!(counter_value(&snapshotter, SCENARIOS_TOTAL, "status", "PASSED"), None);
}

#[test]
fn scenario_run_updates_both_counters() {
    let registry = KnownIssueRegistry::from_json(
        r#"{"VVD-5": {"type": "EXTERNAL", "assertionPattern": "Slow.*"}}"#,
        "inline",
        &std::collections::BTreeMap::new(),
    )
    .expect("registry parses");
    let bus = Arc::new(EventBus::new());
    let aggregator = Arc::new(StatusAggregator::new());
    bus.subscribe(aggregator.clone());
    let soft_assert = SoftAssert::builder()
        .event_bus(bus)
        .known_issue_checker(KnownIssueChecker::new(Arc::new(registry)))
        .build();

    let snapshotter = record_with(|| {
        let mut session = Session::new(SessionId::new(1));
        let scope = aggregator.begin(session.id());
        soft_assert.assert_true(&mut session, "Page loaded", true);
        soft_assert.record_failed_assertion(&mut session, "Slow response");
        scope.finish();
    });

    assert_eq!(counter_value(&snapshotter, ASSERTIONS_TOTAL, "outcome", "passed"), Some(1));
    assert_eq!(
        counter_value(&snapshotter, ASSERTIONS_TOTAL, "outcome", "known_issue"),
        Some(1)
    );
    assert_eq!(
        counter_value(&snapshotter, SCENARIOS_TOTAL, "status", "KNOWN_ISSUES_ONLY"),
        Some(1)
    );
}
