#![cfg(not(loom))]
//! Tests for per-session status aggregation driven through the event bus.
//!
//! Sessions run on separate threads and tasks while sharing one bus and one
//! aggregator; each must finish with its own worst status.

use std::{
    sync::{Arc, Mutex},
    thread,
};

use rstest::{fixture, rstest};
use serial_test::serial;
use vividus_status::{
    EventBus,
    Session,
    SessionId,
    Status,
    StatusAggregator,
    soft_assert::SoftAssert,
};
use vividus_status_testing::{Level, LoggerHandle, logger};

struct Run {
    aggregator: Arc<StatusAggregator>,
    soft_assert: Arc<SoftAssert>,
}

fn wire() -> Run {
    let bus = Arc::new(EventBus::new());
    let aggregator = Arc::new(StatusAggregator::new());
    bus.subscribe(aggregator.clone());
    let soft_assert = Arc::new(SoftAssert::builder().event_bus(bus).build());
    Run {
        aggregator,
        soft_assert,
    }
}

#[fixture]
fn run() -> Run { wire() }

/// Passing sessions assert equal values; the others compare 1 with 2.
fn run_scenario(run: &Run, id: u64, failing: bool) -> (SessionId, Status) {
    let mut session = Session::new(SessionId::new(id));
    let scope = run.aggregator.begin(session.id());
    scope.record(Status::Passed);
    let actual = if failing { 2 } else { 1 };
    run.soft_assert
        .assert_equals(&mut session, "Counter", &1, &actual);
    (session.id(), scope.finish())
}

#[rstest]
fn threads_keep_their_own_status(run: Run) {
    let run = Arc::new(run);
    let handles: Vec<_> = (0..8_u64)
        .map(|id| {
            let run = run.clone();
            thread::spawn(move || run_scenario(&run, id, id % 2 == 0))
        })
        .collect();

    for handle in handles {
        let (session, status) = handle.join().expect("scenario thread panicked");
        let expected = if session.as_u64() % 2 == 0 {
            Status::Failed
        } else {
            Status::Passed
        };
        assert_eq!(status, expected, "session {session}");
    }
    assert_eq!(run.aggregator.active_sessions(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tasks_keep_their_own_status() {
    let run = Arc::new(wire());
    let tasks: Vec<_> = (100..116_u64)
        .map(|id| {
            let run = run.clone();
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                run_scenario(&run, id, id % 3 == 0)
            })
        })
        .collect();

    for result in futures::future::join_all(tasks).await {
        let (session, status) = result.expect("scenario task panicked");
        let failing = session.as_u64() % 3 == 0;
        assert_eq!(status == Status::Failed, failing, "session {session}");
    }
}

#[test]
fn finalised_statuses_reach_the_hook() {
    let finalised = Arc::new(Mutex::new(Vec::new()));
    let sink = finalised.clone();
    let aggregator = StatusAggregator::new().with_on_finalized(move |session, status| {
        sink.lock().expect("hook lock").push((session, status));
    });

    let first = SessionId::new(1);
    let scope = aggregator.begin(first);
    scope.record(Status::Skipped);
    scope.record(Status::Passed);
    assert_eq!(scope.finish(), Status::Skipped);

    let second = SessionId::new(2);
    assert_eq!(aggregator.begin(second).finish(), Status::NotCovered);

    assert_eq!(
        *finalised.lock().expect("hook lock"),
        vec![(first, Status::Skipped), (second, Status::NotCovered)]
    );
}

#[rstest]
#[serial]
fn finalising_unknown_session_warns(mut logger: LoggerHandle) {
    let aggregator = StatusAggregator::new();
    assert_eq!(aggregator.finalize_status(SessionId::new(404)), Status::NotCovered);
    assert!(
        logger.drain_contains(Level::Warn, "never started"),
        "missing warning for unknown session"
    );
}

#[rstest]
#[serial]
fn aborted_scope_warns_and_finalises(mut logger: LoggerHandle) {
    let aggregator = StatusAggregator::new();
    let session = SessionId::new(7);
    {
        let scope = aggregator.begin(session);
        scope.record(Status::Broken);
    }
    assert_eq!(aggregator.current_status(session), None);
    assert!(
        logger.drain_contains(Level::Warn, "aborted"),
        "missing warning for aborted scenario"
    );
}

#[rstest]
#[serial]
fn reset_over_unfinished_scenario_warns(mut logger: LoggerHandle) {
    let aggregator = StatusAggregator::new();
    let session = SessionId::new(8);
    aggregator.reset_state(session);
    aggregator.record(session, Status::Failed);
    aggregator.reset_state(session);
    assert_eq!(aggregator.current_status(session), Some(Status::NotCovered));
    assert!(logger.drain_contains(Level::Warn, "never finalised"));
}
