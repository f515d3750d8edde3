#![cfg(all(feature = "advanced-tests", not(loom)))]
//! Property tests for status ordering.
//!
//! Folding any sequence of observations must yield its most severe member,
//! regardless of order, and the report projection must never let a less
//! severe status overwrite a more severe one.

use proptest::prelude::*;
use rstest::rstest;
use vividus_status::{SessionId, Status, StatusAggregator, StatusPriority};

fn status() -> impl Strategy<Value = Status> { prop::sample::select(Status::ALL.to_vec()) }

proptest! {
    #[test]
    fn worse_of_is_a_semilattice(a in status(), b in status(), c in status()) {
        prop_assert_eq!(Status::worse_of(a, b), Status::worse_of(b, a));
        prop_assert_eq!(
            Status::worse_of(Status::worse_of(a, b), c),
            Status::worse_of(a, Status::worse_of(b, c))
        );
        prop_assert_eq!(Status::worse_of(a, a), a);
        prop_assert_eq!(Status::worse_of(a, Status::lowest()), a);
    }

    #[test]
    fn aggregation_keeps_the_most_severe(observed in prop::collection::vec(status(), 0..32)) {
        let aggregator = StatusAggregator::new();
        let session = SessionId::new(1);
        aggregator.reset_state(session);
        for status in &observed {
            aggregator.record(session, *status);
        }
        let expected = observed.iter().copied().min().unwrap_or(Status::NotCovered);
        prop_assert_eq!(aggregator.finalize_status(session), expected);
    }

    #[test]
    fn order_of_observations_is_irrelevant(
        observed in prop::collection::vec(status(), 1..16).prop_shuffle()
    ) {
        let mut reversed = observed.clone();
        reversed.reverse();
        let fold = |items: &[Status]| items.iter().copied().fold(Status::lowest(), Status::worse_of);
        prop_assert_eq!(fold(&observed), fold(&reversed));
    }

    #[test]
    fn report_updates_follow_priority(current in status(), incoming in status()) {
        let current = StatusPriority::from(current).report_status();
        let incoming = StatusPriority::from(incoming).report_status();
        if StatusPriority::is_update_needed(current, incoming) {
            prop_assert!(!StatusPriority::is_update_needed(incoming, current));
        }
    }
}

#[rstest]
#[case::known_issue_does_not_hide_failure(Status::Failed, Status::KnownIssuesOnly, Status::Failed)]
#[case::broken_wins(Status::KnownIssuesOnly, Status::Broken, Status::Broken)]
#[case::pending_beats_skipped(Status::Skipped, Status::Pending, Status::Pending)]
fn pairs_resolve_to_the_worse(#[case] a: Status, #[case] b: Status, #[case] expected: Status) {
    assert_eq!(a.worse(b), expected);
    assert_eq!(b.worse(a), expected);
}
