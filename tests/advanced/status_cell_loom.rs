#![cfg(all(feature = "advanced-tests", loom))]
//! Concurrency tests for `StatusCell` using loom.
//!
//! Concurrent downgrades must never lose the most severe status, whatever
//! the interleaving.

use loom::{model, sync::Arc, thread};
use vividus_status::{Status, StatusCell};

#[test]
fn concurrent_downgrades_keep_the_worst() {
    model(|| {
        let cell = Arc::new(StatusCell::new(Status::Passed));
        let c1 = cell.clone();
        let c2 = cell.clone();

        let t1 = thread::spawn(move || c1.downgrade(Status::KnownIssuesOnly));
        let t2 = thread::spawn(move || c2.downgrade(Status::Failed));

        let first = t1.join().expect("first downgrade thread panicked");
        let second = t2.join().expect("second downgrade thread panicked");

        assert_eq!(second, Status::Failed);
        assert!(matches!(first, Status::KnownIssuesOnly | Status::Failed));
        assert_eq!(cell.load(), Status::Failed);
    });
}

#[test]
fn milder_status_never_overwrites() {
    model(|| {
        let cell = Arc::new(StatusCell::new(Status::NotCovered));
        let c1 = cell.clone();
        let c2 = cell.clone();

        let t1 = thread::spawn(move || {
            c1.downgrade(Status::Broken);
        });
        let t2 = thread::spawn(move || {
            c2.downgrade(Status::Passed);
        });

        t1.join().expect("broken thread panicked");
        t2.join().expect("passed thread panicked");
        assert_eq!(cell.load(), Status::Broken);
    });
}
