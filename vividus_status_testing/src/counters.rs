//! Helpers for asserting on counters recorded with a debugging recorder.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

/// Run `f` with a fresh thread-local [`DebuggingRecorder`] and return the
/// snapshotter holding whatever it recorded.
pub fn record_with<F: FnOnce()>(f: F) -> Snapshotter {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    metrics::with_local_recorder(&recorder, f);
    snapshotter
}

/// Value of the counter `name` carrying the label `label=value`, if it was
/// recorded.
#[must_use]
pub fn counter_value(snapshotter: &Snapshotter, name: &str, label: &str, value: &str) -> Option<u64> {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .find_map(|(key, _, _, recorded)| {
            let key = key.key();
            let labelled = key
                .labels()
                .any(|l| l.key() == label && l.value() == value);
            match recorded {
                DebugValue::Counter(count) if key.name() == name && labelled => Some(count),
                _ => None,
            }
        })
}
