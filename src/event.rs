//! Assertion events and their synchronous, session-routed delivery.
//!
//! Every event carries the [`SessionId`] of the session that raised it.
//! Listeners are shared by all sessions, so they must use that id, and never
//! the identity of the delivering thread, to find the state they update.

use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, PoisonError, RwLock},
};

use tracing::error;

use crate::{assertion::SoftAssertionError, session::SessionId};

/// Published whenever a soft assertion fails.
#[derive(Clone, Debug)]
pub struct AssertionFailedEvent {
    session: SessionId,
    error: Arc<SoftAssertionError>,
}

impl AssertionFailedEvent {
    #[must_use]
    pub fn new(session: SessionId, error: SoftAssertionError) -> Self {
        Self {
            session,
            error: Arc::new(error),
        }
    }

    /// Session that recorded the failure.
    #[must_use]
    pub fn session(&self) -> SessionId { self.session }

    #[must_use]
    pub fn soft_assertion_error(&self) -> &SoftAssertionError { &self.error }
}

/// Published whenever a soft assertion passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssertionPassedEvent {
    pub session: SessionId,
}

/// Published when a failure requires the running scenario or story to stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailFastEvent {
    pub session: SessionId,
    pub fail_scenario: bool,
    pub fail_story: bool,
}

/// Any event published on an [`EventBus`].
#[derive(Clone, Debug)]
pub enum AssertionEvent {
    Failed(AssertionFailedEvent),
    Passed(AssertionPassedEvent),
    FailFast(FailFastEvent),
}

impl AssertionEvent {
    #[must_use]
    pub fn session(&self) -> SessionId {
        match self {
            AssertionEvent::Failed(event) => event.session(),
            AssertionEvent::Passed(event) => event.session,
            AssertionEvent::FailFast(event) => event.session,
        }
    }
}

/// Receives assertion events.
///
/// Every method has an empty default so implementations only override the
/// events they care about.
pub trait AssertionListener: Send + Sync {
    fn on_assertion_failed(&self, _event: &AssertionFailedEvent) {}

    fn on_assertion_passed(&self, _event: &AssertionPassedEvent) {}

    fn on_fail_fast(&self, _event: &FailFastEvent) {}
}

/// Broadcasts assertion events to every subscribed listener.
///
/// Delivery is synchronous and follows subscription order. Subscriptions are
/// append-only.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<Arc<dyn AssertionListener>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Register `listener` for every subsequently published event.
    pub fn subscribe(&self, listener: Arc<dyn AssertionListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver `event` to every listener.
    ///
    /// A listener that panics is logged and skipped; the remaining listeners
    /// still receive the event.
    pub fn publish(&self, event: &AssertionEvent) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            let delivery = catch_unwind(AssertUnwindSafe(|| match event {
                AssertionEvent::Failed(e) => listener.on_assertion_failed(e),
                AssertionEvent::Passed(e) => listener.on_assertion_passed(e),
                AssertionEvent::FailFast(e) => listener.on_fail_fast(e),
            }));
            if let Err(panic) = delivery {
                error!(
                    session = %event.session(),
                    panic = %panic_message(panic.as_ref()),
                    "assertion listener panicked"
                );
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{
        AssertionEvent,
        AssertionFailedEvent,
        AssertionListener,
        AssertionPassedEvent,
        EventBus,
        FailFastEvent,
    };
    use crate::{
        assertion::{AssertionError, SoftAssertionError},
        session::SessionId,
    };

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Recorder {
        fn push(&self, entry: String) {
            self.0.lock().expect("recorder lock").push(entry);
        }

        fn entries(&self) -> Vec<String> { self.0.lock().expect("recorder lock").clone() }
    }

    impl AssertionListener for Recorder {
        fn on_assertion_failed(&self, event: &AssertionFailedEvent) {
            self.push(format!("failed:{}", event.session().as_u64()));
        }

        fn on_assertion_passed(&self, event: &AssertionPassedEvent) {
            self.push(format!("passed:{}", event.session.as_u64()));
        }

        fn on_fail_fast(&self, event: &FailFastEvent) {
            self.push(format!("fail-fast:{}", event.fail_scenario));
        }
    }

    struct Exploding;

    impl AssertionListener for Exploding {
        fn on_assertion_failed(&self, _event: &AssertionFailedEvent) { panic!("listener bug") }
    }

    fn failed(session: u64) -> AssertionEvent {
        AssertionEvent::Failed(AssertionFailedEvent::new(
            SessionId::new(session),
            SoftAssertionError::new(AssertionError::new("boom"), None),
        ))
    }

    #[test]
    fn delivers_to_every_listener_in_order() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        bus.subscribe(recorder.clone());
        bus.publish(&failed(4));
        bus.publish(&AssertionEvent::Passed(AssertionPassedEvent {
            session: SessionId::new(4),
        }));
        bus.publish(&AssertionEvent::FailFast(FailFastEvent {
            session: SessionId::new(4),
            fail_scenario: true,
            fail_story: false,
        }));
        assert_eq!(recorder.entries(), vec!["failed:4", "passed:4", "fail-fast:true"]);
    }

    #[test]
    fn panicking_listener_does_not_stop_delivery() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        bus.subscribe(Arc::new(Exploding));
        bus.subscribe(recorder.clone());
        bus.publish(&failed(9));
        assert_eq!(recorder.entries(), vec!["failed:9"]);
        assert_eq!(bus.listener_count(), 2);
    }
}
