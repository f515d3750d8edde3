//! Per-session aggregation of the worst observed status.
//!
//! [`StatusAggregator`] keeps one [`StatusCell`] per running session in a
//! dispatch table keyed by [`SessionId`]. Events and step outcomes are routed
//! by the id they carry, so concurrently running sessions never observe each
//! other's state. A cell only ever moves towards more severe statuses.

#[cfg(not(loom))]
use std::sync::atomic::{AtomicU8, Ordering};
use std::{fmt, sync::Arc};

use dashmap::DashMap;
#[cfg(loom)]
use loom::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, info, warn};

use crate::{
    assertion::StepFailure,
    event::{AssertionFailedEvent, AssertionListener},
    reporter::{Scenario, StoryReporter},
    session::SessionId,
    status::Status,
};

/// Lock-free holder of a status that can only be downgraded.
#[derive(Debug)]
pub struct StatusCell {
    rank: AtomicU8,
}

impl StatusCell {
    #[must_use]
    pub fn new(initial: Status) -> Self {
        Self {
            rank: AtomicU8::new(initial.priority()),
        }
    }

    /// Current status.
    #[must_use]
    pub fn load(&self) -> Status {
        Status::from_priority(self.rank.load(Ordering::Acquire)).unwrap_or_else(Status::lowest)
    }

    /// Replace the held status with `status` if it is more severe, returning
    /// the status held afterwards.
    pub fn downgrade(&self, status: Status) -> Status {
        let previous = self.rank.fetch_min(status.priority(), Ordering::AcqRel);
        Status::from_priority(previous)
            .unwrap_or_else(Status::lowest)
            .worse(status)
    }
}

impl Default for StatusCell {
    fn default() -> Self { Self::new(Status::lowest()) }
}

type FinalizedHook = Box<dyn Fn(SessionId, Status) + Send + Sync + 'static>;

/// Tracks the worst status of the scenario each session is running.
///
/// The lifecycle per scenario is [`StatusAggregator::reset_state`], any
/// number of [`StatusAggregator::record`] calls, then exactly one
/// [`StatusAggregator::finalize_status`]. [`StatusAggregator::begin`] wraps
/// that pair in a guard so aborted scenarios are still finalised.
#[derive(Default)]
pub struct StatusAggregator {
    sessions: DashMap<SessionId, Arc<StatusCell>>,
    on_finalized: Option<FinalizedHook>,
}

impl StatusAggregator {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Hand every finalised status to `hook`, typically a report writer.
    #[must_use]
    pub fn with_on_finalized<F>(mut self, hook: F) -> Self
    where
        F: Fn(SessionId, Status) + Send + Sync + 'static,
    {
        self.on_finalized = Some(Box::new(hook));
        self
    }

    /// Start tracking a new scenario for `session`, discarding any state a
    /// previous scenario left behind.
    pub fn reset_state(&self, session: SessionId) {
        let previous = self
            .sessions
            .insert(session, Arc::new(StatusCell::default()));
        if let Some(stale) = previous {
            warn!(
                %session,
                status = %stale.load(),
                "discarding status of a scenario that was never finalised"
            );
        }
    }

    /// Downgrade the status of `session` by `status`, returning the status
    /// held afterwards.
    ///
    /// A session without state is initialised lazily so the observation is
    /// not lost. Such a session stays tracked until it is finalised or
    /// [discarded](StatusAggregator::discard).
    pub fn record(&self, session: SessionId, status: Status) -> Status {
        let cell = self
            .sessions
            .entry(session)
            .or_insert_with(|| {
                warn!(%session, "status recorded before the scenario started");
                Arc::new(StatusCell::default())
            })
            .clone();
        let held = cell.downgrade(status);
        debug!(%session, %status, %held, "status recorded");
        held
    }

    /// Downgrade the originating session by the status of a failed soft
    /// assertion.
    pub fn on_assertion_failed(&self, event: &AssertionFailedEvent) -> Status {
        self.record(event.session(), Status::from_event(event))
    }

    /// Status currently held for `session`, if a scenario is running.
    #[must_use]
    pub fn current_status(&self, session: SessionId) -> Option<Status> {
        self.sessions.get(&session).map(|cell| cell.load())
    }

    /// Stop tracking the scenario of `session` and return its final status.
    ///
    /// Finalising a session that holds no state logs a warning and yields
    /// [`Status::NotCovered`].
    pub fn finalize_status(&self, session: SessionId) -> Status {
        let status = match self.sessions.remove(&session) {
            Some((_, cell)) => cell.load(),
            None => {
                warn!(%session, "finalising a scenario that was never started");
                Status::lowest()
            }
        };
        info!(%session, %status, "scenario finalised");
        crate::metrics::inc_scenarios(status);
        if let Some(hook) = &self.on_finalized {
            hook(session, status);
        }
        status
    }

    /// Stop tracking `session` without finalising it, returning the status it
    /// held. The finalisation hook and metrics are not invoked.
    pub fn discard(&self, session: SessionId) -> Option<Status> {
        let (_, cell) = self.sessions.remove(&session)?;
        let status = cell.load();
        debug!(%session, %status, "scenario state discarded");
        Some(status)
    }

    /// Sessions currently holding state, for sweeping abandoned sessions.
    #[must_use]
    pub fn tracked_sessions(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    /// Reset `session` and return a guard that finalises it exactly once.
    pub fn begin(&self, session: SessionId) -> ScenarioScope<'_> {
        self.reset_state(session);
        ScenarioScope {
            aggregator: self,
            session,
            finished: false,
        }
    }

    /// Number of sessions currently running a scenario.
    #[must_use]
    pub fn active_sessions(&self) -> usize { self.sessions.len() }
}

impl fmt::Debug for StatusAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusAggregator")
            .field("sessions", &self.sessions.len())
            .field("on_finalized", &self.on_finalized.is_some())
            .finish()
    }
}

impl AssertionListener for StatusAggregator {
    fn on_assertion_failed(&self, event: &AssertionFailedEvent) {
        StatusAggregator::on_assertion_failed(self, event);
    }
}

impl StoryReporter for StatusAggregator {
    fn before_scenario(&self, session: SessionId, _scenario: &Scenario) {
        self.reset_state(session);
    }

    fn after_scenario(&self, session: SessionId) { self.finalize_status(session); }

    fn successful(&self, session: SessionId, _step: &str) { self.record(session, Status::Passed); }

    fn ignorable(&self, session: SessionId, _step: &str) { self.record(session, Status::Skipped); }

    fn comment(&self, session: SessionId, _step: &str) { self.record(session, Status::Skipped); }

    fn pending(&self, session: SessionId, _step: &str) { self.record(session, Status::Pending); }

    fn not_performed(&self, session: SessionId, _step: &str) {
        self.record(session, Status::Skipped);
    }

    fn failed(&self, session: SessionId, _step: &str, failure: &StepFailure) {
        self.record(session, Status::from_failure(failure));
    }
}

/// Guard for one running scenario.
///
/// Dropping the guard without calling [`ScenarioScope::finish`] still
/// finalises the scenario, so an aborted scenario cannot leak its status into
/// the next one run by the same session.
#[must_use = "dropping the scope finalises the scenario immediately"]
pub struct ScenarioScope<'a> {
    aggregator: &'a StatusAggregator,
    session: SessionId,
    finished: bool,
}

impl ScenarioScope<'_> {
    #[must_use]
    pub fn session(&self) -> SessionId { self.session }

    /// Record `status` for the guarded session.
    pub fn record(&self, status: Status) -> Status { self.aggregator.record(self.session, status) }

    /// Finalise the scenario and return its status.
    pub fn finish(mut self) -> Status {
        self.finished = true;
        self.aggregator.finalize_status(self.session)
    }
}

impl Drop for ScenarioScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(session = %self.session, "scenario aborted before it finished");
            self.aggregator.finalize_status(self.session);
        }
    }
}
