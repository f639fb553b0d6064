//! # Lifecycle events emitted by the service manager.
//!
//! [`EventKind`] covers three areas:
//! - **Worker events**: invocations, returns, context replacement, exit
//! - **Signal events**: restart/stop requests, evictions, teardown
//! - **Subscriber events**: overflow and panics inside observers
//!
//! Each event carries a global monotonic `seq`; use it to restore order when
//! events reach a subscriber out of order.
//!
//! ## Example
//! ```rust
//! use gracefully::{Action, Event, EventKind};
//!
//! let ev = Event::new(EventKind::WorkerReturned)
//!     .with_worker("api")
//!     .with_attempt(2)
//!     .with_action(Action::Restart);
//!
//! assert_eq!(ev.worker.as_deref(), Some("api"));
//! assert_eq!(ev.action, Some(Action::Restart));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::signals::Action;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets `signaler` (subscriber name) and `reason` (panic info).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `signaler` (subscriber name) and `reason`.
    SubscriberOverflow,

    // === Worker events ===
    /// Worker is about to be invoked.
    ///
    /// Sets `worker`, `attempt` (1-based).
    WorkerStarting,

    /// Worker invocation returned an action.
    ///
    /// Sets `worker`, `attempt`, `action`.
    WorkerReturned,

    /// Worker invocation returned an error (or panicked).
    ///
    /// Sets `worker`, `attempt`, `reason`.
    WorkerFailed,

    /// A fresh execution context replaced the previous one.
    ///
    /// Sets `worker`, `attempt` (the attempt about to run).
    ContextReplaced,

    /// Worker loop ended and reported its result.
    ///
    /// Sets `worker`, `attempt`, `reason` (only on error).
    WorkerExited,

    // === Signal events ===
    /// A control function asked for a restart.
    ///
    /// Sets `signaler`, `action`.
    RestartRequested,

    /// A control function asked for a stop.
    ///
    /// Sets `signaler`, `action`.
    StopRequested,

    /// A signaler's channel closed and it was removed from the select set.
    ///
    /// Sets `signaler`.
    SignalerEvicted,

    /// Every registered signaler was told to cancel.
    ///
    /// Sets `reason` (number of signalers).
    SignalersCancelled,

    /// The manager reached its terminal state.
    ///
    /// Sets `reason` (only when the worker failed).
    ManagerDead,
}

/// Lifecycle event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Worker name, if applicable.
    pub worker: Option<Arc<str>>,
    /// Signaler (or subscriber) name, if applicable.
    pub signaler: Option<Arc<str>>,
    /// Worker invocation count (starting from 1).
    pub attempt: Option<u64>,
    /// Action involved, if any.
    pub action: Option<Action>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            signaler: None,
            attempt: None,
            action: None,
            reason: None,
        }
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a signaler name.
    #[inline]
    pub fn with_signaler(mut self, signaler: impl Into<Arc<str>>) -> Self {
        self.signaler = Some(signaler.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches an action.
    #[inline]
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_signaler(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_signaler(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::WorkerStarting);
        let b = Event::new(EventKind::WorkerStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_subscriber_helpers() {
        let ev = Event::subscriber_overflow("log", "full");
        assert!(ev.is_subscriber_event());
        assert_eq!(ev.reason.as_deref(), Some("subscriber=log reason=full"));
        assert!(!Event::new(EventKind::ManagerDead).is_subscriber_event());
    }
}
