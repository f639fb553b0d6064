//! # LogWriter: lifecycle events as `tracing` records
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO gracefully: worker starting worker="api" attempt=1
//! INFO gracefully: restart requested signaler="manual"
//! INFO gracefully: context replaced worker="api" attempt=2
//! INFO gracefully: stop requested signaler="os-signals"
//! INFO gracefully: worker exited worker="api" attempt=2
//! INFO gracefully: manager dead
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that writes every event through `tracing`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let worker = e.worker.as_deref().unwrap_or("-");
        let signaler = e.signaler.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::WorkerStarting => {
                tracing::info!(target: "gracefully", worker, attempt = e.attempt, "worker starting");
            }
            EventKind::WorkerReturned => {
                tracing::info!(
                    target: "gracefully",
                    worker,
                    attempt = e.attempt,
                    action = e.action.map(|a| a.as_str()),
                    "worker returned"
                );
            }
            EventKind::WorkerFailed => {
                tracing::warn!(target: "gracefully", worker, attempt = e.attempt, reason, "worker failed");
            }
            EventKind::ContextReplaced => {
                tracing::info!(target: "gracefully", worker, attempt = e.attempt, "context replaced");
            }
            EventKind::WorkerExited => {
                tracing::info!(target: "gracefully", worker, attempt = e.attempt, reason, "worker exited");
            }
            EventKind::RestartRequested => {
                tracing::info!(target: "gracefully", signaler, "restart requested");
            }
            EventKind::StopRequested => {
                tracing::info!(target: "gracefully", signaler, "stop requested");
            }
            EventKind::SignalerEvicted => {
                tracing::info!(target: "gracefully", signaler, "signaler evicted");
            }
            EventKind::SignalersCancelled => {
                tracing::info!(target: "gracefully", count = reason, "signalers cancelled");
            }
            EventKind::ManagerDead => {
                tracing::info!(target: "gracefully", reason, "manager dead");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "gracefully", subscriber = signaler, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(target: "gracefully", subscriber = signaler, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
