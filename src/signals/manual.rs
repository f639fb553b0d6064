//! # ManualSignal: drive a manager by hand.
//!
//! Exposes explicit [`stop`](ManualSignal::stop) and
//! [`restart`](ManualSignal::restart) calls usable from any task. Handy in tests
//! and for wiring admin endpoints without OS signals.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use gracefully::{Action, ManualSignal, ServiceManager, WorkerFn};
//!
//! # async fn demo() {
//! let manual = Arc::new(ManualSignal::new());
//! let mgr = ServiceManager::new();
//! mgr.add_signaler(manual.clone());
//!
//! mgr.start(WorkerFn::arc("svc", |ctx: CancellationToken| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, gracefully::WorkerError>(Action::Continue)
//! }));
//!
//! manual.stop().await;
//! assert!(mgr.wait().await.is_ok());
//! # }
//! ```

use super::base::BaseSignaler;
use super::control::{self, Control, ControlReceiver};
use super::signaler::Signaler;

/// Signaler with explicit stop/restart operations.
#[derive(Default)]
pub struct ManualSignal {
    base: BaseSignaler,
}

impl ManualSignal {
    /// Creates a manual signaler with a control channel of capacity 1.
    pub fn new() -> Self {
        Self {
            base: BaseSignaler::new(),
        }
    }

    /// Creates a manual signaler on top of an existing base (e.g. one built from config).
    pub fn with_base(base: BaseSignaler) -> Self {
        Self { base }
    }

    /// Asks the manager to stop. Returns `false` if nobody is listening anymore.
    pub async fn stop(&self) -> bool {
        self.base.signal(control::stop()).await
    }

    /// Asks the manager to restart the worker.
    pub async fn restart(&self) -> bool {
        self.base.signal(control::restart()).await
    }

    /// Sends an arbitrary control function.
    pub async fn send(&self, control: Control) -> bool {
        self.base.signal(control).await
    }

    /// Retires this signaler without requesting any action.
    pub fn close(&self) {
        self.base.close();
    }

    /// True once the manager cancelled this signaler.
    pub fn is_cancelled(&self) -> bool {
        self.base.is_cancelled()
    }
}

impl Signaler for ManualSignal {
    fn wait_channel(&self) -> Option<ControlReceiver> {
        self.base.wait_channel()
    }

    fn cancel(&self) {
        self.base.cancel();
    }

    fn name(&self) -> &str {
        "manual"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, ServiceManager};

    #[tokio::test]
    async fn test_stop_and_restart_controls() {
        let manual = ManualSignal::new();
        let mut rx = manual.wait_channel().unwrap();
        let mgr = ServiceManager::new();

        assert!(manual.restart().await);
        assert_eq!(rx.recv().await.unwrap()(&mgr), Action::Restart);
        assert!(manual.stop().await);
        assert_eq!(rx.recv().await.unwrap()(&mgr), Action::Stop);
    }

    #[tokio::test]
    async fn test_cancelled_manual_refuses_sends() {
        let manual = ManualSignal::new();
        let _rx = manual.wait_channel().unwrap();
        manual.cancel();
        assert!(manual.is_cancelled());
        assert!(!manual.stop().await);
    }
}
