//! # BaseSignaler: reusable channel plumbing for signalers.
//!
//! Holds the two halves every signaler needs:
//! - an outgoing control channel (bounded, default capacity 1),
//! - an incoming cancel notification ([`CancellationToken`]).
//!
//! Concrete signalers only decide *when* to call [`BaseSignaler::signal`] and
//! make their background loops exit on [`BaseSignaler::cancelled`].
//!
//! ## Closing
//! [`BaseSignaler::close`] drops the stored sender. Once in-flight sends finish,
//! the channel reports closed and the manager evicts the signaler. Later
//! `signal` calls return `false`.

use std::sync::Mutex;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use super::control::{Control, ControlReceiver, ControlSender};
use super::signaler::Signaler;
use crate::core::Config;

/// Channel pair shared by the built-in signalers.
pub struct BaseSignaler {
    tx: Mutex<Option<ControlSender>>,
    rx: Mutex<Option<ControlReceiver>>,
    cancel: CancellationToken,
}

impl BaseSignaler {
    /// Creates a base with a control channel of capacity 1.
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Creates a base with the given control channel capacity (min 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a base sized by [`Config::control_capacity_clamped`].
    pub fn from_config(cfg: &Config) -> Self {
        Self::with_capacity(cfg.control_capacity_clamped())
    }

    /// Pushes a control function, waiting for buffer space.
    ///
    /// Returns `false` if the channel is closed, the manager is gone, or the
    /// signaler was cancelled while waiting.
    pub async fn signal(&self, control: Control) -> bool {
        let Some(tx) = self.sender() else {
            return false;
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            res = tx.send(control) => res.is_ok(),
        }
    }

    /// Pushes a control function without waiting.
    ///
    /// Returns `false` if the buffer is full or the channel is closed.
    pub fn try_signal(&self, control: Control) -> bool {
        let Some(tx) = self.sender() else {
            return false;
        };
        match tx.try_send(control) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!("control channel full; dropping control");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Drops the stored sender so the manager sees the channel close.
    pub fn close(&self) {
        self.lock_tx().take();
    }

    /// True once the sender was dropped via [`BaseSignaler::close`].
    pub fn is_closed(&self) -> bool {
        self.lock_tx().is_none()
    }

    /// Completes once the manager (or the owner) cancelled this signaler.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// True once cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Clone of the cancel notification, for background tasks.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn sender(&self) -> Option<ControlSender> {
        self.lock_tx().clone()
    }

    fn lock_tx(&self) -> std::sync::MutexGuard<'_, Option<ControlSender>> {
        self.tx.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for BaseSignaler {
    fn default() -> Self {
        Self::new()
    }
}

impl Signaler for BaseSignaler {
    fn wait_channel(&self) -> Option<ControlReceiver> {
        self.rx.lock().unwrap_or_else(|p| p.into_inner()).take()
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }

    fn name(&self) -> &str {
        "base"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::control;

    #[tokio::test]
    async fn test_wait_channel_taken_once() {
        let base = BaseSignaler::new();
        assert!(base.wait_channel().is_some());
        assert!(base.wait_channel().is_none());
    }

    #[tokio::test]
    async fn test_signal_reaches_receiver() {
        let base = BaseSignaler::new();
        let mut rx = base.wait_channel().unwrap();
        assert!(base.signal(control::stop()).await);

        let mgr = crate::ServiceManager::new();
        let ctl = rx.recv().await.unwrap();
        assert_eq!(ctl(&mgr), crate::Action::Stop);
    }

    #[tokio::test]
    async fn test_close_ends_receiver() {
        let base = BaseSignaler::new();
        let mut rx = base.wait_channel().unwrap();
        base.close();
        assert!(base.is_closed());
        assert!(rx.recv().await.is_none());
        assert!(!base.signal(control::restart()).await);
    }

    #[tokio::test]
    async fn test_try_signal_full() {
        let base = BaseSignaler::new();
        let _rx = base.wait_channel().unwrap();
        assert!(base.try_signal(control::stop()));
        assert!(!base.try_signal(control::stop()));
    }

    #[tokio::test]
    async fn test_cancel_unblocks_pending_signal() {
        let base = std::sync::Arc::new(BaseSignaler::new());
        let _rx = base.wait_channel().unwrap();
        assert!(base.signal(control::stop()).await);

        let b = base.clone();
        let pending = tokio::spawn(async move { b.signal(control::stop()).await });
        base.cancel();
        base.cancel();
        assert!(!pending.await.unwrap());
        assert!(base.is_cancelled());
    }
}
