//! # Registry: lock-guarded state shared by the wait loop and the worker task.
//!
//! Holds everything both sides read or write:
//! - the lifecycle [`State`],
//! - the current execution context (its token is the "cancel function"),
//! - the *active* signalers (index-aligned with the receivers the wait loop owns),
//! - every *registered* signaler (cancelled once at teardown, evicted or not).
//!
//! ## Rules
//! - One `std::sync::Mutex`, held only for a read or an assignment.
//! - Never held across an `.await`, and never while calling into a signaler.
//! - State transitions that depend on the current state are decided under the lock
//!   (e.g. [`Registry::replace_context`] refuses to revive a `Dying` manager).

use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use super::state::State;
use crate::signals::Signaler;

struct Inner {
    state: State,
    ctx: Option<CancellationToken>,
    active: Vec<Arc<dyn Signaler>>,
    registered: Vec<Arc<dyn Signaler>>,
}

/// Shared mutable state of one manager.
pub(crate) struct Registry {
    inner: Mutex<Inner>,
    /// Cancelled once the last active signaler was evicted.
    orphaned: CancellationToken,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: State::New,
                ctx: None,
                active: Vec::new(),
                registered: Vec::new(),
            }),
            orphaned: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub(crate) fn state(&self) -> State {
        self.lock().state
    }

    pub(crate) fn set_state(&self, state: State) {
        self.lock().state = state;
    }

    /// Adds a signaler; `selectable` is false when it came without a channel.
    pub(crate) fn register(&self, signaler: Arc<dyn Signaler>, selectable: bool) {
        let mut inner = self.lock();
        if selectable {
            inner.active.push(Arc::clone(&signaler));
        }
        inner.registered.push(signaler);
    }

    pub(crate) fn active_len(&self) -> usize {
        self.lock().active.len()
    }

    pub(crate) fn active_name(&self, index: usize) -> Arc<str> {
        self.lock()
            .active
            .get(index)
            .map(|s| Arc::from(s.name()))
            .unwrap_or_else(|| Arc::from("unknown"))
    }

    /// Swap-removes the active signaler at `index`; returns its name.
    ///
    /// Cancels [`Registry::orphaned`] when this empties the active list.
    pub(crate) fn evict(&self, index: usize) -> Arc<str> {
        let (name, remaining) = {
            let mut inner = self.lock();
            let name = if index < inner.active.len() {
                Arc::from(inner.active.swap_remove(index).name())
            } else {
                Arc::from("unknown")
            };
            (name, inner.active.len())
        };
        if remaining == 0 {
            self.orphaned.cancel();
        }
        name
    }

    /// Takes every registered signaler so each is cancelled at most once.
    pub(crate) fn drain_registered(&self) -> Vec<Arc<dyn Signaler>> {
        let mut inner = self.lock();
        inner.active.clear();
        std::mem::take(&mut inner.registered)
    }

    /// Installs the first execution context.
    pub(crate) fn install_context(&self, ctx: CancellationToken) {
        self.lock().ctx = Some(ctx);
    }

    /// Cancels the current context and marks the manager `Restarting`.
    ///
    /// Returns `false` (and does nothing) unless the manager is live.
    pub(crate) fn request_restart(&self) -> bool {
        let mut inner = self.lock();
        if !inner.state.is_live() {
            return false;
        }
        inner.state = State::Restarting;
        if let Some(ctx) = inner.ctx.take() {
            ctx.cancel();
        }
        true
    }

    /// Cancels the current context and marks the manager `Dying`.
    pub(crate) fn wind_down(&self) {
        let mut inner = self.lock();
        inner.state = State::Dying;
        if let Some(ctx) = inner.ctx.take() {
            ctx.cancel();
        }
    }

    /// Cancels the current context, if any, without touching the state.
    pub(crate) fn release_context(&self) {
        if let Some(ctx) = self.lock().ctx.take() {
            ctx.cancel();
        }
    }

    /// Swaps in a fresh context and marks the manager `Running`.
    ///
    /// Returns `None` when the manager is no longer live; the worker must exit.
    pub(crate) fn replace_context(&self) -> Option<CancellationToken> {
        let mut inner = self.lock();
        if let Some(old) = inner.ctx.take() {
            old.cancel();
        }
        if !inner.state.is_live() {
            return None;
        }
        let fresh = CancellationToken::new();
        inner.ctx = Some(fresh.clone());
        inner.state = State::Running;
        Some(fresh)
    }

    /// State as seen by a worker that returned `Continue`.
    ///
    /// With no active signalers left nobody can restart or stop it, so the
    /// manager moves to `Dying`.
    pub(crate) fn settle(&self) -> State {
        let mut inner = self.lock();
        if inner.active.is_empty() {
            inner.state = State::Dying;
        }
        inner.state
    }

    pub(crate) async fn orphaned(&self) {
        self.orphaned.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{BaseSignaler, ManualSignal};

    #[test]
    fn test_new_registry_is_new() {
        let reg = Registry::new();
        assert_eq!(reg.state(), State::New);
        assert_eq!(reg.active_len(), 0);
    }

    #[test]
    fn test_restart_requires_live_state() {
        let reg = Registry::new();
        assert!(!reg.request_restart());

        let ctx = CancellationToken::new();
        reg.install_context(ctx.clone());
        reg.set_state(State::Running);
        assert!(reg.request_restart());
        assert!(ctx.is_cancelled());
        assert_eq!(reg.state(), State::Restarting);
    }

    #[test]
    fn test_replace_context_refuses_dying() {
        let reg = Registry::new();
        let ctx = CancellationToken::new();
        reg.install_context(ctx.clone());
        reg.wind_down();
        assert!(ctx.is_cancelled());
        assert_eq!(reg.state(), State::Dying);
        assert!(reg.replace_context().is_none());
    }

    #[test]
    fn test_replace_context_is_independent() {
        let reg = Registry::new();
        let first = CancellationToken::new();
        reg.install_context(first.clone());
        reg.set_state(State::Restarting);

        let second = reg.replace_context().unwrap();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(reg.state(), State::Running);
    }

    #[tokio::test]
    async fn test_evicting_last_signaler_orphans() {
        let reg = Registry::new();
        reg.register(Arc::new(ManualSignal::new()), true);
        reg.register(Arc::new(BaseSignaler::new()), true);
        reg.register(Arc::new(BaseSignaler::new()), false);
        assert_eq!(reg.active_len(), 2);

        assert_eq!(&*reg.evict(0), "manual");
        assert!(!reg.orphaned.is_cancelled());
        assert_eq!(&*reg.evict(0), "base");
        reg.orphaned().await;

        assert_eq!(reg.drain_registered().len(), 3);
        assert!(reg.drain_registered().is_empty());
    }

    #[test]
    fn test_settle_without_signalers_dies() {
        let reg = Registry::new();
        reg.set_state(State::Running);
        assert_eq!(reg.settle(), State::Dying);
    }
}
