//! # Core signaler trait
//!
//! `Signaler` is the extension point for anything that wants to restart or stop
//! a [`ServiceManager`](crate::ServiceManager): OS signals, admin endpoints,
//! file watchers, tests.
//!
//! ## Contract
//! - [`Signaler::wait_channel`] hands the receive side of the signaler's control
//!   channel to the manager. It is called once, at registration. The manager is
//!   the only reader and never sends on it.
//! - Dropping every sender closes the channel. The manager then evicts the
//!   signaler quietly: a closed channel is neither an error nor a stop request.
//! - [`Signaler::cancel`] is called exactly once during the manager's teardown,
//!   including for signalers that were already evicted. It must return without
//!   waiting for background work to finish.
//!
//! Most implementations embed a [`BaseSignaler`](crate::BaseSignaler) and
//! delegate both methods to it.

use super::control::ControlReceiver;

/// Contract for event sources driving a [`ServiceManager`](crate::ServiceManager).
pub trait Signaler: Send + Sync + 'static {
    /// Takes the receive side of the control channel.
    ///
    /// Returns `None` if it was already taken; the manager treats such a
    /// signaler as closed.
    fn wait_channel(&self) -> Option<ControlReceiver>;

    /// Tells the signaler to stop any background activity. Non-blocking.
    fn cancel(&self);

    /// Human-readable name (for events and logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
