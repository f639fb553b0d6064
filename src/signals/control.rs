//! # Actions and control functions.
//!
//! A signaler never changes the manager directly. It pushes a [`Control`] onto its
//! channel; the wait loop later calls it with the manager and applies the
//! [`Action`] it returns. Because evaluation happens on the wait loop, a control
//! function may inspect the manager (e.g. [`ServiceManager::state`]) at the moment
//! of decision rather than at the moment of sending.
//!
//! ```text
//! signaler ── Control ──► channel ──► wait loop: control(&manager) ─► Action
//!                                                   ├─ Continue → no-op
//!                                                   ├─ Restart  → cancel context, Restarting
//!                                                   └─ Stop     → cancel context, Dying
//! ```

use std::fmt;

use tokio::sync::mpsc;

use crate::core::ServiceManager;

/// What the manager (or the worker loop) should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Keep going; defer to whatever the manager's state says.
    Continue,
    /// Cancel the current context and run the worker again from the top.
    Restart,
    /// Cancel the current context and wind the manager down.
    Stop,
}

impl Action {
    /// Short lowercase name (for logs).
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Continue => "continue",
            Action::Restart => "restart",
            Action::Stop => "stop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deferred, state-aware decision delivered by a signaler.
pub type Control = Box<dyn FnOnce(&ServiceManager) -> Action + Send + 'static>;

/// Sending half of a control channel.
pub type ControlSender = mpsc::Sender<Control>;

/// Receiving half of a control channel; only the wait loop reads from it.
pub type ControlReceiver = mpsc::Receiver<Control>;

/// Control function that always yields `action`.
pub fn action(action: Action) -> Control {
    Box::new(move |_| action)
}

/// Control function that requests a stop.
pub fn stop() -> Control {
    action(Action::Stop)
}

/// Control function that requests a restart.
pub fn restart() -> Control {
    action(Action::Restart)
}

/// Boxes an arbitrary decision closure.
///
/// ```
/// use gracefully::{Action, State, control};
///
/// // Only restart a service that is actually running; otherwise leave it alone.
/// let _ctl = control::from_fn(|mgr| match mgr.state() {
///     State::Running => Action::Restart,
///     _ => Action::Continue,
/// });
/// ```
pub fn from_fn<F>(f: F) -> Control
where
    F: FnOnce(&ServiceManager) -> Action + Send + 'static,
{
    Box::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_actions() {
        let mgr = ServiceManager::new();
        assert_eq!(stop()(&mgr), Action::Stop);
        assert_eq!(restart()(&mgr), Action::Restart);
        assert_eq!(action(Action::Continue)(&mgr), Action::Continue);
    }

    #[test]
    fn test_from_fn_sees_manager_state() {
        let mgr = ServiceManager::new();
        let ctl = from_fn(|m| {
            if m.state() == crate::State::New {
                Action::Stop
            } else {
                Action::Continue
            }
        });
        assert_eq!(ctl(&mgr), Action::Stop);
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::Restart.to_string(), "restart");
    }
}
