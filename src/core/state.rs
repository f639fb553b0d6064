//! # Manager lifecycle states.
//!
//! ```text
//! Unconfigured ──► New ──► Running ◄──► Restarting
//!                             │              │
//!                             └──► Dying ◄───┘
//!                                    │
//!                                    ▼
//!                                  Dead
//! ```
//!
//! - `Unconfigured` exists only as the `Default`; a constructed manager starts in `New`.
//! - `Dead` is terminal.

use std::fmt;

/// State of a [`ServiceManager`](crate::ServiceManager).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum State {
    /// Not constructed yet.
    #[default]
    Unconfigured,
    /// Constructed, waiting for `start`.
    New,
    /// The worker task is running.
    Running,
    /// A restart was requested; the worker will be re-invoked with a fresh context.
    Restarting,
    /// Winding down; no further restarts.
    Dying,
    /// Finished. The worker has exited and every signaler was cancelled.
    Dead,
}

impl State {
    /// Short lowercase name (for logs).
    pub fn as_str(self) -> &'static str {
        match self {
            State::Unconfigured => "unconfigured",
            State::New => "new",
            State::Running => "running",
            State::Restarting => "restarting",
            State::Dying => "dying",
            State::Dead => "dead",
        }
    }

    /// True while the worker may still be (re-)invoked.
    #[inline]
    pub fn is_live(self) -> bool {
        matches!(self, State::Running | State::Restarting)
    }

    /// True for [`State::Dead`].
    #[inline]
    pub fn is_terminal(self) -> bool {
        self == State::Dead
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unconfigured() {
        assert_eq!(State::default(), State::Unconfigured);
    }

    #[test]
    fn test_live_and_terminal() {
        assert!(State::Running.is_live());
        assert!(State::Restarting.is_live());
        assert!(!State::Dying.is_live());
        assert!(!State::New.is_live());
        assert!(State::Dead.is_terminal());
        assert_eq!(State::Restarting.to_string(), "restarting");
    }
}
