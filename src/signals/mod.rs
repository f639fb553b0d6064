//! Signalers: event sources that can restart or stop the worker.
//!
//! ## Contents
//! - [`Signaler`] the contract the manager consumes
//! - [`BaseSignaler`] channel plumbing shared by implementations
//! - [`ManualSignal`] explicit `stop`/`restart` calls
//! - [`OsSignals`] OS signals mapped through a [`SignalTable`]
//! - [`control`] the [`Action`] enum and [`Control`] function helpers
//!
//! ```text
//!   OsSignals ────┐
//!   ManualSignal ─┼── Control ──► [channel per signaler] ──► ServiceManager::wait
//!   custom ... ───┘                                            (select over all)
//! ```

mod base;
pub mod control;
mod manual;
mod os;
mod signaler;

pub use base::BaseSignaler;
pub use control::{Action, Control, ControlReceiver, ControlSender};
pub use manual::ManualSignal;
pub use os::{OsSignal, OsSignals, SignalTable};
pub use signaler::Signaler;
