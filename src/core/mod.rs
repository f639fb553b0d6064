//! Runtime core: the manager and its worker task.
//!
//! The public API from this module is [`ServiceManager`] (with its builder),
//! [`Config`] and [`State`].
//!
//! Internal modules:
//! - [`manager`]: the wait loop, signaler registration, teardown;
//! - [`actor`]: the background task that repeatedly invokes the worker;
//! - [`runner`]: executes one invocation, catching panics and publishing events;
//! - [`select`]: the dynamic multiplexed receive over signaler channels;
//! - [`registry`]: lock-guarded state shared by the two sides.

mod actor;
mod builder;
mod config;
mod manager;
mod registry;
mod runner;
mod select;
mod state;

#[cfg(test)]
mod tests;

pub use builder::ServiceManagerBuilder;
pub use config::Config;
pub use manager::ServiceManager;
pub use state::State;
