//! # Event subscribers.
//!
//! Subscribers observe the manager's lifecycle [`Event`](crate::Event)s without
//! being able to influence it. Use them for logging, metrics, or assertions.
//!
//! ```text
//! wait loop / worker task ── publish ──► Bus ──► listener ──► SubscriberSet
//!                                                    ┌──────────┼──────────┐
//!                                                    ▼          ▼          ▼
//!                                               LogWriter    metrics    custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use gracefully::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct RestartCounter;
//!
//! #[async_trait]
//! impl Subscribe for RestartCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::RestartRequested {
//!             // increment counter
//!         }
//!     }
//!     fn name(&self) -> &'static str { "restart-counter" }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
