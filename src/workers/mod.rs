//! # Worker abstractions.
//!
//! - [`Worker`] - trait for the unit of work a [`ServiceManager`](crate::ServiceManager) runs
//! - [`WorkerFn`] - closure-backed implementation
//! - [`WorkerRef`] - shared handle (`Arc<dyn Worker>`)

mod worker;
mod worker_fn;

pub use worker::{BoxWorkerFuture, Worker, WorkerResult};
pub use worker_fn::{WorkerFn, WorkerRef};
