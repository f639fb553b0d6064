//! # Worker abstraction.
//!
//! A worker receives a [`CancellationToken`] (its execution context) and returns
//! an [`Action`] or a [`WorkerError`]:
//!
//! | Return               | Worker loop does                                                  |
//! |----------------------|-------------------------------------------------------------------|
//! | `Ok(Continue)`       | defers to the manager: waits for restart/stop, or exits if orphaned |
//! | `Ok(Restart)`        | runs again immediately with a fresh context                       |
//! | `Ok(Stop)`           | exits                                                             |
//! | `Err(e)`             | exits; `e` is what `wait` returns                                 |
//!
//! The context is cancelled on every restart and on stop. Cancellation is
//! advisory: the worker should notice it and return soon.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::signals::Action;

/// Outcome of one worker invocation.
pub type WorkerResult = Result<Action, WorkerError>;

/// Boxed future returned by [`Worker::spawn`].
pub type BoxWorkerFuture = Pin<Box<dyn Future<Output = WorkerResult> + Send + 'static>>;

/// # Cancellable unit of work.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use gracefully::{Action, BoxWorkerFuture, Worker};
///
/// struct Heartbeat;
///
/// impl Worker for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     fn spawn(&self, ctx: CancellationToken) -> BoxWorkerFuture {
///         Box::pin(async move {
///             ctx.cancelled().await;
///             Ok::<_, gracefully::WorkerError>(Action::Continue)
///         })
///     }
/// }
/// ```
pub trait Worker: Send + Sync + 'static {
    /// Stable, human-readable name.
    fn name(&self) -> &str;

    /// Creates the future for one invocation under `ctx`.
    fn spawn(&self, ctx: CancellationToken) -> BoxWorkerFuture;
}
