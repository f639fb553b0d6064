//! # Example: basic_run
//!
//! Minimal example: one worker, no signalers, run to completion.
//!
//! Demonstrates how to:
//! - Define a worker using [`WorkerFn`].
//! - Attach the built-in [`LogWriter`] subscriber.
//! - Drive it with [`ServiceManager::run`] and exit cleanly.
//!
//! ## Flow
//! ```text
//! ServiceManager::run(worker)
//!     ├─► start(): spawn WorkerActor
//!     │     ├─► publish(WorkerStarting)
//!     │     ├─► worker returns Continue, nobody can restart it ─► Dying
//!     │     └─► publish(WorkerExited), report on done channel
//!     └─► wait(): Done ─► cancel signalers ─► publish(ManagerDead)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example basic_run
//! ```

use std::sync::Arc;
use std::time::Duration;

use gracefully::{Action, Config, LogWriter, ServiceManager, Subscribe, WorkerError, WorkerFn, WorkerRef};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Manager with a log subscriber
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mgr = ServiceManager::builder(Config::default())
        .with_subscribers(subs)
        .build();

    // 2. A worker that ticks a few times, then hands control back
    let hello: WorkerRef = WorkerFn::arc("hello", |ctx: CancellationToken| async move {
        for i in 1..=3 {
            if ctx.is_cancelled() {
                tracing::info!("hello cancelled");
                return Ok::<_, WorkerError>(Action::Continue);
            }
            tracing::info!(tick = i, "hello");
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Ok(Action::Continue)
    });

    // 3. No signalers: Continue means "done"
    mgr.run(hello).await?;
    tracing::info!(state = %mgr.state(), "finished");

    // Give the log subscriber a moment to flush
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
