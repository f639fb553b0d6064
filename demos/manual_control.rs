//! # Example: manual_control
//!
//! Drives a worker from another task through a [`ManualSignal`]: two restarts,
//! then a stop.
//!
//! ## Flow
//! ```text
//! admin task                 wait loop                    worker task
//! ──────────                 ─────────                    ───────────
//! restart() ───────────────► Restarting, cancel ctx ────► returns Continue
//!                                                         fresh ctx, attempt 2
//! restart() ───────────────► Restarting, cancel ctx ────► returns Continue
//!                                                         fresh ctx, attempt 3
//! stop()    ───────────────► Dying, cancel ctx ─────────► returns Continue, exits
//!                            cancel signalers, Dead
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example manual_control
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use gracefully::{
    Action, Config, LogWriter, ManualSignal, ServiceManager, Subscribe, WorkerError, WorkerFn,
    WorkerRef,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mgr = ServiceManager::builder(Config::default())
        .with_subscribers(subs)
        .build();

    let admin = Arc::new(ManualSignal::new());
    mgr.add_signaler(admin.clone());

    // State that survives restarts lives outside the closure's future
    let generation = Arc::new(AtomicU32::new(0));
    let server: WorkerRef = WorkerFn::arc("server", move |ctx: CancellationToken| {
        let generation = generation.clone();
        async move {
            let g = generation.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(generation = g, "serving");
            ctx.cancelled().await;
            tracing::info!(generation = g, "draining");
            Ok::<_, WorkerError>(Action::Continue)
        }
    });

    mgr.start(server);

    tokio::spawn(async move {
        for _ in 0..2 {
            tokio::time::sleep(Duration::from_millis(300)).await;
            admin.restart().await;
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
        admin.stop().await;
    });

    mgr.wait().await?;
    tracing::info!(state = %mgr.state(), "finished");
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
