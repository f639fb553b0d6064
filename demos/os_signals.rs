//! # Example: os_signals
//!
//! A worker controlled by the process's signals through [`OsSignals`]:
//! - `SIGHUP` restarts it (reload),
//! - `SIGINT` / `SIGTERM` stop it.
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example os_signals
//! # in another shell:
//! kill -HUP <pid>     # restart
//! kill -TERM <pid>    # stop
//! ```

use std::sync::Arc;
use std::time::Duration;

use gracefully::{
    Action, Config, LogWriter, OsSignals, ServiceManager, Subscribe, WorkerError, WorkerFn,
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

    let signals = OsSignals::with_defaults()?;
    let table = signals.table();
    for signal in table.signals() {
        if let Some(action) = table.action(signal) {
            tracing::info!(%signal, %action, "signal mapped");
        }
    }
    mgr.add_signaler(Arc::new(signals));

    let ticker: WorkerRef = WorkerFn::arc("ticker", |ctx: CancellationToken| async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok::<_, WorkerError>(Action::Continue),
                _ = interval.tick() => tracing::info!(pid = std::process::id(), "tick"),
            }
        }
    });

    mgr.run(ticker).await?;
    tracing::info!(state = %mgr.state(), "finished");
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
