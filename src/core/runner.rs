//! # Run a single worker invocation.
//!
//! Executes one call of a [`Worker`] under the given context and publishes the
//! outcome to the [`Bus`].
//!
//! ## Event flow
//! ```text
//! Return:
//!   worker.spawn(ctx) → Ok(action) → publish WorkerReturned
//!
//! Failure:
//!   worker.spawn(ctx) → Err(e)     → publish WorkerFailed
//!
//! Panic (building or polling the future):
//!   caught → Err(Panicked)         → publish WorkerFailed
//! ```

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{WorkerError, panic_message},
    events::{Bus, Event, EventKind},
    workers::{Worker, WorkerResult},
};

/// Executes one invocation of `worker`, publishing its outcome to `bus`.
pub(crate) async fn run_once(
    worker: &dyn Worker,
    ctx: CancellationToken,
    attempt: u64,
    bus: &Bus,
) -> WorkerResult {
    let res = match std::panic::catch_unwind(AssertUnwindSafe(|| worker.spawn(ctx))) {
        Ok(fut) => match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => Err(panicked(&*panic)),
        },
        Err(panic) => Err(panicked(&*panic)),
    };

    match &res {
        Ok(action) => bus.publish(
            Event::new(EventKind::WorkerReturned)
                .with_worker(worker.name())
                .with_attempt(attempt)
                .with_action(*action),
        ),
        Err(e) => bus.publish(
            Event::new(EventKind::WorkerFailed)
                .with_worker(worker.name())
                .with_attempt(attempt)
                .with_reason(e.to_string()),
        ),
    }
    res
}

fn panicked(payload: &(dyn std::any::Any + Send)) -> WorkerError {
    WorkerError::Panicked {
        info: panic_message(payload),
    }
}
