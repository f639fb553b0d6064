//! # WorkerActor: the background task hosting the worker.
//!
//! Runs the worker repeatedly under a context the wait loop can cancel, and
//! reports the final result exactly once on the completion channel.
//!
//! ## Architecture
//! ```text
//! start() ──► tokio::spawn(WorkerActor::run(ctx))
//!
//! state = Running, notify ready
//! loop {
//!   ├─► attempt += 1, publish WorkerStarting
//!   ├─► run_once(worker, ctx)
//!   │       ├─ Err(e)          → wind_down (Dying)            → exit Err(e)
//!   │       ├─ Ok(Stop)        → wind_down (Dying)            → exit Ok
//!   │       ├─ Ok(Restart)     → replace_context              → next attempt (exit if Dying)
//!   │       └─ Ok(Continue)    → settle (Dying if no signalers)
//!   │                              ├─ Running → await ctx cancelled | orphaned, settle again
//!   │                              ├─ Running/Restarting → replace_context → next attempt
//!   │                              └─ otherwise → exit Ok
//! }
//! done.send(result)   (capacity 1, never blocks)
//! ```
//!
//! ## Rules
//! - One actor per manager; attempts never overlap.
//! - A worker error supersedes the action it came with.
//! - The wait loop is never notified of `Restarting → Running`.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::{registry::Registry, runner::run_once, state::State};
use crate::{
    error::WorkerError,
    events::{Bus, Event, EventKind},
    signals::Action,
    workers::{WorkerRef, WorkerResult},
};

/// Sending half of the completion channel.
pub(crate) type DoneSender = mpsc::Sender<Result<(), WorkerError>>;

/// Receiving half of the completion channel.
pub(crate) type DoneReceiver = mpsc::Receiver<Result<(), WorkerError>>;

/// What the actor does after one invocation.
enum Step {
    /// Run again under this fresh context.
    Again(CancellationToken),
    /// Leave the loop with this result.
    Exit(Result<(), WorkerError>),
}

/// Hosts one worker for the lifetime of its manager.
pub(crate) struct WorkerActor {
    worker: WorkerRef,
    registry: Arc<Registry>,
    bus: Bus,
    done: DoneSender,
    ready: oneshot::Sender<()>,
}

impl WorkerActor {
    pub(crate) fn new(
        worker: WorkerRef,
        registry: Arc<Registry>,
        bus: Bus,
        done: DoneSender,
        ready: oneshot::Sender<()>,
    ) -> Self {
        Self {
            worker,
            registry,
            bus,
            done,
            ready,
        }
    }

    /// Runs the worker loop until it exits, then reports the result.
    pub(crate) async fn run(self, ctx: CancellationToken) {
        let Self {
            worker,
            registry,
            bus,
            done,
            ready,
        } = self;

        registry.set_state(State::Running);
        let _ = ready.send(());

        let mut ctx = ctx;
        let mut attempt: u64 = 0;
        let result = loop {
            attempt += 1;
            bus.publish(
                Event::new(EventKind::WorkerStarting)
                    .with_worker(worker.name())
                    .with_attempt(attempt),
            );

            let outcome = run_once(worker.as_ref(), ctx.clone(), attempt, &bus).await;
            match next_step(&registry, outcome, &ctx).await {
                Step::Again(fresh) => {
                    ctx = fresh;
                    bus.publish(
                        Event::new(EventKind::ContextReplaced)
                            .with_worker(worker.name())
                            .with_attempt(attempt + 1),
                    );
                }
                Step::Exit(res) => break res,
            }
        };
        registry.release_context();

        let mut exited = Event::new(EventKind::WorkerExited)
            .with_worker(worker.name())
            .with_attempt(attempt);
        if let Err(e) = &result {
            exited = exited.with_reason(e.to_string());
        }
        bus.publish(exited);
        tracing::debug!(worker = worker.name(), attempt, ok = result.is_ok(), "worker loop exited");

        let _ = done.send(result).await;
    }
}

/// Decides what follows one invocation, given what the worker returned and
/// what the manager has decided meanwhile.
async fn next_step(registry: &Registry, outcome: WorkerResult, ctx: &CancellationToken) -> Step {
    match outcome {
        Err(e) => {
            registry.wind_down();
            Step::Exit(Err(e))
        }
        Ok(Action::Stop) => {
            registry.wind_down();
            Step::Exit(Ok(()))
        }
        Ok(Action::Restart) => again_or_exit(registry),
        Ok(Action::Continue) => {
            let mut state = registry.settle();
            if state == State::Running {
                tokio::select! {
                    _ = ctx.cancelled() => {}
                    _ = registry.orphaned() => {}
                }
                state = registry.settle();
            }
            if state.is_live() {
                again_or_exit(registry)
            } else {
                Step::Exit(Ok(()))
            }
        }
    }
}

fn again_or_exit(registry: &Registry) -> Step {
    match registry.replace_context() {
        Some(fresh) => Step::Again(fresh),
        None => Step::Exit(Ok(())),
    }
}
