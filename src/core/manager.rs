//! # ServiceManager: one worker, any number of signalers.
//!
//! The [`ServiceManager`] owns the worker's background task, the cancellable
//! context handed to the worker, and the registered [`Signaler`]s. Callers
//! register signalers, `start` the worker, then `wait`.
//!
//! ## High-level architecture
//! ```text
//! add_signaler(s) ──► s.wait_channel() ──► receivers[i]   (wait loop owns them)
//!                                   └────► Registry.active[i], Registry.registered
//!
//! start(worker) ──► tokio::spawn(WorkerActor::run(ctx)) ──► done channel (cap 1)
//!
//! wait():
//!   await ready
//!   loop {
//!     next_wake(receivers, done):
//!       ├─ Control{i, None}      → evict i (swap-remove), keep looping
//!       ├─ Control{i, Some(f)}   → f(&self):
//!       │      ├─ Continue       → nothing
//!       │      ├─ Restart        → Restarting, cancel ctx
//!       │      └─ Stop           → cancel ctx, Dying, cancel signalers,
//!       │                          await done once, leave
//!       └─ Done(result)          → Dying, cancel signalers, leave
//!   }
//!   Dead, return result
//! ```
//!
//! ## Caller contract
//! Register signalers before `start`. Call `start` once, then `wait` once (or
//! `run` once). Re-entry is the caller's responsibility: the channel ends are
//! handed out once, so a second `start` has nothing to launch and does nothing,
//! while a second `wait` (or `wait` without `start`) has nothing to hear from and
//! never returns.
//!
//! Dropping the manager stops its subscriber listener.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::actor::{DoneReceiver, DoneSender, WorkerActor};
use super::registry::Registry;
use super::select::{Wake, next_wake};
use super::state::State;
use crate::{
    error::WorkerError,
    events::{Bus, Event, EventKind},
    signals::{Action, ControlReceiver, Signaler},
    workers::WorkerRef,
};

/// Channel ends handed out once: the launch half to `start`, the wait half to `wait`.
struct Wiring {
    receivers: Vec<ControlReceiver>,
    launch: Option<(DoneSender, oneshot::Sender<()>)>,
    waiting: Option<(DoneReceiver, oneshot::Receiver<()>)>,
}

/// Lifecycle coordinator for a single worker.
pub struct ServiceManager {
    registry: Arc<Registry>,
    bus: Bus,
    wiring: Mutex<Wiring>,
    /// Stops the subscriber listener when the manager goes away.
    listener: CancellationToken,
}

impl ServiceManager {
    /// Creates a manager with the default [`Config`](crate::Config) and no subscribers.
    pub fn new() -> Self {
        super::builder::ServiceManagerBuilder::new(super::Config::default()).build()
    }

    /// Starts building a manager with the given configuration.
    pub fn builder(cfg: super::Config) -> super::builder::ServiceManagerBuilder {
        super::builder::ServiceManagerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(bus: Bus, listener: CancellationToken) -> Self {
        let (done_tx, done_rx) = mpsc::channel(1);
        let (ready_tx, ready_rx) = oneshot::channel();
        Self {
            registry: Arc::new(Registry::new()),
            bus,
            wiring: Mutex::new(Wiring {
                receivers: Vec::new(),
                launch: Some((done_tx, ready_tx)),
                waiting: Some((done_rx, ready_rx)),
            }),
            listener,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.registry.state()
    }

    /// Number of signalers still being selected on.
    pub fn signaler_count(&self) -> usize {
        self.registry.active_len()
    }

    /// Handle to the event bus (for ad-hoc subscriptions).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Registers a signaler. Call before [`ServiceManager::start`].
    ///
    /// A signaler whose channel was already taken is kept only for teardown.
    pub fn add_signaler(&self, signaler: Arc<dyn Signaler>) {
        let rx = signaler.wait_channel();
        let mut wiring = self.lock_wiring();
        let selectable = rx.is_some();
        if let Some(rx) = rx {
            wiring.receivers.push(rx);
        } else {
            tracing::debug!(signaler = signaler.name(), "signaler has no channel; not selectable");
        }
        self.registry.register(signaler, selectable);
    }

    /// Spawns the worker's background task and returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, worker: WorkerRef) {
        let Some((done, ready)) = self.lock_wiring().launch.take() else {
            return;
        };
        let ctx = CancellationToken::new();
        self.registry.install_context(ctx.clone());

        let actor = WorkerActor::new(
            worker,
            Arc::clone(&self.registry),
            self.bus.clone(),
            done,
            ready,
        );
        tokio::spawn(actor.run(ctx));
    }

    /// Runs the wait loop until the worker has terminated.
    ///
    /// Returns the worker's final result verbatim, or [`WorkerError::Aborted`]
    /// if the worker task disappeared without reporting.
    pub async fn wait(&self) -> Result<(), WorkerError> {
        let (mut receivers, waiting) = {
            let mut wiring = self.lock_wiring();
            (std::mem::take(&mut wiring.receivers), wiring.waiting.take())
        };
        let Some((mut done, ready)) = waiting else {
            return std::future::pending().await;
        };
        let _ = ready.await;

        let mut turn: usize = 0;
        let result = loop {
            turn = turn.wrapping_add(1);
            match next_wake(&mut receivers, &mut done, turn).await {
                Wake::Control {
                    index,
                    control: None,
                } => {
                    receivers.swap_remove(index);
                    let name = self.registry.evict(index);
                    tracing::debug!(signaler = &*name, remaining = receivers.len(), "signaler evicted");
                    self.bus
                        .publish(Event::new(EventKind::SignalerEvicted).with_signaler(name));
                }
                Wake::Control {
                    index,
                    control: Some(control),
                } => {
                    let name = self.registry.active_name(index);
                    match control(self) {
                        Action::Continue => {}
                        Action::Restart => self.restart(name),
                        Action::Stop => {
                            self.stop(name);
                            self.cancel_signalers();
                            break settle(done.recv().await);
                        }
                    }
                }
                Wake::Done(res) => {
                    self.registry.set_state(State::Dying);
                    self.cancel_signalers();
                    break settle(res);
                }
            }
        };

        self.registry.set_state(State::Dead);
        let mut dead = Event::new(EventKind::ManagerDead);
        if let Err(e) = &result {
            dead = dead.with_reason(e.to_string());
        }
        self.bus.publish(dead);
        result
    }

    /// `start` followed by `wait`.
    pub async fn run(&self, worker: WorkerRef) -> Result<(), WorkerError> {
        self.start(worker);
        self.wait().await
    }

    fn restart(&self, signaler: Arc<str>) {
        if self.registry.request_restart() {
            self.bus.publish(
                Event::new(EventKind::RestartRequested)
                    .with_signaler(signaler)
                    .with_action(Action::Restart),
            );
        } else {
            tracing::debug!(signaler = &*signaler, "restart ignored; manager not live");
        }
    }

    fn stop(&self, signaler: Arc<str>) {
        self.registry.wind_down();
        self.bus.publish(
            Event::new(EventKind::StopRequested)
                .with_signaler(signaler)
                .with_action(Action::Stop),
        );
    }

    /// Cancels every registered signaler once, evicted or not.
    fn cancel_signalers(&self) {
        let all = self.registry.drain_registered();
        for signaler in &all {
            signaler.cancel();
        }
        self.bus.publish(
            Event::new(EventKind::SignalersCancelled).with_reason(all.len().to_string()),
        );
    }

    fn lock_wiring(&self) -> MutexGuard<'_, Wiring> {
        self.wiring.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Drop for ServiceManager {
    fn drop(&mut self) {
        self.listener.cancel();
    }
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Final result from a completion read; a closed channel means the task vanished.
fn settle(res: Option<Result<(), WorkerError>>) -> Result<(), WorkerError> {
    res.unwrap_or(Err(WorkerError::Aborted))
}
