//! # gracefully
//!
//! **gracefully** runs one long-lived async worker and lets any number of
//! pluggable *signalers* (OS signals, admin hooks, test drivers) restart or
//! stop it, with every background task torn down when the manager finishes.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │  OsSignals   │   │ ManualSignal │   │ custom impl  │
//!   │ (SIGINT ...) │   │ (stop/restart│   │  Signaler    │
//!   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!          │ Control          │ Control          │ Control
//!          ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ServiceManager::wait (single wait loop)                          │
//! │  - selects over every active channel + the completion channel     │
//! │  - evaluates Control(&manager) ─► Continue | Restart | Stop       │
//! │  - evicts signalers whose channel closed                          │
//! └──────┬─────────────────────────────────────────────▲──────────────┘
//!        │ cancel context                               │ done (once)
//!        ▼                                              │
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  WorkerActor (background task)                                    │
//! │  loop { worker.spawn(ctx) ─► Action | error ─► fresh ctx or exit }│
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ publish
//!        ▼
//!    Bus (broadcast) ──► subscriber listener ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ### Lifecycle
//! ```text
//! Unconfigured ─► New ─► Running ◄──► Restarting
//!                          │             │
//!                          └──► Dying ◄──┘ ─► Dead
//! ```
//! - `Running → Restarting`: a signaler returned `Restart`; the context is cancelled.
//! - `Restarting → Running`: the worker task installed a fresh context and runs again.
//! - `→ Dying`: a signaler returned `Stop`, the worker returned `Stop` or an error,
//!   or the worker returned `Continue` with no signalers left to drive it.
//! - `Dying → Dead`: the worker has reported; all signalers have been cancelled.
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Manager**       | Run a worker, wait for it, tear everything down.              | [`ServiceManager`], [`State`]               |
//! | **Workers**       | Define the worker as a closure or a type.                     | [`Worker`], [`WorkerFn`], [`WorkerRef`]     |
//! | **Signalers**     | Sources of restart/stop decisions.                            | [`Signaler`], [`ManualSignal`], [`OsSignals`] |
//! | **Controls**      | Deferred, state-aware decisions.                              | [`Action`], [`Control`], [`control`]        |
//! | **Subscriber API**| Observe lifecycle events (logging, metrics, tests).           | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed worker and signal-registration errors.                  | [`WorkerError`], [`SignalError`]            |
//! | **Configuration** | Bus and control channel sizing.                               | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use gracefully::{Action, ManualSignal, ServiceManager, State, WorkerError, WorkerFn, WorkerRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), WorkerError> {
//!     let mgr = Arc::new(ServiceManager::new());
//!     let admin = Arc::new(ManualSignal::new());
//!     mgr.add_signaler(admin.clone());
//!
//!     // Serve until the context is cancelled, then let the manager decide.
//!     let server: WorkerRef = WorkerFn::arc("server", |ctx: CancellationToken| async move {
//!         ctx.cancelled().await;
//!         Ok::<_, WorkerError>(Action::Continue)
//!     });
//!
//!     mgr.start(server);
//!     admin.stop().await;
//!     mgr.wait().await?;
//!
//!     assert_eq!(mgr.state(), State::Dead);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod signals;
mod subscribers;
mod workers;

// ---- Public re-exports ----

pub use core::{Config, ServiceManager, ServiceManagerBuilder, State};
pub use error::{SignalError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use signals::control;
pub use signals::{
    Action, BaseSignaler, Control, ControlReceiver, ControlSender, ManualSignal, OsSignal,
    OsSignals, SignalTable, Signaler,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use workers::{BoxWorkerFuture, Worker, WorkerFn, WorkerRef, WorkerResult};
