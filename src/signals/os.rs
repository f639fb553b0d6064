//! # OS signal adapter.
//!
//! [`OsSignals`] listens for operating-system signals and turns each one into a
//! control function that looks the signal up in a [`SignalTable`] when the
//! manager evaluates it.
//!
//! ## Defaults
//! [`SignalTable::default`]:
//! - `SIGINT`  → [`Action::Stop`]
//! - `SIGTERM` → [`Action::Stop`]
//! - `SIGHUP`  → [`Action::Restart`]
//!
//! ## Platforms
//! **Unix:** every [`OsSignal`] is available through [`tokio::signal::unix`].
//!
//! **Other platforms:** only [`OsSignal::Interrupt`] (via [`tokio::signal::ctrl_c`]);
//! other entries fail with [`SignalError::Unsupported`].
//!
//! ## Background work
//! One listener task per table entry. Each exits when the signaler is cancelled,
//! when its channel was closed, or when the OS stream ends.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::base::BaseSignaler;
use super::control::{Action, Control, ControlReceiver};
use super::signaler::Signaler;
use crate::error::SignalError;

/// Operating-system signals understood by [`OsSignals`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OsSignal {
    /// `SIGINT` (Ctrl-C).
    Interrupt,
    /// `SIGTERM` (default kill signal, systemd/Kubernetes stop).
    Terminate,
    /// `SIGHUP` (conventionally "reload").
    Hangup,
    /// `SIGQUIT`.
    Quit,
    /// `SIGUSR1`.
    User1,
    /// `SIGUSR2`.
    User2,
}

impl OsSignal {
    /// Conventional signal name.
    pub fn as_str(self) -> &'static str {
        match self {
            OsSignal::Interrupt => "SIGINT",
            OsSignal::Terminate => "SIGTERM",
            OsSignal::Hangup => "SIGHUP",
            OsSignal::Quit => "SIGQUIT",
            OsSignal::User1 => "SIGUSR1",
            OsSignal::User2 => "SIGUSR2",
        }
    }

    #[cfg(unix)]
    fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            OsSignal::Interrupt => SignalKind::interrupt(),
            OsSignal::Terminate => SignalKind::terminate(),
            OsSignal::Hangup => SignalKind::hangup(),
            OsSignal::Quit => SignalKind::quit(),
            OsSignal::User1 => SignalKind::user_defined1(),
            OsSignal::User2 => SignalKind::user_defined2(),
        }
    }
}

impl fmt::Display for OsSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping of OS signal → action, passed to [`OsSignals::new`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalTable {
    actions: HashMap<OsSignal, Action>,
}

impl SignalTable {
    /// Table with no entries.
    pub fn empty() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Adds (or replaces) an entry, builder style.
    #[must_use]
    pub fn with(mut self, signal: OsSignal, action: Action) -> Self {
        self.actions.insert(signal, action);
        self
    }

    /// Adds (or replaces) an entry.
    pub fn set(&mut self, signal: OsSignal, action: Action) {
        self.actions.insert(signal, action);
    }

    /// Action configured for `signal`.
    pub fn action(&self, signal: OsSignal) -> Option<Action> {
        self.actions.get(&signal).copied()
    }

    /// Signals present in the table (unordered).
    pub fn signals(&self) -> impl Iterator<Item = OsSignal> + '_ {
        self.actions.keys().copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for SignalTable {
    fn default() -> Self {
        Self::empty()
            .with(OsSignal::Interrupt, Action::Stop)
            .with(OsSignal::Terminate, Action::Stop)
            .with(OsSignal::Hangup, Action::Restart)
    }
}

impl FromIterator<(OsSignal, Action)> for SignalTable {
    fn from_iter<I: IntoIterator<Item = (OsSignal, Action)>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

/// Signaler fed by operating-system signals.
pub struct OsSignals {
    base: Arc<BaseSignaler>,
    table: Arc<SignalTable>,
}

impl OsSignals {
    /// Registers a handler for every signal in `table` and starts listening.
    ///
    /// Must be called from within a tokio runtime. Registration errors are
    /// returned before any listener is spawned.
    pub fn new(table: SignalTable) -> Result<Self, SignalError> {
        let mut listeners = Vec::with_capacity(table.len());
        for signal in table.signals() {
            listeners.push((signal, Listener::register(signal)?));
        }

        let base = Arc::new(BaseSignaler::new());
        let table = Arc::new(table);
        for (signal, listener) in listeners {
            tokio::spawn(listen(signal, listener, base.clone(), table.clone()));
        }
        tracing::debug!(signals = table.len(), "os signal listeners started");

        Ok(Self { base, table })
    }

    /// Same as `OsSignals::new(SignalTable::default())`.
    pub fn with_defaults() -> Result<Self, SignalError> {
        Self::new(SignalTable::default())
    }

    /// The table this adapter consults.
    pub fn table(&self) -> &SignalTable {
        &self.table
    }

    /// Retires this signaler without requesting any action.
    pub fn close(&self) {
        self.base.close();
    }

    /// Feeds `signal` through the same path as a delivery from the OS.
    #[cfg(test)]
    pub(crate) async fn deliver(&self, signal: OsSignal) -> bool {
        forward(signal, &self.base, &self.table).await
    }
}

impl Signaler for OsSignals {
    fn wait_channel(&self) -> Option<ControlReceiver> {
        self.base.wait_channel()
    }

    fn cancel(&self) {
        self.base.cancel();
    }

    fn name(&self) -> &str {
        "os-signals"
    }
}

/// Lookup deferred to evaluation time; unknown signals mean "carry on".
fn lookup(signal: OsSignal, table: Arc<SignalTable>) -> Control {
    Box::new(move |_| table.action(signal).unwrap_or(Action::Continue))
}

async fn forward(signal: OsSignal, base: &BaseSignaler, table: &Arc<SignalTable>) -> bool {
    tracing::debug!(%signal, "os signal received");
    base.signal(lookup(signal, table.clone())).await
}

async fn listen(
    signal: OsSignal,
    mut listener: Listener,
    base: Arc<BaseSignaler>,
    table: Arc<SignalTable>,
) {
    loop {
        tokio::select! {
            _ = base.cancelled() => break,
            got = listener.recv() => match got {
                Some(()) => {
                    if !forward(signal, &base, &table).await {
                        break;
                    }
                }
                None => break,
            },
        }
    }
    tracing::debug!(%signal, "os signal listener exited");
}

#[cfg(unix)]
struct Listener(tokio::signal::unix::Signal);

#[cfg(unix)]
impl Listener {
    fn register(signal: OsSignal) -> Result<Self, SignalError> {
        tokio::signal::unix::signal(signal.kind())
            .map(Listener)
            .map_err(|source| SignalError::Register { signal, source })
    }

    async fn recv(&mut self) -> Option<()> {
        self.0.recv().await
    }
}

#[cfg(not(unix))]
struct Listener;

#[cfg(not(unix))]
impl Listener {
    fn register(signal: OsSignal) -> Result<Self, SignalError> {
        match signal {
            OsSignal::Interrupt => Ok(Listener),
            other => Err(SignalError::Unsupported { signal: other }),
        }
    }

    async fn recv(&mut self) -> Option<()> {
        tokio::signal::ctrl_c().await.ok()
    }
}
