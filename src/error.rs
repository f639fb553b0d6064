//! Error types used by the service manager and its signal adapters.
//!
//! This module defines two enums:
//!
//! - [`WorkerError`] errors produced by the supervised worker and surfaced by
//!   [`ServiceManager::wait`](crate::ServiceManager::wait).
//! - [`SignalError`] errors raised while setting up the OS signal adapter.
//!
//! There is deliberately no error for coordination misuse (e.g. calling `wait`
//! before `start`): those are caller-contract violations.
//!
//! Both types provide `as_label` / `as_message` helpers for logs and metrics.

use thiserror::Error;

use crate::signals::OsSignal;

/// # Errors produced by the worker.
///
/// A worker error ends the worker loop immediately, regardless of the action the
/// worker returned, and is handed to the caller of `wait`/`run` unchanged.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker reported a failure with a message.
    #[error("worker failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Worker failed with a foreign error type.
    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Worker panicked; the panic was caught by the hosting task.
    #[error("worker panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// The worker task ended without reporting a result (e.g. the runtime shut down).
    #[error("worker task aborted before reporting completion")]
    Aborted,
}

impl WorkerError {
    /// Shorthand for [`WorkerError::Fail`].
    ///
    /// # Example
    /// ```
    /// use gracefully::WorkerError;
    ///
    /// let err = WorkerError::fail("disk full");
    /// assert_eq!(err.to_string(), "worker failed: disk full");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        WorkerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use gracefully::WorkerError;
    ///
    /// assert_eq!(WorkerError::fail("boom").as_label(), "worker_failed");
    /// assert_eq!(WorkerError::Aborted.as_label(), "worker_aborted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Source(_) => "worker_source",
            WorkerError::Panicked { .. } => "worker_panicked",
            WorkerError::Aborted => "worker_aborted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkerError::Fail { error } => format!("error: {error}"),
            WorkerError::Source(e) => format!("error: {e}"),
            WorkerError::Panicked { info } => format!("panic: {info}"),
            WorkerError::Aborted => "aborted".to_string(),
        }
    }

    /// True if the worker panicked.
    pub fn is_panic(&self) -> bool {
        matches!(self, WorkerError::Panicked { .. })
    }
}

/// # Errors produced while wiring OS signals.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SignalError {
    /// Installing the OS handler for `signal` failed.
    #[error("failed to register handler for {signal}: {source}")]
    Register {
        /// Signal that could not be registered.
        signal: OsSignal,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The signal is not available on this platform.
    #[error("signal {signal} is not supported on this platform")]
    Unsupported {
        /// Signal requested by the table.
        signal: OsSignal,
    },
}

impl SignalError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SignalError::Register { .. } => "signal_register",
            SignalError::Unsupported { .. } => "signal_unsupported",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SignalError::Register { signal, source } => {
                format!("register {signal}: {source}")
            }
            SignalError::Unsupported { signal } => format!("unsupported: {signal}"),
        }
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
