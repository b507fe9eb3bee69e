//! Transport-level failures shared by the status and lookup ports.

use crate::task::domain::{TaskHandle, TaskState};
use std::sync::Arc;
use thiserror::Error;

/// Result type for transport-backed port operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Failures reaching or understanding the remote system.
///
/// A transport failure while checking status is never conflated with the
/// remote operation itself failing; the poller retries these a bounded
/// number of times before escalating.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The remote endpoint could not be reached.
    #[error("remote endpoint unavailable: {0}")]
    Unavailable(String),

    /// The remote response could not be interpreted.
    #[error("malformed remote payload: {0}")]
    MalformedPayload(String),

    /// A snapshot moved the task backwards through its lifecycle.
    ///
    /// Synthesised by the poller when a fetched snapshot violates forward
    /// progress; a regression is a protocol violation by the transport, not
    /// a real state change, and is treated as transient.
    #[error("task {handle} reported {to} after {from}, violating forward progress")]
    StateRegression {
        /// Handle of the polled task.
        handle: TaskHandle,
        /// Last accepted state.
        from: TaskState,
        /// Regressed state the transport reported.
        to: TaskState,
    },

    /// Transport-layer runtime failure.
    #[error("transport runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wraps a runtime error.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
