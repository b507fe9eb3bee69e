//! Error types for task domain validation, parsing, and classification.

use super::{TaskHandle, TaskSnapshot, TaskState};
use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task handle is empty after trimming.
    #[error("task handle must not be empty")]
    EmptyTaskHandle,

    /// The entity identifier is empty after trimming.
    #[error("entity identifier must not be empty")]
    EmptyExternalId,

    /// The entity kind label is empty after trimming.
    #[error("entity kind must not be empty")]
    EmptyEntityKind,
}

/// Error returned while parsing task states from their canonical labels.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);

/// Classified failure of a remote operation.
///
/// Built from the final snapshot of a task that reported [`TaskState::Failed`]
/// or [`TaskState::Canceled`]. The message is the first non-blank error
/// message the remote system supplied, or [`TaskError::FALLBACK_MESSAGE`]
/// when it supplied none. The tracker never retries a classified failure;
/// resubmitting the original mutating request is the caller's decision.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "remote task {handle} ended in state {state} at {}% progress: {message}",
    .progress_percent.unwrap_or(0)
)]
pub struct TaskError {
    handle: TaskHandle,
    state: TaskState,
    message: String,
    progress_percent: Option<u8>,
}

impl TaskError {
    /// Message substituted when the remote system reports no error text.
    pub const FALLBACK_MESSAGE: &'static str = "unknown error";

    /// Classifies the final snapshot of a settled task.
    ///
    /// Picks the first non-blank entry of the snapshot's error messages,
    /// trimmed; an empty or all-blank sequence classifies as
    /// [`Self::FALLBACK_MESSAGE`] rather than being indexed unchecked.
    #[must_use]
    pub fn from_snapshot(snapshot: &TaskSnapshot) -> Self {
        let message = snapshot
            .error_messages()
            .iter()
            .map(|entry| entry.trim())
            .find(|entry| !entry.is_empty())
            .map_or_else(|| Self::FALLBACK_MESSAGE.to_owned(), ToOwned::to_owned);

        Self {
            handle: snapshot.handle().clone(),
            state: snapshot.state(),
            message,
            progress_percent: snapshot.progress_percent(),
        }
    }

    /// Returns the handle of the failed task.
    #[must_use]
    pub const fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    /// Returns the terminal state the task reported.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the classified error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the progress percentage the task reached, when reported.
    #[must_use]
    pub const fn progress_percent(&self) -> Option<u8> {
        self.progress_percent
    }
}
