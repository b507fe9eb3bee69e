//! Status-fetch port for the remote task endpoint.

use super::TransportResult;
use crate::task::domain::{TaskHandle, TaskSnapshot};
use async_trait::async_trait;

/// Contract for fetching the current status of a remote task.
///
/// Implementations are thin transport collaborators: they call the remote
/// system's task-status endpoint and map the raw response into a
/// [`TaskSnapshot`], running status codes through
/// [`TaskState::from_raw`](crate::task::domain::TaskState::from_raw).
/// Implementations must be safe for concurrent use; the tracker adds no
/// locking of its own.
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    /// Fetches a point-in-time snapshot of the task.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`](super::TransportError) when the remote
    /// task endpoint cannot be reached or its response cannot be
    /// interpreted.
    async fn fetch(&self, handle: &TaskHandle) -> TransportResult<TaskSnapshot>;
}
