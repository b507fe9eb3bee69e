//! In-memory implementation of the `TaskStatusSource` port.
//!
//! Provides a simple, thread-safe status source for unit testing
//! without a remote endpoint. Not suitable for production use.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use crate::task::{
    domain::{TaskHandle, TaskSnapshot, TaskState},
    ports::{TaskStatusSource, TransportError, TransportResult},
};

/// In-memory implementation of [`TaskStatusSource`].
///
/// Each handle carries a scripted queue of fetch outcomes, consumed in
/// order. The final outcome is sticky: once the queue is down to one
/// entry, every further fetch repeats it, so a single `Running` entry
/// scripts a task that never settles and a single failure scripts a
/// transport that never recovers. Fetching a handle with no script fails
/// as unavailable.
///
/// Thread-safe via internal [`RwLock`]. Suitable for unit tests only.
///
/// # Example
///
/// ```
/// use argus::task::adapters::memory::InMemoryTaskStatusSource;
///
/// let source = InMemoryTaskStatusSource::new();
/// // Script fetch outcomes per handle in tests...
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskStatusSource {
    store: Arc<RwLock<StatusStore>>,
}

#[derive(Debug, Default)]
struct StatusStore {
    scripts: HashMap<TaskHandle, VecDeque<TransportResult<TaskSnapshot>>>,
    fetch_counts: HashMap<TaskHandle, u64>,
}

impl InMemoryTaskStatusSource {
    /// Creates a source with no scripted handles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one fetch outcome to a handle's script.
    ///
    /// Does nothing if the internal lock is poisoned; by then another
    /// test thread has already panicked.
    pub fn enqueue(&self, handle: &TaskHandle, outcome: TransportResult<TaskSnapshot>) {
        if let Ok(mut guard) = self.store.write() {
            guard
                .scripts
                .entry(handle.clone())
                .or_default()
                .push_back(outcome);
        }
    }

    /// Appends a successful fetch of `snapshot` to its handle's script.
    pub fn enqueue_snapshot(&self, snapshot: TaskSnapshot) {
        let handle = snapshot.handle().clone();
        self.enqueue(&handle, Ok(snapshot));
    }

    /// Appends bare snapshots for each state in turn.
    ///
    /// Convenience for cadence tests that care only about the state
    /// sequence; richer snapshots go through [`Self::enqueue_snapshot`].
    pub fn enqueue_states(
        &self,
        handle: &TaskHandle,
        states: impl IntoIterator<Item = TaskState>,
    ) {
        for state in states {
            self.enqueue_snapshot(TaskSnapshot::new(handle.clone(), state, Utc::now()));
        }
    }

    /// Appends bare snapshots for each raw status code in turn.
    ///
    /// Codes map through [`TaskState::from_raw`], unrecognised ones
    /// included.
    pub fn enqueue_raw_codes(&self, handle: &TaskHandle, codes: impl IntoIterator<Item = i64>) {
        self.enqueue_states(handle, codes.into_iter().map(TaskState::from_raw));
    }

    /// Appends a transport failure to a handle's script.
    pub fn enqueue_failure(&self, handle: &TaskHandle, error: TransportError) {
        self.enqueue(handle, Err(error));
    }

    /// Returns how many fetches a handle has served.
    ///
    /// Returns `0` if the internal lock is poisoned, matching the fallback
    /// behaviour of an unfetched handle.
    #[must_use]
    pub fn fetch_count(&self, handle: &TaskHandle) -> u64 {
        self.store
            .read()
            .map(|guard| guard.fetch_counts.get(handle).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl TaskStatusSource for InMemoryTaskStatusSource {
    async fn fetch(&self, handle: &TaskHandle) -> TransportResult<TaskSnapshot> {
        let mut guard = self
            .store
            .write()
            .map_err(|e| TransportError::runtime(std::io::Error::other(e.to_string())))?;

        *guard.fetch_counts.entry(handle.clone()).or_default() += 1;

        let script = guard.scripts.get_mut(handle).ok_or_else(|| {
            TransportError::Unavailable(format!("no status scripted for task {handle}"))
        })?;

        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.unwrap_or_else(|| {
            Err(TransportError::Unavailable(format!(
                "status script for task {handle} is empty"
            )))
        })
    }
}
