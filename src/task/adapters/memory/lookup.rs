//! In-memory implementation of the `EntityLookup` port.
//!
//! Provides a simple, thread-safe entity directory for unit testing
//! without a remote endpoint. Not suitable for production use.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::task::{
    domain::{EntityKind, EntityQuery, ExternalId},
    ports::{EntityLookup, TransportError, TransportResult},
};

/// In-memory implementation of [`EntityLookup`].
///
/// Registered entries are matched against queries in registration order;
/// the first match wins. Injected failures are served before any matching,
/// one per find, oldest first.
///
/// Thread-safe via internal [`RwLock`]. Suitable for unit tests only.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEntityLookup {
    store: Arc<RwLock<DirectoryStore>>,
}

#[derive(Debug, Default)]
struct DirectoryStore {
    entries: Vec<DirectoryEntry>,
    failures: VecDeque<TransportError>,
    find_count: u64,
}

#[derive(Debug)]
struct DirectoryEntry {
    name: String,
    kind: EntityKind,
    ext_id: ExternalId,
}

impl InMemoryEntityLookup {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity under a name and kind.
    ///
    /// Does nothing if the internal lock is poisoned; by then another
    /// test thread has already panicked.
    pub fn register(&self, name: impl Into<String>, kind: EntityKind, ext_id: ExternalId) {
        if let Ok(mut guard) = self.store.write() {
            guard.entries.push(DirectoryEntry {
                name: name.into(),
                kind,
                ext_id,
            });
        }
    }

    /// Queues a transport failure to serve before the next match attempt.
    pub fn inject_failure(&self, error: TransportError) {
        if let Ok(mut guard) = self.store.write() {
            guard.failures.push_back(error);
        }
    }

    /// Returns how many finds the directory has served.
    ///
    /// Returns `0` if the internal lock is poisoned, matching the fallback
    /// behaviour of an unused directory.
    #[must_use]
    pub fn find_count(&self) -> u64 {
        self.store
            .read()
            .map(|guard| guard.find_count)
            .unwrap_or(0)
    }
}

#[async_trait]
impl EntityLookup for InMemoryEntityLookup {
    async fn find(&self, query: &EntityQuery) -> TransportResult<Option<ExternalId>> {
        let mut guard = self
            .store
            .write()
            .map_err(|e| TransportError::runtime(std::io::Error::other(e.to_string())))?;

        guard.find_count += 1;

        if let Some(failure) = guard.failures.pop_front() {
            return Err(failure);
        }

        Ok(guard
            .entries
            .iter()
            .find(|entry| query.matches(&entry.name, &entry.kind))
            .map(|entry| entry.ext_id.clone()))
    }
}
