//! Point-in-time task snapshot and affected-entity records.

use super::{EntityKind, ExternalId, TaskHandle, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One entity a task created, modified, or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedEntity {
    ext_id: ExternalId,
    kind: EntityKind,
}

impl AffectedEntity {
    /// Creates an affected-entity record.
    #[must_use]
    pub const fn new(ext_id: ExternalId, kind: EntityKind) -> Self {
        Self { ext_id, kind }
    }

    /// Returns the entity's external identifier.
    #[must_use]
    pub const fn ext_id(&self) -> &ExternalId {
        &self.ext_id
    }

    /// Returns the entity's kind label.
    #[must_use]
    pub const fn kind(&self) -> &EntityKind {
        &self.kind
    }
}

/// Immutable point-in-time read of a remote task.
///
/// Produced by the transport on every status fetch and discarded after
/// resolution; the tracker keeps no snapshot history beyond the last
/// accepted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    handle: TaskHandle,
    state: TaskState,
    progress_percent: Option<u8>,
    error_messages: Vec<String>,
    affected_entities: Vec<AffectedEntity>,
    completion_details: BTreeMap<String, Value>,
    observed_at: DateTime<Utc>,
}

impl TaskSnapshot {
    /// Creates a snapshot with no progress, messages, entities, or details.
    #[must_use]
    pub const fn new(handle: TaskHandle, state: TaskState, observed_at: DateTime<Utc>) -> Self {
        Self {
            handle,
            state,
            progress_percent: None,
            error_messages: Vec::new(),
            affected_entities: Vec::new(),
            completion_details: BTreeMap::new(),
            observed_at,
        }
    }

    /// Sets the reported progress percentage.
    #[must_use]
    pub const fn with_progress_percent(mut self, percent: u8) -> Self {
        self.progress_percent = Some(percent);
        self
    }

    /// Sets the remote error messages.
    #[must_use]
    pub fn with_error_messages(mut self, messages: impl IntoIterator<Item = String>) -> Self {
        self.error_messages = messages.into_iter().collect();
        self
    }

    /// Sets the affected-entity list.
    #[must_use]
    pub fn with_affected_entities(
        mut self,
        entities: impl IntoIterator<Item = AffectedEntity>,
    ) -> Self {
        self.affected_entities = entities.into_iter().collect();
        self
    }

    /// Adds one completion-detail entry, replacing any existing value for
    /// the key.
    #[must_use]
    pub fn with_completion_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.completion_details.insert(key.into(), value);
        self
    }

    /// Returns the handle of the observed task.
    #[must_use]
    pub const fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    /// Returns the observed state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the reported progress percentage, when present.
    #[must_use]
    pub const fn progress_percent(&self) -> Option<u8> {
        self.progress_percent
    }

    /// Returns the remote error messages in reported order.
    #[must_use]
    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    /// Returns the affected entities in reported order.
    #[must_use]
    pub fn affected_entities(&self) -> &[AffectedEntity] {
        &self.affected_entities
    }

    /// Returns all completion details.
    #[must_use]
    pub const fn completion_details(&self) -> &BTreeMap<String, Value> {
        &self.completion_details
    }

    /// Returns the completion-detail value stored under `key`, if any.
    #[must_use]
    pub fn completion_detail(&self, key: &str) -> Option<&Value> {
        self.completion_details.get(key)
    }

    /// Returns when the snapshot was taken.
    #[must_use]
    pub const fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}
