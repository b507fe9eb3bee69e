//! Result-resolution strategies and the fallback lookup query.

use super::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter criteria for a fallback list lookup.
///
/// The predicate of a fallback resolution expressed as data, so it can
/// cross the lookup port and be rendered into whatever filter syntax the
/// remote list endpoint expects. At least one criterion is always set;
/// every set criterion must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQuery {
    name: Option<String>,
    kind: Option<EntityKind>,
}

impl EntityQuery {
    /// Creates a query matching entities by name.
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: None,
        }
    }

    /// Creates a query matching entities by kind.
    #[must_use]
    pub const fn of_kind(kind: EntityKind) -> Self {
        Self {
            name: None,
            kind: Some(kind),
        }
    }

    /// Adds a name criterion.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a kind criterion.
    #[must_use]
    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Returns the name criterion, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the kind criterion, if set.
    #[must_use]
    pub const fn kind(&self) -> Option<&EntityKind> {
        self.kind.as_ref()
    }

    /// Returns whether an entity with the given name and kind satisfies
    /// every set criterion.
    #[must_use]
    pub fn matches(&self, name: &str, kind: &EntityKind) -> bool {
        let name_matches = self.name.as_deref().is_none_or(|wanted| wanted == name);
        let kind_matches = self.kind.as_ref().is_none_or(|wanted| wanted == kind);
        name_matches && kind_matches
    }
}

impl fmt::Display for EntityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote_criterion = false;
        if let Some(name) = &self.name {
            write!(f, "name == \"{name}\"")?;
            wrote_criterion = true;
        }
        if let Some(kind) = &self.kind {
            if wrote_criterion {
                f.write_str(" and ")?;
            }
            write!(f, "kind == \"{kind}\"")?;
        }
        Ok(())
    }
}

/// How to find the result identifier once a task has succeeded.
///
/// The remote API's success payload shape differs by operation type, so
/// each call site picks the strategy matching its operation. This is a
/// deliberate seam, not an accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Wait for completion only; no identifier is extracted.
    ///
    /// Update and delete operations already know their entity and use this
    /// to observe completion without touching the payload.
    CompletionOnly,

    /// Read the identifier stored under `key` in the completion details.
    CompletionDetail {
        /// Completion-detail key holding the identifier.
        key: String,
    },

    /// Read the identifier of the affected entity at a fixed position.
    AffectedEntityAt {
        /// Zero-based position in the affected-entities list.
        index: usize,
    },

    /// Read the identifier of the first affected entity of a given kind.
    AffectedEntityOfKind {
        /// Kind label to match.
        kind: EntityKind,
    },

    /// Issue a secondary list call through the lookup collaborator.
    ///
    /// Used when the task payload carries no usable identifier at all; the
    /// remote API is inconsistent about including one, and this works
    /// around it uniformly.
    LookupFallback {
        /// Filter for the list call.
        query: EntityQuery,
    },
}

impl ResolutionStrategy {
    /// Creates a completion-detail strategy.
    #[must_use]
    pub fn completion_detail(key: impl Into<String>) -> Self {
        Self::CompletionDetail { key: key.into() }
    }

    /// Creates a positional affected-entity strategy.
    #[must_use]
    pub const fn affected_entity_at(index: usize) -> Self {
        Self::AffectedEntityAt { index }
    }

    /// Creates a kind-filtered affected-entity strategy.
    #[must_use]
    pub const fn affected_entity_of_kind(kind: EntityKind) -> Self {
        Self::AffectedEntityOfKind { kind }
    }

    /// Creates a fallback lookup strategy.
    #[must_use]
    pub const fn lookup_fallback(query: EntityQuery) -> Self {
        Self::LookupFallback { query }
    }
}
