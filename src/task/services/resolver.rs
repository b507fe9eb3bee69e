//! Resolution service that extracts entity identifiers from completed
//! snapshots.

use crate::task::{
    domain::{
        EntityKind, EntityQuery, ExternalId, ResolutionStrategy, TaskDomainError, TaskSnapshot,
    },
    ports::{EntityLookup, TransportError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolutionError>;

/// Errors returned while resolving an entity identifier from a completed
/// task.
///
/// Every variant means the remote operation itself succeeded; only the
/// identifier of what it produced could not be determined.
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    /// The completion details carry no entry under the requested key.
    #[error("completion details carry no {key:?} entry")]
    MissingDetail {
        /// The key the strategy asked for.
        key: String,
    },

    /// The completion detail exists but is not a JSON string.
    #[error("completion detail {key:?} is not text")]
    DetailNotText {
        /// The key the strategy asked for.
        key: String,
    },

    /// The affected-entities list has no entry at the requested index.
    #[error("no affected entity at index {index}; the task reported {available}")]
    EntityIndexOutOfRange {
        /// The position the strategy asked for.
        index: usize,
        /// How many entities the snapshot actually carries.
        available: usize,
    },

    /// No affected entity carries the requested kind.
    #[error("no affected entity of kind {kind}")]
    NoEntityOfKind {
        /// The kind the strategy asked for.
        kind: EntityKind,
    },

    /// The fallback lookup found nothing matching the query.
    #[error("fallback lookup matched no entity where {query}")]
    NoLookupMatch {
        /// The query the lookup ran.
        query: EntityQuery,
    },

    /// The fallback lookup failed at the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The extracted identifier failed domain validation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
}

/// Resolves the identifier of the entity a completed task produced.
///
/// The remote API is inconsistent about where, and whether, a completion
/// payload names the entity it created, so extraction policy is supplied
/// per call as a [`ResolutionStrategy`] rather than fixed per task kind.
#[derive(Clone)]
pub struct EntityResolver<L>
where
    L: EntityLookup,
{
    lookup: Arc<L>,
}

impl<L> EntityResolver<L>
where
    L: EntityLookup,
{
    /// Creates a resolver over the given lookup port.
    #[must_use]
    pub const fn new(lookup: Arc<L>) -> Self {
        Self { lookup }
    }

    /// Resolves the identifier named by `strategy` from `snapshot`.
    ///
    /// Only [`ResolutionStrategy::LookupFallback`] touches the lookup
    /// port; every other strategy reads the already-fetched snapshot.
    /// [`ResolutionStrategy::CompletionOnly`] resolves to `None`.
    ///
    /// # Errors
    ///
    /// Returns the strategy-specific [`ResolutionError`] when the snapshot
    /// does not carry the requested identifier, and
    /// [`ResolutionError::Transport`] when the fallback lookup fails.
    pub async fn resolve(
        &self,
        snapshot: &TaskSnapshot,
        strategy: &ResolutionStrategy,
    ) -> ResolveResult<Option<ExternalId>> {
        match strategy {
            ResolutionStrategy::CompletionOnly => Ok(None),
            ResolutionStrategy::CompletionDetail { key } => {
                Self::from_completion_detail(snapshot, key).map(Some)
            }
            ResolutionStrategy::AffectedEntityAt { index } => {
                Self::from_entity_at(snapshot, *index).map(Some)
            }
            ResolutionStrategy::AffectedEntityOfKind { kind } => {
                Self::from_entity_of_kind(snapshot, kind).map(Some)
            }
            ResolutionStrategy::LookupFallback { query } => {
                self.from_lookup(snapshot, query).await.map(Some)
            }
        }
    }

    fn from_completion_detail(snapshot: &TaskSnapshot, key: &str) -> ResolveResult<ExternalId> {
        let value = snapshot
            .completion_detail(key)
            .ok_or_else(|| ResolutionError::MissingDetail { key: key.to_owned() })?;
        let text = value
            .as_str()
            .ok_or_else(|| ResolutionError::DetailNotText { key: key.to_owned() })?;
        Ok(ExternalId::new(text)?)
    }

    fn from_entity_at(snapshot: &TaskSnapshot, index: usize) -> ResolveResult<ExternalId> {
        let entities = snapshot.affected_entities();
        let available = entities.len();
        entities
            .get(index)
            .map(|entity| entity.ext_id().clone())
            .ok_or(ResolutionError::EntityIndexOutOfRange { index, available })
    }

    fn from_entity_of_kind(
        snapshot: &TaskSnapshot,
        kind: &EntityKind,
    ) -> ResolveResult<ExternalId> {
        snapshot
            .affected_entities()
            .iter()
            .find(|entity| entity.kind() == kind)
            .map(|entity| entity.ext_id().clone())
            .ok_or_else(|| ResolutionError::NoEntityOfKind { kind: kind.clone() })
    }

    async fn from_lookup(
        &self,
        snapshot: &TaskSnapshot,
        query: &EntityQuery,
    ) -> ResolveResult<ExternalId> {
        debug!(
            handle = %snapshot.handle(),
            query = %query,
            "completion payload names no entity; falling back to a lookup"
        );
        let found = self.lookup.find(query).await?;
        found.ok_or_else(|| ResolutionError::NoLookupMatch {
            query: query.clone(),
        })
    }
}
