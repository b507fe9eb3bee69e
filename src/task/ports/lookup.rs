//! Entity-lookup port for fallback resolution.

use super::TransportResult;
use crate::task::domain::{EntityQuery, ExternalId};
use async_trait::async_trait;

/// Contract for finding an entity through a filtered list call.
///
/// Used only by the fallback resolution strategy, for operations whose
/// completion payload carries no usable identifier. Implementations issue
/// one list call against the target resource collection and apply the
/// query's criteria.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Finds the identifier of the first entity matching `query`.
    ///
    /// Returns `Ok(None)` when no entity matches.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`](super::TransportError) when the remote
    /// list endpoint cannot be reached.
    async fn find(&self, query: &EntityQuery) -> TransportResult<Option<ExternalId>>;
}
