//! Domain model for remote-task completion tracking.
//!
//! The task domain models status mapping, snapshot values, resolution
//! strategies, and failure classification while keeping all transport
//! concerns outside of the domain boundary.

mod error;
mod ids;
mod snapshot;
mod state;
mod strategy;

pub use error::{ParseTaskStateError, TaskDomainError, TaskError};
pub use ids::{EntityKind, ExternalId, TaskHandle};
pub use snapshot::{AffectedEntity, TaskSnapshot};
pub use state::TaskState;
pub use strategy::{EntityQuery, ResolutionStrategy};
