//! Port contracts for remote-task completion tracking.
//!
//! Ports define the transport-agnostic interfaces the tracker's services
//! poll and resolve through.

pub mod lookup;
pub mod status;
pub mod transport;

pub use lookup::EntityLookup;
pub use status::TaskStatusSource;
pub use transport::{TransportError, TransportResult};
