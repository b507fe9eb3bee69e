//! In-memory adapters for the task ports.

mod lookup;
mod status;

pub use lookup::InMemoryEntityLookup;
pub use status::InMemoryTaskStatusSource;
