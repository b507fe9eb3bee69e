//! Remote task completion tracking for Argus.
//!
//! This module awaits asynchronous remote operations to completion: mapping
//! raw status payloads into a canonical state model, polling a task handle
//! until it settles or the local wait budget runs out, classifying remote
//! failures, and resolving the identifier of the entity a successful
//! operation produced. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
