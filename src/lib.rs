//! Argus: completion tracking for asynchronous remote operations.
//!
//! This crate awaits the long-running tasks a remote infrastructure API
//! hands back for mutating requests, polling each task handle until the
//! operation settles and resolving the identifier of the entity it
//! produced.
//!
//! # Architecture
//!
//! Argus follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory doubles)
//!
//! # Modules
//!
//! - [`task`]: Status mapping, polling, classification, and resolution

pub mod task;
