//! Adapters implementing the task ports.
//!
//! This module provides concrete implementations of the task module's port
//! contracts, following hexagonal architecture principles. Adapters handle
//! all infrastructure concerns while the domain remains pure.
//!
//! # Available Adapters
//!
//! - [`memory::InMemoryTaskStatusSource`]: Thread-safe scripted status
//!   source for unit testing
//! - [`memory::InMemoryEntityLookup`]: Thread-safe entity directory for
//!   unit testing

pub mod memory;
