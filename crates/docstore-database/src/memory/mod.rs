//! In-memory driver implementation.
//!
//! Serves `memory://` URIs so collections and their hook pipelines can be
//! exercised without a database server.

pub mod matcher;
pub mod store;

pub use store::MemoryDriver;
