//! # docstore-database
//!
//! Client and collection handles for docstore. Provides:
//!
//! - The write operation pipelines (insert, update, replace, remove, upsert)
//! - The query cursor adapter (`find` then `one`, `all` or `count`)
//! - Result and error assembly shared by every pipeline
//! - An in-memory driver serving `memory://` URIs

pub mod assembler;
pub mod collection;
pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod query;

pub use collection::{Collection, InsertManyResult, InsertOneResult};
pub use connection::{Client, Database};
#[cfg(feature = "memory")]
pub use memory::MemoryDriver;
pub use query::{Query, QueryStage, decode_all, decode_one};
