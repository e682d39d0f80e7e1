//! Core traits defined in `docstore-core` and implemented by driver crates.

pub mod driver;

pub use driver::{
    DeleteResult, DocumentCursor, Driver, QuerySpec, UpdateResult, WriteOp, WriteOutcome,
};
