//! Core type definitions used across the docstore workspace.

pub mod document;
pub mod filter;
pub mod operation;
pub mod sorting;

pub use document::{Document, ID_FIELD};
pub use filter::{FilterOp, UpdateOp};
pub use operation::OperationKind;
pub use sorting::{SortDirection, SortField};
