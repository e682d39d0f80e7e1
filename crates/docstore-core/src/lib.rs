//! # docstore-core
//!
//! Core crate for docstore. Contains the driver delegate traits,
//! configuration schemas, document and operation types, the per-call
//! operation context, and the unified error system.
//!
//! This crate has **no** internal dependencies on other docstore crates.

pub mod config;
pub mod context;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use context::OpContext;
pub use error::{AppError, ErrorKind, HookError};
pub use result::AppResult;
