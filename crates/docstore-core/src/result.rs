//! Convenience result type alias for docstore.

use crate::error::AppError;

/// A specialized `Result` type for docstore operations.
///
/// Every pipeline step, driver call and configuration loader returns this
/// so that failures flow through `?` as a single [`AppError`].
pub type AppResult<T> = Result<T, AppError>;
