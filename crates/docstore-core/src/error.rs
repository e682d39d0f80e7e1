//! Unified error types for docstore.
//!
//! Every step of an operation pipeline maps its failure into [`AppError`]
//! so that a call returns exactly one error. Hook implementations return the
//! narrower [`HookError`], which the pipeline carries verbatim as the source
//! of a `BeforeHook` or `AfterHook` error.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across every docstore crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A before-hook or before-stage middleware rejected the operation.
    /// The driver was never called.
    BeforeHook,
    /// An after-hook or after-stage middleware failed. The driver call
    /// already succeeded, so the mutation may have committed.
    AfterHook,
    /// The driver delegate reported a failure.
    Database,
    /// No document matched the filter.
    NotFound,
    /// The caller's operation context was cancelled.
    Cancelled,
    /// The caller's operation deadline elapsed.
    DeadlineExceeded,
    /// A target could not be encoded into or decoded from a document.
    Serialization,
    /// A filter, update or projection was malformed.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// An internal invariant was violated.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeHook => write!(f, "BEFORE_HOOK"),
            Self::AfterHook => write!(f, "AFTER_HOOK"),
            Self::Database => write!(f, "DATABASE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::DeadlineExceeded => write!(f, "DEADLINE_EXCEEDED"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The error a lifecycle hook or middleware handler returns.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    /// The failure reason reported by the hook.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HookError {
    /// Create a hook error with a reason.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a hook error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<AppError> for HookError {
    fn from(err: AppError) -> Self {
        Self::with_source(err.message.clone(), err)
    }
}

/// The unified error returned by every docstore operation.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap a failed before-stage hook. The hook's message is kept as-is.
    pub fn before_hook(err: HookError) -> Self {
        let message = err.message.clone();
        Self::with_source(ErrorKind::BeforeHook, message, err)
    }

    /// Wrap a failed after-stage hook. The hook's message is kept as-is.
    pub fn after_hook(err: HookError) -> Self {
        let message = err.message.clone();
        Self::with_source(ErrorKind::AfterHook, message, err)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cancellation error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Create a deadline error.
    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeadlineExceeded, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns whether this error came from a lifecycle hook or middleware.
    pub fn is_hook_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::BeforeHook | ErrorKind::AfterHook)
    }

    /// Returns whether the caller must treat the operation's completion
    /// state as unknown: the driver succeeded but an after-stage failed.
    pub fn is_commit_unknown(&self) -> bool {
        self.kind == ErrorKind::AfterHook
    }

    /// Returns whether no document matched.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Returns the original [`HookError`] for hook failures.
    pub fn hook_error(&self) -> Option<&HookError> {
        if !self.is_hook_failure() {
            return None;
        }
        self.source.as_ref()?.downcast_ref::<HookError>()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
