//! Per-call operation context carrying the caller's cancellation signal and
//! optional deadline.
//!
//! The pipeline never creates deadlines of its own. It awaits every driver
//! call and hook invocation through [`OpContext::run`], so whatever bound the
//! caller attached applies to each blocking step of the operation.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::result::AppResult;

/// Ambient cancellation context for a single operation.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    /// Cancelled by the caller to abandon the operation.
    cancel: CancellationToken,
    /// Absolute point in time after which pending steps fail.
    deadline: Option<Instant>,
}

impl OpContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context bound to the given cancellation token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancel: token,
            deadline: None,
        }
    }

    /// Returns a copy of this context that expires after `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns a copy of this context that expires at `deadline`.
    ///
    /// An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// The cancellation token observed by this context.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns whether the caller cancelled this context.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Awaits one step of an operation, failing early if the context is
    /// cancelled or its deadline passes first.
    pub async fn run<T, F>(&self, step: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(AppError::cancelled("Operation context cancelled"));
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, step)
                    .await
                    .map_err(|_| AppError::deadline_exceeded("Operation deadline exceeded"))?,
                None => step.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::cancelled("Operation context cancelled")),
            result = bounded => result,
        }
    }
}
