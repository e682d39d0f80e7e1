//! Stage runner and result assembly shared by every operation pipeline.
//!
//! Each call moves through at most three awaited steps: the before stage,
//! the driver call and the after stage. Whichever step fails first decides
//! the single error the call returns, so a before-stage error always wins
//! over a driver error, and a driver error over an after-stage error.

use std::sync::Arc;

use tracing::{debug, warn};

use docstore_core::context::OpContext;
use docstore_core::error::{AppError, HookError};
use docstore_core::result::AppResult;
use docstore_core::traits::driver::{DeleteResult, Driver, UpdateResult, WriteOp, WriteOutcome};
use docstore_core::types::OperationKind;
use docstore_hooks::{Capability, Hook, MiddlewareDispatcher, OperationEvent, invoke};

/// Runs the stages of one operation against one collection.
#[derive(Debug)]
pub(crate) struct StageRunner<'c> {
    ctx: &'c OpContext,
    middleware: &'c MiddlewareDispatcher,
    operation: OperationKind,
    collection: &'c str,
    documents: usize,
}

impl<'c> StageRunner<'c> {
    /// Creates a runner for one call.
    pub(crate) fn new(
        ctx: &'c OpContext,
        middleware: &'c MiddlewareDispatcher,
        operation: OperationKind,
        collection: &'c str,
    ) -> Self {
        Self {
            ctx,
            middleware,
            operation,
            collection,
            documents: 1,
        }
    }

    /// Sets the number of documents the operation carries.
    pub(crate) fn with_documents(mut self, documents: usize) -> Self {
        self.documents = documents;
        self
    }

    /// Fires one stage: the per-call hook first, then client middleware.
    ///
    /// An absent hook or a hook that does not expose `capability` is
    /// skipped silently.
    pub(crate) async fn fire(
        &self,
        hook: Option<&mut (dyn Hook + '_)>,
        capability: Capability,
    ) -> AppResult<()> {
        if let Some(hook) = hook {
            let invocation = self
                .ctx
                .run(async { Ok::<_, AppError>(invoke(hook, capability).await) })
                .await?;

            let fired = invocation.fired();
            invocation
                .into_result()
                .map_err(|err| self.hook_failure(capability, err))?;
            debug!(
                operation = %self.operation,
                collection = %self.collection,
                capability = %capability,
                fired,
                "Hook stage passed"
            );
        }

        let event = OperationEvent::new(capability, self.operation, self.collection)
            .with_documents(self.documents);
        let dispatched = self
            .ctx
            .run(async { Ok::<_, AppError>(self.middleware.dispatch(&event).await) })
            .await?;

        dispatched.map_err(|err| self.hook_failure(capability, err))
    }

    /// Issues a write request to the driver, bounded by the call context.
    pub(crate) async fn execute(
        &self,
        driver: &Arc<dyn Driver>,
        op: WriteOp,
    ) -> AppResult<WriteOutcome> {
        let request = op.name();
        debug!(
            operation = %self.operation,
            collection = %self.collection,
            driver = %driver.name(),
            request,
            "Delegating to driver"
        );

        let outcome = self.ctx.run(driver.execute(self.collection, op)).await;
        if let Err(e) = &outcome {
            debug!(
                operation = %self.operation,
                collection = %self.collection,
                error = %e,
                "Driver call failed"
            );
        }
        outcome
    }

    /// Awaits any other driver step through the call context.
    pub(crate) async fn run<T, F>(&self, step: F) -> AppResult<T>
    where
        F: std::future::Future<Output = AppResult<T>>,
    {
        self.ctx.run(step).await
    }

    fn hook_failure(&self, capability: Capability, err: HookError) -> AppError {
        if capability.is_before() {
            debug!(
                operation = %self.operation,
                collection = %self.collection,
                capability = %capability,
                reason = %err,
                "Before stage rejected operation"
            );
            AppError::before_hook(err)
        } else {
            warn!(
                operation = %self.operation,
                collection = %self.collection,
                capability = %capability,
                reason = %err,
                "After stage failed; the driver call already succeeded"
            );
            AppError::after_hook(err)
        }
    }
}

/// Extracts inserted primary keys from a driver outcome.
pub(crate) fn expect_inserted(outcome: WriteOutcome) -> AppResult<Vec<serde_json::Value>> {
    match outcome {
        WriteOutcome::Inserted(ids) => Ok(ids),
        other => Err(mismatched("insert", &other)),
    }
}

/// Extracts update counts from a driver outcome.
pub(crate) fn expect_updated(outcome: WriteOutcome) -> AppResult<UpdateResult> {
    match outcome {
        WriteOutcome::Updated(result) => Ok(result),
        other => Err(mismatched("update", &other)),
    }
}

/// Extracts delete counts from a driver outcome.
pub(crate) fn expect_deleted(outcome: WriteOutcome) -> AppResult<DeleteResult> {
    match outcome {
        WriteOutcome::Deleted(result) => Ok(result),
        other => Err(mismatched("delete", &other)),
    }
}

/// Reports a zero-document match as `NotFound` for operations that target
/// exactly one existing document.
pub(crate) fn require_match(operation: OperationKind, matched: u64) -> AppResult<()> {
    if matched == 0 && operation.requires_match() {
        return Err(AppError::not_found(format!(
            "{operation}: no document matched the filter"
        )));
    }
    Ok(())
}

fn mismatched(expected: &str, outcome: &WriteOutcome) -> AppError {
    AppError::internal(format!(
        "Driver returned {outcome:?} for an {expected} request"
    ))
}
