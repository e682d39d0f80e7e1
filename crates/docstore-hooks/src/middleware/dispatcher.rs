//! Middleware dispatcher. Fires every registered handler for one stage.
//!
//! For before stages:
//! - Handlers are called in priority order.
//! - The first failure stops the chain and aborts the operation.
//!
//! For after stages:
//! - Every handler is called regardless of individual failures.
//! - The first failure is reported once all handlers ran.

use std::sync::Arc;

use tracing::{debug, warn};

use docstore_core::error::HookError;

use super::definitions::OperationEvent;
use super::registry::MiddlewareRegistry;
use crate::capability::Stage;

/// Dispatches operation stages to registered middleware.
#[derive(Debug, Clone, Default)]
pub struct MiddlewareDispatcher {
    registry: Arc<MiddlewareRegistry>,
}

impl MiddlewareDispatcher {
    /// Creates a dispatcher over a registry.
    pub fn new(registry: Arc<MiddlewareRegistry>) -> Self {
        Self { registry }
    }

    /// Fires one stage. Returns the first handler failure.
    pub async fn dispatch(&self, event: &OperationEvent) -> Result<(), HookError> {
        let handlers = self.registry.handlers().await;
        if handlers.is_empty() {
            return Ok(());
        }

        debug!(
            capability = %event.capability,
            operation = %event.operation,
            handler_count = handlers.len(),
            "Dispatching middleware"
        );

        let mut first_failure = None;

        for handler in &handlers {
            if let Err(err) = handler.handle(event).await {
                match event.stage() {
                    Stage::Before => {
                        debug!(
                            capability = %event.capability,
                            middleware = %handler.name(),
                            reason = %err,
                            "Middleware halted operation"
                        );
                        return Err(err);
                    }
                    Stage::After => {
                        warn!(
                            capability = %event.capability,
                            middleware = %handler.name(),
                            reason = %err,
                            "Middleware failed after driver call"
                        );
                        if first_failure.is_none() {
                            first_failure = Some(err);
                        }
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns a reference to the middleware registry.
    pub fn registry(&self) -> &Arc<MiddlewareRegistry> {
        &self.registry
    }
}
