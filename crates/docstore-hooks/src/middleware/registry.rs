//! Middleware registry: handlers registered by name with priority ordering.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use docstore_core::error::HookError;

use super::definitions::OperationEvent;

/// Trait for middleware handler implementations.
#[async_trait]
pub trait Middleware: Send + Sync + std::fmt::Debug {
    /// Handles one operation stage.
    async fn handle(&self, event: &OperationEvent) -> Result<(), HookError>;

    /// Unique handler name.
    fn name(&self) -> &str;

    /// Returns the priority (lower = runs first).
    fn priority(&self) -> i32 {
        100
    }
}

/// Entry in the middleware registry.
#[derive(Debug)]
struct MiddlewareEntry {
    handler: Arc<dyn Middleware>,
    priority: i32,
    name: String,
}

/// Registry of middleware handlers, sorted by priority.
#[derive(Debug, Default)]
pub struct MiddlewareRegistry {
    handlers: RwLock<Vec<MiddlewareEntry>>,
}

impl MiddlewareRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler. Handlers with equal priority keep registration
    /// order.
    pub async fn register(&self, handler: Arc<dyn Middleware>) {
        let name = handler.name().to_string();
        let priority = handler.priority();

        let mut handlers = self.handlers.write().await;
        handlers.push(MiddlewareEntry {
            handler,
            priority,
            name: name.clone(),
        });
        handlers.sort_by_key(|e| e.priority);

        info!(middleware = %name, priority, "Middleware registered");
    }

    /// Unregisters every handler with the given name. Returns how many were
    /// removed.
    pub async fn unregister(&self, name: &str) -> usize {
        let mut handlers = self.handlers.write().await;
        let before = handlers.len();
        handlers.retain(|e| e.name != name);
        let removed = before - handlers.len();

        info!(middleware = %name, removed, "Middleware unregistered");
        removed
    }

    /// Returns all handlers, sorted by priority.
    pub async fn handlers(&self) -> Vec<Arc<dyn Middleware>> {
        let handlers = self.handlers.read().await;
        handlers.iter().map(|e| e.handler.clone()).collect()
    }

    /// Returns the number of registered handlers.
    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    /// Returns whether no handler is registered.
    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }
}
