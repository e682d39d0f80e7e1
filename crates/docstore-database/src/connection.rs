//! Client and database handles.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use docstore_core::config::DatabaseConfig;
use docstore_core::error::AppError;
use docstore_core::result::AppResult;
use docstore_core::traits::driver::Driver;
use docstore_hooks::{Middleware, MiddlewareDispatcher, MiddlewareRegistry};

use crate::collection::Collection;

/// Entry point to a document store. Cheap to clone; clones share the
/// driver and the middleware registry.
#[derive(Debug, Clone)]
pub struct Client {
    /// Connection settings.
    config: DatabaseConfig,
    /// The driver delegate.
    driver: Arc<dyn Driver>,
    /// Middleware fired by every collection of this client.
    middleware: Arc<MiddlewareRegistry>,
}

impl Client {
    /// Connect using the driver selected by the URI scheme.
    ///
    /// Only `memory://` is served in-process; network drivers are plugged
    /// in through [`Client::with_driver`].
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            uri = %mask_password(&config.uri),
            database = %config.database,
            "Connecting to document store"
        );

        let driver: Arc<dyn Driver> = match config.scheme() {
            #[cfg(feature = "memory")]
            "memory" => Arc::new(crate::memory::MemoryDriver::new()),
            other => {
                return Err(AppError::configuration(format!(
                    "Unsupported driver scheme '{other}' in {}",
                    mask_password(&config.uri)
                )));
            }
        };

        let client = Self::with_driver(config.clone(), driver);
        let timeout = Duration::from_secs(config.connect_timeout_seconds);
        let healthy = tokio::time::timeout(timeout, client.health_check())
            .await
            .map_err(|_| {
                AppError::deadline_exceeded(format!(
                    "Health check did not complete within {}s",
                    config.connect_timeout_seconds
                ))
            })??;
        if !healthy {
            return Err(AppError::database("Driver health check failed"));
        }

        info!(driver = %client.driver.name(), "Successfully connected to document store");
        Ok(client)
    }

    /// Build a client around an existing driver.
    pub fn with_driver(config: DatabaseConfig, driver: Arc<dyn Driver>) -> Self {
        Self {
            config,
            driver,
            middleware: Arc::new(MiddlewareRegistry::new()),
        }
    }

    /// A handle to a database.
    pub fn database(&self, name: &str) -> Database {
        Database {
            name: name.to_string(),
            driver: Arc::clone(&self.driver),
            middleware: MiddlewareDispatcher::new(Arc::clone(&self.middleware)),
        }
    }

    /// The collection named by the configuration.
    pub fn default_collection(&self) -> Collection {
        self.database(&self.config.database)
            .collection(&self.config.default_collection)
    }

    /// Registers a middleware handler fired by every collection of this
    /// client.
    pub async fn register_middleware(&self, handler: Arc<dyn Middleware>) {
        self.middleware.register(handler).await;
    }

    /// Removes middleware handlers by name. Returns how many were removed.
    pub async fn unregister_middleware(&self, name: &str) -> usize {
        self.middleware.unregister(name).await
    }

    /// The middleware registry.
    pub fn middleware(&self) -> &Arc<MiddlewareRegistry> {
        &self.middleware
    }

    /// Check driver connectivity.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.driver.health_check().await
    }

    /// The driver delegate.
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Connection settings.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

/// A handle to one database of a client.
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    driver: Arc<dyn Driver>,
    middleware: MiddlewareDispatcher,
}

impl Database {
    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A handle to a collection of this database.
    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(
            &self.name,
            name,
            Arc::clone(&self.driver),
            self.middleware.clone(),
        )
    }
}

/// Mask the password portion of a connection URI for safe logging.
fn mask_password(uri: &str) -> String {
    if let Some(at_pos) = uri.find('@') {
        if let Some(colon_pos) = uri[..at_pos].rfind(':') {
            let scheme_end = uri.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &uri[..colon_pos], &uri[at_pos + 1..]);
            }
        }
    }
    uri.to_string()
}
