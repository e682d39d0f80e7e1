//! Database configuration.

use serde::{Deserialize, Serialize};

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URI. The scheme selects the driver (`memory://` for the
    /// bundled in-memory driver).
    pub uri: String,
    /// Database opened by `Client::default_collection`.
    #[serde(default = "default_database")]
    pub database: String,
    /// Collection returned by `Client::default_collection`.
    #[serde(default = "default_collection")]
    pub default_collection: String,
    /// Bound on the connect-time health check, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Configuration for the in-memory driver.
    pub fn memory(database: impl Into<String>) -> Self {
        Self {
            uri: "memory://".to_string(),
            database: database.into(),
            default_collection: default_collection(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }

    /// The URI scheme, without `://`.
    pub fn scheme(&self) -> &str {
        self.uri
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .unwrap_or("")
    }
}

fn default_database() -> String {
    "docstore".to_string()
}

fn default_collection() -> String {
    "documents".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}
