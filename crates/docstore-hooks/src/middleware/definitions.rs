//! The event payload passed to middleware handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docstore_core::types::OperationKind;

use crate::capability::{Capability, Stage};

/// Describes the stage of an operation a middleware handler is fired for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationEvent {
    /// The capability whose stage is being fired.
    pub capability: Capability,
    /// The operation being executed.
    pub operation: OperationKind,
    /// Collection the operation targets.
    pub collection: String,
    /// Number of documents in the target (1 for single-document and
    /// filter-only operations).
    pub documents: usize,
    /// When the stage was reached.
    pub timestamp: DateTime<Utc>,
}

impl OperationEvent {
    /// Creates an event for a single-document operation stage.
    pub fn new(capability: Capability, operation: OperationKind, collection: &str) -> Self {
        Self {
            capability,
            operation,
            collection: collection.to_string(),
            documents: 1,
            timestamp: Utc::now(),
        }
    }

    /// Sets the document count.
    pub fn with_documents(mut self, documents: usize) -> Self {
        self.documents = documents;
        self
    }

    /// The stage being fired.
    pub fn stage(&self) -> Stage {
        self.capability.stage()
    }
}
