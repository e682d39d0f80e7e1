//! The driver delegate interface.
//!
//! The operation pipelines treat the driver as opaque: they hand it a fully
//! built [`WriteOp`] or [`QuerySpec`] and propagate whatever it returns.
//! Any document-database client that can satisfy these calls plugs in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::AppResult;
use crate::types::document::Document;
use crate::types::sorting::SortField;

/// A write request issued to the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert one document.
    InsertOne {
        /// The document to insert.
        document: Document,
    },
    /// Insert a batch of documents in order.
    InsertMany {
        /// The documents to insert.
        documents: Vec<Document>,
    },
    /// Apply an update to the first matching document.
    UpdateOne {
        /// Selection filter.
        filter: Document,
        /// Update operators.
        update: Document,
    },
    /// Apply an update to every matching document.
    UpdateMany {
        /// Selection filter.
        filter: Document,
        /// Update operators.
        update: Document,
    },
    /// Replace the first matching document, inserting when `upsert` is set
    /// and nothing matches.
    ReplaceOne {
        /// Selection filter.
        filter: Document,
        /// The full replacement document.
        replacement: Document,
        /// Insert the replacement when nothing matches.
        upsert: bool,
    },
    /// Delete the first matching document.
    DeleteOne {
        /// Selection filter.
        filter: Document,
    },
    /// Delete every matching document.
    DeleteMany {
        /// Selection filter.
        filter: Document,
    },
}

impl WriteOp {
    /// Returns the operation name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InsertOne { .. } => "insert_one",
            Self::InsertMany { .. } => "insert_many",
            Self::UpdateOne { .. } => "update_one",
            Self::UpdateMany { .. } => "update_many",
            Self::ReplaceOne { .. } => "replace_one",
            Self::DeleteOne { .. } => "delete_one",
            Self::DeleteMany { .. } => "delete_many",
        }
    }
}

/// Counts reported for update, replace and upsert requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Documents matched by the filter.
    pub matched_count: u64,
    /// Documents actually changed.
    pub modified_count: u64,
    /// Documents inserted by an upsert (0 or 1).
    pub upserted_count: u64,
    /// Primary key of the upserted document.
    pub upserted_id: Option<Value>,
}

/// Counts reported for delete requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// Documents deleted.
    pub deleted_count: u64,
}

/// Outcome of a successful [`WriteOp`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// Primary keys of inserted documents, in request order.
    Inserted(Vec<Value>),
    /// Update, replace or upsert counts.
    Updated(UpdateResult),
    /// Delete counts.
    Deleted(DeleteResult),
}

/// A read request issued to the driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    /// Selection filter.
    pub filter: Document,
    /// Sort order, applied before skip and limit.
    pub sort: Vec<SortField>,
    /// Documents to skip.
    pub skip: u64,
    /// Maximum documents to return.
    pub limit: Option<u64>,
    /// Field projection (`1` includes, `0` excludes).
    pub projection: Option<Document>,
}

impl QuerySpec {
    /// A query selecting documents matching `filter`.
    pub fn new(filter: Document) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// A stream of documents produced by a query.
#[async_trait]
pub trait DocumentCursor: Send {
    /// Fetch the next document, or `None` once exhausted.
    async fn next_document(&mut self) -> AppResult<Option<Document>>;
}

/// The external component that performs the actual database I/O.
#[async_trait]
pub trait Driver: Send + Sync + std::fmt::Debug + 'static {
    /// Driver name for logging.
    fn name(&self) -> &str;

    /// Execute a write request against a collection.
    async fn execute(&self, collection: &str, op: WriteOp) -> AppResult<WriteOutcome>;

    /// Open a cursor over the documents selected by `query`.
    async fn query(&self, collection: &str, query: &QuerySpec)
    -> AppResult<Box<dyn DocumentCursor>>;

    /// Count documents matching `filter`.
    async fn count(&self, collection: &str, filter: &Document) -> AppResult<u64>;

    /// Check connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}
