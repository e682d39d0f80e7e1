//! Operation kinds issued through a collection.

use serde::{Deserialize, Serialize};

/// Every operation a collection exposes, as named in logs and middleware
/// events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Insert a single document.
    InsertOne,
    /// Insert a batch of documents.
    InsertMany,
    /// Update the first document matching a filter.
    UpdateOne,
    /// Update a document by primary key.
    UpdateId,
    /// Update every document matching a filter.
    UpdateAll,
    /// Replace the first document matching a filter.
    ReplaceOne,
    /// Remove the first document matching a filter.
    Remove,
    /// Remove a document by primary key.
    RemoveId,
    /// Remove every document matching a filter.
    RemoveAll,
    /// Replace-or-insert on a filter.
    Upsert,
    /// Replace-or-insert on a primary key.
    UpsertId,
    /// Fetch a single document.
    FindOne,
    /// Fetch every matching document.
    FindAll,
    /// Count matching documents.
    Count,
}

impl OperationKind {
    /// Returns the string name of this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsertOne => "insert_one",
            Self::InsertMany => "insert_many",
            Self::UpdateOne => "update_one",
            Self::UpdateId => "update_id",
            Self::UpdateAll => "update_all",
            Self::ReplaceOne => "replace_one",
            Self::Remove => "remove",
            Self::RemoveId => "remove_id",
            Self::RemoveAll => "remove_all",
            Self::Upsert => "upsert",
            Self::UpsertId => "upsert_id",
            Self::FindOne => "find_one",
            Self::FindAll => "find_all",
            Self::Count => "count",
        }
    }

    /// Returns whether a zero-document match is reported as `NotFound`.
    pub fn requires_match(&self) -> bool {
        matches!(
            self,
            Self::UpdateOne
                | Self::UpdateId
                | Self::ReplaceOne
                | Self::Remove
                | Self::RemoveId
                | Self::FindOne
        )
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
