//! In-memory document driver backed by dashmap.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use docstore_core::error::AppError;
use docstore_core::result::AppResult;
use docstore_core::traits::driver::{
    DeleteResult, DocumentCursor, Driver, QuerySpec, UpdateResult, WriteOp, WriteOutcome,
};
use docstore_core::types::{Document, ID_FIELD};

use super::matcher::{apply_update, matches, project, sort_documents};

/// A process-local driver. Each collection is an ordered list of documents
/// keyed by its namespace.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    /// Documents per collection namespace, in insertion order.
    collections: Arc<DashMap<String, Vec<Document>>>,
}

impl MemoryDriver {
    /// Creates an empty driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents stored in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// Drops a collection. Returns whether it existed.
    pub fn drop_collection(&self, collection: &str) -> bool {
        let dropped = self.collections.remove(collection).is_some();
        debug!(collection, dropped, "Dropped in-memory collection");
        dropped
    }

    /// Names of every collection holding documents.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    fn name(&self) -> &str {
        "memory"
    }

    async fn execute(&self, collection: &str, op: WriteOp) -> AppResult<WriteOutcome> {
        let mut documents = self.collections.entry(collection.to_string()).or_default();
        apply(documents.value_mut(), op)
    }

    async fn query(
        &self,
        collection: &str,
        query: &QuerySpec,
    ) -> AppResult<Box<dyn DocumentCursor>> {
        let mut selected = Vec::new();
        if let Some(documents) = self.collections.get(collection) {
            for document in documents.iter() {
                if matches(document, &query.filter)? {
                    selected.push(document.clone());
                }
            }
        }

        sort_documents(&mut selected, &query.sort);

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .filter(|limit| *limit > 0)
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        let mut page = VecDeque::new();
        for document in selected.into_iter().skip(skip).take(limit) {
            page.push_back(match &query.projection {
                Some(projection) => project(&document, projection)?,
                None => document,
            });
        }

        Ok(Box::new(VecCursor { documents: page }))
    }

    async fn count(&self, collection: &str, filter: &Document) -> AppResult<u64> {
        let Some(documents) = self.collections.get(collection) else {
            return Ok(0);
        };
        let mut count = 0;
        for document in documents.iter() {
            if matches(document, filter)? {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// A cursor over an already materialized result page.
#[derive(Debug)]
struct VecCursor {
    documents: VecDeque<Document>,
}

#[async_trait]
impl DocumentCursor for VecCursor {
    async fn next_document(&mut self) -> AppResult<Option<Document>> {
        Ok(self.documents.pop_front())
    }
}

fn apply(documents: &mut Vec<Document>, op: WriteOp) -> AppResult<WriteOutcome> {
    match op {
        WriteOp::InsertOne { document } => {
            let id = insert(documents, document)?;
            Ok(WriteOutcome::Inserted(vec![id]))
        }
        WriteOp::InsertMany { documents: batch } => {
            let mut ids = Vec::with_capacity(batch.len());
            for document in batch {
                ids.push(insert(documents, document)?);
            }
            Ok(WriteOutcome::Inserted(ids))
        }
        WriteOp::UpdateOne { filter, update } => update_matching(documents, &filter, &update, 1),
        WriteOp::UpdateMany { filter, update } => {
            update_matching(documents, &filter, &update, usize::MAX)
        }
        WriteOp::ReplaceOne {
            filter,
            replacement,
            upsert,
        } => replace(documents, &filter, replacement, upsert),
        WriteOp::DeleteOne { filter } => delete_matching(documents, &filter, 1),
        WriteOp::DeleteMany { filter } => delete_matching(documents, &filter, usize::MAX),
    }
}

fn insert(documents: &mut Vec<Document>, mut document: Document) -> AppResult<Value> {
    let id = document
        .entry(ID_FIELD.to_string())
        .or_insert_with(|| Value::String(Uuid::now_v7().to_string()))
        .clone();

    if documents.iter().any(|existing| existing.get(ID_FIELD) == Some(&id)) {
        return Err(AppError::database(format!(
            "Duplicate key: a document with _id {id} already exists"
        )));
    }

    documents.push(document);
    Ok(id)
}

fn update_matching(
    documents: &mut [Document],
    filter: &Document,
    update: &Document,
    max: usize,
) -> AppResult<WriteOutcome> {
    let mut result = UpdateResult::default();
    for document in documents.iter_mut() {
        if result.matched_count as usize >= max {
            break;
        }
        if !matches(document, filter)? {
            continue;
        }
        result.matched_count += 1;

        let mut updated = document.clone();
        if apply_update(&mut updated, update)? {
            *document = updated;
            result.modified_count += 1;
        }
    }
    Ok(WriteOutcome::Updated(result))
}

fn replace(
    documents: &mut Vec<Document>,
    filter: &Document,
    mut replacement: Document,
    upsert: bool,
) -> AppResult<WriteOutcome> {
    if let Some(key) = replacement.keys().find(|key| key.starts_with('$')) {
        return Err(AppError::validation(format!(
            "Replacement document must not contain operators, found '{key}'"
        )));
    }

    let mut position = None;
    for (index, document) in documents.iter().enumerate() {
        if matches(document, filter)? {
            position = Some(index);
            break;
        }
    }

    match position {
        Some(index) => {
            let existing = &mut documents[index];
            let id = existing.get(ID_FIELD).cloned().unwrap_or(Value::Null);
            match replacement.get(ID_FIELD) {
                Some(new_id) if *new_id != id => {
                    return Err(AppError::validation(
                        "Replacement would modify the immutable field '_id'",
                    ));
                }
                _ => {
                    replacement.insert(ID_FIELD.to_string(), id);
                }
            }

            let modified = *existing != replacement;
            *existing = replacement;
            Ok(WriteOutcome::Updated(UpdateResult {
                matched_count: 1,
                modified_count: u64::from(modified),
                ..UpdateResult::default()
            }))
        }
        None if upsert => {
            if !replacement.contains_key(ID_FIELD) {
                if let Some(id) = filter.get(ID_FIELD).filter(|id| !id.is_object()) {
                    replacement.insert(ID_FIELD.to_string(), id.clone());
                }
            }
            let id = insert(documents, replacement)?;
            Ok(WriteOutcome::Updated(UpdateResult {
                upserted_count: 1,
                upserted_id: Some(id),
                ..UpdateResult::default()
            }))
        }
        None => Ok(WriteOutcome::Updated(UpdateResult::default())),
    }
}

fn delete_matching(
    documents: &mut Vec<Document>,
    filter: &Document,
    max: usize,
) -> AppResult<WriteOutcome> {
    let mut kept = Vec::with_capacity(documents.len());
    let mut deleted = 0usize;
    for document in documents.drain(..) {
        if deleted < max && matches(&document, filter)? {
            deleted += 1;
        } else {
            kept.push(document);
        }
    }
    *documents = kept;
    Ok(WriteOutcome::Deleted(DeleteResult {
        deleted_count: deleted as u64,
    }))
}
