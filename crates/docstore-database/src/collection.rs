//! Collection handle and the write operation pipelines.
//!
//! Every write runs the same three steps: fire the family's before stage,
//! delegate to the driver, fire the family's after stage. Targets are
//! borrowed mutably so a before-hook may change them, and they are
//! serialized only once the before stage has returned.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use docstore_core::context::OpContext;
use docstore_core::error::AppError;
use docstore_core::result::AppResult;
use docstore_core::traits::driver::{DeleteResult, Driver, UpdateResult, WriteOp};
use docstore_core::types::document::{expect_document, id_filter, to_document};
use docstore_core::types::{Document, OperationKind};
use docstore_hooks::{
    BatchHook, Capability, FindOptions, Hook, HookSlot, InsertManyOptions, InsertOneOptions,
    MiddlewareDispatcher, RemoveOptions, ReplaceOptions, UpdateOptions, UpsertOptions,
};

use crate::assembler::{
    StageRunner, expect_deleted, expect_inserted, expect_updated, require_match,
};
use crate::query::Query;

/// Result of `insert_one`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertOneResult {
    /// Primary key of the inserted document.
    pub inserted_id: Value,
}

/// Result of `insert_many`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertManyResult {
    /// Primary keys of the inserted documents, in batch order.
    pub inserted_ids: Vec<Value>,
}

/// A handle to one collection. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Collection {
    /// Collection name.
    name: String,
    /// Owning database name.
    database: String,
    /// `database.collection`, the key the driver sees.
    namespace: String,
    /// The driver delegate.
    pub(crate) driver: Arc<dyn Driver>,
    /// Client-scoped middleware.
    pub(crate) middleware: MiddlewareDispatcher,
}

impl Collection {
    pub(crate) fn new(
        database: &str,
        name: &str,
        driver: Arc<dyn Driver>,
        middleware: MiddlewareDispatcher,
    ) -> Self {
        Self {
            name: name.to_string(),
            database: database.to_string(),
            namespace: format!("{database}.{name}"),
            driver,
            middleware,
        }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The `database.collection` namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub(crate) fn stages<'c>(
        &'c self,
        ctx: &'c OpContext,
        operation: OperationKind,
    ) -> StageRunner<'c> {
        StageRunner::new(ctx, &self.middleware, operation, &self.namespace)
    }

    /// Inserts one document.
    pub async fn insert_one<T>(
        &self,
        ctx: &OpContext,
        document: &mut T,
        mut opts: InsertOneOptions<'_>,
    ) -> AppResult<InsertOneResult>
    where
        T: Serialize + Hook,
    {
        let stages = self.stages(ctx, OperationKind::InsertOne);

        fire_slot(&stages, &mut opts.insert_hook, document, Capability::BeforeInsert).await?;

        let op = WriteOp::InsertOne {
            document: to_document(document)?,
        };
        let inserted_id = expect_inserted(stages.execute(&self.driver, op).await?)?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("Driver reported no inserted id"))?;

        fire_slot(&stages, &mut opts.insert_hook, document, Capability::AfterInsert).await?;

        debug!(collection = %self.namespace, id = %inserted_id, "Inserted document");
        Ok(InsertOneResult { inserted_id })
    }

    /// Inserts a batch of documents in order. Hooks fire once for the whole
    /// batch.
    pub async fn insert_many<T>(
        &self,
        ctx: &OpContext,
        documents: &mut [T],
        mut opts: InsertManyOptions<'_>,
    ) -> AppResult<InsertManyResult>
    where
        T: Serialize + Hook,
    {
        if documents.is_empty() {
            return Err(AppError::validation("insert_many requires at least one document"));
        }

        let stages = self
            .stages(ctx, OperationKind::InsertMany)
            .with_documents(documents.len());

        fire_batch(&stages, &mut opts.insert_hook, documents, Capability::BeforeInsert).await?;

        let op = WriteOp::InsertMany {
            documents: documents
                .iter()
                .map(to_document)
                .collect::<AppResult<Vec<_>>>()?,
        };
        let inserted_ids = expect_inserted(stages.execute(&self.driver, op).await?)?;

        fire_batch(&stages, &mut opts.insert_hook, documents, Capability::AfterInsert).await?;

        debug!(
            collection = %self.namespace,
            count = inserted_ids.len(),
            "Inserted documents"
        );
        Ok(InsertManyResult { inserted_ids })
    }

    /// Applies `update` to the first document matching `filter`.
    ///
    /// Returns `NotFound` when nothing matches.
    pub async fn update_one(
        &self,
        ctx: &OpContext,
        filter: Value,
        update: Value,
        opts: UpdateOptions<'_>,
    ) -> AppResult<UpdateResult> {
        let filter = expect_document(filter, "filter")?;
        self.update_filtered(ctx, OperationKind::UpdateOne, filter, update, opts)
            .await
    }

    /// Applies `update` to the document with primary key `id`.
    ///
    /// Returns `NotFound` when no such document exists.
    pub async fn update_id(
        &self,
        ctx: &OpContext,
        id: Value,
        update: Value,
        opts: UpdateOptions<'_>,
    ) -> AppResult<UpdateResult> {
        self.update_filtered(ctx, OperationKind::UpdateId, id_filter(id), update, opts)
            .await
    }

    /// Applies `update` to every document matching `filter`.
    pub async fn update_all(
        &self,
        ctx: &OpContext,
        filter: Value,
        update: Value,
        opts: UpdateOptions<'_>,
    ) -> AppResult<UpdateResult> {
        let filter = expect_document(filter, "filter")?;
        self.update_filtered(ctx, OperationKind::UpdateAll, filter, update, opts)
            .await
    }

    async fn update_filtered(
        &self,
        ctx: &OpContext,
        operation: OperationKind,
        filter: Document,
        update: Value,
        mut opts: UpdateOptions<'_>,
    ) -> AppResult<UpdateResult> {
        let update = expect_document(update, "update")?;
        let stages = self.stages(ctx, operation);

        stages
            .fire(opts.update_hook.as_deref_mut(), Capability::BeforeUpdate)
            .await?;

        let op = match operation {
            OperationKind::UpdateAll => WriteOp::UpdateMany { filter, update },
            _ => WriteOp::UpdateOne { filter, update },
        };
        let result = expect_updated(stages.execute(&self.driver, op).await?)?;
        require_match(operation, result.matched_count)?;

        stages
            .fire(opts.update_hook.as_deref_mut(), Capability::AfterUpdate)
            .await?;

        debug!(
            collection = %self.namespace,
            operation = %operation,
            matched = result.matched_count,
            modified = result.modified_count,
            "Updated documents"
        );
        Ok(result)
    }

    /// Replaces the first document matching `filter` with `replacement`.
    ///
    /// Fires the update family. By default `replacement` is the hook value.
    /// Returns `NotFound` when nothing matches.
    pub async fn replace_one<T>(
        &self,
        ctx: &OpContext,
        filter: Value,
        replacement: &mut T,
        mut opts: ReplaceOptions<'_>,
    ) -> AppResult<UpdateResult>
    where
        T: Serialize + Hook,
    {
        let filter = expect_document(filter, "filter")?;
        let stages = self.stages(ctx, OperationKind::ReplaceOne);

        fire_slot(&stages, &mut opts.update_hook, replacement, Capability::BeforeUpdate).await?;

        let op = WriteOp::ReplaceOne {
            filter,
            replacement: to_document(replacement)?,
            upsert: false,
        };
        let result = expect_updated(stages.execute(&self.driver, op).await?)?;
        require_match(OperationKind::ReplaceOne, result.matched_count)?;

        fire_slot(&stages, &mut opts.update_hook, replacement, Capability::AfterUpdate).await?;

        Ok(result)
    }

    /// Removes the first document matching `filter`.
    ///
    /// Returns `NotFound` when nothing matches.
    pub async fn remove(
        &self,
        ctx: &OpContext,
        filter: Value,
        opts: RemoveOptions<'_>,
    ) -> AppResult<DeleteResult> {
        let filter = expect_document(filter, "filter")?;
        self.remove_filtered(ctx, OperationKind::Remove, filter, opts)
            .await
    }

    /// Removes the document with primary key `id`.
    ///
    /// Returns `NotFound` when no such document exists.
    pub async fn remove_id(
        &self,
        ctx: &OpContext,
        id: Value,
        opts: RemoveOptions<'_>,
    ) -> AppResult<DeleteResult> {
        self.remove_filtered(ctx, OperationKind::RemoveId, id_filter(id), opts)
            .await
    }

    /// Removes every document matching `filter`.
    pub async fn remove_all(
        &self,
        ctx: &OpContext,
        filter: Value,
        opts: RemoveOptions<'_>,
    ) -> AppResult<DeleteResult> {
        let filter = expect_document(filter, "filter")?;
        self.remove_filtered(ctx, OperationKind::RemoveAll, filter, opts)
            .await
    }

    async fn remove_filtered(
        &self,
        ctx: &OpContext,
        operation: OperationKind,
        filter: Document,
        mut opts: RemoveOptions<'_>,
    ) -> AppResult<DeleteResult> {
        let stages = self.stages(ctx, operation);

        stages
            .fire(opts.remove_hook.as_deref_mut(), Capability::BeforeRemove)
            .await?;

        let op = match operation {
            OperationKind::RemoveAll => WriteOp::DeleteMany { filter },
            _ => WriteOp::DeleteOne { filter },
        };
        let result = expect_deleted(stages.execute(&self.driver, op).await?)?;
        require_match(operation, result.deleted_count)?;

        stages
            .fire(opts.remove_hook.as_deref_mut(), Capability::AfterRemove)
            .await?;

        debug!(
            collection = %self.namespace,
            operation = %operation,
            deleted = result.deleted_count,
            "Removed documents"
        );
        Ok(result)
    }

    /// Replaces the first document matching `filter`, inserting
    /// `replacement` when nothing matches.
    ///
    /// Fires only the upsert family. By default `replacement` is the hook
    /// value.
    pub async fn upsert<T>(
        &self,
        ctx: &OpContext,
        filter: Value,
        replacement: &mut T,
        opts: UpsertOptions<'_>,
    ) -> AppResult<UpdateResult>
    where
        T: Serialize + Hook,
    {
        let filter = expect_document(filter, "filter")?;
        self.upsert_filtered(ctx, OperationKind::Upsert, filter, replacement, opts)
            .await
    }

    /// Replaces the document with primary key `id`, inserting `replacement`
    /// under that key when it does not exist.
    pub async fn upsert_id<T>(
        &self,
        ctx: &OpContext,
        id: Value,
        replacement: &mut T,
        opts: UpsertOptions<'_>,
    ) -> AppResult<UpdateResult>
    where
        T: Serialize + Hook,
    {
        self.upsert_filtered(ctx, OperationKind::UpsertId, id_filter(id), replacement, opts)
            .await
    }

    async fn upsert_filtered<T>(
        &self,
        ctx: &OpContext,
        operation: OperationKind,
        filter: Document,
        replacement: &mut T,
        mut opts: UpsertOptions<'_>,
    ) -> AppResult<UpdateResult>
    where
        T: Serialize + Hook,
    {
        let stages = self.stages(ctx, operation);

        fire_slot(&stages, &mut opts.upsert_hook, replacement, Capability::BeforeUpsert).await?;

        let op = WriteOp::ReplaceOne {
            filter,
            replacement: to_document(replacement)?,
            upsert: true,
        };
        let result = expect_updated(stages.execute(&self.driver, op).await?)?;

        fire_slot(&stages, &mut opts.upsert_hook, replacement, Capability::AfterUpsert).await?;

        debug!(
            collection = %self.namespace,
            operation = %operation,
            matched = result.matched_count,
            upserted = result.upserted_count,
            "Upserted document"
        );
        Ok(result)
    }

    /// Starts a query over documents matching `filter`.
    ///
    /// Nothing runs until the query is consumed with `one`, `all` or
    /// `count`.
    pub fn find<'a>(
        &'a self,
        ctx: &'a OpContext,
        filter: Value,
        opts: FindOptions<'a>,
    ) -> Query<'a> {
        Query::new(self, ctx, expect_document(filter, "filter"), opts.query_hook)
    }
}

/// Fires one stage for a single-document operation, resolving the slot
/// against the target.
async fn fire_slot<T: Hook>(
    stages: &StageRunner<'_>,
    slot: &mut HookSlot<'_>,
    target: &mut T,
    capability: Capability,
) -> AppResult<()> {
    match slot {
        HookSlot::Empty => stages.fire(None, capability).await,
        HookSlot::Target => stages.fire(Some(target as &mut dyn Hook), capability).await,
        HookSlot::Value(hook) => stages.fire(Some(&mut **hook), capability).await,
    }
}

/// Fires one stage for a batch operation. A batch used as its own hook is
/// fired once through [`BatchHook`].
async fn fire_batch<T: Hook>(
    stages: &StageRunner<'_>,
    slot: &mut HookSlot<'_>,
    targets: &mut [T],
    capability: Capability,
) -> AppResult<()> {
    match slot {
        HookSlot::Empty => stages.fire(None, capability).await,
        HookSlot::Target => {
            let mut batch = BatchHook::new(targets);
            stages.fire(Some(&mut batch as &mut dyn Hook), capability).await
        }
        HookSlot::Value(hook) => stages.fire(Some(&mut **hook), capability).await,
    }
}
