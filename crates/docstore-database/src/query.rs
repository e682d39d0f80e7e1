//! Query cursor adapter.
//!
//! A [`Query`] is built by `Collection::find` and consumed by `one`, `all`
//! or `count`. Consuming it walks a fixed sequence of stages:
//!
//! `Built -> BeforeHookRun -> Executed -> Decoded -> AfterHookRun -> Done`
//!
//! `count` skips both hook stages. Any failure moves the query to
//! `Errored`; `Done` and `Errored` are terminal and a query cannot be
//! consumed twice. An after-query failure still leaves the caller's target
//! populated.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use docstore_core::context::OpContext;
use docstore_core::error::AppError;
use docstore_core::result::AppResult;
use docstore_core::traits::driver::{DocumentCursor, QuerySpec};
use docstore_core::types::document::{expect_document, from_document};
use docstore_core::types::{Document, OperationKind, SortField};
use docstore_hooks::{Capability, Hook};

use crate::assembler::StageRunner;
use crate::collection::Collection;

/// Where a query is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    /// Built but not consumed.
    Built,
    /// The before-query stage passed.
    BeforeHookRun,
    /// The driver returned a cursor.
    Executed,
    /// Documents were decoded into the caller's target.
    Decoded,
    /// The after-query stage ran.
    AfterHookRun,
    /// Finished successfully.
    Done,
    /// A step failed.
    Errored,
}

impl std::fmt::Display for QueryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Built => "built",
            Self::BeforeHookRun => "before_hook_run",
            Self::Executed => "executed",
            Self::Decoded => "decoded",
            Self::AfterHookRun => "after_hook_run",
            Self::Done => "done",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// A pending query over one collection.
pub struct Query<'a> {
    collection: &'a Collection,
    ctx: &'a OpContext,
    filter: AppResult<Document>,
    sort: Vec<SortField>,
    skip: u64,
    limit: Option<u64>,
    projection: Option<AppResult<Document>>,
    hook: Option<&'a mut dyn Hook>,
    stage: QueryStage,
}

impl<'a> Query<'a> {
    pub(crate) fn new(
        collection: &'a Collection,
        ctx: &'a OpContext,
        filter: AppResult<Document>,
        hook: Option<&'a mut dyn Hook>,
    ) -> Self {
        Self {
            collection,
            ctx,
            filter,
            sort: Vec::new(),
            skip: 0,
            limit: None,
            projection: None,
            hook,
            stage: QueryStage::Built,
        }
    }

    /// Orders results by the given keys. A leading `-` sorts descending.
    pub fn sort(mut self, keys: &[&str]) -> Self {
        self.sort.extend(keys.iter().filter_map(|key| SortField::parse(key)));
        self
    }

    /// Skips the first `skip` results.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Returns at most `limit` results. Zero means no limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Restricts returned fields, e.g. `{"name": 1}` or `{"age": 0}`.
    pub fn select(mut self, projection: Value) -> Self {
        self.projection = Some(expect_document(projection, "projection"));
        self
    }

    /// The current lifecycle stage. After `one`, `all` or `count` returns
    /// this is `Done` or `Errored`.
    pub fn stage(&self) -> QueryStage {
        self.stage
    }

    /// Decodes the first matching document into `target`.
    ///
    /// Returns `NotFound` when nothing matches; the after-query stage is
    /// skipped in that case.
    pub async fn one<T>(&mut self, target: &mut T) -> AppResult<()>
    where
        T: DeserializeOwned,
    {
        self.ensure_unconsumed()?;
        let result = self.fetch_one(target).await;
        self.finish(OperationKind::FindOne, result)
    }

    /// Decodes every matching document into `target`, replacing its
    /// contents. No match leaves `target` empty and is not an error.
    pub async fn all<T>(&mut self, target: &mut Vec<T>) -> AppResult<()>
    where
        T: DeserializeOwned,
    {
        self.ensure_unconsumed()?;
        let result = self.fetch_all(target).await;
        self.finish(OperationKind::FindAll, result)
    }

    /// Counts documents matching the filter. Fires no hooks and ignores
    /// sort, skip, limit and projection.
    pub async fn count(&mut self) -> AppResult<u64> {
        self.ensure_unconsumed()?;
        let result = self.count_matching().await;
        self.finish(OperationKind::Count, result)
    }

    /// A query runs once; its filter is handed to the driver.
    fn ensure_unconsumed(&self) -> AppResult<()> {
        if self.stage != QueryStage::Built {
            return Err(AppError::validation(format!(
                "Query on {} was already consumed (stage {})",
                self.collection.namespace(),
                self.stage
            )));
        }
        Ok(())
    }

    async fn count_matching(&mut self) -> AppResult<u64> {
        let filter = std::mem::take(self.filter.as_mut().map_err(|e| e.clone())?);
        let collection = self.collection;
        let stages = collection.stages(self.ctx, OperationKind::Count);

        let count = stages
            .run(collection.driver.count(collection.namespace(), &filter))
            .await?;
        self.advance(QueryStage::Executed);
        Ok(count)
    }

    async fn fetch_one<T>(&mut self, target: &mut T) -> AppResult<()>
    where
        T: DeserializeOwned,
    {
        let mut spec = self.spec()?;
        spec.limit = Some(1);

        let collection = self.collection;
        let stages = collection.stages(self.ctx, OperationKind::FindOne);

        stages
            .fire(self.hook.as_deref_mut(), Capability::BeforeQuery)
            .await?;
        self.advance(QueryStage::BeforeHookRun);

        let mut cursor = stages
            .run(collection.driver.query(collection.namespace(), &spec))
            .await?;
        self.advance(QueryStage::Executed);

        let decoded: Option<T> = stages.run(decode_one(cursor.as_mut())).await?;
        *target = decoded.ok_or_else(|| {
            AppError::not_found(format!(
                "find_one: no document in {} matched the filter",
                collection.namespace()
            ))
        })?;
        self.advance(QueryStage::Decoded);

        stages
            .fire(self.hook.as_deref_mut(), Capability::AfterQuery)
            .await?;
        self.advance(QueryStage::AfterHookRun);
        Ok(())
    }

    async fn fetch_all<T>(&mut self, target: &mut Vec<T>) -> AppResult<()>
    where
        T: DeserializeOwned,
    {
        let spec = self.spec()?;

        let collection = self.collection;
        let stages = collection.stages(self.ctx, OperationKind::FindAll);

        stages
            .fire(self.hook.as_deref_mut(), Capability::BeforeQuery)
            .await?;
        self.advance(QueryStage::BeforeHookRun);

        let mut cursor = stages
            .run(collection.driver.query(collection.namespace(), &spec))
            .await?;
        self.advance(QueryStage::Executed);

        *target = stages.run(decode_all(cursor.as_mut())).await?;
        self.advance(QueryStage::Decoded);

        stages
            .fire(self.hook.as_deref_mut(), Capability::AfterQuery)
            .await?;
        self.advance(QueryStage::AfterHookRun);
        Ok(())
    }

    fn spec(&mut self) -> AppResult<QuerySpec> {
        let filter = std::mem::take(self.filter.as_mut().map_err(|e| e.clone())?);
        let projection = match self.projection.take() {
            Some(projection) => Some(projection?),
            None => None,
        };
        Ok(QuerySpec {
            filter,
            sort: std::mem::take(&mut self.sort),
            skip: self.skip,
            limit: self.limit,
            projection,
        })
    }

    fn advance(&mut self, next: QueryStage) {
        debug!(
            collection = %self.collection.namespace(),
            from = %self.stage,
            to = %next,
            "Query stage"
        );
        self.stage = next;
    }

    fn finish<R>(&mut self, operation: OperationKind, result: AppResult<R>) -> AppResult<R> {
        match &result {
            Ok(_) => self.advance(QueryStage::Done),
            Err(e) => {
                debug!(
                    collection = %self.collection.namespace(),
                    operation = %operation,
                    stage = %self.stage,
                    error = %e,
                    "Query failed"
                );
                self.stage = QueryStage::Errored;
            }
        }
        result
    }
}

impl std::fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("collection", &self.collection.namespace())
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("skip", &self.skip)
            .field("limit", &self.limit)
            .field("hook", &self.hook.as_ref().map(|_| ".."))
            .field("stage", &self.stage)
            .finish()
    }
}

/// Decodes the next document from a cursor, if any.
pub async fn decode_one<T>(cursor: &mut dyn DocumentCursor) -> AppResult<Option<T>>
where
    T: DeserializeOwned,
{
    match cursor.next_document().await? {
        Some(document) => Ok(Some(from_document(document)?)),
        None => Ok(None),
    }
}

/// Drains a cursor, decoding every document.
pub async fn decode_all<T>(cursor: &mut dyn DocumentCursor) -> AppResult<Vec<T>>
where
    T: DeserializeOwned,
{
    let mut decoded = Vec::new();
    while let Some(document) = cursor.next_document().await? {
        decoded.push(from_document(document)?);
    }
    Ok(decoded)
}
