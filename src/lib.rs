//! # docstore
//!
//! A document store access layer where every CRUD call can carry its own
//! lifecycle hooks. Re-exports the workspace crates under one facade.
//!
//! ```rust,ignore
//! let client = Client::connect(&DatabaseConfig::memory("app")).await?;
//! let users = client.database("app").collection("users");
//!
//! let mut user = User { name: "Lucas".into(), age: 7 };
//! users
//!     .insert_one(&ctx, &mut user, InsertOneOptions::new())
//!     .await?;
//! ```

pub mod telemetry;

pub use docstore_core::config::{AppConfig, DatabaseConfig, LoggingConfig};
pub use docstore_core::traits::driver::{
    DeleteResult, DocumentCursor, Driver, QuerySpec, UpdateResult, WriteOp, WriteOutcome,
};
pub use docstore_core::types::{Document, OperationKind};
pub use docstore_core::{AppError, AppResult, ErrorKind, HookError, OpContext};
pub use docstore_database::{
    Client, Collection, Database, InsertManyResult, InsertOneResult, MemoryDriver, Query,
    QueryStage,
};
pub use docstore_hooks::{
    AfterInsert, AfterQuery, AfterRemove, AfterUpdate, AfterUpsert, BeforeInsert, BeforeQuery,
    BeforeRemove, BeforeUpdate, BeforeUpsert, Capability, FindOptions, Hook, InsertManyOptions,
    InsertOneOptions, Middleware, OperationEvent, RemoveOptions, ReplaceOptions, UpdateOptions,
    UpsertOptions, hook_capabilities,
};
