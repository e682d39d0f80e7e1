//! # docstore-hooks
//!
//! Lifecycle hook dispatch for docstore. Provides:
//!
//! - Ten single-method capability traits (`BeforeInsert` … `AfterQuery`)
//! - Per-call structural capability detection on any [`Hook`] value
//! - The hook invoker turning a capability call into a pass/fail signal
//! - Per-operation options bags carrying one hook slot each
//! - [`BatchHook`] for batches whose elements are hooks themselves
//! - Client-scoped middleware with priority ordering

pub mod batch;
pub mod capability;
pub mod invoker;
pub mod macros;
pub mod middleware;
pub mod options;

pub use batch::BatchHook;
pub use capability::{
    AfterInsert, AfterQuery, AfterRemove, AfterUpdate, AfterUpsert, BeforeInsert, BeforeQuery,
    BeforeRemove, BeforeUpdate, BeforeUpsert, Capability, Hook, HookFamily, Stage,
    capabilities_of, detect,
};
pub use invoker::{Invocation, invoke};
pub use middleware::{Middleware, MiddlewareDispatcher, MiddlewareRegistry, OperationEvent};
pub use options::{
    FindOptions, HookSlot, InsertManyOptions, InsertOneOptions, RemoveOptions, ReplaceOptions,
    UpdateOptions, UpsertOptions,
};

pub use docstore_core::error::HookError;
