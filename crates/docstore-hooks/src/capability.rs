//! Lifecycle capabilities and structural capability detection.
//!
//! Each capability is an independent single-method trait. A hook value is
//! anything implementing [`Hook`], whose accessors report which of those
//! traits the value exposes. Nothing is registered up front: the pipeline
//! asks the value on every call, so one value may expose any subset of the
//! ten capabilities and may be reused across operations of different
//! families.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use docstore_core::error::HookError;
use docstore_core::types::Document;

/// Fired before an insert reaches the driver. May mutate the target.
#[async_trait]
pub trait BeforeInsert: Send {
    async fn before_insert(&mut self) -> Result<(), HookError>;
}

/// Fired after an insert succeeded.
#[async_trait]
pub trait AfterInsert: Send {
    async fn after_insert(&mut self) -> Result<(), HookError>;
}

/// Fired before an update or replace reaches the driver.
#[async_trait]
pub trait BeforeUpdate: Send {
    async fn before_update(&mut self) -> Result<(), HookError>;
}

/// Fired after an update or replace succeeded.
#[async_trait]
pub trait AfterUpdate: Send {
    async fn after_update(&mut self) -> Result<(), HookError>;
}

/// Fired before an upsert reaches the driver.
#[async_trait]
pub trait BeforeUpsert: Send {
    async fn before_upsert(&mut self) -> Result<(), HookError>;
}

/// Fired after an upsert succeeded.
#[async_trait]
pub trait AfterUpsert: Send {
    async fn after_upsert(&mut self) -> Result<(), HookError>;
}

/// Fired before a remove reaches the driver.
#[async_trait]
pub trait BeforeRemove: Send {
    async fn before_remove(&mut self) -> Result<(), HookError>;
}

/// Fired after a remove succeeded.
#[async_trait]
pub trait AfterRemove: Send {
    async fn after_remove(&mut self) -> Result<(), HookError>;
}

/// Fired before a query reaches the driver.
#[async_trait]
pub trait BeforeQuery: Send {
    async fn before_query(&mut self) -> Result<(), HookError>;
}

/// Fired after a query's documents were decoded into the caller's target.
#[async_trait]
pub trait AfterQuery: Send {
    async fn after_query(&mut self) -> Result<(), HookError>;
}

/// A value that can be supplied as a hook.
///
/// Every accessor defaults to `None`. A type exposes a capability by
/// implementing the capability trait and returning `Some(self)` from the
/// matching accessor, which [`hook_capabilities!`](crate::hook_capabilities)
/// generates.
pub trait Hook: Send {
    fn as_before_insert(&mut self) -> Option<&mut dyn BeforeInsert> {
        None
    }
    fn as_after_insert(&mut self) -> Option<&mut dyn AfterInsert> {
        None
    }
    fn as_before_update(&mut self) -> Option<&mut dyn BeforeUpdate> {
        None
    }
    fn as_after_update(&mut self) -> Option<&mut dyn AfterUpdate> {
        None
    }
    fn as_before_upsert(&mut self) -> Option<&mut dyn BeforeUpsert> {
        None
    }
    fn as_after_upsert(&mut self) -> Option<&mut dyn AfterUpsert> {
        None
    }
    fn as_before_remove(&mut self) -> Option<&mut dyn BeforeRemove> {
        None
    }
    fn as_after_remove(&mut self) -> Option<&mut dyn AfterRemove> {
        None
    }
    fn as_before_query(&mut self) -> Option<&mut dyn BeforeQuery> {
        None
    }
    fn as_after_query(&mut self) -> Option<&mut dyn AfterQuery> {
        None
    }
}

// Untyped documents can be used as targets but expose no capabilities.
impl Hook for serde_json::Value {}
impl Hook for Document {}

/// Whether a capability runs before or after the driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Before the driver call. Failure aborts the operation.
    Before,
    /// After a successful driver call. Failure is reported, never undone.
    After,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

/// An operation family with its own pair of capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookFamily {
    Insert,
    Update,
    Upsert,
    Remove,
    Query,
}

impl HookFamily {
    /// The capability fired at `stage` for this family.
    pub fn capability(&self, stage: Stage) -> Capability {
        match (self, stage) {
            (Self::Insert, Stage::Before) => Capability::BeforeInsert,
            (Self::Insert, Stage::After) => Capability::AfterInsert,
            (Self::Update, Stage::Before) => Capability::BeforeUpdate,
            (Self::Update, Stage::After) => Capability::AfterUpdate,
            (Self::Upsert, Stage::Before) => Capability::BeforeUpsert,
            (Self::Upsert, Stage::After) => Capability::AfterUpsert,
            (Self::Remove, Stage::Before) => Capability::BeforeRemove,
            (Self::Remove, Stage::After) => Capability::AfterRemove,
            (Self::Query, Stage::Before) => Capability::BeforeQuery,
            (Self::Query, Stage::After) => Capability::AfterQuery,
        }
    }
}

/// Names one of the ten lifecycle capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    BeforeInsert,
    AfterInsert,
    BeforeUpdate,
    AfterUpdate,
    BeforeUpsert,
    AfterUpsert,
    BeforeRemove,
    AfterRemove,
    BeforeQuery,
    AfterQuery,
}

impl Capability {
    /// Every capability, before/after pairs in family order.
    pub const ALL: [Capability; 10] = [
        Self::BeforeInsert,
        Self::AfterInsert,
        Self::BeforeUpdate,
        Self::AfterUpdate,
        Self::BeforeUpsert,
        Self::AfterUpsert,
        Self::BeforeRemove,
        Self::AfterRemove,
        Self::BeforeQuery,
        Self::AfterQuery,
    ];

    /// Returns the string name of this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeInsert => "before_insert",
            Self::AfterInsert => "after_insert",
            Self::BeforeUpdate => "before_update",
            Self::AfterUpdate => "after_update",
            Self::BeforeUpsert => "before_upsert",
            Self::AfterUpsert => "after_upsert",
            Self::BeforeRemove => "before_remove",
            Self::AfterRemove => "after_remove",
            Self::BeforeQuery => "before_query",
            Self::AfterQuery => "after_query",
        }
    }

    /// The stage this capability fires at.
    pub fn stage(&self) -> Stage {
        match self {
            Self::BeforeInsert
            | Self::BeforeUpdate
            | Self::BeforeUpsert
            | Self::BeforeRemove
            | Self::BeforeQuery => Stage::Before,
            _ => Stage::After,
        }
    }

    /// The family this capability belongs to.
    pub fn family(&self) -> HookFamily {
        match self {
            Self::BeforeInsert | Self::AfterInsert => HookFamily::Insert,
            Self::BeforeUpdate | Self::AfterUpdate => HookFamily::Update,
            Self::BeforeUpsert | Self::AfterUpsert => HookFamily::Upsert,
            Self::BeforeRemove | Self::AfterRemove => HookFamily::Remove,
            Self::BeforeQuery | Self::AfterQuery => HookFamily::Query,
        }
    }

    /// Returns whether this is a before-stage capability.
    pub fn is_before(&self) -> bool {
        self.stage() == Stage::Before
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns whether `hook` exposes `capability`.
///
/// Purely a query: nothing is invoked and the answer is not cached.
pub fn detect(hook: &mut (dyn Hook + '_), capability: Capability) -> bool {
    match capability {
        Capability::BeforeInsert => hook.as_before_insert().is_some(),
        Capability::AfterInsert => hook.as_after_insert().is_some(),
        Capability::BeforeUpdate => hook.as_before_update().is_some(),
        Capability::AfterUpdate => hook.as_after_update().is_some(),
        Capability::BeforeUpsert => hook.as_before_upsert().is_some(),
        Capability::AfterUpsert => hook.as_after_upsert().is_some(),
        Capability::BeforeRemove => hook.as_before_remove().is_some(),
        Capability::AfterRemove => hook.as_after_remove().is_some(),
        Capability::BeforeQuery => hook.as_before_query().is_some(),
        Capability::AfterQuery => hook.as_after_query().is_some(),
    }
}

/// Every capability `hook` exposes.
pub fn capabilities_of(hook: &mut (dyn Hook + '_)) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|capability| detect(hook, *capability))
        .collect()
}
