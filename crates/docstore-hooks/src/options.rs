//! Per-call options bags. Each carries exactly one hook slot, named for the
//! family of capabilities it feeds.
//!
//! Document-carrying operations (insert, replace, upsert) use a [`HookSlot`],
//! which can also point at the target document itself. Filter-only
//! operations (update, remove, find) take an optional hook value.

use std::fmt;

use crate::capability::Hook;

/// Where a document-carrying operation finds its hook value.
#[derive(Default)]
pub enum HookSlot<'a> {
    /// No hook: every capability check reports absent.
    #[default]
    Empty,
    /// The operation's target document is the hook value.
    Target,
    /// An explicit hook value.
    Value(&'a mut dyn Hook),
}

impl<'a> HookSlot<'a> {
    /// Returns whether no hook was supplied.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Debug for HookSlot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Target => write!(f, "Target"),
            Self::Value(_) => write!(f, "Value(..)"),
        }
    }
}

impl<'a> From<&'a mut dyn Hook> for HookSlot<'a> {
    fn from(hook: &'a mut dyn Hook) -> Self {
        Self::Value(hook)
    }
}

fn describe(hook: &Option<&mut dyn Hook>) -> &'static str {
    if hook.is_some() { "Some(..)" } else { "None" }
}

/// Options for `insert_one`.
///
/// By default the inserted document is the hook value; an explicit hook
/// takes precedence over it.
pub struct InsertOneOptions<'a> {
    /// Source of `BeforeInsert` / `AfterInsert`.
    pub insert_hook: HookSlot<'a>,
}

impl Default for InsertOneOptions<'_> {
    fn default() -> Self {
        Self {
            insert_hook: HookSlot::Target,
        }
    }
}

impl<'a> InsertOneOptions<'a> {
    /// Options using the inserted document as the hook value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit hook value instead of the inserted document.
    pub fn insert_hook(mut self, hook: &'a mut dyn Hook) -> Self {
        self.insert_hook = HookSlot::Value(hook);
        self
    }

    /// Use the inserted document as the hook value again after another
    /// setter replaced it.
    pub fn hook_target(mut self) -> Self {
        self.insert_hook = HookSlot::Target;
        self
    }

    /// Fire no hooks at all.
    pub fn without_hooks(mut self) -> Self {
        self.insert_hook = HookSlot::Empty;
        self
    }
}

/// Options for `insert_many`.
///
/// By default the batch itself is the hook value: each document exposing
/// the capability is fired in order, once per stage.
pub struct InsertManyOptions<'a> {
    /// Source of `BeforeInsert` / `AfterInsert`, fired once per batch.
    pub insert_hook: HookSlot<'a>,
}

impl Default for InsertManyOptions<'_> {
    fn default() -> Self {
        Self {
            insert_hook: HookSlot::Target,
        }
    }
}

impl<'a> InsertManyOptions<'a> {
    /// Options using the batch as the hook value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit hook value instead of the batch.
    pub fn insert_hook(mut self, hook: &'a mut dyn Hook) -> Self {
        self.insert_hook = HookSlot::Value(hook);
        self
    }

    /// Use the batch as the hook value again after another setter
    /// replaced it.
    pub fn hook_target(mut self) -> Self {
        self.insert_hook = HookSlot::Target;
        self
    }

    /// Fire no hooks at all.
    pub fn without_hooks(mut self) -> Self {
        self.insert_hook = HookSlot::Empty;
        self
    }
}

/// Options for `update_one`, `update_id` and `update_all`.
#[derive(Default)]
pub struct UpdateOptions<'a> {
    /// Source of `BeforeUpdate` / `AfterUpdate`.
    pub update_hook: Option<&'a mut dyn Hook>,
}

impl<'a> UpdateOptions<'a> {
    /// Options with no hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit hook value.
    pub fn update_hook(mut self, hook: &'a mut dyn Hook) -> Self {
        self.update_hook = Some(hook);
        self
    }
}

/// Options for `replace_one`.
///
/// Replace fires the update family. By default the replacement document is
/// the hook value; an explicit hook takes precedence over it.
pub struct ReplaceOptions<'a> {
    /// Source of `BeforeUpdate` / `AfterUpdate`.
    pub update_hook: HookSlot<'a>,
}

impl Default for ReplaceOptions<'_> {
    fn default() -> Self {
        Self {
            update_hook: HookSlot::Target,
        }
    }
}

impl<'a> ReplaceOptions<'a> {
    /// Options using the replacement document as the hook value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit hook value instead of the replacement document.
    pub fn update_hook(mut self, hook: &'a mut dyn Hook) -> Self {
        self.update_hook = HookSlot::Value(hook);
        self
    }

    /// Fire no hooks at all.
    pub fn without_hooks(mut self) -> Self {
        self.update_hook = HookSlot::Empty;
        self
    }
}

/// Options for `remove`, `remove_id` and `remove_all`.
#[derive(Default)]
pub struct RemoveOptions<'a> {
    /// Source of `BeforeRemove` / `AfterRemove`.
    pub remove_hook: Option<&'a mut dyn Hook>,
}

impl<'a> RemoveOptions<'a> {
    /// Options with no hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit hook value.
    pub fn remove_hook(mut self, hook: &'a mut dyn Hook) -> Self {
        self.remove_hook = Some(hook);
        self
    }
}

/// Options for `upsert` and `upsert_id`.
///
/// Upsert fires only the upsert family, never the update family. By
/// default the replacement document is the hook value.
pub struct UpsertOptions<'a> {
    /// Source of `BeforeUpsert` / `AfterUpsert`.
    pub upsert_hook: HookSlot<'a>,
}

impl Default for UpsertOptions<'_> {
    fn default() -> Self {
        Self {
            upsert_hook: HookSlot::Target,
        }
    }
}

impl<'a> UpsertOptions<'a> {
    /// Options using the replacement document as the hook value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit hook value instead of the replacement document.
    pub fn upsert_hook(mut self, hook: &'a mut dyn Hook) -> Self {
        self.upsert_hook = HookSlot::Value(hook);
        self
    }

    /// Fire no hooks at all.
    pub fn without_hooks(mut self) -> Self {
        self.upsert_hook = HookSlot::Empty;
        self
    }
}

/// Options for `find`.
#[derive(Default)]
pub struct FindOptions<'a> {
    /// Source of `BeforeQuery` / `AfterQuery`.
    pub query_hook: Option<&'a mut dyn Hook>,
}

impl<'a> FindOptions<'a> {
    /// Options with no hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit hook value.
    pub fn query_hook(mut self, hook: &'a mut dyn Hook) -> Self {
        self.query_hook = Some(hook);
        self
    }
}

impl fmt::Debug for InsertOneOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertOneOptions")
            .field("insert_hook", &self.insert_hook)
            .finish()
    }
}

impl fmt::Debug for InsertManyOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertManyOptions")
            .field("insert_hook", &self.insert_hook)
            .finish()
    }
}

impl fmt::Debug for UpdateOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateOptions")
            .field("update_hook", &format_args!("{}", describe(&self.update_hook)))
            .finish()
    }
}

impl fmt::Debug for ReplaceOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplaceOptions")
            .field("update_hook", &self.update_hook)
            .finish()
    }
}

impl fmt::Debug for RemoveOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveOptions")
            .field("remove_hook", &format_args!("{}", describe(&self.remove_hook)))
            .finish()
    }
}

impl fmt::Debug for UpsertOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpsertOptions")
            .field("upsert_hook", &self.upsert_hook)
            .finish()
    }
}

impl fmt::Debug for FindOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindOptions")
            .field("query_hook", &format_args!("{}", describe(&self.query_hook)))
            .finish()
    }
}
