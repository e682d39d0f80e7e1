//! A hook implementation over a batch of hook values.
//!
//! The pipeline fires a batch operation's hook exactly once. When the batch
//! itself is the hook, it is wrapped in [`BatchHook`], which exposes a
//! capability if any element does and, when fired, runs that capability on
//! each exposing element in order, stopping at the first failure.

use async_trait::async_trait;

use docstore_core::error::HookError;

use crate::capability::{
    AfterInsert, AfterQuery, AfterRemove, AfterUpdate, AfterUpsert, BeforeInsert, BeforeQuery,
    BeforeRemove, BeforeUpdate, BeforeUpsert, Hook,
};

/// Fans one capability invocation out to every element of a batch.
#[derive(Debug)]
pub struct BatchHook<'a, H> {
    items: &'a mut [H],
}

impl<'a, H: Hook> BatchHook<'a, H> {
    /// Wrap a batch of hook values.
    pub fn new(items: &'a mut [H]) -> Self {
        Self { items }
    }

    /// Number of elements in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

macro_rules! fan_out {
    ($capability:ident, $accessor:ident, $method:ident) => {
        #[async_trait]
        impl<'a, H: Hook> $capability for BatchHook<'a, H> {
            async fn $method(&mut self) -> Result<(), HookError> {
                for item in self.items.iter_mut() {
                    if let Some(capable) = item.$accessor() {
                        capable.$method().await?;
                    }
                }
                Ok(())
            }
        }
    };
}

fan_out!(BeforeInsert, as_before_insert, before_insert);
fan_out!(AfterInsert, as_after_insert, after_insert);
fan_out!(BeforeUpdate, as_before_update, before_update);
fan_out!(AfterUpdate, as_after_update, after_update);
fan_out!(BeforeUpsert, as_before_upsert, before_upsert);
fan_out!(AfterUpsert, as_after_upsert, after_upsert);
fan_out!(BeforeRemove, as_before_remove, before_remove);
fan_out!(AfterRemove, as_after_remove, after_remove);
fan_out!(BeforeQuery, as_before_query, before_query);
fan_out!(AfterQuery, as_after_query, after_query);

macro_rules! any_exposes {
    ($accessor:ident, $capability:ident) => {
        fn $accessor(&mut self) -> Option<&mut dyn $capability> {
            if self.items.iter_mut().any(|item| item.$accessor().is_some()) {
                Some(self)
            } else {
                None
            }
        }
    };
}

impl<'a, H: Hook> Hook for BatchHook<'a, H> {
    any_exposes!(as_before_insert, BeforeInsert);
    any_exposes!(as_after_insert, AfterInsert);
    any_exposes!(as_before_update, BeforeUpdate);
    any_exposes!(as_after_update, AfterUpdate);
    any_exposes!(as_before_upsert, BeforeUpsert);
    any_exposes!(as_after_upsert, AfterUpsert);
    any_exposes!(as_before_remove, BeforeRemove);
    any_exposes!(as_after_remove, AfterRemove);
    any_exposes!(as_before_query, BeforeQuery);
    any_exposes!(as_after_query, AfterQuery);
}
