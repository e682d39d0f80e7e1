//! Convenience macros for declaring hook types.

/// Implements [`Hook`](crate::Hook) for a type, exposing the listed
/// capabilities. The type must implement each listed capability trait.
///
/// # Example
/// ```rust,ignore
/// #[async_trait]
/// impl BeforeInsert for User {
///     async fn before_insert(&mut self) -> Result<(), HookError> {
///         self.age = self.age.max(18);
///         Ok(())
///     }
/// }
///
/// hook_capabilities!(User => BeforeInsert);
///
/// // A document type that takes part in no lifecycle.
/// hook_capabilities!(Invoice);
/// ```
#[macro_export]
macro_rules! hook_capabilities {
    (@accessor BeforeInsert) => {
        fn as_before_insert(&mut self) -> Option<&mut dyn $crate::BeforeInsert> {
            Some(self)
        }
    };
    (@accessor AfterInsert) => {
        fn as_after_insert(&mut self) -> Option<&mut dyn $crate::AfterInsert> {
            Some(self)
        }
    };
    (@accessor BeforeUpdate) => {
        fn as_before_update(&mut self) -> Option<&mut dyn $crate::BeforeUpdate> {
            Some(self)
        }
    };
    (@accessor AfterUpdate) => {
        fn as_after_update(&mut self) -> Option<&mut dyn $crate::AfterUpdate> {
            Some(self)
        }
    };
    (@accessor BeforeUpsert) => {
        fn as_before_upsert(&mut self) -> Option<&mut dyn $crate::BeforeUpsert> {
            Some(self)
        }
    };
    (@accessor AfterUpsert) => {
        fn as_after_upsert(&mut self) -> Option<&mut dyn $crate::AfterUpsert> {
            Some(self)
        }
    };
    (@accessor BeforeRemove) => {
        fn as_before_remove(&mut self) -> Option<&mut dyn $crate::BeforeRemove> {
            Some(self)
        }
    };
    (@accessor AfterRemove) => {
        fn as_after_remove(&mut self) -> Option<&mut dyn $crate::AfterRemove> {
            Some(self)
        }
    };
    (@accessor BeforeQuery) => {
        fn as_before_query(&mut self) -> Option<&mut dyn $crate::BeforeQuery> {
            Some(self)
        }
    };
    (@accessor AfterQuery) => {
        fn as_after_query(&mut self) -> Option<&mut dyn $crate::AfterQuery> {
            Some(self)
        }
    };
    ($ty:ty $(=> $($capability:ident),+ $(,)?)?) => {
        impl $crate::Hook for $ty {
            $($($crate::hook_capabilities!(@accessor $capability);)+)?
        }
    };
}
