//! Hook invoker. Calls a single detected capability and reports the
//! outcome as a pass/fail signal.
//!
//! The invoker adds no retry and no timeout. Callers that need a bound
//! await it through `OpContext::run`.

use docstore_core::error::HookError;

use crate::capability::{Capability, Hook};

/// Outcome of invoking one capability on a hook value.
#[derive(Debug)]
pub enum Invocation {
    /// The hook value does not expose the capability; nothing ran.
    Absent,
    /// The capability ran and succeeded.
    Passed,
    /// The capability ran and failed.
    Failed(HookError),
}

impl Invocation {
    /// Returns whether the capability actually ran.
    pub fn fired(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Collapse into a result; an absent capability counts as success.
    pub fn into_result(self) -> Result<(), HookError> {
        match self {
            Self::Failed(err) => Err(err),
            Self::Absent | Self::Passed => Ok(()),
        }
    }
}

impl From<Result<(), HookError>> for Invocation {
    fn from(result: Result<(), HookError>) -> Self {
        match result {
            Ok(()) => Self::Passed,
            Err(err) => Self::Failed(err),
        }
    }
}

macro_rules! call {
    ($hook:expr, $accessor:ident, $method:ident) => {
        match $hook.$accessor() {
            Some(capable) => Invocation::from(capable.$method().await),
            None => Invocation::Absent,
        }
    };
}

/// Invokes `capability` on `hook` if the value exposes it.
pub async fn invoke(hook: &mut (dyn Hook + '_), capability: Capability) -> Invocation {
    match capability {
        Capability::BeforeInsert => call!(hook, as_before_insert, before_insert),
        Capability::AfterInsert => call!(hook, as_after_insert, after_insert),
        Capability::BeforeUpdate => call!(hook, as_before_update, before_update),
        Capability::AfterUpdate => call!(hook, as_after_update, after_update),
        Capability::BeforeUpsert => call!(hook, as_before_upsert, before_upsert),
        Capability::AfterUpsert => call!(hook, as_after_upsert, after_upsert),
        Capability::BeforeRemove => call!(hook, as_before_remove, before_remove),
        Capability::AfterRemove => call!(hook, as_after_remove, after_remove),
        Capability::BeforeQuery => call!(hook, as_before_query, before_query),
        Capability::AfterQuery => call!(hook, as_after_query, after_query),
    }
}
