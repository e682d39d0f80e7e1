//! Middleware: handlers registered on a client and fired at every before
//! and after stage of every operation, after the per-call hook.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::OperationEvent;
pub use dispatcher::MiddlewareDispatcher;
pub use registry::{Middleware, MiddlewareRegistry};
