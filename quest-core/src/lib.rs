//! Quest Core - Prototype object runtime (pure logic, no IO)
//!
//! Contains the attribute store, the dispatch protocol, closures and the
//! try/return escape mechanism. Only operates on in-memory objects.
//!
//! Configuration is read from a global singleton (see [`config`]) that the
//! embedding layer initializes once.

pub mod config;
pub mod error;
pub mod runtime;

// Re-export common types
pub use error::{Result, RuntimeError};
pub use runtime::closure::{Closure, Invocation};
pub use runtime::data::{Coerced, Coercion, Data};
pub use runtime::escape::{return_levels, return_to, try_with, Escape, Marker, Target};
pub use runtime::flow::Flow;
pub use runtime::key::Key;
pub use runtime::object::{Id, Object, ObjectBuilder};
pub use runtime::store::Attributes;
pub use runtime::symbol::Symbol;
pub use runtime::kernel;

// Re-export config types from quest-config
pub use quest_config::{Component, LimitConfig, RuntimeConfig, ValidationLevel};
