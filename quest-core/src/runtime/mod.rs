//! Quest runtime
//!
//! Leaves first:
//! - `symbol` / `key`: interned attribute names and attribute keys
//! - `store`: the per-object attribute table
//! - `object`: prototype objects and chain lookup
//! - `dispatch` / `validation`: get/set/delete/call and the interceptor
//! - `closure` / `flow` / `escape`: callables and non-local return
//! - `kernel`: the base attributes of a root prototype

// ==================== Names and keys ====================

/// Interned attribute names
pub mod symbol;

/// Attribute keys
pub mod key;

// ==================== Objects ====================

/// Native payloads and coercions
pub mod data;

/// Attribute store
pub mod store;

/// Prototype objects
pub mod object;

// ==================== Dispatch ====================

/// get/set/delete/call protocol
pub mod dispatch;

/// Validation interceptor
pub mod validation;

// ==================== Control ====================

/// Closures
pub mod closure;

/// Value-or-escape results
pub mod flow;

/// try / return
pub mod escape;

// ==================== Kernel ====================

/// Base prototype attributes
pub mod kernel;
