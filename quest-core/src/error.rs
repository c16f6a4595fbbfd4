//! Runtime error types
//!
//! Every variant is fatal for the current top-level operation. Escapes raised
//! by `return` never travel through this type, see [`crate::Flow`].

use thiserror::Error;

use crate::runtime::escape::Target;

/// Unified runtime error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Write or delete on a readonly key
    #[error("attribute `{key}` is readonly")]
    ReadonlyViolation { key: String },

    /// A checked coercion produced the wrong kind of value
    #[error("{attr} didn't return {expected} (got {found})")]
    TypeMismatch {
        attr: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A `return` travelled past the outermost `try`
    #[error("{remaining}")]
    UnhandledEscape { remaining: Target },

    /// Strict validation rejected an operation
    #[error("validation failed: {0}")]
    Validation(String),

    /// Closure invocations nested deeper than the configured limit
    #[error("call depth exceeded the limit of {limit}")]
    StackOverflow { limit: usize },
}

/// Result alias used throughout the runtime
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuntimeError::ReadonlyViolation {
            key: "__id__".to_string(),
        };
        assert_eq!(err.to_string(), "attribute `__id__` is readonly");

        let err = RuntimeError::TypeMismatch {
            attr: "@num".to_string(),
            expected: "Number",
            found: "Null",
        };
        assert_eq!(err.to_string(), "@num didn't return Number (got Null)");

        let err = RuntimeError::UnhandledEscape {
            remaining: Target::Levels(2),
        };
        assert_eq!(err.to_string(), "returned 2 levels too many");
    }
}
