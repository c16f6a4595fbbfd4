//! Value-or-escape results
//!
//! Dispatch returns `Result<Flow>`: `Err` carries failures, `Flow::Escape`
//! carries an in-flight `return`. The two never share a channel, so error
//! handling can't swallow an escape and `try` can't swallow an error.

use super::escape::Escape;
use super::object::Object;
use crate::error::{Result, RuntimeError};

/// Normal completion or an escape on its way to a `try`
#[derive(Debug, Clone)]
pub enum Flow<T = Object> {
    Value(T),
    Escape(Escape),
}

impl<T> Flow<T> {
    pub fn is_escape(&self) -> bool {
        matches!(self, Flow::Escape(_))
    }

    /// The completed value, `None` for an escape
    pub fn value(self) -> Option<T> {
        match self {
            Flow::Value(value) => Some(value),
            Flow::Escape(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Flow<U> {
        match self {
            Flow::Value(value) => Flow::Value(f(value)),
            Flow::Escape(escape) => Flow::Escape(escape),
        }
    }

    /// Finish at the top level: an escape that got this far has no `try`
    /// left to land on
    pub fn settle(self) -> Result<T> {
        match self {
            Flow::Value(value) => Ok(value),
            Flow::Escape(escape) => Err(RuntimeError::UnhandledEscape {
                remaining: escape.target(),
            }),
        }
    }
}

impl From<Object> for Flow {
    fn from(value: Object) -> Self {
        Flow::Value(value)
    }
}

/// Unwrap the value of a `Result<Flow>`, returning early from the enclosing
/// function on an error or an escape
///
/// # Example
/// ```
/// use quest_core::{value, Closure, Flow, Object, Result};
///
/// fn twice(f: &Closure) -> Result<Flow> {
///     let first = value!(f.call(&[]));
///     let second = value!(f.call(&[first]));
///     Ok(Flow::Value(second))
/// }
///
/// let echo = Closure::new(|call| Ok(Flow::Value(call.arg(0))));
/// assert!(twice(&echo).unwrap().settle().unwrap().is_null());
/// ```
#[macro_export]
macro_rules! value {
    ($flow:expr) => {
        match $flow? {
            $crate::Flow::Value(value) => value,
            $crate::Flow::Escape(escape) => return Ok($crate::Flow::Escape(escape)),
        }
    };
}
