//! try / return
//!
//! `try_with` installs a boundary identified by a fresh [`Marker`] and runs a
//! body; `return_levels` and `return_to` raise an [`Escape`] that travels
//! outward as [`Flow::Escape`] until a boundary claims it:
//!
//! - a marker target completes at the `try` owning that marker
//! - a level target completes at the first `try` once the count is ≤ 1,
//!   otherwise the count is decremented and the escape keeps going
//!
//! Boundaries live on a per-thread LIFO stack. Each `try` pops its own
//! boundary through a drop guard, so the stack stays balanced on every exit
//! path including failures.

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use super::flow::Flow;
use super::object::Object;
use crate::error::{Result, RuntimeError};

const TARGET: &str = "quest::escape";

static NEXT_MARKER: AtomicU64 = AtomicU64::new(1);

/// Unique token of one `try` invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Marker(u64);

impl Marker {
    fn next() -> Marker {
        Marker(NEXT_MARKER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an escape is headed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Number of enclosing `try`s still to unwind
    Levels(usize),
    /// The `try` owning this marker
    Marker(Marker),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Levels(levels) => write!(f, "returned {levels} levels too many"),
            Target::Marker(marker) => write!(f, "returned to try {marker}, which is not active"),
        }
    }
}

/// An in-flight `return`
#[derive(Debug, Clone)]
pub struct Escape {
    target: Target,
    value: Object,
}

impl Escape {
    pub fn new(target: Target, value: Object) -> Escape {
        Escape { target, value }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn value(&self) -> &Object {
        &self.value
    }

    /// Decide the escape's fate at the boundary owning `marker`
    fn land(self, marker: Marker) -> Flow {
        match self.target {
            Target::Marker(target) if target == marker => {
                debug!(target: TARGET, marker = %marker, "escape landed on its marker");
                Flow::Value(self.value)
            }
            Target::Levels(levels) if levels <= 1 => {
                debug!(target: TARGET, marker = %marker, "escape landed");
                Flow::Value(self.value)
            }
            Target::Levels(levels) => {
                trace!(target: TARGET, marker = %marker, remaining = levels - 1, "escape passes");
                Flow::Escape(Escape::new(Target::Levels(levels - 1), self.value))
            }
            Target::Marker(_) => Flow::Escape(self),
        }
    }
}

thread_local! {
    static BOUNDARIES: RefCell<Vec<Marker>> = const { RefCell::new(Vec::new()) };
}

/// Guard for one installed boundary; popping happens on drop
struct Boundary {
    marker: Marker,
}

impl Boundary {
    fn enter(marker: Marker) -> Boundary {
        BOUNDARIES.with(|stack| stack.borrow_mut().push(marker));
        trace!(target: TARGET, marker = %marker, depth = depth(), "enter try");
        Boundary { marker }
    }
}

impl Drop for Boundary {
    fn drop(&mut self) {
        let popped = BOUNDARIES.with(|stack| stack.borrow_mut().pop());
        debug_assert_eq!(popped, Some(self.marker), "boundary stack out of order");
        trace!(target: TARGET, marker = %self.marker, "leave try");
    }
}

/// Number of active `try` boundaries on this thread
pub fn depth() -> usize {
    BOUNDARIES.with(|stack| stack.borrow().len())
}

/// Whether the `try` owning `marker` is still running
pub fn is_active(marker: Marker) -> bool {
    BOUNDARIES.with(|stack| stack.borrow().contains(&marker))
}

/// Run `body` inside a new escape boundary
///
/// The body receives the boundary's marker object, which `return_to` accepts.
/// Errors from the body propagate untouched.
///
/// # Example
/// ```
/// use quest_core::{return_levels, try_with, value, Flow, Object};
///
/// let result = try_with(|_marker| {
///     value!(try_with(|_inner| return_levels(2, Object::text("out"))));
///     Ok(Flow::Value(Object::text("skipped")))
/// })
/// .unwrap()
/// .settle()
/// .unwrap();
/// assert_eq!(result.as_text(), Some("out"));
/// ```
pub fn try_with<F>(body: F) -> Result<Flow>
where
    F: FnOnce(&Object) -> Result<Flow>,
{
    let marker = Marker::next();
    let token = Object::marker(marker);
    let outcome = {
        let boundary = Boundary::enter(marker);
        let outcome = body(&token);
        drop(boundary);
        outcome
    };
    match outcome? {
        Flow::Value(value) => Ok(Flow::Value(value)),
        Flow::Escape(escape) => Ok(escape.land(marker)),
    }
}

/// Raise an escape that unwinds `levels` enclosing `try`s
///
/// A count below 1 is treated as 1.
///
/// # Errors
/// `UnhandledEscape` when fewer than `levels` boundaries are active
pub fn return_levels(levels: usize, value: Object) -> Result<Flow> {
    let levels = levels.max(1);
    let active = depth();
    if levels > active {
        return Err(RuntimeError::UnhandledEscape {
            remaining: Target::Levels(levels - active),
        });
    }
    debug!(target: TARGET, levels, "return");
    Ok(Flow::Escape(Escape::new(Target::Levels(levels), value)))
}

/// Raise an escape addressed to the `try` that produced `marker`
///
/// # Errors
/// `TypeMismatch` when `marker` is not a marker object, `UnhandledEscape`
/// when its `try` already finished
pub fn return_to(marker: &Object, value: Object) -> Result<Flow> {
    let target = marker.as_marker().ok_or_else(|| RuntimeError::TypeMismatch {
        attr: "return".to_string(),
        expected: "Marker",
        found: marker.data().kind_name(),
    })?;
    if !is_active(target) {
        return Err(RuntimeError::UnhandledEscape {
            remaining: Target::Marker(target),
        });
    }
    debug!(target: TARGET, marker = %target, "return to marker");
    Ok(Flow::Escape(Escape::new(Target::Marker(target), value)))
}
