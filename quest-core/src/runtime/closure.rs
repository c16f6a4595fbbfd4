//! Closures
//!
//! A closure is a shared body plus an optional owner. Binding never mutates:
//! [`Closure::bind`] returns a new closure sharing the body, so a template
//! stored once on a prototype can be bound to any number of receivers.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::dispatch;
use super::flow::Flow;
use super::key::Key;
use super::object::Object;
use crate::config;
use crate::error::{Result, RuntimeError};

type Body = dyn Fn(&Invocation<'_>) -> Result<Flow>;

/// A callable body with an optional bound receiver
#[derive(Clone)]
pub struct Closure {
    body: Rc<Body>,
    owner: Option<Object>,
}

impl Closure {
    /// Create an unbound closure
    ///
    /// # Example
    /// ```
    /// use quest_core::{Closure, Flow, Object};
    ///
    /// let first = Closure::new(|call| Ok(Flow::Value(call.arg(0))));
    /// let result = first.call(&[Object::number(1.0)]).unwrap().settle().unwrap();
    /// assert_eq!(result.as_number(), Some(1.0));
    /// ```
    pub fn new<F>(body: F) -> Closure
    where
        F: Fn(&Invocation<'_>) -> Result<Flow> + 'static,
    {
        Closure {
            body: Rc::new(body),
            owner: None,
        }
    }

    /// A new closure sharing this body, bound to `owner`
    pub fn bind(&self, owner: Object) -> Closure {
        Closure {
            body: Rc::clone(&self.body),
            owner: Some(owner),
        }
    }

    pub fn owner(&self) -> Option<&Object> {
        self.owner.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.owner.is_some()
    }

    /// Whether both closures run the same body
    pub fn shares_body(&self, other: &Closure) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }

    /// Invoke with `args`
    ///
    /// A bound closure sees its owner as receiver; an unbound one runs with
    /// the Null sentinel as receiver and only its captured environment.
    pub fn call(&self, args: &[Object]) -> Result<Flow> {
        self.call_from(None, args)
    }

    /// Invoke on behalf of an attribute found on `holder`
    pub(crate) fn call_from(&self, holder: Option<&Object>, args: &[Object]) -> Result<Flow> {
        let depth = CallDepth::enter()?;
        trace!(
            target: "quest::closure",
            bound = self.is_bound(),
            argc = args.len(),
            depth = depth.level(),
            "invoke"
        );
        let invocation = Invocation {
            this: self.owner.as_ref(),
            holder,
            args,
        };
        (self.body)(&invocation)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "Closure(bound to #{})", owner.id()),
            None => write!(f, "Closure(unbound)"),
        }
    }
}

/// What a closure body sees while running
///
/// Positional arguments are available through [`arg`](Self::arg) and the full
/// argument list through [`args`](Self::args) or [`arg_list`](Self::arg_list).
pub struct Invocation<'a> {
    this: Option<&'a Object>,
    holder: Option<&'a Object>,
    args: &'a [Object],
}

impl<'a> Invocation<'a> {
    /// The receiver, or the Null sentinel for an unbound call
    pub fn this(&self) -> Object {
        self.this.cloned().unwrap_or_else(Object::null)
    }

    pub fn is_bound(&self) -> bool {
        self.this.is_some()
    }

    /// Object on which the running attribute was found, when called through dispatch
    pub fn holder(&self) -> Option<&Object> {
        self.holder
    }

    /// Positional argument `index`, Null when missing
    pub fn arg(&self, index: usize) -> Object {
        self.args.get(index).cloned().unwrap_or_else(Object::null)
    }

    pub fn args(&self) -> &[Object] {
        self.args
    }

    /// All arguments as a List
    pub fn arg_list(&self) -> Object {
        Object::list(self.args.to_vec())
    }

    pub fn argc(&self) -> usize {
        self.args.len()
    }

    /// Invoke the ancestor implementation of `key` with the same receiver
    ///
    /// The walk starts above the object holding the running attribute, so an
    /// override defined on a prototype reaches the value it shadows even when
    /// invoked for a descendant.
    pub fn call_super(&self, key: impl Into<Key>, args: &[Object]) -> Result<Flow> {
        let this = self.this();
        let start = self.holder.unwrap_or(&this);
        dispatch::call_ancestor(&this, start, &key.into(), args)
    }
}

thread_local! {
    static CALL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Counts nested invocations; released on drop
pub(crate) struct CallDepth {
    level: usize,
}

impl CallDepth {
    pub(crate) fn enter() -> Result<CallDepth> {
        let limit = config::limits().max_call_depth;
        let level = CALL_DEPTH.with(|depth| depth.get()) + 1;
        if level > limit {
            return Err(RuntimeError::StackOverflow { limit });
        }
        CALL_DEPTH.with(|depth| depth.set(level));
        Ok(CallDepth { level })
    }

    fn level(&self) -> usize {
        self.level
    }
}

impl Drop for CallDepth {
    fn drop(&mut self) {
        CALL_DEPTH.with(|depth| depth.set(self.level - 1));
    }
}
