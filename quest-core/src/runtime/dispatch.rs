//! get/set/delete/call protocol
//!
//! The uniform attribute operations on [`Object`]. `get`, `set`, `delete` and
//! `call_attr` pass through the validation interceptor; `has` and
//! `respond_to` are plain queries.
//!
//! Calling an attribute:
//! 1. resolve it through the ancestor chain
//! 2. a Closure is bound to the receiver and invoked
//! 3. any other value has its own `()` attribute invoked
//! 4. an unresolved attribute yields Null

use tracing::trace;

use super::closure::CallDepth;
use super::data::{Coerced, Coercion};
use super::flow::Flow;
use super::key::Key;
use super::object::Object;
use super::symbol::Symbol;
use super::validation::{self, Operation};
use crate::error::{Result, RuntimeError};
use crate::value;

const TARGET: &str = "quest::dispatch";

impl Object {
    /// Chain value of `key`, or the Null sentinel when unresolved
    ///
    /// # Example
    /// ```
    /// use quest_core::Object;
    ///
    /// let proto = Object::new_root();
    /// proto.set("size", Object::number(3.0)).unwrap();
    /// let child = Object::with_parent(&proto);
    /// assert_eq!(child.get("size").unwrap().as_number(), Some(3.0));
    /// assert!(child.get("missing").unwrap().is_null());
    /// ```
    pub fn get(&self, key: impl Into<Key>) -> Result<Object> {
        let key = key.into();
        validation::intercept(self, Operation::Get(&key), || {
            let value = self.lookup(&key);
            trace!(target: TARGET, id = %self.id(), key = %key, found = value.is_some(), "get");
            Ok(value.unwrap_or_else(Object::null))
        })
    }

    /// Store `value` under `key` in the local table
    ///
    /// # Errors
    /// `ReadonlyViolation` for readonly keys
    pub fn set(&self, key: impl Into<Key>, value: Object) -> Result<()> {
        let key = key.into();
        validation::intercept(self, Operation::Set(&key, &value), || {
            self.attrs_mut().set(key.clone(), value.clone())
        })
    }

    /// Remove `key` from the local table, returning the old value or Null
    pub fn delete(&self, key: impl Into<Key>) -> Result<Object> {
        let key = key.into();
        validation::intercept(self, Operation::Delete(&key), || self.attrs_mut().delete(&key))
    }

    /// Whether `key` is present locally
    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.attrs().has(&key.into())
    }

    /// Whether `key` resolves anywhere in the chain
    pub fn respond_to(&self, key: impl Into<Key>) -> bool {
        self.resolve(&key.into()).is_some()
    }

    /// Call the attribute `key` with `args`, the receiver being `self`
    pub fn call_attr(&self, key: impl Into<Key>, args: &[Object]) -> Result<Flow> {
        let key = key.into();
        validation::intercept(self, Operation::Call(&key, args), || self.dispatch_call(&key, args))
    }

    /// Call a coercion attribute and check the payload kind of its result
    ///
    /// # Errors
    /// `TypeMismatch` when the result (Null included) lacks the expected payload
    pub fn call_into(&self, coercion: Coercion) -> Result<Flow<Coerced>> {
        let produced = value!(self.call_attr(coercion.attr(), &[]));
        coercion
            .extract(&produced)
            .map(Flow::Value)
            .ok_or_else(|| RuntimeError::TypeMismatch {
                attr: coercion.attr().to_string(),
                expected: coercion.expected(),
                found: produced.data().kind_name(),
            })
    }

    /// Ancestor value of `key`, skipping the local table; Null when unresolved
    pub fn super_attr(&self, key: impl Into<Key>) -> Object {
        self.super_lookup(&key.into()).unwrap_or_else(Object::null)
    }

    /// Call the ancestor value of `key` with `self` as receiver
    pub fn call_super(&self, key: impl Into<Key>, args: &[Object]) -> Result<Flow> {
        call_ancestor(self, self, &key.into(), args)
    }

    fn dispatch_call(&self, key: &Key, args: &[Object]) -> Result<Flow> {
        match self.resolve(key) {
            Some((holder, value)) => invoke(self, &holder, &value, args),
            None => self.call_intrinsic(key, args),
        }
    }

    /// Attributes a closure answers without a prototype defining them
    fn call_intrinsic(&self, key: &Key, args: &[Object]) -> Result<Flow> {
        if let Some(closure) = self.as_closure() {
            match key.as_symbol() {
                Some(Symbol::CALL) => return closure.call(args),
                Some(Symbol::BIND) => {
                    let owner = args.first().cloned().unwrap_or_else(Object::null);
                    return Ok(Flow::Value(Object::closure(closure.bind(owner))));
                }
                _ => {}
            }
        }
        trace!(target: TARGET, id = %self.id(), key = %key, "call of unresolved attribute");
        Ok(Flow::Value(Object::null()))
    }
}

/// Call the value of `key` found above `start`, with `this` as receiver
pub(crate) fn call_ancestor(this: &Object, start: &Object, key: &Key, args: &[Object]) -> Result<Flow> {
    match start.super_resolve(key) {
        Some((holder, value)) => {
            trace!(target: TARGET, id = %this.id(), key = %key, holder = %holder.id(), "super call");
            invoke(this, &holder, &value, args)
        }
        None => {
            trace!(target: TARGET, id = %this.id(), key = %key, "super call of unresolved attribute");
            Ok(Flow::Value(Object::null()))
        }
    }
}

fn invoke(this: &Object, holder: &Object, value: &Object, args: &[Object]) -> Result<Flow> {
    match value.as_closure() {
        Some(closure) => closure.bind(this.clone()).call_from(Some(holder), args),
        None => {
            let _depth = CallDepth::enter()?;
            value.call_attr(Symbol::CALL, args)
        }
    }
}
