//! Base prototype attributes
//!
//! The attributes every root prototype starts with: construction, identity
//! and equality, truthiness, text and hash coercions, reflection, and
//! `try`/`return`. Value types living outside the core install their own
//! prototypes on top of one carrying these.

use tracing::debug;

use super::closure::{Closure, Invocation};
use super::data::{Coercion, Data};
use super::escape::{return_levels, return_to, try_with};
use super::flow::Flow;
use super::key::Key;
use super::object::Object;
use super::symbol::Symbol;
use crate::error::{Result, RuntimeError};
use crate::value;

/// A fresh root prototype carrying the base attributes
///
/// # Example
/// ```
/// use quest_core::{kernel, Object};
///
/// let root = kernel::pristine().unwrap();
/// let child = root.call_attr("birth", &[]).unwrap().settle().unwrap();
/// let answer = child.call_attr("is_a", &[root]).unwrap().settle().unwrap();
/// assert_eq!(answer.as_bool(), Some(true));
/// ```
pub fn pristine() -> Result<Object> {
    let root = Object::new_root();
    install(&root)?;
    Ok(root)
}

/// Define the base attributes on `target`
pub fn install(target: &Object) -> Result<()> {
    debug!(target: "quest::dispatch", id = %target.id(), "install kernel attributes");

    define(target, Symbol::BIRTH, |call| construct(call, "birth"))?;
    define(target, Symbol::INIT, |call| construct(call, "init"))?;
    define(target, Symbol::IS_A, |call| {
        Ok(boolean(call.this().is_a(&call.arg(0))))
    })?;
    define(target, Symbol::SUPER, |call| {
        Ok(Flow::Value(call.this().super_attr(Key::from_value(&call.arg(0)))))
    })?;
    define(target, Symbol::CLONE, |call| {
        Ok(Flow::Value(call.this().shallow_clone()))
    })?;

    define(target, Symbol::IDENTICAL, |call| {
        Ok(boolean(call.this().identical(&call.arg(0))))
    })?;
    define(target, Symbol::NOT_IDENTICAL, |call| {
        let same = value!(call.this().call_attr(Symbol::IDENTICAL, call.args()));
        Ok(boolean(!value!(truthy(&same))))
    })?;
    define(target, Symbol::EQL, |call| {
        call.this().call_attr(Symbol::IDENTICAL, call.args())
    })?;
    define(target, Symbol::NEQ, |call| {
        let equal = value!(call.this().call_attr(Symbol::EQL, call.args()));
        Ok(boolean(!value!(truthy(&equal))))
    })?;
    define(target, Symbol::NOT, |call| {
        let truth = value!(call.this().call_into(Coercion::Bool));
        Ok(boolean(truth.as_bool() != Some(true)))
    })?;

    define(target, Symbol::AT_BOOL, |_| Ok(boolean(true)))?;
    define(target, Symbol::AT_TEXT, |call| {
        Ok(Flow::Value(Object::text(format!("<object #{}>", call.this().id()))))
    })?;
    define(target, Symbol::AT_HASH, |call| {
        Ok(Flow::Value(Object::number(call.this().id().get() as f64)))
    })?;
    define(target, Symbol::RESPOND_TO, |call| {
        Ok(boolean(call.this().respond_to(Key::from_value(&call.arg(0)))))
    })?;

    define(target, Symbol::TRY, |call| {
        let body = call.arg(0);
        try_with(|marker| body.call_attr(Symbol::CALL, &[marker.clone()]))
    })?;
    define(target, Symbol::RETURN, |call| {
        let target = call.arg(0);
        let value = call.arg(1);
        match target.data() {
            Data::Null => return_levels(1, value),
            Data::Number(levels) => return_levels(levels.max(0.0) as usize, value),
            Data::Marker(_) => return_to(&target, value),
            other => Err(mismatch("return", "Number or Marker", other)),
        }
    })?;

    Ok(())
}

/// `birth`/`init`: a child of the receiver, optionally run through arg 0
fn construct(call: &Invocation<'_>, attr: &str) -> Result<Flow> {
    let init = call.arg(0);
    match init.data() {
        Data::Null => call.this().birth(None),
        Data::Closure(closure) => call.this().birth(Some(closure)),
        other => Err(mismatch(attr, "Closure", other)),
    }
}

fn define<F>(target: &Object, name: Symbol, body: F) -> Result<()>
where
    F: Fn(&Invocation<'_>) -> Result<Flow> + 'static,
{
    target.set(name, Object::closure(Closure::new(body)))
}

fn boolean(value: bool) -> Flow {
    Flow::Value(Object::boolean(value))
}

/// Native booleans answer directly; anything else goes through `@bool`
fn truthy(value: &Object) -> Result<Flow<bool>> {
    if let Some(b) = value.as_bool() {
        return Ok(Flow::Value(b));
    }
    Ok(value
        .call_into(Coercion::Bool)?
        .map(|coerced| coerced.as_bool() == Some(true)))
}

fn mismatch(attr: &str, expected: &'static str, found: &Data) -> RuntimeError {
    RuntimeError::TypeMismatch {
        attr: attr.to_string(),
        expected,
        found: found.kind_name(),
    }
}
