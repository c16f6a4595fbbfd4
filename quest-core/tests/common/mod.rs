//! Test helpers
//!
//! Shortcuts for building prototypes and calling attributes in integration tests
#![allow(dead_code)]

use quest_core::{kernel, Closure, Flow, Invocation, Key, Object, Result};

/// Wrap a body as a closure object, ready to be stored as an attribute
pub fn method<F>(body: F) -> Object
where
    F: Fn(&Invocation<'_>) -> Result<Flow> + 'static,
{
    Object::closure(Closure::new(body))
}

/// A method that always answers `value`
pub fn constant(value: Object) -> Object {
    method(move |_| Ok(Flow::Value(value.clone())))
}

/// Call `key` on `obj` and settle the result, panicking on errors or escapes
pub fn call(obj: &Object, key: impl Into<Key>, args: &[Object]) -> Object {
    obj.call_attr(key, args)
        .and_then(Flow::settle)
        .unwrap_or_else(|e| panic!("call failed: {e}"))
}

/// A fresh root prototype with the base attributes installed
pub fn root() -> Object {
    kernel::pristine().unwrap_or_else(|e| panic!("kernel install failed: {e}"))
}

/// A child of `proto` created through its `birth` attribute
pub fn birth(proto: &Object) -> Object {
    call(proto, "birth", &[])
}

/// Text payload of `obj`, panicking when it has none
pub fn text(obj: &Object) -> String {
    obj.as_text()
        .unwrap_or_else(|| panic!("expected Text, got {obj:?}"))
        .to_string()
}

/// Number payload of `obj`, panicking when it has none
pub fn num(obj: &Object) -> f64 {
    obj.as_number()
        .unwrap_or_else(|| panic!("expected Number, got {obj:?}"))
}
