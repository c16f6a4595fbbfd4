//! Validation interceptor
//!
//! Every get/set/delete/call goes through [`intercept`], which consults the
//! process-wide [`ValidationLevel`]:
//!
//! | level    | effect of a violation                    |
//! |----------|------------------------------------------|
//! | `off`    | nothing is checked                       |
//! | `warn`   | logged on `quest::validation`, continue  |
//! | `strict` | `RuntimeError::Validation`               |

use std::fmt;

use tracing::warn;

use super::data::Coercion;
use super::flow::Flow;
use super::key::Key;
use super::object::{Id, Object};
use crate::config;
use crate::error::{Result, RuntimeError};
use quest_config::ValidationLevel;

/// An intercepted dispatch operation
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    Get(&'a Key),
    Set(&'a Key, &'a Object),
    Delete(&'a Key),
    Call(&'a Key, &'a [Object]),
}

impl Operation<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Get(_) => "get",
            Operation::Set(..) => "set",
            Operation::Delete(_) => "delete",
            Operation::Call(..) => "call",
        }
    }

    pub fn key(&self) -> &Key {
        match self {
            Operation::Get(key) | Operation::Set(key, _) | Operation::Delete(key) | Operation::Call(key, _) => key,
        }
    }
}

/// A failed check
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub operation: &'static str,
    pub receiver: Id,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on #{}: {}", self.operation, self.receiver, self.message)
    }
}

/// Results the interceptor can inspect after an operation
pub(crate) trait Produced {
    fn produced(&self) -> Option<&Object>;
}

impl Produced for () {
    fn produced(&self) -> Option<&Object> {
        None
    }
}

impl Produced for Object {
    fn produced(&self) -> Option<&Object> {
        Some(self)
    }
}

impl Produced for Flow {
    fn produced(&self) -> Option<&Object> {
        match self {
            Flow::Value(value) => Some(value),
            Flow::Escape(_) => None,
        }
    }
}

/// Run `run` wrapped in the before/after checks of the current level
pub(crate) fn intercept<T, F>(receiver: &Object, op: Operation<'_>, run: F) -> Result<T>
where
    T: Produced,
    F: FnOnce() -> Result<T>,
{
    let level = config::validation_level();
    if !level.is_enabled() {
        return run();
    }

    for violation in check_before(receiver, &op) {
        report(level, violation)?;
    }
    let produced = run()?;
    if let Some(violation) = check_after(receiver, &op, produced.produced()) {
        report(level, violation)?;
    }
    Ok(produced)
}

/// Checks made before `op` runs on `receiver`
pub fn check_before(receiver: &Object, op: &Operation<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut violate = |message: String| {
        violations.push(Violation {
            operation: op.name(),
            receiver: receiver.id(),
            message,
        })
    };

    match op.key() {
        Key::Symbol(symbol) if symbol.as_str().is_empty() => {
            violate("attribute name is empty".to_string());
        }
        Key::Object(object) if object.is_null() => {
            violate("null used as an attribute key".to_string());
        }
        _ => {}
    }

    if let Operation::Set(key, value) = op {
        if **key == Key::PARENT && !value.is_null() && value.is_a(receiver) {
            violate(format!("parent #{} already inherits from the receiver", value.id()));
        }
        if **key == Key::STEPPARENTS && value.as_list().is_none() {
            violate(format!(
                "stepparents must be a List (got {})",
                value.data().kind_name()
            ));
        }
    }

    violations
}

/// Checks made on the value `op` produced
pub fn check_after(receiver: &Object, op: &Operation<'_>, produced: Option<&Object>) -> Option<Violation> {
    let Operation::Call(key, _) = op else {
        return None;
    };
    let coercion = key.as_symbol().and_then(Coercion::from_symbol)?;
    let value = produced?;
    if coercion.accepts(value) {
        return None;
    }
    Some(Violation {
        operation: op.name(),
        receiver: receiver.id(),
        message: format!(
            "{} didn't return {} (got {})",
            coercion.attr(),
            coercion.expected(),
            value.data().kind_name()
        ),
    })
}

fn report(level: ValidationLevel, violation: Violation) -> Result<()> {
    match level {
        ValidationLevel::Off => Ok(()),
        ValidationLevel::Warn => {
            warn!(target: "quest::validation", receiver = %violation.receiver, "{violation}");
            Ok(())
        }
        ValidationLevel::Strict => Err(RuntimeError::Validation(violation.to_string())),
    }
}
