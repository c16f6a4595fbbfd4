//! Attribute keys
//!
//! A key is either an interned name or an arbitrary object. Object keys are
//! compared and hashed by identity, never by value.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::object::Object;
use super::symbol::Symbol;

/// Key of an attribute table entry
#[derive(Clone)]
pub enum Key {
    Symbol(Symbol),
    Object(Object),
}

impl Key {
    pub const ID: Key = Key::Symbol(Symbol::ID);
    pub const READONLY: Key = Key::Symbol(Symbol::READONLY);
    pub const PARENT: Key = Key::Symbol(Symbol::PARENT);
    pub const STEPPARENTS: Key = Key::Symbol(Symbol::STEPPARENTS);

    /// Key for a value handed in by script code: text becomes a name,
    /// anything else is used by identity
    pub fn from_value(value: &Object) -> Key {
        match value.as_text() {
            Some(name) => Key::Symbol(Symbol::intern(name)),
            None => Key::Object(value.clone()),
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Key::Symbol(symbol) => Some(*symbol),
            Key::Object(_) => None,
        }
    }

    /// Whether the store answers this key itself
    pub fn is_reserved(&self) -> bool {
        self.as_symbol().is_some_and(Symbol::is_reserved)
    }

    /// The key as a value: names become text, object keys are returned as is
    pub fn to_object(&self) -> Object {
        match self {
            Key::Symbol(symbol) => Object::text(symbol.as_str()),
            Key::Object(object) => object.clone(),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Symbol(a), Key::Symbol(b)) => a == b,
            (Key::Object(a), Key::Object(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Symbol(symbol) => {
                0u8.hash(state);
                symbol.hash(state);
            }
            Key::Object(object) => {
                1u8.hash(state);
                object.id().hash(state);
            }
        }
    }
}

impl From<Symbol> for Key {
    fn from(symbol: Symbol) -> Self {
        Key::Symbol(symbol)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Symbol(Symbol::intern(name))
    }
}

impl From<Object> for Key {
    fn from(object: Object) -> Self {
        Key::Object(object)
    }
}

impl From<&Object> for Key {
    fn from(object: &Object) -> Self {
        Key::Object(object.clone())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Symbol(symbol) => write!(f, "{symbol:?}"),
            Key::Object(object) => write!(f, "{object:?}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Symbol(symbol) => write!(f, "{symbol}"),
            Key::Object(object) => write!(f, "#{}", object.id()),
        }
    }
}
