//! Native payloads
//!
//! Every object may carry one native payload next to its attributes. The
//! built-in value types live outside the core; the core only needs the
//! payload kinds to check coercion results and to recognize closures.

use super::closure::Closure;
use super::escape::Marker;
use super::object::Object;
use super::symbol::Symbol;

/// Native payload of an object
#[derive(Debug, Clone, Default)]
pub enum Data {
    /// Ordinary prototype object
    #[default]
    Plain,
    /// The Null sentinel
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
    List(Vec<Object>),
    /// Ordered key/value pairs
    Map(Vec<(Object, Object)>),
    Closure(Closure),
    /// Token identifying an active `try`
    Marker(Marker),
}

impl Data {
    /// Name of the payload kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Data::Plain => "Object",
            Data::Null => "Null",
            Data::Boolean(_) => "Boolean",
            Data::Number(_) => "Number",
            Data::Text(_) => "Text",
            Data::List(_) => "List",
            Data::Map(_) => "Map",
            Data::Closure(_) => "Closure",
            Data::Marker(_) => "Marker",
        }
    }
}

/// The coercion attributes every value type may expose
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coercion {
    Bool,
    Num,
    Text,
    List,
    Map,
}

impl Coercion {
    /// The attribute called to coerce
    pub fn attr(self) -> Symbol {
        match self {
            Coercion::Bool => Symbol::AT_BOOL,
            Coercion::Num => Symbol::AT_NUM,
            Coercion::Text => Symbol::AT_TEXT,
            Coercion::List => Symbol::AT_LIST,
            Coercion::Map => Symbol::AT_MAP,
        }
    }

    /// Payload kind the attribute must produce
    pub fn expected(self) -> &'static str {
        match self {
            Coercion::Bool => "Boolean",
            Coercion::Num => "Number",
            Coercion::Text => "Text",
            Coercion::List => "List",
            Coercion::Map => "Map",
        }
    }

    pub fn from_symbol(symbol: Symbol) -> Option<Coercion> {
        match symbol {
            Symbol::AT_BOOL => Some(Coercion::Bool),
            Symbol::AT_NUM => Some(Coercion::Num),
            Symbol::AT_TEXT => Some(Coercion::Text),
            Symbol::AT_LIST => Some(Coercion::List),
            Symbol::AT_MAP => Some(Coercion::Map),
            _ => None,
        }
    }

    /// Whether `value` carries the expected payload
    pub fn accepts(self, value: &Object) -> bool {
        self.extract(value).is_some()
    }

    /// Copy the native payload out of `value` if it has the expected kind
    pub fn extract(self, value: &Object) -> Option<Coerced> {
        match (self, value.data()) {
            (Coercion::Bool, Data::Boolean(b)) => Some(Coerced::Bool(*b)),
            (Coercion::Num, Data::Number(n)) => Some(Coerced::Num(*n)),
            (Coercion::Text, Data::Text(t)) => Some(Coerced::Text(t.clone())),
            (Coercion::List, Data::List(items)) => Some(Coerced::List(items.clone())),
            (Coercion::Map, Data::Map(pairs)) => Some(Coerced::Map(pairs.clone())),
            _ => None,
        }
    }
}

/// Native value produced by a checked coercion
#[derive(Debug, Clone)]
pub enum Coerced {
    Bool(bool),
    Num(f64),
    Text(String),
    List(Vec<Object>),
    Map(Vec<(Object, Object)>),
}

impl Coerced {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Coerced::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Coerced::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Coerced::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Object>> {
        match self {
            Coerced::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<Vec<(Object, Object)>> {
        match self {
            Coerced::Map(pairs) => Some(pairs),
            _ => None,
        }
    }
}
