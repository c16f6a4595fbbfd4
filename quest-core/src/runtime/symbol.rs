//! Interned attribute names
//!
//! Attribute names are interned once into a process-wide table and handled as
//! `u32` symbols afterwards, so dispatch compares integers instead of strings.
//! Interned text lives for the rest of the process.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use once_cell::sync::Lazy;

/// An interned attribute name
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

/// Names interned at startup, in this order, so they get fixed indices
const PREDEFINED: [&str; 25] = [
    "__id__",
    "__readonly__",
    "__parent__",
    "__stepparents__",
    "()",
    "@bool",
    "@num",
    "@text",
    "@list",
    "@map",
    "bind",
    "birth",
    "is_a",
    "super",
    "clone",
    "===",
    "!==",
    "==",
    "!=",
    "!",
    "@hash",
    "respond_to",
    "try",
    "return",
    "init",
];

impl Symbol {
    pub const ID: Symbol = Symbol(0);
    pub const READONLY: Symbol = Symbol(1);
    pub const PARENT: Symbol = Symbol(2);
    pub const STEPPARENTS: Symbol = Symbol(3);
    pub const CALL: Symbol = Symbol(4);
    pub const AT_BOOL: Symbol = Symbol(5);
    pub const AT_NUM: Symbol = Symbol(6);
    pub const AT_TEXT: Symbol = Symbol(7);
    pub const AT_LIST: Symbol = Symbol(8);
    pub const AT_MAP: Symbol = Symbol(9);
    pub const BIND: Symbol = Symbol(10);
    pub const BIRTH: Symbol = Symbol(11);
    pub const IS_A: Symbol = Symbol(12);
    pub const SUPER: Symbol = Symbol(13);
    pub const CLONE: Symbol = Symbol(14);
    pub const IDENTICAL: Symbol = Symbol(15);
    pub const NOT_IDENTICAL: Symbol = Symbol(16);
    pub const EQL: Symbol = Symbol(17);
    pub const NEQ: Symbol = Symbol(18);
    pub const NOT: Symbol = Symbol(19);
    pub const AT_HASH: Symbol = Symbol(20);
    pub const RESPOND_TO: Symbol = Symbol(21);
    pub const TRY: Symbol = Symbol(22);
    pub const RETURN: Symbol = Symbol(23);
    pub const INIT: Symbol = Symbol(24);

    /// Intern `name`, returning the existing symbol if it was seen before
    pub fn intern(name: &str) -> Symbol {
        lock().intern(name)
    }

    /// The interned text
    pub fn as_str(self) -> &'static str {
        lock().resolve(self)
    }

    /// Keys the attribute store answers itself instead of the table
    pub fn is_reserved(self) -> bool {
        self.0 <= Symbol::STEPPARENTS.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::intern(name)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static INTERNER: Lazy<Mutex<Interner>> = Lazy::new(|| Mutex::new(Interner::with_predefined()));

fn lock() -> std::sync::MutexGuard<'static, Interner> {
    // the table is append-only, a poisoned lock still holds consistent data
    INTERNER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Interner {
    lookup: HashMap<&'static str, Symbol>,
    names: Vec<&'static str>,
}

impl Interner {
    fn with_predefined() -> Self {
        let mut interner = Interner {
            lookup: HashMap::with_capacity(64),
            names: Vec::with_capacity(64),
        };
        for name in PREDEFINED {
            interner.insert(name);
        }
        interner
    }

    fn intern(&mut self, name: &str) -> Symbol {
        if let Some(symbol) = self.lookup.get(name) {
            return *symbol;
        }
        let leaked: &'static str = Box::leak(name.to_owned().into_boxed_str());
        self.insert(leaked)
    }

    fn insert(&mut self, name: &'static str) -> Symbol {
        assert!(
            self.names.len() < u32::MAX as usize,
            "symbol table overflow"
        );
        let symbol = Symbol(self.names.len() as u32);
        self.names.push(name);
        self.lookup.insert(name, symbol);
        symbol
    }

    fn resolve(&self, symbol: Symbol) -> &'static str {
        self.names[symbol.0 as usize]
    }
}
