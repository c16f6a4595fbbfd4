//! Attribute store
//!
//! The per-object table of attributes, plus the object's readonly keys, its
//! identity and its ancestor references. The store only knows its own entries;
//! walking the ancestors is done by [`Object::lookup`].
//!
//! The reserved keys are answered here and never inherited:
//! - `__id__`: the identity, as a Number (readonly)
//! - `__readonly__`: the readonly keys, as a List (readonly)
//! - `__parent__`: the parent slot; setting Null detaches it
//! - `__stepparents__`: the stepparent list; only a List may be stored
//!
//! A sealed store (the Null sentinel's) rejects every write.

use std::collections::{HashMap, HashSet};

use tracing::{trace, warn};

use super::data::Data;
use super::key::Key;
use super::object::{Id, Object};
use crate::error::{Result, RuntimeError};

const TARGET: &str = "quest::store";

/// Attribute table of one object
#[derive(Debug)]
pub struct Attributes {
    id: Id,
    table: HashMap<Key, Object>,
    readonly: HashSet<Key>,
    parent: Option<Object>,
    stepparents: Vec<Object>,
    sealed: bool,
}

impl Attributes {
    /// Create the store of a new object
    pub fn new(id: Id, parent: Option<Object>, stepparents: Vec<Object>) -> Self {
        let mut readonly = HashSet::with_capacity(2);
        readonly.insert(Key::ID);
        readonly.insert(Key::READONLY);
        Self {
            id,
            table: HashMap::new(),
            readonly,
            parent,
            stepparents,
            sealed: false,
        }
    }

    /// A store that rejects all writes, with no ancestors
    pub fn sealed(id: Id) -> Self {
        Self {
            sealed: true,
            ..Self::new(id, None, Vec::new())
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Identity of the owning object
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn is_readonly(&self, key: &Key) -> bool {
        self.sealed || self.readonly.contains(key)
    }

    /// Reject all further writes to `key`
    pub fn make_readonly(&mut self, key: Key) {
        if self.refuse_unchecked("make_readonly") {
            return;
        }
        trace!(target: TARGET, id = %self.id, key = %key, "make readonly");
        self.readonly.insert(key);
    }

    /// Whether `key` is present locally (ancestors are not consulted)
    pub fn has(&self, key: &Key) -> bool {
        if *key == Key::ID || *key == Key::READONLY {
            true
        } else if *key == Key::PARENT {
            self.parent.is_some()
        } else if *key == Key::STEPPARENTS {
            !self.stepparents.is_empty()
        } else {
            self.table.contains_key(key)
        }
    }

    /// Local value of `key`, `None` when absent
    pub fn get(&self, key: &Key) -> Option<Object> {
        if *key == Key::ID {
            Some(Object::number(self.id.get() as f64))
        } else if *key == Key::READONLY {
            Some(Object::list(self.readonly.iter().map(Key::to_object).collect()))
        } else if *key == Key::PARENT {
            self.parent.clone()
        } else if *key == Key::STEPPARENTS {
            (!self.stepparents.is_empty()).then(|| Object::list(self.stepparents.clone()))
        } else {
            self.table.get(key).cloned()
        }
    }

    /// Insert or replace `key`
    ///
    /// # Errors
    /// `ReadonlyViolation` if the key is readonly, `TypeMismatch` if a
    /// non-List is stored under `__stepparents__`
    pub fn set(&mut self, key: Key, value: Object) -> Result<()> {
        self.ensure_writable(&key)?;
        trace!(target: TARGET, id = %self.id, key = %key, value = ?value, "set");

        if key == Key::PARENT {
            self.parent = (!value.is_null()).then_some(value);
        } else if key == Key::STEPPARENTS {
            match value.data() {
                Data::List(items) => self.stepparents = items.clone(),
                other => {
                    return Err(RuntimeError::TypeMismatch {
                        attr: key.to_string(),
                        expected: "List",
                        found: other.kind_name(),
                    })
                }
            }
        } else {
            self.table.insert(key, value);
        }
        Ok(())
    }

    /// Remove `key`, returning the removed value or the Null sentinel
    ///
    /// # Errors
    /// `ReadonlyViolation` if the key is readonly
    pub fn delete(&mut self, key: &Key) -> Result<Object> {
        self.ensure_writable(key)?;
        trace!(target: TARGET, id = %self.id, key = %key, "delete");

        let removed = if *key == Key::PARENT {
            self.parent.take()
        } else if *key == Key::STEPPARENTS {
            let old = std::mem::take(&mut self.stepparents);
            (!old.is_empty()).then(|| Object::list(old))
        } else {
            self.table.remove(key)
        };
        Ok(removed.unwrap_or_else(Object::null))
    }

    pub fn parent(&self) -> Option<&Object> {
        self.parent.as_ref()
    }

    pub fn stepparents(&self) -> &[Object] {
        &self.stepparents
    }

    pub fn set_parent(&mut self, parent: Option<Object>) {
        if self.refuse_unchecked("set_parent") {
            return;
        }
        self.parent = parent;
    }

    /// Append a stepparent; it is consulted after the ones already present
    pub fn push_stepparent(&mut self, stepparent: Object) {
        if self.refuse_unchecked("push_stepparent") {
            return;
        }
        self.stepparents.push(stepparent);
    }

    /// Number of entries in the local table
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Shallow copy under a new identity: new containers, same values
    pub(crate) fn duplicate(&self, id: Id) -> Attributes {
        Attributes {
            id,
            table: self.table.clone(),
            readonly: self.readonly.clone(),
            parent: self.parent.clone(),
            stepparents: self.stepparents.clone(),
            sealed: self.sealed,
        }
    }

    /// Infallible mutators drop writes to a sealed store
    fn refuse_unchecked(&self, op: &str) -> bool {
        if self.sealed {
            warn!(target: TARGET, id = %self.id, op, "write to a sealed store ignored");
        }
        self.sealed
    }

    fn ensure_writable(&self, key: &Key) -> Result<()> {
        if self.is_readonly(key) {
            return Err(RuntimeError::ReadonlyViolation {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}
