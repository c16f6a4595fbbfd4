//! Prototype objects
//!
//! An [`Object`] is a shared handle to an identity, a native payload and an
//! attribute store. Behaviour comes from the ancestor graph: a single parent
//! plus an ordered list of stepparents, walked in a fixed order:
//!
//! ```text
//! local table → stepparents (in order, each through its full chain) → parent (full chain)
//! ```
//!
//! The first hit wins and the walk stops there. A walk visits each object at
//! most once, so shared ancestors (diamonds) and cycles cost one visit each.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use super::closure::Closure;
use super::data::Data;
use super::escape::Marker;
use super::flow::Flow;
use super::key::Key;
use super::store::Attributes;
use crate::config;
use crate::error::Result;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Globally unique object identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(u64);

impl Id {
    /// Allocate a fresh identity
    pub fn next() -> Id {
        Id(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to a prototype object
///
/// Cloning the handle shares the object; [`Object::shallow_clone`] makes a new
/// one. `==` on handles is identity (`===`).
#[derive(Clone)]
pub struct Object(Rc<Inner>);

struct Inner {
    id: Id,
    data: Data,
    attrs: RefCell<Attributes>,
}

thread_local! {
    static NULL: Object = Object::sealed_null();
}

impl Object {
    fn from_parts(data: Data, parent: Option<Object>, stepparents: Vec<Object>) -> Object {
        let id = Id::next();
        Object(Rc::new(Inner {
            id,
            data,
            attrs: RefCell::new(Attributes::new(id, parent, stepparents)),
        }))
    }

    fn sealed_null() -> Object {
        let id = Id::next();
        Object(Rc::new(Inner {
            id,
            data: Data::Null,
            attrs: RefCell::new(Attributes::sealed(id)),
        }))
    }

    // ==================== Construction ====================

    /// A new object with an empty store and no ancestors
    pub fn new_root() -> Object {
        Object::from_parts(Data::Plain, None, Vec::new())
    }

    /// A new empty object whose parent is `parent`
    pub fn with_parent(parent: &Object) -> Object {
        Object::from_parts(Data::Plain, Some(parent.clone()), Vec::new())
    }

    pub fn builder() -> ObjectBuilder {
        ObjectBuilder::default()
    }

    /// The Null sentinel returned for unresolved attributes
    ///
    /// Its store is sealed: `set` and `delete` on it fail with
    /// `ReadonlyViolation`.
    pub fn null() -> Object {
        NULL.with(Object::clone)
    }

    pub fn boolean(value: bool) -> Object {
        Object::from_parts(Data::Boolean(value), None, Vec::new())
    }

    pub fn number(value: f64) -> Object {
        Object::from_parts(Data::Number(value), None, Vec::new())
    }

    pub fn text(value: impl Into<String>) -> Object {
        Object::from_parts(Data::Text(value.into()), None, Vec::new())
    }

    pub fn list(items: Vec<Object>) -> Object {
        Object::from_parts(Data::List(items), None, Vec::new())
    }

    pub fn map(pairs: Vec<(Object, Object)>) -> Object {
        Object::from_parts(Data::Map(pairs), None, Vec::new())
    }

    pub fn closure(closure: Closure) -> Object {
        Object::from_parts(Data::Closure(closure), None, Vec::new())
    }

    pub(crate) fn marker(marker: Marker) -> Object {
        Object::from_parts(Data::Marker(marker), None, Vec::new())
    }

    /// Shallow copy: a fresh identity and a new table holding the same values
    pub fn shallow_clone(&self) -> Object {
        let id = Id::next();
        let attrs = self.0.attrs.borrow().duplicate(id);
        Object(Rc::new(Inner {
            id,
            data: self.0.data.clone(),
            attrs: RefCell::new(attrs),
        }))
    }

    // ==================== Identity and payload ====================

    pub fn id(&self) -> Id {
        self.0.id
    }

    /// Identity equality (`===`)
    pub fn identical(&self, other: &Object) -> bool {
        self.0.id == other.0.id
    }

    pub fn data(&self) -> &Data {
        &self.0.data
    }

    pub fn is_null(&self) -> bool {
        matches!(self.0.data, Data::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.0.data {
            Data::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.0.data {
            Data::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.0.data {
            Data::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Object]> {
        match &self.0.data {
            Data::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Object, Object)]> {
        match &self.0.data {
            Data::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&Closure> {
        match &self.0.data {
            Data::Closure(closure) => Some(closure),
            _ => None,
        }
    }

    pub fn as_marker(&self) -> Option<Marker> {
        match self.0.data {
            Data::Marker(marker) => Some(marker),
            _ => None,
        }
    }

    // ==================== Store access ====================

    /// Direct read access to the attribute store
    ///
    /// # Panics
    /// Panics if the store is mutably borrowed, which only happens while a
    /// `attrs_mut` guard is alive on the same object.
    pub fn attrs(&self) -> Ref<'_, Attributes> {
        self.0.attrs.borrow()
    }

    /// Direct write access to the attribute store, bypassing validation
    pub fn attrs_mut(&self) -> RefMut<'_, Attributes> {
        self.0.attrs.borrow_mut()
    }

    pub fn parent(&self) -> Option<Object> {
        self.attrs().parent().cloned()
    }

    pub fn stepparents(&self) -> Vec<Object> {
        self.attrs().stepparents().to_vec()
    }

    pub fn set_parent(&self, parent: Option<Object>) {
        self.attrs_mut().set_parent(parent);
    }

    pub fn push_stepparent(&self, stepparent: Object) {
        self.attrs_mut().push_stepparent(stepparent);
    }

    pub fn make_readonly(&self, key: impl Into<Key>) {
        self.attrs_mut().make_readonly(key.into());
    }

    // ==================== Chain lookup ====================

    /// Chain-aware lookup; `None` when no object in the chain has `key`
    pub fn lookup(&self, key: &Key) -> Option<Object> {
        self.resolve(key).map(|(_, value)| value)
    }

    /// Like [`lookup`](Self::lookup), also returning the object that held the value
    pub fn resolve(&self, key: &Key) -> Option<(Object, Object)> {
        self.resolve_at(key, 0, &mut Walk::new())
    }

    /// Lookup that skips the local table and starts at the ancestors
    pub fn super_lookup(&self, key: &Key) -> Option<Object> {
        self.super_resolve(key).map(|(_, value)| value)
    }

    pub(crate) fn super_resolve(&self, key: &Key) -> Option<(Object, Object)> {
        if key.is_reserved() {
            return None;
        }
        let mut walk = Walk::new();
        walk.enter(self.id());
        let attrs = self.attrs();
        resolve_in_ancestors(&attrs, key, 0, &mut walk)
    }

    fn resolve_at(&self, key: &Key, depth: usize, walk: &mut Walk) -> Option<(Object, Object)> {
        if !walk.enter(self.id()) {
            return None;
        }
        let attrs = self.attrs();
        if let Some(value) = attrs.get(key) {
            return Some((self.clone(), value));
        }
        if key.is_reserved() {
            return None;
        }
        resolve_in_ancestors(&attrs, key, depth, walk)
    }

    // ==================== Prototypal operations ====================

    /// Structural instance-of over the ancestor graph
    ///
    /// True if `self` is `other`, or if any stepparent (in order) or the parent
    /// `is_a` `other`.
    pub fn is_a(&self, other: &Object) -> bool {
        self.is_a_at(other, 0, &mut Walk::new())
    }

    fn is_a_at(&self, other: &Object, depth: usize, walk: &mut Walk) -> bool {
        if self.identical(other) {
            return true;
        }
        if !walk.enter(self.id()) {
            return false;
        }
        if depth >= walk.limit {
            warn!(target: "quest::store", id = %self.id(), limit = walk.limit, "ancestor walk hit the depth limit");
            return false;
        }
        let attrs = self.attrs();
        attrs
            .stepparents()
            .iter()
            .chain(attrs.parent())
            .any(|ancestor| ancestor.is_a_at(other, depth + 1, walk))
    }

    /// Create a child whose sole parent is `self`
    ///
    /// When `init` is given it runs right away with the child as receiver; an
    /// escape raised by it propagates instead of the child.
    pub fn birth(&self, init: Option<&Closure>) -> Result<Flow> {
        let builder = Object::builder().parent(self);
        match init {
            Some(init) => builder.build_with(init),
            None => Ok(Flow::Value(builder.build())),
        }
    }
}

/// State of one ancestor walk
struct Walk {
    visited: HashSet<Id>,
    limit: usize,
}

impl Walk {
    fn new() -> Walk {
        Walk {
            visited: HashSet::new(),
            limit: config::limits().max_chain_depth,
        }
    }

    /// Mark `id` visited; false when this walk has already been there
    fn enter(&mut self, id: Id) -> bool {
        self.visited.insert(id)
    }
}

fn resolve_in_ancestors(
    attrs: &Attributes,
    key: &Key,
    depth: usize,
    walk: &mut Walk,
) -> Option<(Object, Object)> {
    if depth >= walk.limit {
        warn!(target: "quest::store", id = %attrs.id(), key = %key, limit = walk.limit, "ancestor walk hit the depth limit");
        return None;
    }
    for stepparent in attrs.stepparents() {
        if let Some(found) = stepparent.resolve_at(key, depth + 1, walk) {
            return Some(found);
        }
    }
    attrs
        .parent()
        .and_then(|parent| parent.resolve_at(key, depth + 1, walk))
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.identical(other)
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            Data::Plain => write!(f, "Object#{}", self.0.id),
            Data::Null => write!(f, "Null"),
            Data::Boolean(b) => write!(f, "Boolean({b})"),
            Data::Number(n) => write!(f, "Number({n})"),
            Data::Text(t) => write!(f, "Text({t:?})"),
            Data::List(items) => f.debug_tuple("List").field(items).finish(),
            Data::Map(pairs) => f.debug_tuple("Map").field(pairs).finish(),
            Data::Closure(closure) => write!(f, "{closure:?}#{}", self.0.id),
            Data::Marker(marker) => write!(f, "Marker({marker})"),
        }
    }
}

/// Builder for objects with ancestors, a payload or an initializer
///
/// # Example
/// ```
/// use quest_core::{Object, Data};
///
/// let mixin = Object::new_root();
/// let base = Object::new_root();
/// let obj = Object::builder()
///     .parent(&base)
///     .stepparent(&mixin)
///     .data(Data::Number(1.0))
///     .build();
/// assert!(obj.is_a(&mixin));
/// ```
#[derive(Default)]
pub struct ObjectBuilder {
    parent: Option<Object>,
    stepparents: Vec<Object>,
    data: Data,
}

impl ObjectBuilder {
    pub fn parent(mut self, parent: &Object) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Append a stepparent, consulted before the parent and after earlier stepparents
    pub fn stepparent(mut self, stepparent: &Object) -> Self {
        self.stepparents.push(stepparent.clone());
        self
    }

    pub fn data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    pub fn build(self) -> Object {
        Object::from_parts(self.data, self.parent, self.stepparents)
    }

    /// Build, then run `init` with the new object as receiver
    ///
    /// The initializer's own result is discarded; the new object is returned
    /// unless the initializer raised an escape.
    pub fn build_with(self, init: &Closure) -> Result<Flow> {
        let object = self.build();
        match init.bind(object.clone()).call(&[])? {
            Flow::Value(_) => Ok(Flow::Value(object)),
            escape => Ok(escape),
        }
    }
}
