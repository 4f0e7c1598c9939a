//! Dynamic Value Model
//!
//! Signals store `Value`s: either a leaf primitive or an object-shaped map
//! from property name to nested `Value`. The map variant is what makes a
//! signal a *node* in the graph: each of its keys can be lazily
//! materialized into a child signal on first tracked read.
//!
//! # Null Is Object-Shaped
//!
//! `Value::Null` counts as object-shaped for the purposes of whole-object
//! assignment. Merging into or from a `Null` value is a silent no-op rather
//! than an error. This mirrors the host-language convention the runtime was
//! designed around and is a documented surprise, not a defect.

use indexmap::IndexMap;

/// A value stored in a signal cell.
///
/// Leaf variants (`Bool`, `Int`, `Float`, `Str`) notify on every write.
/// `Map` values are merged key-by-key instead of being replaced, keeping the
/// node's identity stable while its children update.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent value. Object-shaped; see module docs.
    Null,
    /// Boolean leaf.
    Bool(bool),
    /// Integer leaf.
    Int(i64),
    /// Floating-point leaf.
    Float(f64),
    /// String leaf.
    Str(String),
    /// Object-shaped node value: property name to nested value.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Build an object-shaped value from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Whether this value is object-shaped (`Map` or `Null`).
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Map(_) | Value::Null)
    }

    /// Whether this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the map entries if this is a `Map`.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Mutably borrow the map entries if this is a `Map`.
    pub(crate) fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Extract an integer, if this is an `Int` leaf.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract a float, if this is a `Float` leaf.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract a boolean, if this is a `Bool` leaf.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract a string slice, if this is a `Str` leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key, if this is a `Map`. Absent keys read as `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<K, V> FromIterator<(K, V)> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::map(iter)
    }
}
