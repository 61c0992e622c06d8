//! # Structured Keys
//!
//! A [`Key`] is an ordered sequence of self-describing [`Value`]s. Keys compare
//! structurally: two keys are equal when every component is equal, and they are
//! ordered component by component with a shorter key sorting before any key it
//! is a prefix of.
//!
//! ## Value order
//!
//! Values of different kinds order by kind:
//!
//! `Undefined < Null < false < true < Number < BigInt < String < Bytes < Array < Object < Handle`
//!
//! Within a kind, numbers use [`f64::total_cmp`] (so `-0.0 < 0.0` and `NaN`
//! equals itself), strings and bytes compare bytewise, arrays lexicographically
//! and objects entry by entry in key order. This is exactly the order of the
//! wire encoding in [`codec`](super::codec), which is what makes range listing
//! work on raw bytes.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// An in-process platform object (a socket, a crypto key, ...).
///
/// Handles can be compared and held in memory but never written to storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    pub kind: String,
    pub id: u64,
}

impl Handle {
    pub fn new(kind: impl Into<String>, id: u64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

/// A self-describing value, usable both as a key component and as a stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    #[serde(skip)]
    Handle(Handle),
}

impl Value {
    /// Convenience constructor for [`Value::Bytes`].
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Builds an object from `(key, value)` pairs.
    pub fn object<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Name of the value's kind, as reported in errors.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Handle(handle) => &handle.kind,
        }
    }

    /// The first [`Handle`] found anywhere inside this value.
    pub fn find_handle(&self) -> Option<&Handle> {
        match self {
            Value::Handle(handle) => Some(handle),
            Value::Array(items) => items.iter().find_map(Value::find_handle),
            Value::Object(entries) => entries.values().find_map(Value::find_handle),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Undefined => 0,
            Value::Null => 1,
            Value::Bool(false) => 2,
            Value::Bool(true) => 3,
            Value::Number(_) => 4,
            Value::BigInt(_) => 5,
            Value::String(_) => 6,
            Value::Bytes(_) => 7,
            Value::Array(_) => 8,
            Value::Object(_) => 9,
            Value::Handle(_) => 10,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::BigInt(a), Value::BigInt(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Object(a), Value::Object(b)) => a.iter().cmp(b.iter()),
            (Value::Handle(a), Value::Handle(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::BigInt(n) => write!(f, "{n}n"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Handle(handle) => write!(f, "[{} #{}]", handle.kind, handle.id),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::BigInt(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Handle> for Value {
    fn from(handle: Handle) -> Self {
        Value::Handle(handle)
    }
}

/// A structured storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key(Vec<Value>);

impl Key {
    pub fn new(components: Vec<Value>) -> Self {
        Self(components)
    }

    /// A key with one component.
    pub fn single(value: impl Into<Value>) -> Self {
        Self(vec![value.into()])
    }

    pub fn components(&self) -> &[Value] {
        &self.0
    }

    pub fn into_components(self) -> Vec<Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends a component, returning the extended key.
    pub fn join(mut self, value: impl Into<Value>) -> Self {
        self.0.push(value.into());
        self
    }

    /// True when `prefix`'s components lead this key's components.
    pub fn starts_with(&self, prefix: &Key) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [only] => write!(f, "{only}"),
            components => {
                f.write_str("[")?;
                for (i, c) in components.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        Key::single(value)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::single(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::single(s)
    }
}

impl From<Vec<Value>> for Key {
    fn from(components: Vec<Value>) -> Self {
        Key(components)
    }
}

impl<V: Into<Value>, const N: usize> From<[V; N]> for Key {
    fn from(components: [V; N]) -> Self {
        Key(components.into_iter().map(Into::into).collect())
    }
}

/// Structural key equality.
pub fn equal(a: &Key, b: &Key) -> bool {
    a == b
}

/// Total order over keys, identical to the order of their encodings.
pub fn compare(a: &Key, b: &Key) -> Ordering {
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_order_by_rank() {
        let ladder = [
            Value::Undefined,
            Value::Null,
            Value::Bool(false),
            Value::Bool(true),
            Value::Number(f64::INFINITY),
            Value::BigInt(i128::MIN),
            Value::from(""),
            Value::Bytes(Vec::new()),
            Value::Array(vec![]),
            Value::object::<&str, Value>([]),
        ];
        for pair in ladder.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_numbers_use_total_order() {
        assert!(Value::Number(-0.0) < Value::Number(0.0));
        assert_ne!(Value::Number(-0.0), Value::Number(0.0));
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert!(Value::Number(f64::NEG_INFINITY) < Value::Number(-1.0));
    }

    #[test]
    fn test_deep_equality() {
        let a = Key::from([Value::from("users"), Value::object([("id", 7)])]);
        let b = Key::from([Value::from("users"), Value::object([("id", 7)])]);
        let c = Key::from([Value::from("users"), Value::object([("id", 8)])]);
        assert!(equal(&a, &b));
        assert!(!equal(&a, &c));
        assert_eq!(compare(&a, &c), Ordering::Less);
    }

    #[test]
    fn test_shorter_key_sorts_first() {
        let parent = Key::from(["a"]);
        let child = parent.clone().join("b");
        assert!(parent < child);
        assert!(child.starts_with(&parent));
        assert!(!parent.starts_with(&child));
    }

    #[test]
    fn test_find_handle_is_recursive() {
        let value = Value::object([(
            "nested",
            Value::Array(vec![Value::Null, Handle::new("CryptoKey", 1).into()]),
        )]);
        assert_eq!(value.find_handle().map(|h| h.kind.as_str()), Some("CryptoKey"));
        assert!(Value::from("plain").find_handle().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::single("a").to_string(), "\"a\"");
        assert_eq!(Key::from([Value::from("a"), Value::from(1)]).to_string(), "[\"a\", 1]");
        assert_eq!(Value::BigInt(5).to_string(), "5n");
    }
}
