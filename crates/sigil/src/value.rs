// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Render-time data.
//!
//! A render call receives a [`Data`] mapping from key to [`Value`]. Values
//! mirror JSON, plus two engine-specific variants: [`Value::Safe`] for
//! pre-escaped text and [`Value::Template`] for an uninvoked nested template.
//!
//! A key that is absent from the mapping is "undefined"; [`Value::Null`] is an
//! explicit null. Placeholders and conditionals treat both the same way.
//!
//! ```rust,ignore
//! use sigil::{Data, Value};
//!
//! let data = Data::new()
//!     .with("name", "Alice")
//!     .with("nums", vec![1, 2, 3]);
//!
//! let same = Data::from_json(serde_json::json!({ "name": "Alice", "nums": [1, 2, 3] }))?;
//! assert_eq!(data, same);
//! ```

use crate::error::{Result, SigilError};
use crate::safe_string::SafeString;
use crate::template::CompiledTemplate;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A dynamic value supplied as template data.
#[derive(Debug, Clone)]
pub enum Value {
    /// Explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A JSON number.
    Number(serde_json::Number),
    /// A string, escaped on output.
    String(String),
    /// An ordered sequence; the only iterable value.
    Array(Vec<Value>),
    /// A string-keyed map.
    Object(BTreeMap<String, Value>),
    /// Pre-escaped text, emitted verbatim.
    Safe(SafeString),
    /// A nested template that has not been invoked yet.
    Template(CompiledTemplate),
}

impl Value {
    /// Truthiness as used by `@if`.
    ///
    /// `Null`, `false`, zero, NaN and the empty string are falsy. Everything
    /// else is truthy, including empty arrays and objects.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Safe(_) | Value::Template(_) => true,
        }
    }

    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The elements of an array value.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Safe(_) => "safe string",
            Value::Template(_) => "template",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Safe(a), Value::Safe(b)) => a == b,
            (Value::Template(a), Value::Template(b)) => CompiledTemplate::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn fmt_number(n: &serde_json::Number, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(i) = n.as_i64() {
        write!(f, "{}", i)
    } else if let Some(u) = n.as_u64() {
        write!(f, "{}", u)
    } else {
        // f64's Display already prints integral floats without a fraction.
        write!(f, "{}", n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Stringification applied before escaping.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => fmt_number(n, f),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Object(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            Value::Safe(s) => f.write_str(s.as_str()),
            Value::Template(t) => f.write_str(t.source()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Safe(s) => s.serialize(serializer),
            Value::Template(t) => serializer.serialize_str(t.source()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
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

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(serde_json::Number::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Non-finite floats have no JSON representation and become `Null`.
    fn from(f: f64) -> Self {
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::from(f64::from(f))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<SafeString> for Value {
    fn from(s: SafeString) -> Self {
        Value::Safe(s)
    }
}

impl From<CompiledTemplate> for Value {
    fn from(t: CompiledTemplate) -> Self {
        Value::Template(t)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

/// The data mapping handed to a render call.
///
/// Keys are kept in sorted order, so when several keys are rejected the one
/// reported is always the first in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data(BTreeMap<String, Value>);

impl Data {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Looks up a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// True if the key is present (even if its value is null).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts a JSON object into a data mapping.
    ///
    /// # Errors
    ///
    /// Returns [`SigilError::InvalidData`] if `json` is not an object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect()),
            other => Err(SigilError::InvalidData(format!(
                "expected a JSON object, found {}",
                Value::from(other).type_name()
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Data {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, Value>> for Data {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl IntoIterator for Data {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for Data {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        for falsy in [
            Value::from(0),
            Value::from(0.0),
            Value::from(""),
            Value::Null,
            Value::from(false),
        ] {
            assert!(!falsy.is_truthy(), "{:?} should be falsy", falsy);
        }

        for truthy in [
            Value::from(1),
            Value::from("x"),
            Value::from(-0.5),
            Value::Object(BTreeMap::new()),
            Value::Array(Vec::new()),
            Value::Safe(SafeString::new("")),
        ] {
            assert!(truthy.is_truthy(), "{:?} should be truthy", truthy);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(1.0).to_string(), "1");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "1,2,3");
        assert_eq!(
            Value::from(json!(["a", null, "b"])).to_string(),
            "a,,b"
        );
        assert_eq!(
            Value::from(json!({"b": 1, "a": "x"})).to_string(),
            r#"{"a":"x","b":1}"#
        );
    }

    #[test]
    fn test_from_json() {
        let data = Data::from_json(json!({"name": "Alice", "nums": [1, 2]})).unwrap();
        assert_eq!(data.get("name"), Some(&Value::from("Alice")));
        assert_eq!(data.get("nums").and_then(Value::as_array).map(<[Value]>::len), Some(2));

        let err = Data::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, SigilError::InvalidData(_)));
    }

    #[test]
    fn test_keys_are_sorted() {
        let data = Data::new().with("zeta", 1).with("alpha", 2);
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert!(Value::from(f64::NAN).is_null());
    }
}
