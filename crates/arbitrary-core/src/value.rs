//! Value representations for the arbitrary-factory toolkit.
//!
//! This module defines the dynamically shaped [`Value`] produced by recipe
//! generators and walked by structural projections, together with the
//! [`Key`] type used to address a field inside a composite value.

use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use std::fmt;

/// Dynamically shaped generated value.
///
/// `Array` and `Object` are the composite variants; everything else is a
/// scalar. Objects use a `BTreeMap` so serialized output is stable across
/// runs with the same seed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing or null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// String value
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Object/map of values
    Object(BTreeMap<String, Value>),
}

/// Address of a field inside a composite [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Named field of an object
    Field(String),

    /// Position in an array
    Index(usize),

    /// Number of elements of an array or object, or characters of a string
    Length,
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value is an array or an object.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get this value as an object.
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Number of elements, entries or characters, if this value has a length.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Array(arr) => Some(arr.len()),
            Self::Object(obj) => Some(obj.len()),
            Self::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Read the value stored under `key`.
    ///
    /// Reading a key the value does not carry yields [`Value::Null`].
    pub fn project(&self, key: &Key) -> Value {
        match (self, key) {
            (Self::Object(obj), Key::Field(name)) => obj.get(name).cloned().unwrap_or_default(),
            (Self::Array(arr), Key::Index(i)) => arr.get(*i).cloned().unwrap_or_default(),
            (_, Key::Length) => self
                .len()
                .map(|n| Self::Int(n as i64))
                .unwrap_or_default(),
            _ => Self::Null,
        }
    }

    /// Check whether this value carries `key`.
    pub fn has(&self, key: &Key) -> bool {
        match (self, key) {
            (Self::Object(obj), Key::Field(name)) => obj.contains_key(name),
            (Self::Array(arr), Key::Index(i)) => *i < arr.len(),
            (_, Key::Length) => self.len().is_some(),
            _ => false,
        }
    }

    /// Keys carried by this value, in iteration order.
    pub fn keys(&self) -> Vec<Key> {
        match self {
            Self::Object(obj) => obj.keys().cloned().map(Key::Field).collect(),
            Self::Array(arr) => (0..arr.len()).map(Key::Index).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Array(arr) => {
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Object(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(i) => write!(f, "{i}"),
            Self::Length => f.write_str("length"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(obj: BTreeMap<String, Value>) -> Self {
        Self::Object(obj)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&YamlValue> for Value {
    fn from(yaml: &YamlValue) -> Self {
        match yaml {
            YamlValue::Null => Self::Null,
            YamlValue::Bool(b) => Self::Bool(*b),
            YamlValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::String(n.to_string())
                }
            }
            YamlValue::String(s) => Self::String(s.clone()),
            YamlValue::Sequence(arr) => Self::Array(arr.iter().map(Self::from).collect()),
            YamlValue::Mapping(map) => Self::Object(
                map.iter()
                    .filter_map(|(k, v)| {
                        let key = match k {
                            YamlValue::String(s) => s.clone(),
                            YamlValue::Number(n) => n.to_string(),
                            YamlValue::Bool(b) => b.to_string(),
                            _ => return None,
                        };
                        Some((key, Self::from(v)))
                    })
                    .collect(),
            ),
            YamlValue::Tagged(tagged) => Self::from(&tagged.value),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}
