//! Runtime value types for verdict expressions and contexts
//!
//! The `Value` enum represents every value that can flow through a decision
//! graph. Objects are ordered maps so that iteration, serialization and merge
//! results are deterministic across runs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Largest integer that an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Ordered object map used for contexts and nested objects.
pub type Map = BTreeMap<String, Value>;

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (f64 for both integers and decimals)
    Number(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Object (ordered key-value map)
    Object(Map),
}

impl Value {
    /// Create an empty object
    pub fn object() -> Self {
        Value::Object(Map::new())
    }

    /// Name of the value's type, as reported in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Integral view of a number, if it has no fractional part and fits
    /// exactly in an f64 mantissa.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => Some(*n as i64),
            _ => None,
        }
    }

    /// Truthiness used by `bool()` and the unary dialect's boolean coercion
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        }
    }

    /// Look up a dot-separated path (`a.b.c`). Numeric segments index arrays.
    pub fn dot(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Insert `value` at a dot-separated path, creating intermediate objects.
    /// Non-object intermediates are replaced by objects.
    pub fn dot_insert(&mut self, path: &str, value: Value) {
        let mut segments = path.split('.').peekable();
        let mut current = self;

        while let Some(segment) = segments.next() {
            if !matches!(current, Value::Object(_)) {
                *current = Value::object();
            }
            let Value::Object(map) = current else {
                return;
            };

            if segments.peek().is_none() {
                map.insert(segment.to_string(), value);
                return;
            }

            current = map.entry(segment.to_string()).or_insert_with(Value::object);
        }
    }

    /// Remove and return the value at a dot-separated path
    pub fn dot_remove(&mut self, path: &str) -> Option<Value> {
        match path.rsplit_once('.') {
            None => match self {
                Value::Object(map) => map.remove(path),
                _ => None,
            },
            Some((parent, last)) => {
                let mut current = self;
                for segment in parent.split('.') {
                    current = match current {
                        Value::Object(map) => map.get_mut(segment)?,
                        _ => return None,
                    };
                }
                match current {
                    Value::Object(map) => map.remove(last),
                    _ => None,
                }
            }
        }
    }

    /// Deep merge `other` into `self`. Objects merge key by key, any other
    /// value on the right replaces the left.
    pub fn merge(&mut self, other: &Value) {
        match (self, other) {
            (Value::Object(left), Value::Object(right)) => {
                for (key, value) in right {
                    match left.get_mut(key) {
                        Some(existing) => existing.merge(value),
                        None => {
                            left.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            (left, right) => *left = right.clone(),
        }
    }

    /// Merge returning a new value, leaving `self` untouched
    pub fn merged(&self, other: &Value) -> Value {
        let mut result = self.clone();
        result.merge(other);
        result
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => match self.as_integer() {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
            Value::String(s) => write!(f, "{}", s),
            Value::Array(_) | Value::Object(_) => {
                let json = serde_json::Value::from(self.clone());
                write!(f, "{}", json)
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => match self.as_integer() {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
                    serde_json::Value::from(n as i64)
                } else {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, serde_json::Value::from(value)))
                    .collect(),
            ),
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

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
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

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}
