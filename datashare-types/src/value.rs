//! Typed values and insertion-ordered value buckets.
//!
//! A [`ValuesBucket`] is the write payload for insert/update operations: an
//! ordered mapping from column name to a typed scalar or binary value.
//! Insertion order is preserved so that downstream SQL generation is
//! deterministic across the process boundary.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A typed column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
    Blob(Vec<u8>),
}

impl Value {
    /// Returns the type name, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
            Self::Blob(_) => "blob",
        }
    }

    /// Returns true for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Compares two values for predicate evaluation.
    ///
    /// Integers and reals compare numerically against each other; all other
    /// comparisons require matching types. Returns `None` for incomparable
    /// pairs (including any comparison against `Null`).
    #[must_use]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Real(a), Self::Real(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Real(b)) => (*a as f64).partial_cmp(b),
            (Self::Real(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Blob(a), Self::Blob(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Blob(v) => write!(f, "<blob {} bytes>", v.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

/// An insertion-ordered mapping from column name to typed value.
///
/// Re-putting an existing column overwrites the value in place without
/// changing its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesBucket {
    values: IndexMap<String, Value>,
}

impl ValuesBucket {
    /// Creates an empty bucket.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a value under a column name, preserving first-insertion order.
    pub fn put(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Puts a text value.
    pub fn put_text(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put(column, Value::Text(value.into()))
    }

    /// Puts an integer value.
    pub fn put_integer(&mut self, column: impl Into<String>, value: i64) -> &mut Self {
        self.put(column, Value::Integer(value))
    }

    /// Puts a real value.
    pub fn put_real(&mut self, column: impl Into<String>, value: f64) -> &mut Self {
        self.put(column, Value::Real(value))
    }

    /// Puts a boolean value.
    pub fn put_boolean(&mut self, column: impl Into<String>, value: bool) -> &mut Self {
        self.put(column, Value::Boolean(value))
    }

    /// Puts a binary value.
    pub fn put_blob(&mut self, column: impl Into<String>, value: Vec<u8>) -> &mut Self {
        self.put(column, Value::Blob(value))
    }

    /// Puts an explicit null.
    pub fn put_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.put(column, Value::Null)
    }

    /// Returns the value for a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Returns true when the bucket holds no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Removes all columns.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Returns the column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates columns and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for ValuesBucket {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
