//! The tagged value tree produced by the parser and consumed by the writer.

use crate::time::Datetime;
use std::collections::BTreeMap;

/// A TOML table. Keys iterate in lexicographic order, which is what makes
/// the writer's output deterministic without extra bookkeeping.
pub type Table = BTreeMap<String, Value>;

/// An ordered sequence of TOML values.
pub type Array = Vec<Value>;

/// A parsed TOML value.
#[derive(Clone, Debug)]
pub enum Value {
    /// A unicode string.
    String(String),
    /// A signed 64-bit integer. Literals outside the `i64` range fail to
    /// parse with `InvalidNumber`.
    Integer(i64),
    /// An IEEE-754 double, including `inf`, `-inf` and `nan`.
    Float(f64),
    /// A boolean.
    Boolean(bool),
    /// One of the date-time shapes, carried as RFC-3339-shaped text.
    Datetime(Datetime),
    /// An ordered sequence of values.
    Array(Array),
    /// A table of key-value pairs.
    Table(Table),
}

impl Value {
    /// Gets the type of the value as a string.
    #[inline]
    pub fn type_str(&self) -> &'static str {
        match self {
            Value::String(..) => "string",
            Value::Integer(..) => "integer",
            Value::Float(..) => "float",
            Value::Boolean(..) => "boolean",
            Value::Datetime(..) => "datetime",
            Value::Array(..) => "array",
            Value::Table(..) => "table",
        }
    }

    /// Returns a borrowed string if this is a string value.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns an `i64` if this is an integer value.
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns an `f64` if this is a float value.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns a `bool` if this is a boolean value.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a borrowed [`Datetime`] if this is a date-time value.
    #[inline]
    pub fn as_datetime(&self) -> Option<&Datetime> {
        match self {
            Value::Datetime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Returns a borrowed array if this is an array value.
    #[inline]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns a mutable array reference.
    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns a borrowed table if this is a table value.
    #[inline]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Returns a mutable table reference.
    #[inline]
    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Returns `true` if `other` has the same TOML type as `self`.
    ///
    /// All [`DatetimeKind`](crate::DatetimeKind)s count as distinct types;
    /// tables count as one type regardless of their internal shape.
    pub fn same_type(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(..), Value::String(..))
            | (Value::Integer(..), Value::Integer(..))
            | (Value::Float(..), Value::Float(..))
            | (Value::Boolean(..), Value::Boolean(..))
            | (Value::Array(..), Value::Array(..))
            | (Value::Table(..), Value::Table(..)) => true,
            (Value::Datetime(a), Value::Datetime(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}

/// Returns `true` if all elements of `array` share one TOML type, per
/// [`Value::same_type`]. Empty and single-element arrays are trivially
/// homogeneous.
pub fn is_homogeneous(array: &[Value]) -> bool {
    match array.split_first() {
        Some((first, rest)) => rest.iter().all(|v| first.same_type(v)),
        None => true,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            // NaN payloads and signs are not semantic; two NaNs are the
            // same TOML value.
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Datetime(a), Value::Datetime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Datetime> for Value {
    fn from(dt: Datetime) -> Self {
        Value::Datetime(dt)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::String(s) => ser.serialize_str(s),
            Value::Integer(i) => ser.serialize_i64(*i),
            Value::Float(f) => ser.serialize_f64(*f),
            Value::Boolean(b) => ser.serialize_bool(*b),
            Value::Datetime(dt) => ser.serialize_str(dt.as_str()),
            Value::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = ser.serialize_seq(Some(arr.len()))?;
                for ele in arr {
                    seq.serialize_element(ele)?;
                }
                seq.end()
            }
            Value::Table(tab) => {
                use serde::ser::SerializeMap;
                let mut map = ser.serialize_map(Some(tab.len()))?;
                for (k, v) in tab {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Datetime {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ser.serialize_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "./value_tests.rs"]
mod tests;
