use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    fmt,
};

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// Anything that can hand out a scalar value for a named field.
pub trait Record {
    /// Returns `None` when the record has no such field.
    fn field(&self, key: &str) -> Option<FieldValue>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, key: &str) -> Option<FieldValue> {
        (**self).field(key)
    }
}

impl Record for Map<String, Value> {
    fn field(&self, key: &str) -> Option<FieldValue> {
        self.get(key).map(FieldValue::from)
    }
}

impl Record for HashMap<String, FieldValue> {
    fn field(&self, key: &str) -> Option<FieldValue> {
        self.get(key).cloned()
    }
}

impl Record for BTreeMap<String, FieldValue> {
    fn field(&self, key: &str) -> Option<FieldValue> {
        self.get(key).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// Orders two values, or returns `None` when they are not comparable.
    ///
    /// Integers and floats compare numerically with each other. Any other
    /// mix of kinds, a null on either side, or a NaN is not comparable.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;

        match (self, other) {
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Text(a), Text(b)) => Some(a.cmp(b)),
            (Date(a), Date(b)) => Some(a.cmp(b)),
            (DateTime(a), DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Date(_) => "date",
            FieldValue::DateTime(_) => "datetime",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("None"),
            FieldValue::Boolean(true) => f.write_str("True"),
            FieldValue::Boolean(false) => f.write_str("False"),
            FieldValue::Integer(value) => write!(f, "{value}"),
            // Debug keeps the trailing `.0` on whole floats.
            FieldValue::Float(value) => write!(f, "{value:?}"),
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            FieldValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<&Value> for FieldValue {
    /// Arrays and objects are kept as their JSON text.
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(value) => FieldValue::Boolean(*value),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => FieldValue::Integer(integer),
                None => FieldValue::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(text) => FieldValue::Text(text.clone()),
            Value::Array(_) | Value::Object(_) => FieldValue::Text(value.to_string()),
        }
    }
}
