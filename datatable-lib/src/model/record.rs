//! Dynamic row record

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::Row;

/// A dynamic row: an ordered mapping from column key to JSON value.
///
/// Any JSON object deserializes into a `Record`, so a table can be pointed at
/// an endpoint without declaring a row type first.
///
/// ```
/// use datatable_lib::model::{Record, Row};
///
/// let record: Record = serde_json::from_str(r#"{"id": 3, "name": "Jane Doe"}"#).unwrap();
/// assert_eq!(record.get_str("name"), Some("Jane Doe"));
/// assert_eq!(record.id().as_deref(), Some("3"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value (builder style).
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the field as a string slice, if it is a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Returns the field as an integer, if it is a JSON integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns all fields in key order.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl Row for Record {
    fn field(&self, key: &str) -> Option<Value> {
        self.fields.get(key).cloned()
    }
}
