//! Records: ordered field maps that expressions are evaluated against.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, WhereError};
use crate::value::Value;

/// An ordered mapping from field name to [`Value`].
///
/// Field order is insertion order. It is kept for serialization; evaluation
/// looks fields up by name only.
///
/// # Example
///
/// ```
/// use standout_where::{Record, Value};
///
/// let alice = Record::new().with("name", "Alice").with("age", 30);
///
/// assert_eq!(alice.get("name"), Some(&Value::from("Alice")));
/// assert_eq!(alice.get("email"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Record::default()
    }

    /// Adds a field, returning the record for chaining.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, returning the previous value if there was one.
    ///
    /// Replacing a field keeps its original position.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Returns the value of a field, or `None` if the field is absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the record has the field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Converts a JSON object into a record, keeping its key order.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(WhereError::NotAnObject {
                what: "record",
                found: crate::parse::json_type(&other),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = WhereError;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        Record::from_json(json)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Record::from_json(json).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    #[test]
    fn builder_and_lookup() {
        let record = Record::new().with("name", "Bob").with("age", 25u8);

        assert_eq!(record.len(), 2);
        assert!(record.contains("age"));
        assert!(!record.contains("city"));
        assert_eq!(record.get("age"), Some(&Value::Number(Number::U64(25))));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut record = Record::new().with("a", 1).with("b", 2);
        let previous = record.insert("a", 3);

        assert_eq!(previous, Some(Value::from(1)));
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn from_json_keeps_key_order() {
        let record = Record::from_json(serde_json::json!({"z": 1, "a": 2, "m": 3})).unwrap();
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn from_json_rejects_non_objects() {
        let err = Record::from_json(serde_json::json!([1, 2])).unwrap_err();
        assert!(matches!(
            err,
            WhereError::NotAnObject {
                what: "record",
                found: "array"
            }
        ));
    }

    #[test]
    fn dataset_deserializes_from_json() {
        let records: Vec<Record> =
            serde_json::from_str(r#"[{"name": "Alice"}, {"name": "Bob", "age": 25}]"#).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("age"), Some(&Value::from(25)));
    }

    #[test]
    fn serializes_back_to_json() {
        let record = Record::new()
            .with("name", "Alice")
            .with("tags", vec!["x", "y"])
            .with("manager", Value::Null);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Alice", "tags": ["x", "y"], "manager": null})
        );
    }
}
