//! Generic record representation shared by every entity type.
//!
//! The backend returns records keyed by either `id` or `_id`. A [`Record`] is
//! canonicalized on construction so the identifier always lives under
//! [`ID_FIELD`]; nothing downstream of the gateway looks at [`ID_ALIAS`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Canonical identifier key.
pub const ID_FIELD: &str = "id";

/// Alternate identifier key used by some endpoints.
pub const ID_ALIAS: &str = "_id";

/// Identifier of a record, always compared as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read an identifier out of a JSON value. Numbers are rendered as text so
    /// `7` and `"7"` name the same record.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A mapping from field name to value with a canonical identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record (no identifier yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object, canonicalizing the identifier.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut record = Self(map);
        record.canonicalize();
        record
    }

    /// Build a record from any JSON value; only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(Error::Serialization(format!(
                "expected a JSON object for a record, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Encode a typed model as a record.
    pub fn encode<T: Serialize>(model: &T) -> Result<Self> {
        Self::from_value(serde_json::to_value(model)?)
    }

    /// Decode the record into a typed model.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    /// Move `_id` to `id`. When both are present `id` wins and the alias is
    /// dropped.
    fn canonicalize(&mut self) {
        if let Some(alias) = self.0.remove(ID_ALIAS) {
            let has_id = self
                .0
                .get(ID_FIELD)
                .is_some_and(|v| RecordId::from_value(v).is_some());
            if !has_id {
                self.0.insert(ID_FIELD.to_string(), alias);
            }
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.0.get(ID_FIELD).and_then(RecordId::from_value)
    }

    /// True when this record carries `id`.
    pub fn has_id(&self, id: &RecordId) -> bool {
        self.id().as_ref() == Some(id)
    }

    pub fn set_id(&mut self, id: &RecordId) {
        self.0
            .insert(ID_FIELD.to_string(), Value::String(id.as_str().to_string()));
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String value of a field, if it is a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        let field = field.into();
        if field == ID_ALIAS {
            return self.0.insert(ID_FIELD.to_string(), value);
        }
        self.0.insert(field, value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Shallow-merge `patch` into this record. Identifier keys in the patch
    /// are ignored so a record never changes identity.
    pub fn merge(&mut self, patch: &Record) {
        for (key, value) in patch.fields() {
            if key == ID_FIELD || key == ID_ALIAS {
                continue;
            }
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record.0
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
