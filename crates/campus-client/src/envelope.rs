//! Response envelope normalization.
//!
//! Endpoints disagree on where the payload sits: `{"data": {"data": ...}}`,
//! `{"data": ...}`, or the bare body. Every gateway method goes through
//! [`unwrap`] so call sites never probe the shape themselves.

use campus_core::{Error, Record, Result};
use serde_json::Value;
use tracing::trace;

const DATA: &str = "data";

/// Strip up to two `data` envelopes.
pub fn unwrap(body: Value) -> Value {
    match body {
        Value::Object(mut outer) if outer.contains_key(DATA) => {
            let inner = outer.remove(DATA).unwrap_or(Value::Null);
            match inner {
                Value::Object(mut inner_obj) if inner_obj.contains_key(DATA) => {
                    trace!("Envelope: data.data");
                    inner_obj.remove(DATA).unwrap_or(Value::Null)
                }
                other => {
                    trace!("Envelope: data");
                    other
                }
            }
        }
        other => other,
    }
}

/// Unwrap a list response into records.
///
/// After unwrapping, an object is searched for an array under `list_key`
/// (the entity path, e.g. `universities`), `items` or `results`.
pub fn unwrap_list(body: Value, list_key: &str) -> Result<Vec<Record>> {
    let items = match unwrap(body) {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        Value::Object(mut obj) => {
            let key = [list_key, "items", "results"]
                .into_iter()
                .find(|k| obj.get(*k).is_some_and(Value::is_array))
                .ok_or_else(|| {
                    Error::Serialization(format!("no {list_key} list in response"))
                })?;
            match obj.remove(key) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            }
        }
        other => {
            return Err(Error::Serialization(format!(
                "expected a list of {list_key}, got {other}"
            )))
        }
    };
    items.into_iter().map(Record::from_value).collect()
}

/// Unwrap a single-record response.
///
/// Returns `None` when the response does not echo a record: an empty body, a
/// bare acknowledgement like `{"message": "Created"}`, or any non-object.
pub fn unwrap_record(body: Value) -> Option<Record> {
    match unwrap(body) {
        Value::Object(obj) => {
            let record = Record::from_map(obj);
            record.id().map(|_| record)
        }
        _ => None,
    }
}

/// Pull a human message out of an error body.
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "error", "msg"]
        .into_iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
}
