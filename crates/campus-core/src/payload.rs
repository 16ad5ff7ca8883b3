//! Request payloads built from a draft.
//!
//! A draft submits as JSON unless at least one media field holds a pending
//! local file, in which case the whole draft is sent as multipart form data.
//! The encoding rules are a contract with the backend:
//!
//! | Draft value | JSON body | Multipart parts |
//! |-------------|-----------|-----------------|
//! | scalar | as is | one text part |
//! | array of scalars | array | one part per element, repeated name |
//! | array of objects | array | `field[i][prop]` per property |
//! | nested object | object | JSON string under the field name |
//! | null | `null` | empty text part |
//! | media, pending file | n/a | file part under the field name |
//! | media, no pending file | omitted | omitted |
//!
//! Inside an array of objects, a property that is itself an array or object
//! is sent as a JSON string under `field[i][prop]`.
//!
//! An explicit null clears the field on the server and in the local patch.
//! A create drops its null fields first (see [`Payload::drop_nulls`]), since
//! there they only mean "left blank".
//!
//! Media fields are never submitted as `null` or an empty string; omission is
//! how "keep the current file" is expressed.

use serde_json::{Map, Value};
use tracing::debug;

use crate::media::{LocalFile, MediaRef};
use crate::record::{Record, ID_ALIAS, ID_FIELD};

/// Value of one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(LocalFile),
}

/// One multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    pub name: String,
    pub value: FormValue,
}

impl MultipartField {
    fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }
}

/// Encoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Multipart(Vec<MultipartField>),
}

/// Fields and pending files of a submitted draft.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    fields: Record,
    files: Vec<(String, LocalFile)>,
}

impl Payload {
    /// Build a payload from plain draft fields and the draft's media slots.
    ///
    /// `fields` must not contain media fields; `media` lists them by name.
    /// Identifier keys are dropped. Null fields are kept.
    pub fn build<'a, I>(fields: &Record, media: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a MediaRef>)>,
    {
        let clean: Map<String, Value> = fields
            .fields()
            .filter(|(k, _)| k.as_str() != ID_FIELD && k.as_str() != ID_ALIAS)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let files: Vec<(String, LocalFile)> = media
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .and_then(MediaRef::as_pending)
                    .map(|file| (name.to_string(), file.clone()))
            })
            .collect();

        debug!(
            field_count = clean.len(),
            file_count = files.len(),
            multipart = !files.is_empty(),
            "Payload built"
        );

        Self {
            fields: Record::from_map(clean),
            files,
        }
    }

    /// Payload with plain fields only.
    pub fn from_fields(fields: &Record) -> Self {
        Self::build(fields, std::iter::empty())
    }

    /// Remove fields whose value is null.
    pub fn drop_nulls(self) -> Self {
        let fields: Map<String, Value> = self
            .fields
            .fields()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self {
            fields: Record::from_map(fields),
            files: self.files,
        }
    }

    pub fn is_multipart(&self) -> bool {
        !self.files.is_empty()
    }

    /// Plain fields as sent. Also the patch applied to the local record after
    /// a successful update, and the fallback record after a create the server
    /// did not echo.
    pub fn fields(&self) -> &Record {
        &self.fields
    }

    pub fn files(&self) -> &[(String, LocalFile)] {
        &self.files
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.files.iter().any(|(n, _)| n == name)
    }

    /// Encode for the wire.
    pub fn body(&self) -> Body {
        if self.is_multipart() {
            Body::Multipart(self.multipart_fields())
        } else {
            Body::Json(self.fields.clone().into_value())
        }
    }

    /// Flatten into multipart parts, fields first and files last.
    pub fn multipart_fields(&self) -> Vec<MultipartField> {
        let mut parts = Vec::new();
        for (name, value) in self.fields.fields() {
            flatten_field(name, value, &mut parts);
        }
        for (name, file) in &self.files {
            parts.push(MultipartField {
                name: name.clone(),
                value: FormValue::File(file.clone()),
            });
        }
        parts
    }
}

fn flatten_field(name: &str, value: &Value, parts: &mut Vec<MultipartField>) {
    match value {
        Value::Null => parts.push(MultipartField::text(name, "")),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::Object(obj) => {
                        for (prop, prop_value) in obj {
                            if prop_value.is_null() {
                                continue;
                            }
                            parts.push(MultipartField::text(
                                format!("{name}[{index}][{prop}]"),
                                scalar_text(prop_value),
                            ));
                        }
                    }
                    Value::Null => {}
                    other => parts.push(MultipartField::text(name, scalar_text(other))),
                }
            }
        }
        other => parts.push(MultipartField::text(name, scalar_text(other))),
    }
}

/// Text form of a value: strings unquoted, everything else as JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
