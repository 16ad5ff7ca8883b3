//! Create/edit form state.
//!
//! The editor holds one [`Draft`] at a time. Media fields are split in two:
//! the submittable value (a pending local file or nothing) lives in the
//! draft, and what the form shows lives in a preview slot. Opening a record
//! for edit moves its remote media into the preview slot, so an untouched
//! media field is omitted from the payload and the server keeps the file.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use tracing::{debug, trace};

use campus_core::{
    EntityDescriptor, Error, FieldKind, LocalFile, MediaRef, Payload, Preview, PreviewRegistry,
    Record, RecordId, RemoteMedia, Result, ID_ALIAS, ID_FIELD,
};

use crate::pending::action_key;

/// Whether the editor creates a new record or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(RecordId),
}

impl EditorMode {
    pub fn target(&self) -> Option<&RecordId> {
        match self {
            EditorMode::Create => None,
            EditorMode::Edit(id) => Some(id),
        }
    }
}

/// Form values being edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    fields: Record,
    media: BTreeMap<String, Option<MediaRef>>,
}

impl Draft {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }

    /// Submittable value of a media field.
    pub fn media(&self, name: &str) -> Option<&MediaRef> {
        self.media.get(name).and_then(Option::as_ref)
    }

    pub fn has_pending_file(&self) -> bool {
        self.media.values().flatten().any(MediaRef::is_pending)
    }

    fn payload(&self) -> Payload {
        Payload::build(
            &self.fields,
            self.media.iter().map(|(name, value)| (name.as_str(), value.as_ref())),
        )
    }
}

/// A draft frozen for sending. Independent of the editor, so closing the
/// form after submitting does not stop the result from being applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub mode: EditorMode,
    pub payload: Payload,
}

impl Submission {
    /// Pending-action key: the record id, or `new` for a create.
    pub fn key(&self) -> &str {
        action_key(self.mode.target())
    }
}

struct OpenForm {
    mode: EditorMode,
    draft: Draft,
    previews: HashMap<String, Preview>,
}

/// Modal form for one entity type.
pub struct FormEditor {
    descriptor: &'static EntityDescriptor,
    registry: PreviewRegistry,
    open: Option<OpenForm>,
}

impl FormEditor {
    pub fn new(descriptor: &'static EntityDescriptor) -> Self {
        Self::with_registry(descriptor, PreviewRegistry::new())
    }

    /// Editor issuing previews from a shared registry.
    pub fn with_registry(descriptor: &'static EntityDescriptor, registry: PreviewRegistry) -> Self {
        Self {
            descriptor,
            registry,
            open: None,
        }
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn mode(&self) -> Option<&EditorMode> {
        self.open.as_ref().map(|f| &f.mode)
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.open.as_ref().map(|f| &f.draft)
    }

    /// What the form shows for a media field.
    pub fn preview(&self, name: &str) -> Option<&Preview> {
        self.open.as_ref().and_then(|f| f.previews.get(name))
    }

    /// Open the form. Create mode starts from an empty template; edit mode
    /// copies `record`. Any form already open is closed first.
    pub fn open(&mut self, mode: EditorMode, record: Option<&Record>) {
        self.close();

        let mut fields = Map::new();
        let mut media = BTreeMap::new();
        let mut previews = HashMap::new();

        for spec in self.descriptor.fields {
            if spec.kind == FieldKind::Media {
                media.insert(spec.name.to_string(), None);
            } else if matches!(mode, EditorMode::Create) {
                fields.insert(spec.name.to_string(), empty_value(spec.kind));
            }
        }

        if let (EditorMode::Edit(_), Some(record)) = (&mode, record) {
            for (name, value) in record.fields() {
                if name == ID_FIELD || name == ID_ALIAS {
                    continue;
                }
                if self.descriptor.is_media_field(name) {
                    if let Some(remote) = RemoteMedia::from_value(value) {
                        previews.insert(name.clone(), Preview::Remote(remote));
                    }
                } else {
                    fields.insert(name.clone(), value.clone());
                }
            }
        }

        debug!(
            entity = self.descriptor.path,
            mode = ?mode,
            preview_count = previews.len(),
            "Editor opened"
        );
        self.open = Some(OpenForm {
            mode,
            draft: Draft {
                fields: Record::from_map(fields),
                media,
            },
            previews,
        });
    }

    /// Set a plain field.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        if self.descriptor.is_media_field(name) {
            return Err(Error::Validation(format!(
                "{name} is a file field; pick a file instead"
            )));
        }
        let form = self.form_mut()?;
        form.draft.fields.insert(name, value);
        Ok(())
    }

    /// Attach a local file to a media field, replacing any earlier pick and
    /// releasing its preview.
    pub fn pick_file(&mut self, name: &str, file: LocalFile) -> Result<()> {
        if !self.descriptor.is_media_field(name) {
            return Err(Error::Validation(format!("{name} is not a file field")));
        }
        let handle = self.registry.acquire(&file);
        let form = self.form_mut()?;
        // Dropping the replaced preview releases it.
        form.previews.insert(name.to_string(), Preview::Local(handle));
        form.draft
            .media
            .insert(name.to_string(), Some(MediaRef::Pending(file)));
        trace!(field = name, "File picked");
        Ok(())
    }

    /// Check required fields and freeze the draft into a [`Submission`]. The
    /// draft stays in place so a failed request can be retried.
    pub fn prepare(&self) -> Result<Submission> {
        let form = self
            .open
            .as_ref()
            .ok_or_else(|| Error::Validation("No form is open".to_string()))?;

        for spec in self.descriptor.required_fields() {
            let filled = if spec.kind == FieldKind::Media {
                form.draft.media(spec.name).is_some() || form.previews.contains_key(spec.name)
            } else {
                form.draft.get(spec.name).is_some_and(is_filled)
            };
            if !filled {
                return Err(Error::Validation(format!("{} is required", spec.name)));
            }
        }

        Ok(Submission {
            mode: form.mode.clone(),
            payload: match form.mode {
                EditorMode::Create => form.draft.payload().drop_nulls(),
                EditorMode::Edit(_) => form.draft.payload(),
            },
        })
    }

    /// Discard the draft and release every preview.
    pub fn close(&mut self) {
        if let Some(form) = self.open.take() {
            debug!(
                entity = self.descriptor.path,
                released = form.previews.len(),
                "Editor closed"
            );
        }
    }

    fn form_mut(&mut self) -> Result<&mut OpenForm> {
        self.open
            .as_mut()
            .ok_or_else(|| Error::Validation("No form is open".to_string()))
    }
}

/// Template value of a field in a fresh create form.
fn empty_value(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Text => Value::String(String::new()),
        FieldKind::Bool => Value::Bool(false),
        FieldKind::StringList | FieldKind::RecordList => Value::Array(Vec::new()),
        FieldKind::Object => Value::Object(Map::new()),
        FieldKind::Number | FieldKind::Date | FieldKind::Media => Value::Null,
    }
}

fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::entity::{QUESTION_PAPER, UNIVERSITY};
    use campus_core::{Body, FormValue};
    use serde_json::json;

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn png(name: &str) -> LocalFile {
        LocalFile::new(name, PNG.to_vec(), "image/png")
    }

    fn university() -> Record {
        Record::from_value(json!({
            "_id": "u1",
            "name": "Sapienza",
            "location": "Rome",
            "logo": {"url": "https://cdn/logo.png"},
            "campusImage": "https://cdn/campus.jpg"
        }))
        .unwrap()
    }

    #[test]
    fn test_create_starts_from_template() {
        let mut editor = FormEditor::new(&UNIVERSITY);
        editor.open(EditorMode::Create, None);
        let draft = editor.draft().unwrap();
        assert_eq!(draft.get("name"), Some(&json!("")));
        assert_eq!(draft.get("programs"), Some(&json!([])));
        assert!(draft.media("logo").is_none());
    }

    #[test]
    fn test_edit_moves_remote_media_to_preview() {
        let mut editor = FormEditor::new(&UNIVERSITY);
        editor.open(EditorMode::Edit(RecordId::from("u1")), Some(&university()));

        assert_eq!(editor.preview("logo").unwrap().url(), "https://cdn/logo.png");
        assert_eq!(editor.preview("campusImage").unwrap().url(), "https://cdn/campus.jpg");
        let draft = editor.draft().unwrap();
        assert!(draft.media("logo").is_none());
        assert!(!draft.fields().contains_key("logo"));
        assert!(!draft.fields().contains_key(ID_FIELD));
    }

    #[test]
    fn test_untouched_media_is_omitted_from_payload() {
        let mut editor = FormEditor::new(&UNIVERSITY);
        editor.open(EditorMode::Edit(RecordId::from("u1")), Some(&university()));
        editor.set_field("name", json!("Sapienza University")).unwrap();

        let submission = editor.prepare().unwrap();
        assert_eq!(submission.key(), "u1");
        assert!(!submission.payload.is_multipart());
        assert!(!submission.payload.contains_key("logo"));
        assert!(!submission.payload.contains_key("campusImage"));
        match submission.payload.body() {
            Body::Json(body) => assert_eq!(body["name"], "Sapienza University"),
            Body::Multipart(_) => panic!("expected JSON"),
        }
    }

    #[test]
    fn test_picked_file_makes_multipart() {
        let mut editor = FormEditor::new(&UNIVERSITY);
        editor.open(EditorMode::Edit(RecordId::from("u1")), Some(&university()));
        editor.pick_file("logo", png("new-logo.png")).unwrap();

        let submission = editor.prepare().unwrap();
        let parts = submission.payload.multipart_fields();
        let files: Vec<_> = parts
            .iter()
            .filter(|p| matches!(p.value, FormValue::File(_)))
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(files, vec!["logo"]);
        assert!(!parts.iter().any(|p| p.name == "campusImage"));
    }

    #[test]
    fn test_replacing_pick_releases_previous_preview() {
        let mut editor = FormEditor::new(&UNIVERSITY);
        editor.open(EditorMode::Create, None);
        editor.pick_file("logo", png("a.png")).unwrap();
        let first = editor.preview("logo").unwrap().url();
        editor.pick_file("logo", png("b.png")).unwrap();

        assert_eq!(editor.registry().live_count(), 1);
        assert_ne!(editor.preview("logo").unwrap().url(), first);
    }

    #[test]
    fn test_close_and_drop_release_previews() {
        let registry = PreviewRegistry::new();
        let mut editor = FormEditor::with_registry(&UNIVERSITY, registry.clone());
        editor.open(EditorMode::Create, None);
        editor.pick_file("logo", png("a.png")).unwrap();
        editor.pick_file("campusImage", png("b.png")).unwrap();
        assert_eq!(registry.live_count(), 2);

        editor.close();
        assert_eq!(registry.live_count(), 0);
        assert!(!editor.is_open());

        editor.open(EditorMode::Create, None);
        editor.pick_file("logo", png("c.png")).unwrap();
        drop(editor);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_required_fields_block_submission() {
        let mut editor = FormEditor::new(&QUESTION_PAPER);
        editor.open(EditorMode::Create, None);
        editor.set_field("title", json!("IMAT 2023")).unwrap();
        editor.set_field("exam", json!("  ")).unwrap();

        let err = editor.prepare().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: exam is required");

        editor.set_field("exam", json!("IMAT")).unwrap();
        editor.set_field("year", json!(2023)).unwrap();
        let submission = editor.prepare().unwrap();
        assert_eq!(submission.key(), "new");
        assert_eq!(submission.payload.fields().get("year"), Some(&json!(2023)));
    }

    #[test]
    fn test_field_kind_mismatch() {
        let mut editor = FormEditor::new(&UNIVERSITY);
        editor.open(EditorMode::Create, None);
        assert!(editor.set_field("logo", json!("x")).is_err());
        assert!(editor.pick_file("name", png("a.png")).is_err());
    }

    #[test]
    fn test_closed_editor_rejects_edits() {
        let mut editor = FormEditor::new(&UNIVERSITY);
        assert!(editor.set_field("name", json!("x")).is_err());
        assert!(editor.prepare().is_err());
    }

    #[test]
    fn test_draft_survives_prepare() {
        let mut editor = FormEditor::new(&UNIVERSITY);
        editor.open(EditorMode::Create, None);
        editor.set_field("name", json!("Pavia")).unwrap();
        editor.set_field("location", json!("Pavia")).unwrap();
        editor.pick_file("logo", png("a.png")).unwrap();
        let _ = editor.prepare().unwrap();

        let draft = editor.draft().unwrap();
        assert!(draft.has_pending_file());
        assert_eq!(draft.get("name"), Some(&json!("Pavia")));
    }

    #[test]
    fn test_create_drops_blank_nulls_but_edit_sends_them() {
        let mut editor = FormEditor::new(&UNIVERSITY);
        editor.open(EditorMode::Create, None);
        editor.set_field("name", json!("Pavia")).unwrap();
        editor.set_field("location", json!("Pavia")).unwrap();
        let created = editor.prepare().unwrap();
        assert!(!created.payload.contains_key("ranking"));

        let mut record = university();
        record.insert("ranking".to_string(), json!(5));
        editor.open(EditorMode::Edit(RecordId::from("u1")), Some(&record));
        editor.set_field("ranking", Value::Null).unwrap();
        let edited = editor.prepare().unwrap();
        assert_eq!(edited.payload.fields().get("ranking"), Some(&Value::Null));
    }
}
