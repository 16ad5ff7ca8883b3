//! Media references and transient preview lifetimes.
//!
//! A media field holds either an object the backend already stores
//! ([`RemoteMedia`]) or a file the user picked that has not been uploaded yet
//! ([`LocalFile`]). Picking a file also acquires a [`PreviewHandle`], the
//! equivalent of a browser object URL: it must be released when the file is
//! replaced, when the editor closes, and when the editor is dropped. Handles
//! release themselves on drop and the [`PreviewRegistry`] counts the live
//! ones so leaks are observable.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::trace;
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};
use crate::file_safety::{detect_content_type, sanitize_filename, validate_file};

/// A previously uploaded object. The backend sends either an object with at
/// least `url` or, on older endpoints, the bare URL string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMedia {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

impl RemoteMedia {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            public_id: None,
        }
    }

    /// Read a media descriptor from a raw field value.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

impl<'de> Deserialize<'de> for RemoteMedia {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Object {
            url: String,
            #[serde(default, alias = "public_id")]
            public_id: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Url(String),
            Object(Object),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Url(url) => Ok(RemoteMedia::new(url)),
            Wire::Object(o) => Ok(RemoteMedia {
                url: o.url,
                public_id: o.public_id,
            }),
        }
    }
}

/// A file chosen locally, held in memory until the form is submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    /// Wrap in-memory bytes. The MIME type is detected from magic bytes,
    /// falling back to `claimed_mime`.
    pub fn new(file_name: &str, bytes: Vec<u8>, claimed_mime: &str) -> Self {
        let file_name = sanitize_filename(file_name);
        let mime_type = detect_content_type(&file_name, &bytes, claimed_mime);
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// Read a file from disk, rejecting executables and oversized files.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let verdict = validate_file(&file_name, &bytes, defaults::MAX_UPLOAD_BYTES);
        if !verdict.allowed {
            return Err(Error::Validation(
                verdict
                    .block_reason
                    .unwrap_or_else(|| format!("{file_name} cannot be uploaded")),
            ));
        }

        Ok(Self::new(&file_name, bytes, "application/octet-stream"))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Value of a media field in a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Remote(RemoteMedia),
    Pending(LocalFile),
}

impl MediaRef {
    pub fn is_pending(&self) -> bool {
        matches!(self, MediaRef::Pending(_))
    }

    pub fn as_pending(&self) -> Option<&LocalFile> {
        match self {
            MediaRef::Pending(file) => Some(file),
            MediaRef::Remote(_) => None,
        }
    }
}

// =============================================================================
// PREVIEW HANDLES
// =============================================================================

/// Issues transient preview references and tracks which are still alive.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a preview for a picked file.
    pub fn acquire(&self, file: &LocalFile) -> PreviewHandle {
        let id = Uuid::new_v4();
        if let Ok(mut live) = self.live.lock() {
            live.insert(id);
        }
        trace!(preview = %id, file = %file.file_name, "Preview acquired");
        PreviewHandle {
            id,
            file_name: file.file_name.clone(),
            registry: Arc::clone(&self.live),
        }
    }

    /// Number of previews acquired and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// A transient local preview reference. Released when dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    file_name: String,
    registry: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewHandle {
    /// Local reference a renderer can show, like `blob:` URLs in a browser.
    pub fn url(&self) -> String {
        format!("preview://{}/{}", self.id, self.file_name)
    }

    /// Release explicitly. Equivalent to dropping the handle.
    pub fn release(self) {}
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Ok(mut live) = self.registry.lock() {
            live.remove(&self.id);
        }
        trace!(preview = %self.id, "Preview released");
    }
}

/// What the editor shows for a media field.
#[derive(Debug)]
pub enum Preview {
    /// Existing remote object, display only.
    Remote(RemoteMedia),
    /// Newly picked file.
    Local(PreviewHandle),
}

impl Preview {
    pub fn url(&self) -> String {
        match self {
            Preview::Remote(media) => media.url.clone(),
            Preview::Local(handle) => handle.url(),
        }
    }
}
