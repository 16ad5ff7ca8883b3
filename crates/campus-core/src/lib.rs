//! # campus-core
//!
//! Core types and the collection engine behind every campusdesk admin screen.
//!
//! Each management page (courses, universities, blogs, team, testimonials,
//! consultations, top performers, question papers, subscribers) is the same
//! pattern over a different entity:
//!
//! ```text
//! RemoteGateway -> CollectionStore -> filter -> paginate -> rows
//!                        ^                                   |
//!                        +------ optimistic patch <-- editor +
//! ```
//!
//! This crate holds the entity-independent pieces of that pattern. The HTTP
//! gateway lives in `campus-client` and the editor and screen controller in
//! `campus-admin`.

pub mod defaults;
pub mod entity;
pub mod error;
pub mod file_safety;
pub mod filter;
pub mod logging;
pub mod media;
pub mod memory;
pub mod models;
pub mod pagination;
pub mod payload;
pub mod record;
pub mod store;
pub mod traits;

// Re-export commonly used types at crate root
pub use entity::{
    ActionMethod, CustomAction, DeleteRoute, EntityDescriptor, EntityKind, FieldKind, FieldSpec,
    Operations, Persistence, UpdateRoute,
};
pub use error::{Error, Result};
pub use file_safety::{detect_content_type, sanitize_filename, validate_file, ValidationResult};
pub use filter::filter;
pub use media::{LocalFile, MediaRef, Preview, PreviewHandle, PreviewRegistry, RemoteMedia};
pub use memory::{GatewayOp, MemoryGateway};
pub use models::*;
pub use pagination::{needs_reset, page_numbers, paginate, total_pages, Page, Showing};
pub use payload::{Body, FormValue, MultipartField, Payload};
pub use record::{Record, RecordId, ID_ALIAS, ID_FIELD};
pub use store::CollectionStore;
pub use traits::{RemoteGateway, SessionVerifier};
