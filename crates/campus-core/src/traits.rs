//! Core traits for campusdesk abstractions.
//!
//! The admin screens only ever talk to a [`RemoteGateway`]; the HTTP
//! implementation lives in `campus-client` and an in-memory one in
//! [`crate::memory`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::entity::EntityDescriptor;
use crate::error::Result;
use crate::payload::Payload;
use crate::record::{Record, RecordId};

/// One entity type's remote operations.
///
/// Every method returns records already unwrapped from the response envelope
/// and with canonical identifiers. There is no retry and no caching; a
/// failure is returned as is.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    fn descriptor(&self) -> &'static EntityDescriptor;

    /// Fetch the whole collection.
    async fn get_all(&self) -> Result<Vec<Record>>;

    /// Fetch one record.
    async fn get_by_id(&self, id: &RecordId) -> Result<Record>;

    /// Create a record. Returns the created record when the server echoes it.
    async fn create(&self, payload: &Payload) -> Result<Option<Record>>;

    /// Update a record. Returns the updated record when the server echoes it.
    async fn update(&self, id: &RecordId, payload: &Payload) -> Result<Option<Record>>;

    async fn delete(&self, id: &RecordId) -> Result<()>;

    /// Run a custom action declared by the descriptor.
    async fn action(&self, name: &str, id: &RecordId) -> Result<Option<Record>>;
}

#[async_trait]
impl<G: RemoteGateway + ?Sized> RemoteGateway for Arc<G> {
    fn descriptor(&self) -> &'static EntityDescriptor {
        (**self).descriptor()
    }

    async fn get_all(&self) -> Result<Vec<Record>> {
        (**self).get_all().await
    }

    async fn get_by_id(&self, id: &RecordId) -> Result<Record> {
        (**self).get_by_id(id).await
    }

    async fn create(&self, payload: &Payload) -> Result<Option<Record>> {
        (**self).create(payload).await
    }

    async fn update(&self, id: &RecordId, payload: &Payload) -> Result<Option<Record>> {
        (**self).update(id, payload).await
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        (**self).delete(id).await
    }

    async fn action(&self, name: &str, id: &RecordId) -> Result<Option<Record>> {
        (**self).action(name, id).await
    }
}

/// Server-side session check.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// True when the current session cookie is valid.
    async fn verify_session(&self) -> Result<bool>;
}
