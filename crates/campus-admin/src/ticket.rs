//! Writes in flight.
//!
//! A ticket is issued by one of the screen's `begin_*` operations once the
//! row is marked busy and any optimistic change is applied. Its `call` only
//! borrows the ticket and the gateway, so tickets for different rows can be
//! awaited together. The result goes back to the matching `finish_*`, which
//! consumes the ticket and frees the row.

use campus_core::{Record, RecordId, RemoteGateway, Result};

use crate::editor::{EditorMode, Submission};
use crate::pending::PendingGuard;

/// A create or update waiting for the server.
pub struct SubmitTicket {
    pub(crate) submission: Submission,
    pub(crate) _guard: PendingGuard,
}

impl SubmitTicket {
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Send the payload. Returns the record the server echoed, if any.
    pub async fn call<G: RemoteGateway + ?Sized>(&self, gateway: &G) -> Result<Option<Record>> {
        match &self.submission.mode {
            EditorMode::Create => gateway.create(&self.submission.payload).await,
            EditorMode::Edit(id) => gateway.update(id, &self.submission.payload).await,
        }
    }
}

/// A delete whose row is already gone from the local collection.
pub struct DeleteTicket {
    pub(crate) id: RecordId,
    pub(crate) removed: Option<Record>,
    pub(crate) _guard: PendingGuard,
}

impl DeleteTicket {
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub async fn call<G: RemoteGateway + ?Sized>(&self, gateway: &G) -> Result<()> {
        gateway.delete(&self.id).await
    }
}

/// A custom row action waiting for the server.
pub struct ActionTicket {
    pub(crate) name: String,
    pub(crate) id: RecordId,
    pub(crate) patch: Record,
    pub(crate) _guard: PendingGuard,
}

impl ActionTicket {
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn call<G: RemoteGateway + ?Sized>(&self, gateway: &G) -> Result<Option<Record>> {
        gateway.action(&self.name, &self.id).await
    }
}
