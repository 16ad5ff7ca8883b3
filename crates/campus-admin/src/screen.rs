//! Admin screen controller.
//!
//! One [`AdminScreen`] per management page. It owns the collection, the
//! search query, the current page, the form editor and the error banner, and
//! wires them to a [`RemoteGateway`]. Writes are optimistic: the local
//! collection is patched from what was sent and only re-fetched when a delete
//! fails (or after every write when reconciliation is turned on).
//!
//! Operations never return errors. A failure becomes the banner message and
//! the operation reports `false`.
//!
//! Each write also comes as a `begin_*`/`finish_*` pair around a ticket (see
//! [`crate::ticket`]), which lets writes on different rows overlap. Only the
//! row being written is locked.

use std::time::Instant;

use tracing::{debug, info, warn};

use campus_core::defaults::{FIRST_PAGE, PAGE_SIZE};
use campus_core::{
    filter, needs_reset, page_numbers, paginate, CollectionStore, EntityDescriptor, Error, Page,
    PreviewRegistry, Record, RecordId, RemoteGateway, Result, Showing,
};

use crate::editor::{EditorMode, FormEditor, Submission};
use crate::pending::{PendingActions, PendingGuard};
use crate::ticket::{ActionTicket, DeleteTicket, SubmitTicket};

/// State and operations of one management page.
pub struct AdminScreen<G: RemoteGateway> {
    gateway: G,
    store: CollectionStore,
    query: String,
    page: usize,
    page_size: usize,
    editor: FormEditor,
    pending: PendingActions,
    loading: bool,
    error: Option<String>,
    reconcile: bool,
}

impl<G: RemoteGateway> AdminScreen<G> {
    pub fn new(gateway: G) -> Self {
        let descriptor = gateway.descriptor();
        Self {
            gateway,
            store: CollectionStore::new(),
            query: String::new(),
            page: FIRST_PAGE,
            page_size: PAGE_SIZE,
            editor: FormEditor::new(descriptor),
            pending: PendingActions::new(),
            loading: false,
            error: None,
            reconcile: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Re-fetch the collection after every successful create or update
    /// instead of trusting the local patch.
    pub fn with_reconcile(mut self, reconcile: bool) -> Self {
        self.reconcile = reconcile;
        self
    }

    /// Issue editor previews from `registry`.
    pub fn with_previews(mut self, registry: PreviewRegistry) -> Self {
        self.editor = FormEditor::with_registry(self.gateway.descriptor(), registry);
        self
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.gateway.descriptor()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    /// True while the collection is being fetched or any row action is
    /// waiting for the server.
    pub fn is_loading(&self) -> bool {
        self.loading || !self.pending.is_empty()
    }

    /// Banner message of the last failure, if not dismissed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    // =========================================================================
    // VIEW
    // =========================================================================

    /// Replace the query. The page goes back to the first one when the
    /// narrowed view no longer reaches the current page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.settle_page();
        debug!(query = %self.query, page = self.page, "Query changed");
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(FIRST_PAGE);
    }

    fn filtered(&self) -> Vec<&Record> {
        filter(&self.store, &self.query, self.descriptor().search_fields)
    }

    /// Current page of the filtered collection.
    pub fn view(&self) -> Page<&Record> {
        paginate(&self.filtered(), self.page_size, self.page)
    }

    pub fn page_numbers(&self) -> Vec<usize> {
        let total = campus_core::total_pages(self.filtered().len(), self.page_size);
        page_numbers(total, self.page)
    }

    pub fn showing(&self) -> Showing {
        self.view().showing()
    }

    fn settle_page(&mut self) {
        let total = campus_core::total_pages(self.filtered().len(), self.page_size);
        if needs_reset(total, self.page) {
            debug!(from = self.page, total_pages = total, "Page reset");
            self.page = FIRST_PAGE;
        }
    }

    fn fail(&mut self, op: &str, err: Error) -> bool {
        warn!(entity = self.descriptor().path, op, error = %err, "Operation failed");
        self.error = Some(err.user_message());
        false
    }

    // =========================================================================
    // LOAD
    // =========================================================================

    /// Fetch the whole collection.
    pub async fn load(&mut self) -> bool {
        let start = Instant::now();
        self.loading = true;
        let result = self.gateway.get_all().await;
        self.loading = false;

        match result {
            Ok(records) => {
                self.store.set_all(records);
                self.settle_page();
                info!(
                    entity = self.descriptor().path,
                    record_count = self.store.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Collection loaded"
                );
                true
            }
            Err(e) => self.fail("load", e),
        }
    }

    // =========================================================================
    // EDITOR
    // =========================================================================

    pub fn open_create(&mut self) {
        self.editor.open(EditorMode::Create, None);
    }

    /// Open the editor on a record from the collection.
    pub fn open_edit(&mut self, id: &RecordId) -> bool {
        match self.store.get(id) {
            Some(record) => {
                let record = record.clone();
                self.editor.open(EditorMode::Edit(id.clone()), Some(&record));
                true
            }
            None => self.fail(
                "open_edit",
                Error::NotFound(format!("{} {}", self.descriptor().path, id)),
            ),
        }
    }

    pub fn editor(&self) -> &FormEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut FormEditor {
        &mut self.editor
    }

    pub fn close_editor(&mut self) {
        self.editor.close();
    }

    /// Submit the open form. On success the collection is patched and the
    /// editor closes; on failure the draft stays for a retry.
    pub async fn submit(&mut self) -> bool {
        let submission = match self.editor.prepare() {
            Ok(submission) => submission,
            Err(e) => return self.fail("submit", e),
        };
        let ok = self.send(submission).await;
        if ok {
            self.editor.close();
        }
        ok
    }

    /// Send a prepared submission and apply its result. The editor is not
    /// consulted, so this applies even if the form was closed meanwhile.
    pub async fn send(&mut self, submission: Submission) -> bool {
        let Some(ticket) = self.begin_send(submission) else {
            return false;
        };
        let result = ticket.call(&self.gateway).await;
        self.finish_send(ticket, result).await
    }

    /// Mark the submission's row busy. `None` (with the banner set) when an
    /// action on that row is already running.
    pub fn begin_send(&mut self, submission: Submission) -> Option<SubmitTicket> {
        let guard = self.acquire(submission.key(), "submit")?;
        Some(SubmitTicket {
            submission,
            _guard: guard,
        })
    }

    /// Apply the server's answer to a submission.
    pub async fn finish_send(&mut self, ticket: SubmitTicket, result: Result<Option<Record>>) -> bool {
        let SubmitTicket { submission, _guard } = ticket;
        let echoed = match result {
            Ok(echoed) => echoed,
            Err(e) => {
                let op = match submission.mode {
                    EditorMode::Create => "create",
                    EditorMode::Edit(_) => "update",
                };
                return self.fail(op, e);
            }
        };

        match &submission.mode {
            EditorMode::Create => {
                let created = echoed.unwrap_or_else(|| submission.payload.fields().clone());
                debug!(
                    entity = self.descriptor().path,
                    record_id = ?created.id(),
                    "Created record prepended"
                );
                self.store.insert_front(created);
            }
            EditorMode::Edit(id) => {
                self.store.replace_by_id(id, submission.payload.fields());
                if let Some(echoed) = echoed {
                    self.store.replace_by_id(id, &echoed);
                }
                debug!(entity = self.descriptor().path, record_id = %id, "Record patched");
            }
        }

        self.error = None;
        if self.reconcile {
            self.load().await;
        }
        true
    }

    // =========================================================================
    // ROW ACTIONS
    // =========================================================================

    fn acquire(&mut self, key: &str, op: &str) -> Option<PendingGuard> {
        match self.pending.try_acquire(key) {
            Ok(guard) => Some(guard),
            Err(e) => {
                self.fail(op, e);
                None
            }
        }
    }

    /// Remove a record optimistically. A failed delete re-fetches the
    /// collection so the row comes back.
    pub async fn delete(&mut self, id: &RecordId) -> bool {
        let Some(ticket) = self.begin_delete(id) else {
            return false;
        };
        let result = ticket.call(&self.gateway).await;
        self.finish_delete(ticket, result).await
    }

    /// Mark the row busy and drop it from the collection.
    pub fn begin_delete(&mut self, id: &RecordId) -> Option<DeleteTicket> {
        let guard = self.acquire(id.as_str(), "delete")?;
        let removed = self.store.remove_by_id(id);
        self.settle_page();
        Some(DeleteTicket {
            id: id.clone(),
            removed,
            _guard: guard,
        })
    }

    /// Settle a delete. The row stays busy until the resync after a failure
    /// has finished.
    pub async fn finish_delete(&mut self, ticket: DeleteTicket, result: Result<()>) -> bool {
        let DeleteTicket { id, removed, _guard } = ticket;
        match result {
            Ok(()) => {
                info!(entity = self.descriptor().path, record_id = %id, "Record deleted");
                self.error = None;
                true
            }
            Err(e) => {
                let message = e.user_message();
                warn!(entity = self.descriptor().path, record_id = %id, error = %e, "Delete failed, resyncing");
                if let Err(reload) = self.resync().await {
                    warn!(error = %reload, "Resync failed, restoring removed record locally");
                    if let Some(record) = removed {
                        self.store.insert_front(record);
                    }
                }
                self.error = Some(message);
                false
            }
        }
    }

    async fn resync(&mut self) -> Result<()> {
        self.loading = true;
        let result = self.gateway.get_all().await;
        self.loading = false;
        self.store.set_all(result?);
        self.settle_page();
        Ok(())
    }

    /// Run a custom action on a record and apply its local patch.
    pub async fn run_action(&mut self, name: &str, id: &RecordId) -> bool {
        let Some(ticket) = self.begin_action(name, id) else {
            return false;
        };
        let result = ticket.call(&self.gateway).await;
        self.finish_action(ticket, result)
    }

    /// Check the action exists and mark the row busy.
    pub fn begin_action(&mut self, name: &str, id: &RecordId) -> Option<ActionTicket> {
        let Some(action) = self.descriptor().action(name) else {
            let err = self.descriptor().unsupported(name);
            self.fail(name, err);
            return None;
        };
        let guard = self.acquire(id.as_str(), name)?;
        let patch: Record = action
            .patch
            .iter()
            .map(|(field, value)| (field.to_string(), serde_json::Value::from(*value)))
            .collect();
        Some(ActionTicket {
            name: name.to_string(),
            id: id.clone(),
            patch,
            _guard: guard,
        })
    }

    pub fn finish_action(&mut self, ticket: ActionTicket, result: Result<Option<Record>>) -> bool {
        let ActionTicket {
            name,
            id,
            patch,
            _guard,
        } = ticket;
        match result {
            Ok(echoed) => {
                self.store.replace_by_id(&id, &patch);
                if let Some(echoed) = echoed {
                    self.store.replace_by_id(&id, &echoed);
                }
                info!(entity = self.descriptor().path, record_id = %id, action = %name, "Action applied");
                self.error = None;
                true
            }
            Err(e) => self.fail(&name, e),
        }
    }
}
