//! In-memory gateway.
//!
//! Backs the screens whose state is never persisted (entities with
//! [`Persistence::LocalOnly`](crate::entity::Persistence)) and serves as a
//! deterministic gateway in tests: it records every call and can be told to
//! fail specific operations.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::entity::EntityDescriptor;
use crate::error::{Error, Result};
use crate::media::RemoteMedia;
use crate::payload::Payload;
use crate::record::{Record, RecordId};
use crate::traits::RemoteGateway;

/// Gateway operation, for call logs and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    GetAll,
    GetById,
    Create,
    Update,
    Delete,
    Action,
}

#[derive(Debug, Default)]
struct State {
    records: Vec<Record>,
    failing: HashSet<GatewayOp>,
    calls: Vec<GatewayOp>,
}

/// Gateway holding its records in memory.
#[derive(Debug, Clone)]
pub struct MemoryGateway {
    descriptor: &'static EntityDescriptor,
    state: Arc<Mutex<State>>,
    echo: bool,
}

impl MemoryGateway {
    pub fn new(descriptor: &'static EntityDescriptor) -> Self {
        Self {
            descriptor,
            state: Arc::new(Mutex::new(State::default())),
            echo: true,
        }
    }

    /// Seed the stored records.
    pub fn with_records(self, records: Vec<Record>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.records = records;
        }
        self
    }

    /// Whether create/update return the stored record (default) or nothing.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Make `op` fail with a 500 until [`MemoryGateway::recover`] is called.
    /// A failing operation changes nothing.
    pub fn fail_on(&self, op: GatewayOp) {
        if let Ok(mut state) = self.state.lock() {
            state.failing.insert(op);
        }
    }

    pub fn recover(&self, op: GatewayOp) {
        if let Ok(mut state) = self.state.lock() {
            state.failing.remove(&op);
        }
    }

    /// Operations called so far, in order.
    pub fn calls(&self) -> Vec<GatewayOp> {
        self.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<Record> {
        self.lock().map(|s| s.records.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("memory gateway lock poisoned".to_string()))
    }

    /// Log the call and check operation support and injected failures.
    fn enter(&self, op: GatewayOp, allowed: bool, name: &str) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.lock()?;
        state.calls.push(op);
        self.descriptor.ensure(allowed, name)?;
        if state.failing.contains(&op) {
            debug!(entity = self.descriptor.path, op = name, "Injected failure");
            return Err(Error::Api {
                status: 500,
                message: format!("{} {} failed", self.descriptor.path, name),
            });
        }
        Ok(state)
    }

    /// Stored form of a payload: fields plus a remote descriptor for each
    /// uploaded file.
    fn materialize(&self, payload: &Payload) -> Record {
        let mut record = payload.fields().clone();
        for (name, file) in payload.files() {
            let media = RemoteMedia::new(format!(
                "memory://{}/{}/{}",
                self.descriptor.path, name, file.file_name
            ));
            record.insert(
                name.clone(),
                serde_json::to_value(media).unwrap_or(Value::Null),
            );
        }
        record
    }

    fn echo(&self, record: Record) -> Option<Record> {
        self.echo.then_some(record)
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    async fn get_all(&self) -> Result<Vec<Record>> {
        let state = self.enter(GatewayOp::GetAll, self.descriptor.operations.get_all, "get_all")?;
        Ok(state.records.clone())
    }

    async fn get_by_id(&self, id: &RecordId) -> Result<Record> {
        let state = self.enter(
            GatewayOp::GetById,
            self.descriptor.operations.get_by_id,
            "get_by_id",
        )?;
        state
            .records
            .iter()
            .find(|r| r.has_id(id))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("{} {}", self.descriptor.path, id)))
    }

    async fn create(&self, payload: &Payload) -> Result<Option<Record>> {
        let mut record = self.materialize(payload);
        let mut state = self.enter(GatewayOp::Create, self.descriptor.operations.create, "create")?;
        let id = RecordId::new(Uuid::new_v4().simple().to_string());
        record.set_id(&id);
        state.records.insert(0, record.clone());
        debug!(entity = self.descriptor.path, record_id = %id, "Stored new record");
        Ok(self.echo(record))
    }

    async fn update(&self, id: &RecordId, payload: &Payload) -> Result<Option<Record>> {
        let patch = self.materialize(payload);
        let mut state = self.enter(GatewayOp::Update, self.descriptor.operations.update, "update")?;
        let record = state
            .records
            .iter_mut()
            .find(|r| r.has_id(id))
            .ok_or_else(|| Error::NotFound(format!("{} {}", self.descriptor.path, id)))?;
        record.merge(&patch);
        let updated = record.clone();
        Ok(self.echo(updated))
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let mut state = self.enter(GatewayOp::Delete, self.descriptor.operations.delete, "delete")?;
        let before = state.records.len();
        state.records.retain(|r| !r.has_id(id));
        if state.records.len() == before {
            return Err(Error::NotFound(format!("{} {}", self.descriptor.path, id)));
        }
        Ok(())
    }

    async fn action(&self, name: &str, id: &RecordId) -> Result<Option<Record>> {
        let action = self.descriptor.action(name);
        let mut state = self.enter(GatewayOp::Action, action.is_some(), name)?;
        let Some(action) = action else {
            return Err(self.descriptor.unsupported(name));
        };
        let record = state
            .records
            .iter_mut()
            .find(|r| r.has_id(id))
            .ok_or_else(|| Error::NotFound(format!("{} {}", self.descriptor.path, id)))?;
        for (field, value) in action.patch {
            record.insert(*field, Value::String((*value).to_string()));
        }
        let updated = record.clone();
        Ok(self.echo(updated))
    }
}
