//! In-memory collection of one entity type, owned by one screen.
//!
//! The collection always reflects the last successful fetch plus the
//! optimistic patches applied since. It is ordered by server order, except
//! that records created locally are prepended.
//!
//! Mutators keyed by id never fail on an unknown id; they return `false` and
//! leave the collection untouched.

use tracing::trace;

use crate::record::{Record, RecordId};

#[derive(Debug, Clone, Default)]
pub struct CollectionStore {
    records: Vec<Record>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection. Later duplicates of an id are dropped so
    /// the collection stays unique by identifier.
    pub fn set_all(&mut self, records: Vec<Record>) {
        let mut seen = std::collections::HashSet::new();
        self.records = records
            .into_iter()
            .filter(|r| match r.id() {
                Some(id) => seen.insert(id),
                None => true,
            })
            .collect();
        trace!(record_count = self.records.len(), "Collection replaced");
    }

    /// Prepend a newly created record. An existing record with the same id is
    /// removed first.
    pub fn insert_front(&mut self, record: Record) {
        if let Some(id) = record.id() {
            self.records.retain(|r| !r.has_id(&id));
        }
        self.records.insert(0, record);
    }

    /// Merge `patch` into the record with `id`.
    pub fn replace_by_id(&mut self, id: &RecordId, patch: &Record) -> bool {
        match self.records.iter_mut().find(|r| r.has_id(id)) {
            Some(record) => {
                record.merge(patch);
                true
            }
            None => false,
        }
    }

    /// Remove the record with `id`, returning it.
    pub fn remove_by_id(&mut self, id: &RecordId) -> Option<Record> {
        let pos = self.records.iter().position(|r| r.has_id(id))?;
        Some(self.records.remove(pos))
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.has_id(id))
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<'a> IntoIterator for &'a CollectionStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
