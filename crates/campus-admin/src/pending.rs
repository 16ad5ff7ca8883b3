//! In-flight action tracking.
//!
//! A row's buttons stay disabled while an action on that row is pending. The
//! key is the record id, or [`NEW_RECORD_KEY`] for a create. Actions on
//! different keys run independently.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use campus_core::defaults::NEW_RECORD_KEY;
use campus_core::{Error, RecordId, Result};
use tracing::trace;

/// Set of keys with an action in flight.
#[derive(Debug, Clone, Default)]
pub struct PendingActions {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as pending until the guard is dropped. Fails with
    /// [`Error::Busy`] when `key` is already pending.
    pub fn try_acquire(&self, key: &str) -> Result<PendingGuard> {
        let mut keys = self
            .keys
            .lock()
            .map_err(|_| Error::Internal("pending actions lock poisoned".to_string()))?;
        if !keys.insert(key.to_string()) {
            return Err(Error::Busy(key.to_string()));
        }
        trace!(key, "Action pending");
        Ok(PendingGuard {
            key: key.to_string(),
            keys: Arc::clone(&self.keys),
        })
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.keys.lock().map(|k| k.contains(key)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.keys.lock().map(|k| k.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key of an action on an existing record, or on a record being created.
pub fn action_key(id: Option<&RecordId>) -> &str {
    id.map(RecordId::as_str).unwrap_or(NEW_RECORD_KEY)
}

/// Clears its key when dropped.
#[derive(Debug)]
pub struct PendingGuard {
    key: String,
    keys: Arc<Mutex<HashSet<String>>>,
}

impl PendingGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Ok(mut keys) = self.keys.lock() {
            keys.remove(&self.key);
        }
        trace!(key = %self.key, "Action settled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_is_busy() {
        let pending = PendingActions::new();
        let guard = pending.try_acquire("u1").unwrap();
        let err = pending.try_acquire("u1").unwrap_err();
        assert!(matches!(err, Error::Busy(ref key) if key == "u1"));
        assert!(pending.is_pending("u1"));

        drop(guard);
        assert!(!pending.is_pending("u1"));
        assert!(pending.try_acquire("u1").is_ok());
    }

    #[test]
    fn test_different_keys_are_independent() {
        let pending = PendingActions::new();
        let _a = pending.try_acquire("u1").unwrap();
        let _b = pending.try_acquire("u2").unwrap();
        let _c = pending.try_acquire(NEW_RECORD_KEY).unwrap();
        assert_eq!(pending.len(), 3);
    }

    #[test]
    fn test_action_key() {
        let id = RecordId::from("c7");
        assert_eq!(action_key(Some(&id)), "c7");
        assert_eq!(action_key(None), "new");
    }

    #[test]
    fn test_clones_share_state() {
        let pending = PendingActions::new();
        let view = pending.clone();
        let guard = pending.try_acquire("x").unwrap();
        assert!(view.is_pending("x"));
        assert_eq!(guard.key(), "x");
    }
}
