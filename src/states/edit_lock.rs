//! Edit Locks
//!
//! At most one commit per record field may be in flight. Two widgets bound
//! to the same field of a shared record would otherwise race their
//! refresh/write/save sequences.

use crate::domain::field::FieldBinding;
use crate::error::{Error, Result};
use ahash::AHashSet;
use std::sync::{Arc, Mutex, PoisonError};

type LockKey = (Arc<str>, FieldBinding);

/// Registry of record fields with a commit in flight
///
/// Clones share the registry.
#[derive(Clone, Debug, Default)]
pub struct EditLocks {
    held: Arc<Mutex<AHashSet<LockKey>>>,
}

impl EditLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `field` of `record` until the returned lease drops
    pub fn try_acquire(&self, record: Arc<str>, field: &FieldBinding) -> Result<EditLease> {
        let key = (record, field.clone());
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);

        if !held.insert(key.clone()) {
            tracing::warn!("Commit to {} of {} already in flight", key.1, key.0);
            return Err(Error::EditLocked {
                record: key.0.to_string(),
                field: key.1.to_string(),
            });
        }

        Ok(EditLease {
            locks: self.clone(),
            key,
        })
    }

    pub fn is_locked(&self, record: &str, field: &FieldBinding) -> bool {
        let held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        held.iter().any(|(r, f)| &**r == record && f == field)
    }
}

/// Claim on one record field, released on drop
#[derive(Debug)]
pub struct EditLease {
    locks: EditLocks,
    key: LockKey,
}

impl Drop for EditLease {
    fn drop(&mut self) {
        let mut held = self.locks.held.lock().unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.key);
    }
}
