//! Save Coordinator
//!
//! Commit path of an inline edit: refresh the record, coerce the value for
//! its field type, write it and save, all under the field's edit lock.

use crate::domain::field::{FieldDescriptor, FieldValue};
use crate::error::Result;
use crate::services::Record;
use crate::states::edit_lock::EditLocks;

#[derive(Clone, Debug, Default)]
pub struct SaveCoordinator {
    locks: EditLocks,
}

impl SaveCoordinator {
    pub fn new(locks: EditLocks) -> Self {
        Self { locks }
    }

    pub fn locks(&self) -> &EditLocks {
        &self.locks
    }

    /// Write `value` onto `record` and persist it
    ///
    /// The lease is dropped on every exit path, including a failed refresh.
    pub async fn commit<R: Record>(&self, record: &R, descriptor: &FieldDescriptor, value: &FieldValue) -> Result<()> {
        let key = record.record_key();
        let _lease = self.locks.try_acquire(key.clone(), &descriptor.binding)?;

        record.refresh().await?;

        let raw = descriptor.coerce(value);
        tracing::debug!("Writing {} = {} on {}", descriptor.binding, raw, key);
        record.set_attr(&descriptor.binding, raw);

        record.save().await
    }
}
