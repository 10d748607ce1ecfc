//! Inline Edit
//!
//! One editable field bound to one record: the field store, the commit path
//! and the flash notifications a save produces.

use crate::constants::{SAVE_ERROR_MESSAGE, SAVE_SUCCESS_MESSAGE};
use crate::domain::field::{FieldBinding, FieldConfig, FieldDescriptor, FieldValue};
use crate::error::Result;
use crate::services::{Notification, NotificationSink, Record, next_tick};
use crate::states::field_edit::{BlurToken, EditableFieldStore, PreventDefault, SaveStep};
use crate::states::save::SaveCoordinator;
use serde_json::Value;
use std::sync::Arc;

/// Result of a save request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Value unchanged, nothing sent
    NoOp,
    /// Record saved with the new value
    Saved,
    /// Commit failed, value restored
    RolledBack,
    /// Not editing, or a save already in flight
    Ignored,
}

pub struct InlineEdit<R, N> {
    record: Arc<R>,
    descriptor: FieldDescriptor,
    store: EditableFieldStore,
    coordinator: SaveCoordinator,
    sink: N,
}

impl<R: Record, N: NotificationSink> InlineEdit<R, N> {
    /// Bind a field to `record`
    ///
    /// Custom attribute fields start from `supplied`, falling back to the
    /// record's slot; property fields always read the record.
    pub fn new(
        record: Arc<R>,
        config: &FieldConfig,
        supplied: Option<Value>,
        coordinator: SaveCoordinator,
        sink: N,
    ) -> Result<Self> {
        let descriptor = FieldDescriptor::try_from(config)?;

        let raw = match (&descriptor.binding, supplied) {
            (FieldBinding::CustomAttribute(_), Some(value)) => value,
            _ => record.attr(&descriptor.binding),
        };
        let initial = descriptor.normalize(raw);

        tracing::debug!(
            "Inline edit of {} on {} starts at {:?}",
            descriptor.binding,
            record.record_key(),
            initial
        );

        Ok(Self {
            store: EditableFieldStore::new(initial, config.options()),
            record,
            descriptor,
            coordinator,
            sink,
        })
    }

    // ==================== Getters ====================

    pub fn record(&self) -> &Arc<R> {
        &self.record
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn store(&self) -> &EditableFieldStore {
        &self.store
    }

    /// The value shown while not editing
    pub fn value(&self) -> &FieldValue {
        self.store.committed()
    }

    // ==================== Actions ====================

    pub fn enable_edit(&mut self, event: &mut impl PreventDefault) -> bool {
        self.store.enter_edit(event)
    }

    pub fn set_value(&mut self, value: FieldValue) -> bool {
        self.store.set_pending(value)
    }

    pub fn cancel(&mut self) -> bool {
        self.store.cancel()
    }

    /// Save from a submit event, suppressing its default action
    pub async fn submit(&mut self, event: &mut impl PreventDefault) -> SaveOutcome {
        event.prevent_default();
        self.save().await
    }

    /// Commit the pending value
    ///
    /// Emits exactly one notification when a commit was attempted.
    pub async fn save(&mut self) -> SaveOutcome {
        let value = match self.store.begin_save() {
            SaveStep::Ignored => {
                tracing::debug!("Save of {} ignored in {:?}", self.descriptor.binding, self.store.phase());
                return SaveOutcome::Ignored;
            }
            SaveStep::NoOp => return SaveOutcome::NoOp,
            SaveStep::Commit(value) => value,
        };

        match self
            .coordinator
            .commit(self.record.as_ref(), &self.descriptor, &value)
            .await
        {
            Ok(()) => {
                self.store.finish_save(true);
                self.sink.notify(Notification::success(SAVE_SUCCESS_MESSAGE));
                SaveOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(
                    "Saving {} of {} failed: {}",
                    self.descriptor.binding,
                    self.record.record_key(),
                    e
                );
                self.store.finish_save(false);
                self.sink.notify(Notification::error(SAVE_ERROR_MESSAGE));
                SaveOutcome::RolledBack
            }
        }
    }

    /// Pointer-down anywhere; outside the widget while editing schedules a save
    pub fn on_pointer_down(&mut self, inside: bool) -> Option<BlurToken> {
        self.store.schedule_blur(inside)
    }

    /// Fire a scheduled blur save if it is still valid
    pub async fn fire_blur(&mut self, token: BlurToken) -> Option<SaveOutcome> {
        if !self.store.take_blur(token) {
            tracing::trace!("Blur save {:?} no longer valid", token);
            return None;
        }
        Some(self.save().await)
    }

    /// Fire a blur save on the next scheduler tick
    pub async fn run_deferred_blur(&mut self, token: BlurToken) -> Option<SaveOutcome> {
        next_tick().await;
        self.fire_blur(token).await
    }
}
