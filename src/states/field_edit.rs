//! Editable Field Store
//!
//! Phase machine of one inline-editable field: `Viewing`, `Editing` and
//! `Saving`. The store is synchronous; the commit itself runs elsewhere and
//! reports back through [`EditableFieldStore::finish_save`].

use crate::domain::field::FieldValue;

/// Lifecycle phase of an editable field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditPhase {
    #[default]
    Viewing,
    Editing,
    Saving,
}

/// An input event whose default action can be suppressed
pub trait PreventDefault {
    fn prevent_default(&mut self);
}

/// Minimal input event for hosts without their own event type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiEvent {
    default_prevented: bool,
}

impl UiEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl PreventDefault for UiEvent {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Handle of a save scheduled by focus loss
///
/// Valid only for the editing session it was issued in.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct BlurToken(u64);

/// What a save request turned into
#[derive(Clone, Debug, PartialEq)]
pub enum SaveStep {
    /// Nothing changed; back to `Viewing`
    NoOp,
    /// Value to commit; the store is now `Saving`
    Commit(FieldValue),
    /// Not editing (or already saving); nothing happened
    Ignored,
}

/// Value and phase of one field of one record
#[derive(Clone, Debug)]
pub struct EditableFieldStore {
    phase: EditPhase,
    committed: FieldValue,
    pending: FieldValue,
    rollback: Option<FieldValue>,
    options: Vec<String>,
    session: u64,
    blur: Option<BlurToken>,
}

impl EditableFieldStore {
    pub fn new(initial: FieldValue, options: Vec<String>) -> Self {
        Self {
            phase: EditPhase::Viewing,
            pending: initial.clone(),
            committed: initial,
            rollback: None,
            options,
            session: 0,
            blur: None,
        }
    }

    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    /// Last loaded or confirmed value (optimistically the new one while saving)
    pub fn committed(&self) -> &FieldValue {
        &self.committed
    }

    pub fn pending(&self) -> &FieldValue {
        &self.pending
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn is_editing(&self) -> bool {
        self.phase == EditPhase::Editing
    }

    pub fn is_saving(&self) -> bool {
        self.phase == EditPhase::Saving
    }

    /// Switch to `Editing` with a fresh copy of the committed value
    ///
    /// The event's default action is always suppressed. Any blur save
    /// scheduled in an earlier session is invalidated.
    pub fn enter_edit(&mut self, event: &mut impl PreventDefault) -> bool {
        event.prevent_default();

        if self.phase != EditPhase::Viewing {
            return false;
        }

        self.session += 1;
        self.blur = None;
        self.pending = self.committed.clone();
        self.phase = EditPhase::Editing;
        true
    }

    pub fn set_pending(&mut self, value: FieldValue) -> bool {
        if self.phase != EditPhase::Editing {
            return false;
        }
        self.pending = value;
        true
    }

    /// Discard the pending value
    pub fn cancel(&mut self) -> bool {
        if self.phase != EditPhase::Editing {
            return false;
        }
        self.pending = self.committed.clone();
        self.blur = None;
        self.phase = EditPhase::Viewing;
        true
    }

    pub fn begin_save(&mut self) -> SaveStep {
        if self.phase != EditPhase::Editing {
            return SaveStep::Ignored;
        }

        self.blur = None;

        if self.pending == self.committed {
            self.phase = EditPhase::Viewing;
            return SaveStep::NoOp;
        }

        let value = self.pending.clone();
        self.rollback = Some(std::mem::replace(&mut self.committed, value.clone()));
        self.phase = EditPhase::Saving;
        SaveStep::Commit(value)
    }

    /// Leave `Saving`, restoring the pre-edit value when the commit failed
    pub fn finish_save(&mut self, succeeded: bool) {
        if self.phase != EditPhase::Saving {
            return;
        }

        match self.rollback.take() {
            Some(previous) if !succeeded => {
                self.committed = previous;
                self.pending = self.committed.clone();
            }
            _ => {}
        }
        self.phase = EditPhase::Viewing;
    }

    /// Schedule an implicit save for a pointer-down outside the widget
    pub fn schedule_blur(&mut self, inside: bool) -> Option<BlurToken> {
        if inside || self.phase != EditPhase::Editing {
            return None;
        }
        let token = BlurToken(self.session);
        self.blur = Some(token);
        Some(token)
    }

    /// Consume a scheduled blur save; `false` when it was invalidated
    pub fn take_blur(&mut self, token: BlurToken) -> bool {
        if self.blur != Some(token) || self.phase != EditPhase::Editing {
            return false;
        }
        self.blur = None;
        true
    }
}
