//! Notifications
//!
//! Flash messages emitted by the edit layer for whatever UI renders them.
//! The sink is injected; nothing here is process-global.

use crate::constants::FLASH_LOG_CAPACITY;
use chrono::{DateTime, Utc};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// A transient flash message
///
/// Serializes as `{"success": "..."}` or `{"error": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notification {
    Success(Arc<str>),
    Error(Arc<str>),
}

impl Notification {
    pub fn success(message: impl Into<Arc<str>>) -> Self {
        Self::Success(message.into())
    }

    pub fn error(message: impl Into<Arc<str>>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }
}

/// Receiver of flash notifications
pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

impl NotificationSink for Sender<Notification> {
    fn notify(&self, notification: Notification) {
        if self.send(notification).is_err() {
            tracing::debug!("Notification dropped: no receiver");
        }
    }
}

/// A flash with the time it was raised
#[derive(Clone, Debug)]
pub struct Flash {
    pub at: DateTime<Utc>,
    pub notification: Notification,
}

/// Sink keeping the most recent flashes (oldest evicted first)
#[derive(Debug)]
pub struct FlashLog {
    cap: usize,
    entries: Mutex<VecDeque<Flash>>,
}

impl FlashLog {
    /// Create a log holding at most `cap` flashes. If 0, nothing is kept.
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            entries: Mutex::new(VecDeque::with_capacity(cap.min(1024))),
        }
    }

    /// Snapshot of the kept flashes (oldest to newest)
    pub fn entries(&self) -> Vec<Flash> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<Flash> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FlashLog {
    fn default() -> Self {
        Self::new(FLASH_LOG_CAPACITY)
    }
}

impl NotificationSink for FlashLog {
    fn notify(&self, notification: Notification) {
        if self.cap == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == self.cap {
            entries.pop_front();
        }
        entries.push_back(Flash {
            at: Utc::now(),
            notification,
        });
    }
}
