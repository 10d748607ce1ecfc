//! Service Layer
//!
//! Capabilities the engine consumes (collection queries, records, display
//! preferences) and produces (notifications), with the concrete
//! implementations the CLI runs against.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       State Layer                             │
//! │        TreeViewController            InlineEdit               │
//! └──────────────────────────────────────────────────────────────┘
//!        │              │                    │            │
//!        ▼              ▼                    ▼            ▼
//!  CollectionQuery  DisplayPreference     Record    NotificationSink
//!  (JsonCollection)  Gateway (file)   (JsonFileRecord)  (FlashLog)
//! ```

mod collection;
mod notifications;
mod preferences;
mod record;
mod runtime;

pub use collection::*;
pub use notifications::*;
pub use preferences::*;
pub use record::*;
pub use runtime::*;
