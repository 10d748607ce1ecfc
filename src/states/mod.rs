//! State Layer
//!
//! The engine's mutable state and the operations that drive it. Services are
//! injected; nothing here owns a runtime or touches the filesystem directly.
//!
//! ```text
//! user action → controller method → service call (await) → state update → renderer / sink
//! ```

mod edit_lock;
mod fetch_queue;
mod field_edit;
mod inline_edit;
pub mod paging;
mod render;
mod save;
mod tree_view;

pub use edit_lock::*;
pub use fetch_queue::*;
pub use field_edit::*;
pub use inline_edit::*;
pub use paging::{PagingState, RequestParams, build_request_params};
pub use render::*;
pub use save::*;
pub use tree_view::*;
