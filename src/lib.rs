//! GRC Client Core
//!
//! Headless engine behind two GRC widgets: an inline-editable record field
//! with optimistic save and rollback, and a server-paged tree view that
//! remembers which nodes the user expanded.

pub mod constants;
pub mod domain;
pub mod error;
pub mod helpers;
pub mod services;
pub mod states;
pub mod utils;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
