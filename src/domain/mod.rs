//! Domain - Pure Data Structures
//!
//! Node identities, field values and configuration. Nothing here performs IO
//! except configuration loading.

pub mod config;
pub mod field;
pub mod tree;
