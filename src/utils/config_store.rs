//! ConfigStore - Local JSON document storage

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Save a JSON document, creating parent directories as needed
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}
