//! Config - Application Configuration

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_PAGE_SIZE, DEFAULT_TREE_CONTEXT, DEFAULT_TREE_VIEW,
};
use crate::domain::field::FieldConfig;
use crate::domain::tree::ViewKey;
use crate::error::Result;
use crate::helpers::get_or_create_config_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Tree view configuration
    pub tree: TreeViewConfig,
    /// Logging configuration
    pub log: LogConfig,
    /// Display preferences file (defaults to the data directory)
    pub preferences_file: Option<PathBuf>,
    /// Inline edit fields by name
    pub fields: BTreeMap<String, FieldConfig>,
}

/// Tree view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeViewConfig {
    /// View identifier for display preferences
    pub view: String,
    /// Context identifier for display preferences
    pub context: String,
    /// Items per page
    pub page_size: u32,
}

impl Default for TreeViewConfig {
    fn default() -> Self {
        Self {
            view: DEFAULT_TREE_VIEW.to_string(),
            context: DEFAULT_TREE_CONTEXT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TreeViewConfig {
    pub fn view_key(&self) -> ViewKey {
        ViewKey::new(self.view.as_str(), self.context.as_str())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level directive when RUST_LOG is not set
    pub level: String,
    /// Also write a daily log file in the data directory
    pub file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: false,
        }
    }
}

/// Load the configuration from `path`, or from the platform config directory
///
/// A missing file yields the defaults.
pub fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => get_or_create_config_dir()?.join(CONFIG_FILE_NAME),
    };

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}
