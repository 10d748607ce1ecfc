//! Client Constants
//!
//! Centralized defaults shared by the tree view and inline edit layers.

/// Page size used when a view configuration does not set one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Default view/context pair for tree display preferences
pub const DEFAULT_TREE_VIEW: &str = "Program";
pub const DEFAULT_TREE_CONTEXT: &str = "default";

/// Flash messages emitted by inline edit saves
pub const SAVE_SUCCESS_MESSAGE: &str = "Saved";
pub const SAVE_ERROR_MESSAGE: &str = "There was a problem saving";

/// Prefix of the token written for person-reference custom attributes
pub const PERSON_TOKEN_PREFIX: &str = "Person:";

/// Delimiter for option lists supplied as a single string
pub const OPTION_LIST_DELIMITER: char = ',';

/// Namespace holding custom attribute values on a record
pub const CUSTOM_ATTRIBUTES_KEY: &str = "custom_attributes";

/// Bounded flash log capacity
pub const FLASH_LOG_CAPACITY: usize = 50;

/// File names inside the platform config/data directories
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const PREFERENCES_FILE_NAME: &str = "display_prefs.json";
pub const LOG_FILE_PREFIX: &str = "grc-client.log";
