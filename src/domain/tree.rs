//! Tree - Node identity and paged collection types

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Unique identifier for a tree node (the identity of the domain object it shows)
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Arc<str>);

impl NodeId {
    /// Create a new NodeId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a tree view's display preferences: the view plus the page context it lives in
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ViewKey {
    /// View identifier (usually the model the tree lists)
    pub view: Arc<str>,
    /// Context the view is shown in (page, parent object, ...)
    pub context: Arc<str>,
}

impl ViewKey {
    pub fn new(view: impl Into<Arc<str>>, context: impl Into<Arc<str>>) -> Self {
        Self {
            view: view.into(),
            context: context.into(),
        }
    }
}

impl std::fmt::Display for ViewKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.view, self.context)
    }
}

/// An object that can be shown as a tree node
pub trait TreeItem: Clone {
    /// Identity used to match re-fetched items against rendered nodes
    fn node_id(&self) -> NodeId;

    /// Text shown for the node
    fn title(&self) -> &str;
}

/// One page of a server-paged collection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on the requested page
    pub items: Vec<T>,
    /// Total number of items matching the query, across all pages
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }
}
