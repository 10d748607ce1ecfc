//! Collection Query
//!
//! The paged query capability the tree view fetches through, plus a
//! JSON-file backed implementation used by the CLI.

use crate::domain::tree::{NodeId, Page, TreeItem};
use crate::error::Result;
use crate::states::RequestParams;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;

/// Server-paged collection of tree items
pub trait CollectionQuery {
    type Item: TreeItem;

    /// Fetch one page matching `params`, with the total match count
    fn find_all(&self, params: &RequestParams) -> impl Future<Output = Result<Page<Self::Item>>>;

    /// Fetch the children shown under an expanded node
    fn find_children(&self, parent: &NodeId) -> impl Future<Output = Result<Vec<Self::Item>>> {
        tracing::trace!("No child query for {}", parent);
        async { Ok(Vec::new()) }
    }
}

/// A node of a JSON collection document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: NodeId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CollectionItem>,
}

impl CollectionItem {
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<CollectionItem>) -> Self {
        self.children = children;
        self
    }
}

impl TreeItem for CollectionItem {
    fn node_id(&self) -> NodeId {
        self.id.clone()
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// In-memory collection loaded from a JSON array of items
///
/// Search matches top-level titles case-insensitively; paging is 1-based.
#[derive(Clone, Debug, Default)]
pub struct JsonCollection {
    items: Vec<CollectionItem>,
}

impl JsonCollection {
    pub fn new(items: Vec<CollectionItem>) -> Self {
        Self { items }
    }

    /// Load a collection document
    pub async fn open(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let items: Vec<CollectionItem> = serde_json::from_str(&content)?;
        tracing::debug!("Loaded {} root items from {}", items.len(), path.display());
        Ok(Self::new(items))
    }

    fn find<'a>(items: &'a [CollectionItem], id: &NodeId) -> Option<&'a CollectionItem> {
        items.iter().find_map(|item| {
            if &item.id == id {
                Some(item)
            } else {
                Self::find(&item.children, id)
            }
        })
    }
}

impl CollectionQuery for JsonCollection {
    type Item = CollectionItem;

    async fn find_all(&self, params: &RequestParams) -> Result<Page<CollectionItem>> {
        let needle = params
            .search_value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let matching: Vec<&CollectionItem> = self
            .items
            .iter()
            .filter(|item| match &needle {
                Some(needle) => item.title.to_lowercase().contains(needle),
                None => true,
            })
            .collect();

        let total = matching.len() as u64;
        let page_size = params.page_size.max(1) as usize;
        let start = params.page.saturating_sub(1) as usize * page_size;

        let items = matching
            .into_iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        Ok(Page::new(items, total))
    }

    async fn find_children(&self, parent: &NodeId) -> Result<Vec<CollectionItem>> {
        Ok(Self::find(&self.items, parent)
            .map(|item| item.children.clone())
            .unwrap_or_default())
    }
}
