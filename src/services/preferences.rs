//! Display Preferences
//!
//! Per-user, per-view memory of which tree nodes are expanded. The tree view
//! resolves the store once before its first fetch.

use crate::domain::tree::{NodeId, ViewKey};
use crate::error::{Error, Result};
use crate::utils::config_store::save_json;
use ahash::AHashSet;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Expanded-node sets keyed by view
pub trait PreferenceStore {
    /// Nodes the user left expanded in `view`
    fn expanded_nodes(&self, view: &ViewKey) -> AHashSet<NodeId>;

    /// Record an expand/collapse toggle
    fn set_node_expanded(&mut self, view: &ViewKey, node: &NodeId, expanded: bool) -> Result<()>;
}

/// Async accessor for the shared preference store
pub trait DisplayPreferenceGateway {
    type Store: PreferenceStore;

    fn get_singleton(&self) -> impl Future<Output = Result<Self::Store>>;
}

type ViewMap = BTreeMap<String, BTreeSet<NodeId>>;

#[derive(Debug)]
struct FilePreferencesInner {
    path: PathBuf,
    views: ViewMap,
}

/// Preference store persisted as a JSON map `"view/context" -> [node ids]`
///
/// Clones share the same underlying store.
#[derive(Clone, Debug)]
pub struct FilePreferences {
    inner: Arc<Mutex<FilePreferencesInner>>,
}

impl FilePreferences {
    /// Load the store; a missing file is an empty store
    pub async fn load(path: PathBuf) -> Result<Self> {
        let views: ViewMap = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => ViewMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| Error::Preferences {
                message: format!("{}: {e}", path.display()),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ViewMap::new(),
            Err(e) => {
                return Err(Error::Preferences {
                    message: format!("{}: {e}", path.display()),
                });
            }
        };

        tracing::debug!("Loaded display preferences for {} views", views.len());

        Ok(Self {
            inner: Arc::new(Mutex::new(FilePreferencesInner { path, views })),
        })
    }
}

impl PreferenceStore for FilePreferences {
    fn expanded_nodes(&self, view: &ViewKey) -> AHashSet<NodeId> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .views
            .get(&view.to_string())
            .map(|nodes| nodes.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn set_node_expanded(&mut self, view: &ViewKey, node: &NodeId, expanded: bool) -> Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let key = view.to_string();
        let previous = inner.views.get(&key).cloned();

        let changed = if expanded {
            inner.views.entry(key.clone()).or_default().insert(node.clone())
        } else {
            inner
                .views
                .get_mut(&key)
                .is_some_and(|nodes| nodes.remove(node))
        };

        if inner.views.get(&key).is_some_and(BTreeSet::is_empty) {
            inner.views.remove(&key);
        }

        if !changed {
            return Ok(());
        }

        if let Err(e) = save_json(&inner.path, &inner.views) {
            tracing::warn!("Could not write display preferences for {}: {}", key, e);
            match previous {
                Some(nodes) => inner.views.insert(key, nodes),
                None => inner.views.remove(&key),
            };
            return Err(Error::Preferences {
                message: e.to_string(),
            });
        }

        Ok(())
    }
}

/// Gateway resolving a single shared [`FilePreferences`] per file
#[derive(Debug)]
pub struct FilePreferenceGateway {
    path: PathBuf,
    store: OnceCell<FilePreferences>,
}

impl FilePreferenceGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store: OnceCell::new(),
        }
    }
}

impl DisplayPreferenceGateway for FilePreferenceGateway {
    type Store = FilePreferences;

    async fn get_singleton(&self) -> Result<FilePreferences> {
        let store = self
            .store
            .get_or_try_init(|| FilePreferences::load(self.path.clone()))
            .await?;
        Ok(store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewKey {
        ViewKey::new("Control", "audit-1")
    }

    #[tokio::test]
    async fn missing_file_is_empty_and_toggles_persist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        let gateway = FilePreferenceGateway::new(&path);

        let mut store = gateway.get_singleton().await.expect("store");
        assert!(store.expanded_nodes(&view()).is_empty());

        store
            .set_node_expanded(&view(), &NodeId::from("12"), true)
            .expect("expand");
        store
            .set_node_expanded(&view(), &NodeId::from("13"), true)
            .expect("expand");
        store
            .set_node_expanded(&view(), &NodeId::from("13"), false)
            .expect("collapse");

        let reloaded = FilePreferences::load(path.clone()).await.expect("reload");
        let expanded = reloaded.expanded_nodes(&view());
        assert_eq!(expanded.len(), 1);
        assert!(expanded.contains(&NodeId::from("12")));

        let raw = std::fs::read_to_string(&path).expect("read");
        assert!(raw.contains("Control/audit-1"));
    }

    #[tokio::test]
    async fn singleton_is_shared() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gateway = FilePreferenceGateway::new(dir.path().join("prefs.json"));

        let mut first = gateway.get_singleton().await.expect("store");
        first
            .set_node_expanded(&view(), &NodeId::from("1"), true)
            .expect("expand");

        let second = gateway.get_singleton().await.expect("store");
        assert!(second.expanded_nodes(&view()).contains(&NodeId::from("1")));
    }

    #[tokio::test]
    async fn failed_write_is_undone_so_retry_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        let mut store = FilePreferences::load(path.clone()).await.expect("store");
        let node = NodeId::from("1");

        std::fs::create_dir(&path).expect("block the file path");
        let first = store.set_node_expanded(&view(), &node, true);
        assert!(matches!(first, Err(Error::Preferences { .. })));
        assert!(store.expanded_nodes(&view()).is_empty());

        std::fs::remove_dir(&path).expect("unblock");
        store.set_node_expanded(&view(), &node, true).expect("retry");

        let reloaded = FilePreferences::load(path).await.expect("reload");
        assert!(reloaded.expanded_nodes(&view()).contains(&node));
    }

    #[tokio::test]
    async fn corrupt_file_fails_resolution() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{not json").expect("write");

        let result = FilePreferenceGateway::new(path).get_singleton().await;
        assert!(matches!(result, Err(Error::Preferences { .. })));
    }
}
