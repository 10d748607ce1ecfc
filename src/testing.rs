//! Test doubles shared by the unit tests

use crate::domain::field::FieldBinding;
use crate::domain::tree::{NodeId, Page, ViewKey};
use crate::error::{Error, Result};
use crate::services::{
    CollectionItem, CollectionQuery, DisplayPreferenceGateway, JsonCollection, Notification,
    NotificationSink, PreferenceStore, read_binding, write_binding,
};
use crate::states::RequestParams;
use ahash::{AHashMap, AHashSet};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Record whose "server copy" is a second in-memory document
#[derive(Debug)]
pub struct MemoryRecord {
    key: Arc<str>,
    working: Mutex<Value>,
    stored: Mutex<Value>,
    fail_saves: AtomicBool,
    refreshes: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryRecord {
    pub fn new(key: &str, doc: Value) -> Self {
        Self {
            key: key.into(),
            working: Mutex::new(doc.clone()),
            stored: Mutex::new(doc),
            fail_saves: AtomicBool::new(false),
            refreshes: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Value {
        self.stored.lock().expect("stored").clone()
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Network calls made (refreshes plus saves)
    pub fn calls(&self) -> usize {
        self.refreshes() + self.saves()
    }
}

impl crate::services::Record for MemoryRecord {
    fn record_key(&self) -> Arc<str> {
        self.key.clone()
    }

    async fn refresh(&self) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        let stored = self.stored();
        *self.working.lock().expect("working") = stored;
        Ok(())
    }

    async fn save(&self) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Persistence {
                message: "rejected".into(),
            });
        }
        let working = self.working.lock().expect("working").clone();
        *self.stored.lock().expect("stored") = working;
        Ok(())
    }

    fn attr(&self, binding: &FieldBinding) -> Value {
        read_binding(&self.working.lock().expect("working"), binding)
    }

    fn set_attr(&self, binding: &FieldBinding, value: Value) {
        write_binding(&mut self.working.lock().expect("working"), binding, value);
    }
}

/// Sink remembering every notification
#[derive(Debug, Default)]
pub struct RecordingSink {
    received: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn received(&self) -> Vec<Notification> {
        self.received.lock().expect("received").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.received.lock().expect("received").push(notification);
    }
}

/// Preference store kept in memory, recording toggles
#[derive(Clone, Debug, Default)]
pub struct MemoryPreferences {
    views: Arc<Mutex<AHashMap<String, AHashSet<NodeId>>>>,
    toggles: Arc<Mutex<Vec<(NodeId, bool)>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryPreferences {
    pub fn with_expanded(view: &ViewKey, nodes: &[&str]) -> Self {
        let prefs = Self::default();
        prefs
            .views
            .lock()
            .expect("views")
            .insert(view.to_string(), nodes.iter().map(|n| NodeId::from(*n)).collect());
        prefs
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn toggles(&self) -> Vec<(NodeId, bool)> {
        self.toggles.lock().expect("toggles").clone()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn expanded_nodes(&self, view: &ViewKey) -> AHashSet<NodeId> {
        self.views
            .lock()
            .expect("views")
            .get(&view.to_string())
            .cloned()
            .unwrap_or_default()
    }

    fn set_node_expanded(&mut self, view: &ViewKey, node: &NodeId, expanded: bool) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Preferences {
                message: "write rejected".into(),
            });
        }
        let mut views = self.views.lock().expect("views");
        let nodes = views.entry(view.to_string()).or_default();
        if expanded {
            nodes.insert(node.clone());
        } else {
            nodes.remove(node);
        }
        self.toggles.lock().expect("toggles").push((node.clone(), expanded));
        Ok(())
    }
}

/// Gateway handing out a fixed store, or failing when it has none
#[derive(Debug, Default)]
pub struct MemoryGateway {
    store: Option<MemoryPreferences>,
}

impl MemoryGateway {
    pub fn new(store: MemoryPreferences) -> Self {
        Self { store: Some(store) }
    }

    pub fn failing() -> Self {
        Self { store: None }
    }
}

impl DisplayPreferenceGateway for MemoryGateway {
    type Store = MemoryPreferences;

    async fn get_singleton(&self) -> Result<MemoryPreferences> {
        self.store.clone().ok_or_else(|| Error::Preferences {
            message: "preference service unavailable".into(),
        })
    }
}

#[derive(Debug, Default)]
struct QueryLog {
    pages: Vec<RequestParams>,
    children: Vec<NodeId>,
}

/// Collection query over fixed items, logging calls and optionally failing
#[derive(Clone, Debug, Default)]
pub struct ScriptedQuery {
    collection: JsonCollection,
    log: Arc<Mutex<QueryLog>>,
    fail: Arc<AtomicBool>,
}

impl ScriptedQuery {
    pub fn new(items: Vec<CollectionItem>) -> Self {
        Self {
            collection: JsonCollection::new(items),
            ..Self::default()
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn page_calls(&self) -> Vec<RequestParams> {
        self.log.lock().expect("log").pages.clone()
    }

    pub fn child_calls(&self) -> Vec<NodeId> {
        self.log.lock().expect("log").children.clone()
    }
}

impl CollectionQuery for ScriptedQuery {
    type Item = CollectionItem;

    async fn find_all(&self, params: &RequestParams) -> Result<Page<CollectionItem>> {
        self.log.lock().expect("log").pages.push(params.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Fetch {
                message: "service unavailable".into(),
            });
        }
        self.collection.find_all(params).await
    }

    async fn find_children(&self, parent: &NodeId) -> Result<Vec<CollectionItem>> {
        self.log.lock().expect("log").children.push(parent.clone());
        self.collection.find_children(parent).await
    }
}
