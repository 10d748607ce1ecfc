//! Tree View Controller
//!
//! Drives one paged tree view: resolves the user's expansion preferences,
//! fetches pages through the collection query, discards stale responses and
//! feeds the rest to the renderer without duplicating nodes.
//!
//! ## Flow
//!
//! ```text
//! init ──► preferences.get_singleton() ──► PagingState { current: 1 }
//!                                              │
//!  set_page / set_search ─────────────────────►│
//!                                              ▼
//!                     begin_fetch() ──► query.find_all(params)
//!                                              │
//!                     complete_fetch() ◄───────┘
//!                        │  stale ──► dropped
//!                        ▼
//!                  RenderQueue ──► TreeRenderer ──► children of expanded nodes
//! ```

use crate::domain::config::TreeViewConfig;
use crate::domain::tree::{NodeId, Page, ViewKey};
use crate::error::Result;
use crate::services::{CollectionQuery, DisplayPreferenceGateway, PreferenceStore};
use crate::states::fetch_queue::{FetchOutcome, FetchQueue, FetchTicket};
use crate::states::paging::{PagingState, RequestParams, build_request_params};
use crate::states::render::{RenderQueue, TreeRenderer};
use ahash::AHashSet;
use futures::future::join_all;
use std::sync::Arc;

/// Load state of the tree view
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TreeLoadState {
    /// No fetch issued yet
    #[default]
    Idle,
    /// Fetch in progress
    Loading,
    /// Latest fetch applied
    Loaded,
    /// Latest fetch failed
    Error(Arc<str>),
}

/// What a completed fetch did to the view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStatus {
    Applied {
        inserted: usize,
        updated: usize,
        total: u64,
    },
    Stale,
}

pub struct TreeViewController<Q, R, P>
where
    Q: CollectionQuery,
{
    view: ViewKey,
    query: Q,
    renderer: R,
    preferences: P,
    expanded: AHashSet<NodeId>,
    children_loaded: AHashSet<NodeId>,
    paging: PagingState,
    fetches: FetchQueue,
    rendered: RenderQueue,
    load_state: TreeLoadState,
}

impl<Q, R, P> TreeViewController<Q, R, P>
where
    Q: CollectionQuery,
    R: TreeRenderer<Q::Item>,
    P: PreferenceStore,
{
    /// Resolve preferences and set up the view; no fetch is issued yet
    ///
    /// Fails when the preference store cannot be resolved.
    pub async fn init<G>(gateway: &G, config: &TreeViewConfig, query: Q, renderer: R) -> Result<Self>
    where
        G: DisplayPreferenceGateway<Store = P>,
    {
        let view = config.view_key();

        let preferences = match gateway.get_singleton().await {
            Ok(preferences) => preferences,
            Err(e) => {
                tracing::warn!("Tree view {} unavailable: {}", view, e);
                return Err(e);
            }
        };

        let expanded = preferences.expanded_nodes(&view);
        tracing::info!("Tree view {} ready ({} expanded nodes)", view, expanded.len());

        Ok(Self {
            view,
            query,
            renderer,
            preferences,
            expanded,
            children_loaded: AHashSet::new(),
            paging: PagingState::new(config.page_size),
            fetches: FetchQueue::new(),
            rendered: RenderQueue::new(),
            load_state: TreeLoadState::Idle,
        })
    }

    // ==================== Getters ====================

    pub fn view(&self) -> &ViewKey {
        &self.view
    }

    pub fn paging(&self) -> &PagingState {
        &self.paging
    }

    pub fn load_state(&self) -> &TreeLoadState {
        &self.load_state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Whether the latest page fetch is still waiting for its response
    pub fn is_fetching(&self) -> bool {
        self.fetches.is_pending()
    }

    pub fn is_expanded(&self, node: &NodeId) -> bool {
        self.expanded.contains(node)
    }

    /// Expanded nodes, sorted
    pub fn expanded_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<_> = self.expanded.iter().cloned().collect();
        nodes.sort();
        nodes
    }

    pub fn build_request_params(&self) -> RequestParams {
        build_request_params(&self.paging)
    }

    // ==================== Paging ====================

    pub fn set_page(&mut self, page: u32) {
        self.paging.set_page(page);
    }

    pub fn next_page(&mut self) -> bool {
        self.paging.next_page()
    }

    pub fn previous_page(&mut self) -> bool {
        self.paging.previous_page()
    }

    /// Change the search term; a new term starts a fresh tree at page 1
    pub fn set_search(&mut self, search: Option<String>) -> bool {
        if !self.paging.set_search(search) {
            return false;
        }

        tracing::debug!("Search of {} now {:?}", self.view, self.paging.search_value());
        self.renderer.clear();
        self.rendered.reset();
        self.children_loaded.clear();
        true
    }

    // ==================== Fetching ====================

    /// Issue a fetch for the current cursor, superseding any outstanding one
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.load_state = TreeLoadState::Loading;
        self.fetches.issue(&self.paging)
    }

    /// Apply the response to `ticket`
    ///
    /// Stale responses change nothing. A failure of the current fetch leaves
    /// the cursor as it was and is returned for the caller to retry.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, response: Result<Page<Q::Item>>) -> Result<FetchStatus> {
        match self.fetches.accept(ticket, response, &mut self.paging) {
            FetchOutcome::Stale { .. } => Ok(FetchStatus::Stale),
            FetchOutcome::Failed { error } => {
                self.load_state = TreeLoadState::Error(error.to_string().into());
                Err(error)
            }
            FetchOutcome::Applied { items, total } => {
                let report = self.rendered.enqueue(&mut self.renderer, None, &items);
                self.restore_expansion(&report.inserted);
                self.load_state = TreeLoadState::Loaded;

                tracing::debug!(
                    "Fetch {} applied: {} new, {} updated, {} total",
                    ticket.generation(),
                    report.inserted.len(),
                    report.updated,
                    total
                );

                Ok(FetchStatus::Applied {
                    inserted: report.inserted.len(),
                    updated: report.updated,
                    total,
                })
            }
        }
    }

    /// Fetch the current page, then the children of expanded nodes
    pub async fn find(&mut self) -> Result<FetchStatus> {
        let ticket = self.begin_fetch();
        let response = self.query.find_all(ticket.params()).await;
        let status = self.complete_fetch(&ticket, response)?;

        if matches!(status, FetchStatus::Applied { .. }) {
            if let Err(e) = self.load_expanded_children().await {
                tracing::warn!("Loading children in {} failed: {}", self.view, e);
            }
        }

        Ok(status)
    }

    /// Fetch children of every rendered expanded node not loaded yet
    ///
    /// Runs level by level until no new expanded node appears. Returns the
    /// number of nodes inserted; on failure the nodes loaded so far stay.
    pub async fn load_expanded_children(&mut self) -> Result<usize> {
        let mut inserted = 0;

        loop {
            let mut targets: Vec<NodeId> = self
                .expanded
                .iter()
                .filter(|id| self.rendered.contains(id) && !self.children_loaded.contains(*id))
                .cloned()
                .collect();
            if targets.is_empty() {
                return Ok(inserted);
            }
            targets.sort();

            let query = &self.query;
            let results = join_all(targets.iter().map(|id| query.find_children(id))).await;

            let mut first_error = None;
            for (parent, result) in targets.into_iter().zip(results) {
                match result {
                    Ok(children) => {
                        let report = self.rendered.enqueue(&mut self.renderer, Some(&parent), &children);
                        self.restore_expansion(&report.inserted);
                        inserted += report.inserted.len();
                        self.children_loaded.insert(parent);
                    }
                    Err(e) => {
                        tracing::warn!("Children of {} failed to load: {}", parent, e);
                        first_error.get_or_insert(e);
                    }
                }
            }

            if let Some(e) = first_error {
                return Err(e);
            }
        }
    }

    /// Expand or collapse a node, remembering the choice
    ///
    /// Expanding loads the node's children the first time.
    pub async fn toggle_expanded(&mut self, node: &NodeId, expanded: bool) -> Result<usize> {
        self.preferences.set_node_expanded(&self.view, node, expanded)?;

        if expanded {
            self.expanded.insert(node.clone());
        } else {
            self.expanded.remove(node);
        }
        self.renderer.set_expanded(node, expanded);

        if !expanded {
            return Ok(0);
        }
        self.load_expanded_children().await
    }

    fn restore_expansion(&mut self, inserted: &[NodeId]) {
        for id in inserted {
            if self.expanded.contains(id) {
                self.renderer.set_expanded(id, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::CollectionItem;
    use crate::states::render::TreeModel;
    use crate::testing::{MemoryGateway, MemoryPreferences, ScriptedQuery};

    type Controller = TreeViewController<ScriptedQuery, TreeModel<CollectionItem>, MemoryPreferences>;

    fn config(page_size: u32) -> TreeViewConfig {
        TreeViewConfig {
            view: "Program".into(),
            context: "audit".into(),
            page_size,
        }
    }

    fn items() -> Vec<CollectionItem> {
        vec![
            CollectionItem::new("1", "Access Control").with_children(vec![
                CollectionItem::new("1.1", "Password policy")
                    .with_children(vec![CollectionItem::new("1.1.1", "Rotation")]),
            ]),
            CollectionItem::new("2", "Backup")
                .with_children(vec![CollectionItem::new("2.1", "Offsite copies")]),
            CollectionItem::new("3", "Change management"),
            CollectionItem::new("4", "Data retention"),
            CollectionItem::new("5", "Encryption"),
        ]
    }

    async fn controller(query: ScriptedQuery, prefs: MemoryPreferences, page_size: u32) -> Controller {
        TreeViewController::init(&MemoryGateway::new(prefs), &config(page_size), query, TreeModel::new())
            .await
            .expect("init")
    }

    fn page_of(ids: &[&str], total: u64) -> Result<Page<CollectionItem>> {
        Ok(Page::new(
            ids.iter().map(|id| CollectionItem::new(*id, format!("Item {id}"))).collect(),
            total,
        ))
    }

    #[tokio::test]
    async fn preference_failure_aborts_init_without_fetching() {
        let query = ScriptedQuery::new(items());
        let result: Result<Controller> = TreeViewController::init(
            &MemoryGateway::failing(),
            &config(10),
            query.clone(),
            TreeModel::new(),
        )
        .await;

        assert!(matches!(result, Err(Error::Preferences { .. })));
        assert!(query.page_calls().is_empty());
    }

    #[tokio::test]
    async fn first_find_renders_page_and_total() {
        let query = ScriptedQuery::new(items());
        let mut tree = controller(query.clone(), MemoryPreferences::default(), 2).await;
        assert_eq!(tree.load_state(), &TreeLoadState::Idle);

        let status = tree.find().await.expect("find");

        assert_eq!(
            status,
            FetchStatus::Applied {
                inserted: 2,
                updated: 0,
                total: 5
            }
        );
        assert_eq!(tree.load_state(), &TreeLoadState::Loaded);
        assert_eq!(tree.paging().total(), Some(5));
        assert_eq!(tree.paging().total_pages(), Some(3));
        assert_eq!(tree.renderer().outline(), vec!["▸ Access Control", "▸ Backup"]);
        assert_eq!(query.page_calls()[0].page, 1);
        assert_eq!(query.page_calls()[0].page_size, 2);
    }

    #[tokio::test]
    async fn late_superseded_response_is_discarded() {
        let mut tree = controller(ScriptedQuery::new(items()), MemoryPreferences::default(), 10).await;

        let a = tree.begin_fetch();
        tree.set_search(Some("backup".into()));
        let b = tree.begin_fetch();
        assert_eq!(b.params().search_value.as_deref(), Some("backup"));

        let status_b = tree.complete_fetch(&b, page_of(&["2"], 1)).expect("b");
        let status_a = tree.complete_fetch(&a, page_of(&["1", "2", "3"], 5)).expect("a");

        assert!(matches!(status_b, FetchStatus::Applied { total: 1, .. }));
        assert_eq!(status_a, FetchStatus::Stale);
        assert!(!tree.is_fetching());
        assert_eq!(tree.paging().total(), Some(1));
        assert_eq!(tree.renderer().len(), 1);
        assert_eq!(tree.load_state(), &TreeLoadState::Loaded);
    }

    #[tokio::test]
    async fn fetching_tracks_only_the_latest_ticket() {
        let mut tree = controller(ScriptedQuery::new(items()), MemoryPreferences::default(), 10).await;
        assert!(!tree.is_fetching());

        let a = tree.begin_fetch();
        let b = tree.begin_fetch();
        assert!(tree.is_fetching());

        assert_eq!(tree.complete_fetch(&a, page_of(&["1"], 1)).expect("a"), FetchStatus::Stale);
        assert!(tree.is_fetching(), "b is still outstanding");
        assert_eq!(tree.load_state(), &TreeLoadState::Loading);

        let failed = tree.complete_fetch(&b, Err(Error::Fetch { message: "503".into() }));
        assert!(failed.is_err());
        assert!(!tree.is_fetching());
        assert_eq!(tree.load_state(), &TreeLoadState::Error("Fetch failed: 503".into()));
    }

    #[tokio::test]
    async fn overlapping_pages_never_duplicate_nodes() {
        let mut tree = controller(ScriptedQuery::new(items()), MemoryPreferences::default(), 2).await;

        tree.find().await.expect("page 1");
        assert!(tree.next_page());
        tree.find().await.expect("page 2");
        tree.set_page(1);
        let again = tree.find().await.expect("page 1 again");

        assert_eq!(
            again,
            FetchStatus::Applied {
                inserted: 0,
                updated: 2,
                total: 5
            }
        );
        assert_eq!(tree.renderer().len(), 4);
        assert_eq!(tree.renderer().roots().len(), 4);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_cursor_and_reports_error() {
        let query = ScriptedQuery::new(items());
        let mut tree = controller(query.clone(), MemoryPreferences::default(), 2).await;
        tree.find().await.expect("page 1");

        query.fail(true);
        tree.next_page();
        let result = tree.find().await;

        assert!(matches!(result, Err(Error::Fetch { .. })));
        assert!(matches!(tree.load_state(), TreeLoadState::Error(_)));
        assert_eq!(tree.paging().current(), 2);
        assert_eq!(tree.paging().total(), Some(5));
        assert_eq!(tree.renderer().len(), 2);

        query.fail(false);
        tree.find().await.expect("retry");
        assert_eq!(tree.load_state(), &TreeLoadState::Loaded);
        assert_eq!(tree.renderer().len(), 4);
    }

    #[tokio::test]
    async fn remembered_expansion_loads_children_eagerly() {
        let view = ViewKey::new("Program", "audit");
        let prefs = MemoryPreferences::with_expanded(&view, &["1", "1.1"]);
        let query = ScriptedQuery::new(items());
        let mut tree = controller(query.clone(), prefs, 10).await;

        tree.find().await.expect("find");

        assert_eq!(
            tree.renderer().outline()[..4],
            [
                "▾ Access Control",
                "  ▾ Password policy",
                "    ▸ Rotation",
                "▸ Backup",
            ]
        );
        assert_eq!(query.child_calls(), vec![NodeId::from("1"), NodeId::from("1.1")]);

        tree.find().await.expect("refetch");
        assert_eq!(query.child_calls().len(), 2, "children are loaded once");
    }

    #[tokio::test]
    async fn toggling_persists_and_loads_children_once() {
        let prefs = MemoryPreferences::default();
        let query = ScriptedQuery::new(items());
        let mut tree = controller(query.clone(), prefs.clone(), 10).await;
        tree.find().await.expect("find");

        let backup = NodeId::from("2");
        assert_eq!(tree.toggle_expanded(&backup, true).await.expect("expand"), 1);
        assert!(tree.renderer().is_expanded(&backup));

        tree.toggle_expanded(&backup, false).await.expect("collapse");
        assert!(!tree.renderer().is_expanded(&backup));
        tree.toggle_expanded(&backup, true).await.expect("expand again");

        assert_eq!(query.child_calls(), vec![backup.clone()]);
        assert_eq!(
            prefs.toggles(),
            vec![(backup.clone(), true), (backup.clone(), false), (backup, true)]
        );
        assert_eq!(tree.expanded_nodes(), vec![NodeId::from("2")]);
    }

    #[tokio::test]
    async fn rejected_toggle_leaves_view_and_store_in_agreement() {
        let view = ViewKey::new("Program", "audit");
        let prefs = MemoryPreferences::default();
        let query = ScriptedQuery::new(items());
        let mut tree = controller(query.clone(), prefs.clone(), 10).await;
        tree.find().await.expect("find");
        let backup = NodeId::from("2");

        prefs.fail_writes(true);
        let result = tree.toggle_expanded(&backup, true).await;

        assert!(matches!(result, Err(Error::Preferences { .. })));
        assert!(!tree.is_expanded(&backup));
        assert!(!tree.renderer().is_expanded(&backup));
        assert!(prefs.expanded_nodes(&view).is_empty());
        assert!(query.child_calls().is_empty());

        prefs.fail_writes(false);
        tree.toggle_expanded(&backup, true).await.expect("retry");
        assert!(tree.renderer().is_expanded(&backup));
        assert!(prefs.expanded_nodes(&view).contains(&backup));
    }

    #[tokio::test]
    async fn new_search_starts_a_fresh_tree() {
        let mut tree = controller(ScriptedQuery::new(items()), MemoryPreferences::default(), 2).await;
        tree.find().await.expect("page 1");
        tree.next_page();

        assert!(tree.set_search(Some("encryption".into())));
        assert_eq!(tree.paging().current(), 1);
        assert!(tree.renderer().is_empty());

        tree.find().await.expect("search");
        assert_eq!(tree.renderer().outline(), vec!["▸ Encryption"]);
        assert!(!tree.set_search(Some("encryption".into())));
    }
}
