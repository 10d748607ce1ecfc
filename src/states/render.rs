//! Tree Rendering
//!
//! The renderer boundary, the identity-keyed enqueue step in front of it, and
//! an in-memory tree model implementing the boundary.

use crate::domain::tree::{NodeId, TreeItem};
use ahash::{AHashMap, AHashSet};
use hashlink::LinkedHashMap;

/// Display side of a tree view
pub trait TreeRenderer<T> {
    /// Add a node under `parent` (or at the root)
    fn insert(&mut self, parent: Option<&NodeId>, item: &T);

    /// Refresh an already rendered node in place, keeping its expansion
    fn update(&mut self, item: &T);

    /// Show a node expanded or collapsed
    fn set_expanded(&mut self, node: &NodeId, expanded: bool);

    /// Drop every node
    fn clear(&mut self);
}

/// Result of one enqueue batch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnqueueReport {
    /// Nodes that were new, in batch order
    pub inserted: Vec<NodeId>,
    /// Nodes that were already rendered and got updated
    pub updated: usize,
}

/// Identity index of rendered nodes
///
/// Re-enqueueing a node never renders it twice.
#[derive(Debug, Default)]
pub struct RenderQueue {
    rendered: AHashSet<NodeId>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue<T, R>(&mut self, renderer: &mut R, parent: Option<&NodeId>, items: &[T]) -> EnqueueReport
    where
        T: TreeItem,
        R: TreeRenderer<T> + ?Sized,
    {
        let mut report = EnqueueReport::default();

        for item in items {
            let id = item.node_id();
            if self.rendered.insert(id.clone()) {
                renderer.insert(parent, item);
                report.inserted.push(id);
            } else {
                renderer.update(item);
                report.updated += 1;
            }
        }

        report
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.rendered.contains(node)
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    /// Forget every node (the renderer is cleared alongside)
    pub fn reset(&mut self) {
        self.rendered.clear();
    }
}

/// A rendered node of a [`TreeModel`]
#[derive(Clone, Debug)]
pub struct RenderedNode<T> {
    pub item: T,
    pub parent: Option<NodeId>,
    pub expanded: bool,
}

/// In-memory tree renderer
#[derive(Clone, Debug)]
pub struct TreeModel<T> {
    nodes: LinkedHashMap<NodeId, RenderedNode<T>>,
    roots: Vec<NodeId>,
    children: AHashMap<NodeId, Vec<NodeId>>,
}

impl<T> Default for TreeModel<T> {
    fn default() -> Self {
        Self {
            nodes: LinkedHashMap::new(),
            roots: Vec::new(),
            children: AHashMap::new(),
        }
    }
}

impl<T: TreeItem> TreeModel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, node: &NodeId) -> Option<&RenderedNode<T>> {
        self.nodes.get(node)
    }

    pub fn is_expanded(&self, node: &NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.expanded)
    }

    /// Every node in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &RenderedNode<T>)> {
        self.nodes.iter()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, node: &NodeId) -> &[NodeId] {
        self.children.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Text outline of the visible tree (children of collapsed nodes hidden)
    pub fn outline(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.outline_node(root, 0, &mut lines);
        }
        lines
    }

    fn outline_node(&self, id: &NodeId, depth: usize, lines: &mut Vec<String>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };

        let marker = if node.expanded { '▾' } else { '▸' };
        lines.push(format!("{}{} {}", "  ".repeat(depth), marker, node.item.title()));

        if node.expanded {
            for child in self.children(id) {
                self.outline_node(child, depth + 1, lines);
            }
        }
    }
}

impl<T: TreeItem> TreeRenderer<T> for TreeModel<T> {
    fn insert(&mut self, parent: Option<&NodeId>, item: &T) {
        let id = item.node_id();
        if self.nodes.contains_key(&id) {
            self.update(item);
            return;
        }

        match parent {
            Some(parent) => self.children.entry(parent.clone()).or_default().push(id.clone()),
            None => self.roots.push(id.clone()),
        }

        self.nodes.insert(
            id,
            RenderedNode {
                item: item.clone(),
                parent: parent.cloned(),
                expanded: false,
            },
        );
    }

    fn update(&mut self, item: &T) {
        if let Some(node) = self.nodes.get_mut(&item.node_id()) {
            node.item = item.clone();
        }
    }

    fn set_expanded(&mut self, node: &NodeId, expanded: bool) {
        if let Some(node) = self.nodes.get_mut(node) {
            node.expanded = expanded;
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.children.clear();
    }
}
