//! SpatialTree implementation.

use std::collections::BTreeSet;

use crate::errors::{IndexError, IndexResult};
use crate::rectangle::Rectangle;

use super::rtree_constants::{DEFAULT_MAX_ENTRIES, MIN_MAX_ENTRIES};
use super::rtree_types::{
    ChildRef, IntegrityReport, LeafEntry, Node, NodeBounds, NodeId, NodeKind, TreeStats,
};

/// An in-memory R-Tree mapping rectangles to records of type `T`.
///
/// All nodes are owned by the tree through a flat arena; entries and parent
/// links refer to nodes by [`NodeId`]. Nodes are only ever added, so every
/// node in the arena stays reachable from the root.
///
/// # Example
///
/// ```rust
/// use poi_rtree::{Rectangle, SpatialTree};
///
/// let mut tree = SpatialTree::new(4).unwrap();
/// tree.insert(Rectangle::point(0.0, 0.0), "origin").unwrap();
/// tree.insert(Rectangle::point(5.0, 5.0), "far").unwrap();
///
/// let hits = tree.search(&Rectangle::new(-1.0, -1.0, 1.0, 1.0)).unwrap();
/// assert_eq!(hits, vec![&"origin"]);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialTree<T> {
    nodes: Vec<Node<T>>,
    root: NodeId,
    max_entries: usize,
    entry_count: usize,
    split_count: u64,
}

impl<T> Default for SpatialTree<T> {
    fn default() -> Self {
        SpatialTree {
            nodes: vec![Node::empty_leaf()],
            root: 0,
            max_entries: DEFAULT_MAX_ENTRIES,
            entry_count: 0,
            split_count: 0,
        }
    }
}

impl<T> SpatialTree<T> {
    /// Creates an empty tree whose nodes hold at most `max_entries` entries.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidConfiguration`] if `max_entries` is
    /// below 2.
    pub fn new(max_entries: usize) -> IndexResult<Self> {
        if max_entries < MIN_MAX_ENTRIES {
            return Err(IndexError::InvalidConfiguration(format!(
                "max_entries must be at least {}, got: {}",
                MIN_MAX_ENTRIES, max_entries
            )));
        }
        Ok(SpatialTree {
            max_entries,
            ..Default::default()
        })
    }

    /// The fanout limit M.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Number of nodes in the arena; valid node ids are `0..node_count()`.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels from the root down to the leaves.
    pub fn height(&self) -> u32 {
        let mut height = 1;
        let mut current = self.root;
        while let Some(first) = self.nodes[current].children().and_then(|c| c.first()) {
            height += 1;
            current = first.node;
        }
        height
    }

    /// MBR of everything stored, or `None` for an empty tree.
    pub fn bounds(&self) -> Option<Rectangle> {
        self.nodes[self.root].bounds()
    }

    /// Id of the current root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    /// Iterates over every stored `(rectangle, record)` pair, leaf by leaf.
    pub fn iter(&self) -> impl Iterator<Item = (&Rectangle, &T)> + '_ {
        self.nodes
            .iter()
            .filter_map(|node| node.entries())
            .flatten()
            .map(|entry| (&entry.bounds, &entry.record))
    }

    /// Adds `record` under `rect`.
    ///
    /// On return every ancestor rectangle on the insertion path is the tight
    /// MBR of its subtree and all leaves are still at the same depth.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidCoordinate`] if `rect` has a non-finite
    /// coordinate or a min corner above its max corner. The tree is left
    /// unchanged in that case.
    pub fn insert(&mut self, rect: Rectangle, record: T) -> IndexResult<()> {
        if !rect.is_finite() || !rect.is_valid() {
            return Err(IndexError::InvalidCoordinate(format!(
                "Cannot index {}: coordinates must be finite with min <= max",
                rect
            )));
        }

        let leaf = self.choose_leaf(&rect);
        let overflow = match &mut self.nodes[leaf].kind {
            NodeKind::Leaf { entries } => {
                entries.push(LeafEntry { bounds: rect, record });
                entries.len() > self.max_entries
            }
            NodeKind::Internal { .. } => unreachable!("choose_leaf always stops at a leaf"),
        };
        self.entry_count += 1;

        if overflow {
            self.split(leaf);
        }
        self.adjust_tree(leaf);
        Ok(())
    }

    /// Returns every record whose rectangle intersects `query`, boundaries
    /// included. Results come in traversal order.
    ///
    /// # Errors
    /// Returns [`IndexError::InvalidQuery`] if `query` is not finite or has
    /// its corners inverted.
    pub fn search(&self, query: &Rectangle) -> IndexResult<Vec<&T>> {
        if !query.is_finite() || !query.is_valid() {
            return Err(IndexError::InvalidQuery(format!(
                "Cannot search {}: coordinates must be finite with min <= max",
                query
            )));
        }

        let mut results = Vec::new();
        self.search_recursive(self.root, query, &mut results);
        Ok(results)
    }

    /// MBR of every non-empty node, walked pre-order from the root.
    pub fn node_bounds(&self) -> Vec<NodeBounds> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id];
            if let Some(bounds) = node.bounds() {
                result.push(NodeBounds {
                    depth,
                    is_leaf: node.is_leaf(),
                    bounds,
                });
            }
            if let Some(children) = node.children() {
                stack.extend(children.iter().rev().map(|c| (c.node, depth + 1)));
            }
        }
        result
    }

    /// Get comprehensive statistics
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            total_entries: self.entry_count as u64,
            node_count: self.nodes.len() as u64,
            leaf_count: self.nodes.iter().filter(|n| n.is_leaf()).count() as u64,
            height: self.height(),
            max_entries: self.max_entries,
            split_count: self.split_count,
        }
    }

    /// Walks the whole tree and verifies its structural invariants.
    ///
    /// Stored child rectangles are compared against MBRs recomputed from the
    /// leaf rectangles below them. Also checked are leaf depth, fanout,
    /// parent links and the reachable record count.
    pub fn check_integrity(&self) -> IntegrityReport {
        let mut report = IntegrityReport::new();
        let mut leaf_depths = BTreeSet::new();

        if self.nodes[self.root].parent.is_some() {
            report.fail(format!("Root node {} has a parent link", self.root));
        }

        let (reachable, _) = self.verify_subtree(self.root, 0, &mut report, &mut leaf_depths);
        report.records_reachable = reachable;

        if leaf_depths.len() > 1 {
            report.fail(format!("Leaves found at several depths: {:?}", leaf_depths));
        }
        if reachable != self.entry_count as u64 {
            report.fail(format!(
                "{} records reachable from the root but {} inserted",
                reachable, self.entry_count
            ));
        }
        report.leaf_depths = leaf_depths.into_iter().collect();
        report
    }

    /// Descend from the root choosing, at each internal node, the child
    /// needing least area enlargement; the first such child wins ties.
    fn choose_leaf(&self, rect: &Rectangle) -> NodeId {
        let mut current = self.root;

        while let NodeKind::Internal { children } = &self.nodes[current].kind {
            let mut iter = children.iter();
            let Some(first) = iter.next() else {
                return current;
            };

            let mut best = first.node;
            let mut best_enlargement = first.bounds.enlargement(rect);
            for child in iter {
                let enlargement = child.bounds.enlargement(rect);
                if enlargement < best_enlargement {
                    best_enlargement = enlargement;
                    best = child.node;
                }
            }
            current = best;
        }
        current
    }

    /// Split an overflowing node at the midpoint of its entry list and
    /// propagate the split upward until no ancestor overflows.
    fn split(&mut self, node_id: NodeId) {
        let mut current = node_id;

        loop {
            let sibling_kind = match &mut self.nodes[current].kind {
                NodeKind::Leaf { entries } => {
                    let mid = entries.len() / 2;
                    NodeKind::Leaf { entries: entries.split_off(mid) }
                }
                NodeKind::Internal { children } => {
                    let mid = children.len() / 2;
                    NodeKind::Internal { children: children.split_off(mid) }
                }
            };
            let parent = self.nodes[current].parent;
            let sibling = self.allocate(Node { parent, kind: sibling_kind });
            self.reparent_children(sibling);
            self.split_count += 1;

            log::debug!(
                "Split node {} at level {} (0 = leaf) into {} + {} entries",
                current,
                self.level(current),
                self.nodes[current].len(),
                self.nodes[sibling].len()
            );

            let current_ref = ChildRef { bounds: self.node_mbr(current), node: current };
            let sibling_ref = ChildRef { bounds: self.node_mbr(sibling), node: sibling };

            let Some(parent_id) = parent else {
                let root = self.allocate(Node {
                    parent: None,
                    kind: NodeKind::Internal { children: vec![current_ref, sibling_ref] },
                });
                self.nodes[current].parent = Some(root);
                self.nodes[sibling].parent = Some(root);
                self.root = root;
                log::debug!("Grew a new root {}, tree height is now {}", root, self.height());
                return;
            };

            let overflow = match &mut self.nodes[parent_id].kind {
                NodeKind::Internal { children } => {
                    if let Some(entry) = children.iter_mut().find(|c| c.node == current) {
                        entry.bounds = current_ref.bounds;
                    }
                    children.push(sibling_ref);
                    children.len() > self.max_entries
                }
                NodeKind::Leaf { .. } => false,
            };
            if !overflow {
                return;
            }
            current = parent_id;
        }
    }

    /// Walk from `node_id` to the root, overwriting each parent's rectangle
    /// for the node just ascended from with that node's tight MBR.
    fn adjust_tree(&mut self, node_id: NodeId) {
        let mut current = node_id;

        while let Some(parent_id) = self.nodes[current].parent {
            let bounds = self.node_mbr(current);
            if let NodeKind::Internal { children } = &mut self.nodes[parent_id].kind {
                if let Some(entry) = children.iter_mut().find(|c| c.node == current) {
                    entry.bounds = bounds;
                }
            }
            current = parent_id;
        }
    }

    fn search_recursive<'a>(&'a self, node_id: NodeId, query: &Rectangle, results: &mut Vec<&'a T>) {
        match &self.nodes[node_id].kind {
            NodeKind::Leaf { entries } => {
                for entry in entries {
                    if entry.bounds.intersects(query) {
                        results.push(&entry.record);
                    }
                }
            }
            NodeKind::Internal { children } => {
                // Only descend into children whose rectangle intersects query
                for child in children {
                    if child.bounds.intersects(query) {
                        self.search_recursive(child.node, query, results);
                    }
                }
            }
        }
    }

    /// Returns (records below, MBR recomputed from leaf rectangles).
    fn verify_subtree(
        &self,
        node_id: NodeId,
        depth: usize,
        report: &mut IntegrityReport,
        leaf_depths: &mut BTreeSet<usize>,
    ) -> (u64, Option<Rectangle>) {
        report.nodes_checked += 1;
        let node = &self.nodes[node_id];

        if node.len() > self.max_entries {
            report.fail(format!(
                "Node {} holds {} entries, more than the limit of {}",
                node_id,
                node.len(),
                self.max_entries
            ));
        }

        match &node.kind {
            NodeKind::Leaf { entries } => {
                leaf_depths.insert(depth);
                (entries.len() as u64, node.bounds())
            }
            NodeKind::Internal { children } => {
                if children.is_empty() {
                    report.fail(format!("Internal node {} has no children", node_id));
                }

                let mut count = 0;
                let mut subtree: Option<Rectangle> = None;
                for child in children {
                    if self.nodes[child.node].parent != Some(node_id) {
                        report.fail(format!(
                            "Node {} is held by {} but links to parent {:?}",
                            child.node, node_id, self.nodes[child.node].parent
                        ));
                    }

                    let (below, actual) =
                        self.verify_subtree(child.node, depth + 1, report, leaf_depths);
                    count += below;

                    if actual != Some(child.bounds) {
                        report.fail(format!(
                            "Node {} stores {} for child {} but its subtree spans {:?}",
                            node_id, child.bounds, child.node, actual
                        ));
                    }
                    if let Some(actual) = actual {
                        subtree = Some(match subtree {
                            Some(acc) => acc.union(&actual),
                            None => actual,
                        });
                    }
                }
                (count, subtree)
            }
        }
    }

    /// Height of a node above the leaves; leaves are at level 0.
    fn level(&self, node_id: NodeId) -> usize {
        let mut level = 0;
        let mut current = node_id;
        while let Some(first) = self.nodes[current].children().and_then(|c| c.first()) {
            level += 1;
            current = first.node;
        }
        level
    }

    fn allocate(&mut self, node: Node<T>) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Point the children of an internal node back at it after they were
    /// moved there by a split.
    fn reparent_children(&mut self, node_id: NodeId) {
        let child_ids: Vec<NodeId> = match self.nodes[node_id].children() {
            Some(children) => children.iter().map(|c| c.node).collect(),
            None => return,
        };
        for child in child_ids {
            self.nodes[child].parent = Some(node_id);
        }
    }

    /// Tight MBR of a node that is known to be non-empty.
    fn node_mbr(&self, node_id: NodeId) -> Rectangle {
        self.nodes[node_id].bounds().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
