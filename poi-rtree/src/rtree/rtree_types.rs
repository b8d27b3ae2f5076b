//! Core types and data structures for the R-Tree.
//!
//! This module defines:
//! - Node types (leaf and internal) and their entries
//! - Statistics structures
//! - The integrity report produced by tree validation

use crate::rectangle::Rectangle;

/// Index of a node inside the tree's node arena
pub type NodeId = usize;

// ============================================================================
// Node Types
// ============================================================================

/// An entry in a leaf node
#[derive(Debug, Clone)]
pub struct LeafEntry<T> {
    pub bounds: Rectangle,
    pub record: T,
}

/// A child reference in an internal node
///
/// `bounds` is the tight MBR of the child's whole subtree once an insertion
/// has returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildRef {
    pub bounds: Rectangle,
    pub node: NodeId,
}

/// Payload of a node. A leaf can only hold records and an internal node can
/// only hold child references.
#[derive(Debug, Clone)]
pub enum NodeKind<T> {
    /// Leaf node containing actual records
    Leaf { entries: Vec<LeafEntry<T>> },
    /// Internal node containing child references
    Internal { children: Vec<ChildRef> },
}

/// A node of the R-Tree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// Non-owning link to the node holding this one; `None` for the root
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind<T>,
}

impl<T> Node<T> {
    pub(crate) fn empty_leaf() -> Self {
        Node {
            parent: None,
            kind: NodeKind::Leaf { entries: Vec::new() },
        }
    }

    /// The node that holds this one, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Leaf entries, or `None` for an internal node.
    pub fn entries(&self) -> Option<&[LeafEntry<T>]> {
        match &self.kind {
            NodeKind::Leaf { entries } => Some(entries),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Child references, or `None` for a leaf.
    pub fn children(&self) -> Option<&[ChildRef]> {
        match &self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Internal { children } => Some(children),
        }
    }

    /// Get the bounding rectangle enclosing all children/entries
    pub fn bounds(&self) -> Option<Rectangle> {
        match &self.kind {
            NodeKind::Leaf { entries } => Rectangle::union_all(entries.iter().map(|e| &e.bounds)),
            NodeKind::Internal { children } => {
                Rectangle::union_all(children.iter().map(|c| &c.bounds))
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { entries } => entries.len(),
            NodeKind::Internal { children } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Introspection
// ============================================================================

/// Bounding rectangle of one node, as reported by
/// [`SpatialTree::node_bounds`](crate::SpatialTree::node_bounds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBounds {
    /// Distance from the root; the root is at depth 0
    pub depth: usize,
    pub is_leaf: bool,
    pub bounds: Rectangle,
}

/// Statistics about the R-Tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub total_entries: u64,
    pub node_count: u64,
    pub leaf_count: u64,
    /// Number of levels; a tree whose root is a leaf has height 1
    pub height: u32,
    pub max_entries: usize,
    /// Node splits performed since the tree was created
    pub split_count: u64,
}

/// Result of a structural validation pass over the tree
#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub nodes_checked: u64,
    /// Distinct depths at which leaves were found; a balanced tree has one
    pub leaf_depths: Vec<usize>,
    pub records_reachable: u64,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.is_valid = false;
        self.errors.push(message);
    }
}
