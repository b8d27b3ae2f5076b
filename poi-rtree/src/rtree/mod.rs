//! In-memory R-Tree over rectangle-keyed records.
//!
//! This module provides the index structure itself:
//! - Nodes live in an arena owned by the tree and refer to each other by
//!   index, so parent links never take part in ownership
//! - Insertion descends by least area enlargement, splits overflowing nodes
//!   at the midpoint of their entry list, and repairs bounding rectangles on
//!   the way back up
//! - Search prunes every subtree whose bounding rectangle misses the query

pub mod rtree_constants;
pub mod rtree_types;
mod rtree_impl;

pub use rtree_constants::{DEFAULT_MAX_ENTRIES, MIN_MAX_ENTRIES};
pub use rtree_impl::SpatialTree;
pub use rtree_types::{
    ChildRef, IntegrityReport, LeafEntry, Node, NodeBounds, NodeId, NodeKind, TreeStats,
};
