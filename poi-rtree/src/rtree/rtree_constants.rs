//! Constants for the in-memory R-Tree.

/// Default maximum number of entries per node (fanout limit M)
pub const DEFAULT_MAX_ENTRIES: usize = 32;

/// Smallest fanout limit under which a split still yields two non-empty nodes
pub const MIN_MAX_ENTRIES: usize = 2;

/// Number of inserted records between two build progress log lines
pub const BUILD_PROGRESS_INTERVAL: usize = 1000;
