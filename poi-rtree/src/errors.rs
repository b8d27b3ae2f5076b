//! Error types for index construction, insertion and queries.

use thiserror::Error;

/// Errors that can occur while building or querying the index.
///
/// Empty results are never an error: searching an empty tree, or a region
/// with nothing in it, returns an empty `Vec`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// A coordinate or rectangle offered for insertion is non-finite,
    /// out of range, or has its min/max corners inverted.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// The index was configured with settings it cannot operate under,
    /// such as a fanout limit below two.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A query was issued with malformed parameters.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
