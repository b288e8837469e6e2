//! Store-level errors

use thiserror::Error;

use crate::domain::NodeId;

/// Errors raised by a sibling store while reading or persisting nodes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("write rejected for node {node}: {reason}")]
    WriteRejected { node: NodeId, reason: String },
}

impl StoreError {
    /// Create a write rejection with a reason.
    pub fn rejected(node: NodeId, reason: impl Into<String>) -> Self {
        Self::WriteRejected {
            node,
            reason: reason.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
