//! Application-level errors (wraps domain and store errors)

use std::fmt;

use thiserror::Error;

use crate::domain::{DomainError, GroupKey, NodeId, RelocationPhase};
use crate::infrastructure::StoreError;

/// Which engine step issued a failed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Relocation(RelocationPhase),
    DefaultPosition,
    Repair,
    Destroy,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStage::Relocation(phase) => write!(f, "{}", phase),
            WriteStage::DefaultPosition => write!(f, "default-position"),
            WriteStage::Repair => write!(f, "repair"),
            WriteStage::Destroy => write!(f, "destroy"),
        }
    }
}

/// Errors raised by ordering queries and relocations.
///
/// Writes already persisted before a `PersistFailure` are not rolled back;
/// `OrderingEngine::repair_group` restores density afterwards.
#[derive(Error, Debug)]
pub enum OrderingError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("persist failed during {stage} for node {node}: {source}")]
    PersistFailure {
        stage: WriteStage,
        node: NodeId,
        #[source]
        source: StoreError,
    },

    #[error("invalid target {target} for node {node}: {reason}")]
    InvalidTarget {
        node: NodeId,
        target: NodeId,
        reason: String,
    },

    #[error("{group} is not dense, found positions {found:?}")]
    NotDense {
        group: GroupKey,
        found: Vec<Option<u32>>,
    },

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl OrderingError {
    /// Map a failed write issued during `stage`.
    pub fn persist(stage: WriteStage, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::WriteRejected { node, .. } => Self::PersistFailure {
                stage,
                node,
                source: err,
            },
        }
    }

    /// Create an InvalidTarget error.
    pub fn invalid_target(node: NodeId, target: NodeId, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            node,
            target,
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for OrderingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for ordering operations.
pub type OrderingResult<T> = Result<T, OrderingError>;

/// Application errors: configuration and fixture building on top of ordering.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Ordering(#[from] OrderingError),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
