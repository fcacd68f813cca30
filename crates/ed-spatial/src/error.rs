//! Spatial-subsystem error type.

use thiserror::Error;

use ed_core::{CoreError, NodeId};

/// Errors produced by `ed-spatial`.
///
/// `NoPathFound` is an expected outcome of an exhaustive search, not an input
/// problem; callers can tell the two apart with [`SpatialError::is_no_path`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoreError),

    #[error("road graph has no nodes")]
    EmptyGraph,

    #[error("no path from {from} to {to}")]
    NoPathFound { from: NodeId, to: NodeId },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("node key {0} added more than once")]
    DuplicateNodeKey(u64),

    #[error("route search interrupted by deadline or cancellation")]
    Interrupted,
}

impl SpatialError {
    #[inline]
    pub fn is_no_path(&self) -> bool {
        matches!(self, SpatialError::NoPathFound { .. })
    }
}

pub type SpatialResult<T> = Result<T, SpatialError>;
