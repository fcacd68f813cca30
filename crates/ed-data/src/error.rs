//! Error types for ed-data.

use thiserror::Error;

use ed_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row could not be parsed (bad number, unknown status, missing column).
    #[error("data parse error: {0}")]
    Parse(String),

    /// The road-graph export was rejected by the graph builder.
    #[error("road graph: {0}")]
    Spatial(#[from] SpatialError),
}

pub type DataResult<T> = Result<T, DataError>;
