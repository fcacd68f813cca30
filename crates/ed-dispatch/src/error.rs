use thiserror::Error;

use ed_core::CoreError;
use ed_spatial::SpatialError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    #[error("no zones configured")]
    NoZonesConfigured,

    #[error("{0} is missing or empty")]
    DataUnavailable(&'static str),

    #[error("search interrupted by deadline or cancellation")]
    Interrupted,

    #[error("worker pool error: {0}")]
    Pool(String),

    #[error("routing error: {0}")]
    Spatial(#[from] SpatialError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
