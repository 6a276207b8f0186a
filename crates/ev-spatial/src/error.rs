//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `ev-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(f32),

    #[error("malformed obstacle map: {0}")]
    MapFormat(String),

    #[error("obstacle map JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
