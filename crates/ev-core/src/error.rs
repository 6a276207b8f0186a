//! Framework error type.
//!
//! Sub-crates define their own error enums (`SpatialError`, `MobilityError`,
//! `SimError`) and wrap `EvError` where a core failure can surface.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `ev-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum EvError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("agent {0} is no longer alive")]
    AgentNotAlive(AgentId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `ev-*` crates.
pub type EvResult<T> = Result<T, EvError>;
