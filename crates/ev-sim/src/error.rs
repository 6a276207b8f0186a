use ev_core::EvError;
use ev_mobility::MobilityError;
use ev_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("time step must be non-negative, got {0}")]
    NegativeDelta(f32),

    #[error(transparent)]
    Core(EvError),

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("mobility error for agent: {0}")]
    Mobility(#[from] MobilityError),
}

impl From<EvError> for SimError {
    fn from(e: EvError) -> Self {
        match e {
            EvError::Config(msg) => SimError::Config(msg),
            other => SimError::Core(other),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
