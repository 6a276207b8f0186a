use ev_core::AgentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("agent {0} has no motion state")]
    UnknownAgent(AgentId),

    #[error("agent {0} is no longer in the world")]
    NotAlive(AgentId),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
