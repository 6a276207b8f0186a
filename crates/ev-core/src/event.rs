//! Transient world events.

use crate::{AgentId, Vec2};

/// One fired shot, kept by the world for a short display / hearing window.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShotEvent {
    pub shooter: AgentId,
    pub origin: Vec2,
    pub target: Vec2,
    /// Simulated time of the shot (seconds since start).
    pub time: f64,
    pub hit: bool,
}

impl ShotEvent {
    /// Seconds since the shot at simulated time `now`.
    #[inline]
    pub fn age(&self, now: f64) -> f64 {
        now - self.time
    }
}

/// Why an agent left the roster.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalReason {
    /// Reached an exit.
    Escaped,
    /// Shot.
    Died,
}

impl RemovalReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RemovalReason::Escaped => "escaped",
            RemovalReason::Died    => "died",
        }
    }
}

impl std::fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
