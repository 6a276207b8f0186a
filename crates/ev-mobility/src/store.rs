//! The `MobilityStore`: per-agent motion state and sparse path cache.

use rustc_hash::FxHashMap;

use ev_core::AgentId;
use ev_spatial::Path;

use crate::MotionState;

/// Holds motion state for every agent plus sparse paths for agents that are
/// walking one.
///
/// The `states` vector is indexed by `AgentId` and always has one entry per
/// spawned agent.  The `paths` map is sparse: only agents in
/// [`MotionMode::FollowingPath`](crate::MotionMode::FollowingPath) have an
/// entry, and it is dropped when exhausted, replaced, or the agent leaves.
#[derive(Default)]
pub struct MobilityStore {
    /// Per-agent motion state, indexed by `AgentId`.
    pub states: Vec<MotionState>,

    /// Sparse path cache: `AgentId → Path`.
    pub paths: FxHashMap<AgentId, Path>,
}

impl MobilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn state(&self, agent: AgentId) -> Option<&MotionState> {
        self.states.get(agent.index())
    }

    #[inline]
    pub fn path(&self, agent: AgentId) -> Option<&Path> {
        self.paths.get(&agent)
    }

    /// `true` if `agent` has waypoints left to walk.
    #[inline]
    pub fn has_path(&self, agent: AgentId) -> bool {
        self.paths.get(&agent).is_some_and(|p| !p.is_empty())
    }

    /// Remaining waypoint count (0 without a path).
    pub fn path_len(&self, agent: AgentId) -> usize {
        self.paths.get(&agent).map_or(0, Path::len)
    }

    pub fn clear_path(&mut self, agent: AgentId) {
        self.paths.remove(&agent);
    }
}
