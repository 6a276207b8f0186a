//! Read-only world view passed to every behavior callback.

use ev_agent::AgentStore;
use ev_core::{AgentId, BehaviorParams, Rect, ShotEvent, Tick, Vec2};
use ev_mobility::MobilityStore;
use ev_spatial::{has_line_of_sight, ObstacleSet, SpatialIndex};

/// A read-only snapshot of the simulation state passed to
/// [`BehaviorModel::decide`][crate::BehaviorModel::decide].
///
/// Agents move one at a time, so ev-sim rebuilds this (a handful of
/// borrows, no allocation) before each decision.  An agent therefore sees
/// the post-move positions of agents processed earlier in the tick and the
/// pre-move positions of the rest.
pub struct SimContext<'a> {
    /// Current simulation tick.
    pub tick: Tick,
    /// Simulated seconds since the start of the run.
    pub now: f64,
    /// Length of this tick in simulated seconds.
    pub dt: f32,

    /// Read-only view of every agent's SoA state arrays.
    pub agents: &'a AgentStore,
    pub index: &'a SpatialIndex,
    pub obstacles: &'a ObstacleSet,
    pub exits: &'a [Rect],
    /// Recent shots, oldest first.
    pub shots: &'a [ShotEvent],
    pub mobility: &'a MobilityStore,
    pub params: &'a BehaviorParams,
}

impl<'a> SimContext<'a> {
    #[inline]
    pub fn is_alive(&self, agent: AgentId) -> bool {
        self.agents.is_alive(agent)
    }

    #[inline]
    pub fn pos(&self, agent: AgentId) -> Vec2 {
        self.agents.pos[agent.index()]
    }

    /// Live agents within `r` of `center` (exact distance), in index order.
    pub fn nearby_agents(&self, center: Vec2, r: f32) -> Vec<AgentId> {
        let r2 = r * r;
        self.index
            .query_radius(center, r)
            .into_iter()
            .filter(|&a| self.agents.is_alive(a) && self.pos(a).distance_sq(center) <= r2)
            .collect()
    }

    /// `true` if no wall blocks the segment `a–b`.
    #[inline]
    pub fn can_see(&self, a: Vec2, b: Vec2) -> bool {
        has_line_of_sight(a, b, self.obstacles)
    }

    /// `true` if `agent` still has waypoints to walk.
    #[inline]
    pub fn has_path(&self, agent: AgentId) -> bool {
        self.mobility.has_path(agent)
    }

    /// Index of the exit closest to `pos`, or `None` if there are no exits.
    pub fn nearest_exit(&self, pos: Vec2) -> Option<usize> {
        nearest_exit(self.exits, pos)
    }

    /// Index of an exit whose inflated rectangle overlaps the bounding
    /// square of a disk at `pos` with `radius`.
    pub fn exit_reached(&self, pos: Vec2, radius: f32) -> Option<usize> {
        exit_reached(self.exits, pos, radius, self.params.exit_inflation)
    }
}

/// Index of the first exit that, grown by `inflation`, overlaps the
/// bounding square of a disk at `pos`.
pub fn exit_reached(exits: &[Rect], pos: Vec2, radius: f32, inflation: f32) -> Option<usize> {
    let body = Rect::around(pos, radius);
    exits.iter().position(|e| e.inflate(inflation).overlaps(&body))
}

/// Index of the exit rectangle closest to `pos` (first wins on ties).
pub fn nearest_exit(exits: &[Rect], pos: Vec2) -> Option<usize> {
    exits
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance_sq_to(pos).total_cmp(&b.distance_sq_to(pos)))
        .map(|(i, _)| i)
}
