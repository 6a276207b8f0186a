//! Agent intents: the actions an agent can request during a decision.

use ev_core::{AgentId, Vec2};

/// An action that an agent wants to perform this tick.
///
/// Intents are produced by [`BehaviorModel::decide`][crate::BehaviorModel::decide]
/// and applied in order by ev-sim before the agent's motion step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Head along `direction` at `speed`, dropping any path.  A zero
    /// direction with a zero speed means "stop"; a non-zero direction also
    /// turns the agent to face it.
    Steer { direction: Vec2, speed: f32 },

    /// Stop dead (velocity zeroed, no drift) and face `facing`.  The agent
    /// stays put until its next `Steer` or `TravelTo`.
    Halt { facing: Vec2 },

    /// Plan a path to `goal` and follow it at `speed`.
    TravelTo { goal: Vec2, speed: f32 },

    /// Fire at `target`.  `hit` is already resolved; ev-sim rechecks line of
    /// sight, records a shot event, and removes the target on a hit.
    Shoot { target: AgentId, hit: bool },

    /// Take `victim`'s weapon.  The deciding agent has already switched to
    /// its shooter role.
    StealWeapon { victim: AgentId },

    /// Leave the world through an exit.
    Escape,
}
