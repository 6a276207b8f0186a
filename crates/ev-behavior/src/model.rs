//! The `BehaviorModel` trait: the main extension point for user code.

use ev_agent::Role;
use ev_core::{AgentId, AgentRng};

use crate::{Intent, SimContext};

/// Pluggable agent behavior.
///
/// Implement this trait to define how agents decide what to do each tick.
/// The callback receives a read-only [`SimContext`], the agent's own
/// [`Role`] by mutable reference (its state machine lives there), and a
/// per-agent [`AgentRng`] so outcomes are reproducible for a fixed seed.
///
/// Anything that touches another agent must be expressed as an [`Intent`].
///
/// # Example
///
/// ```rust,ignore
/// struct Flock;
///
/// impl BehaviorModel for Flock {
///     fn decide(&self, agent: AgentId, _role: &mut Role, ctx: &SimContext, _rng: &mut AgentRng) -> Vec<Intent> {
///         let me = ctx.pos(agent);
///         let near = ctx.nearby_agents(me, 50.0);
///         let centre = near.iter().fold(Vec2::ZERO, |acc, &a| acc + ctx.pos(a)) / near.len().max(1) as f32;
///         vec![Intent::Steer { direction: centre - me, speed: 20.0 }]
///     }
/// }
/// ```
pub trait BehaviorModel {
    /// Called once per live agent per tick, before its motion step.
    ///
    /// An empty `Vec` leaves the motion model running on its own
    /// (wander / idle, or the current path).
    fn decide(
        &self,
        agent: AgentId,
        role:  &mut Role,
        ctx:   &SimContext<'_>,
        rng:   &mut AgentRng,
    ) -> Vec<Intent>;
}
