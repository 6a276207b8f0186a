//! `ev-mobility`: continuous agent motion.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`state`]   | `MotionMode`, `MotionState`: per-agent steering state            |
//! | [`store`]   | `MobilityStore`: `Vec<MotionState>` + sparse path cache          |
//! | [`engine`]  | `MobilityEngine<P>`: planning, steering and the integration step |
//! | [`error`]   | `MobilityError`, `MobilityResult<T>`                              |
//!
//! # Motion model
//!
//! Every live agent is integrated once per tick with a variable `dt`:
//!
//! 1. Idle agents count down and do not move.
//! 2. The motion mode yields a target velocity (wander heading, next
//!    waypoint, or a heading set by the behavior layer).
//! 3. Agent repulsion and wall / world-edge repulsion are summed into one
//!    force, clamped, and applied as `dv = F / m · dt`.
//! 4. The velocity is blended toward the target and clamped to max speed.
//! 5. The tentative move is rejected or deflected so the agent's disk never
//!    enters a wall and never starts overlapping another agent.
//!
//! Collision response is impulse-style, not rigid-body exact.

pub mod engine;
pub mod error;
pub mod state;
pub mod store;

#[cfg(test)]
mod tests;

pub use engine::MobilityEngine;
pub use error::{MobilityError, MobilityResult};
pub use state::{MotionMode, MotionState};
pub use store::MobilityStore;
