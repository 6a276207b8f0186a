//! `ev-sim`: world state and tick loop for the rust_evac crowd simulation.
//!
//! # Tick loop
//!
//! ```text
//! step(dt):
//!   ① Clock       advance; drop shot events older than the TTL.
//!   ② Triggers    spontaneous shooter emergence roll.
//!   ③ Order       shuffle live agents with the seeded SimRng.
//!   ④ Per agent, in that order:
//!        decide    BehaviorModel::decide (may rewrite the agent's Role)
//!        apply     Steer / TravelTo → mobility
//!                  Shoot           → recheck sight, record shot, kill on hit
//!                  StealWeapon     → move the weapon
//!                  Escape          → remove
//!        move      MobilityEngine::step
//!        check     evacuating agent on an exit → escaped
//!   ⑤ End         time limit, or no student left to save.
//! ```
//!
//! Agents update sequentially, so a decision sees the post-move positions of
//! agents earlier in this tick's order and the pre-move positions of the
//! rest.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ev_core::SimConfig;
//! use ev_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::school(SimConfig::default())
//!     .map(ev_spatial::load_map_file("school.json", 10.0))
//!     .build()?;
//! sim.force_spawn_shooter();
//! let outcome = sim.run_until_done(0.05, &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod outcome;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use outcome::{Outcome, Termination};
pub use sim::Sim;
