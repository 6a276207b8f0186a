//! `ev-behavior`: agent behavior model trait, intents, and school logic.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                         |
//! |-------------|------------------------------------------------------------------|
//! | [`intent`]  | `Intent` enum (`Steer`, `TravelTo`, `Shoot`, `StealWeapon`, `Escape`) |
//! | [`context`] | `SimContext<'a>`: narrow read-only view of the world            |
//! | [`model`]   | `BehaviorModel` trait                                            |
//! | [`passive`] | `PassiveBehavior`: never produces intents                       |
//! | [`school`]  | `SchoolBehavior`: staff / student / shooter state machine       |
//! | [`student`] | awareness, weapon theft, evacuation                              |
//! | [`shooter`] | lock validation, search, pursue, engage                          |
//!
//! # Decide / apply
//!
//! ev-sim processes agents one at a time in a shuffled order.  For each
//! agent it builds a `SimContext`, calls `BehaviorModel::decide` (which may
//! rewrite the agent's own [`Role`](ev_agent::Role) but nothing else), then
//! applies the returned intents before moving on to the next agent.  All
//! effects on other agents (kills, disarming, removal) go through intents.

pub mod context;
pub mod intent;
pub mod model;
pub mod passive;
pub mod school;
pub mod shooter;
pub mod student;


pub use context::{exit_reached, nearest_exit, SimContext};
pub use intent::Intent;
pub use model::BehaviorModel;
pub use passive::PassiveBehavior;
pub use school::SchoolBehavior;
pub use student::start_evacuation;
