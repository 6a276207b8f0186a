//! `ev-core`: foundational types for the `rust_evac` crowd simulation.
//!
//! This crate is a dependency of every other `ev-*` crate.  It has no `ev-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `AgentId`                                                  |
//! | [`geom`]    | `Vec2`, `Rect`                                             |
//! | [`kind`]    | `AgentKind` enum (student / staff)                         |
//! | [`time`]    | `Tick`, `SimClock`                                         |
//! | [`config`]  | `SimConfig` plus motion / behavior / planner / spawn params |
//! | [`event`]   | `ShotEvent`, `RemovalReason`                               |
//! | [`rng`]     | `AgentRng` (per-agent), `SimRng` (world-level)             |
//! | [`error`]   | `EvError`, `EvResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types, so     |
//! |         | `SimConfig` can be read from JSON/TOML by an application.  |

pub mod config;
pub mod error;
pub mod event;
pub mod geom;
pub mod ids;
pub mod kind;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{BehaviorParams, MotionParams, PlannerParams, SimConfig, SpawnParams};
pub use error::{EvError, EvResult};
pub use event::{RemovalReason, ShotEvent};
pub use geom::{Rect, Vec2};
pub use ids::AgentId;
pub use kind::AgentKind;
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick};
