//! `ev-agent`: Structure-of-Arrays agent storage for `rust_evac`.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`store`]   | `AgentStore` (SoA arrays), `AgentRngs` (per-agent RNG), `AgentView` |
//! | [`role`]    | `Role`, `StudentMode`, `ShooterState`                         |
//! | [`spawn`]   | `AgentSpec` (fluent construction + per-kind sampling)         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types.    |

pub mod role;
pub mod spawn;
pub mod store;


pub use role::{Role, ShooterState, StudentMode};
pub use spawn::AgentSpec;
pub use store::{AgentRngs, AgentStore, AgentView};
