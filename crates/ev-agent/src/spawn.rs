//! Agent construction parameters.
//!
//! # Usage
//!
//! ```rust
//! use ev_agent::{AgentSpec, AgentStore};
//! use ev_core::{AgentKind, Vec2};
//!
//! let mut store = AgentStore::new();
//! let id = store.push(
//!     AgentSpec::new(AgentKind::Staff, Vec2::new(10.0, 10.0))
//!         .radius(6.0)
//!         .armed(true),
//! );
//! assert!(store.armed[id.index()]);
//! ```

use ev_core::{AgentKind, SimRng, SpawnParams, Vec2};

/// Everything needed to push one agent into an [`AgentStore`](crate::AgentStore).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSpec {
    pub kind: AgentKind,
    pub pos: Vec2,
    pub heading: f32,
    pub radius: f32,
    pub mass: f32,
    pub max_speed: f32,
    pub preferred_speed: f32,
    pub armed: bool,
}

impl AgentSpec {
    /// A mid-range agent of `kind` at `pos`.
    pub fn new(kind: AgentKind, pos: Vec2) -> Self {
        let p = SpawnParams::default();
        let mid = |(lo, hi): (f32, f32)| (lo + hi) * 0.5;
        let (radius, wander, max) = kind_ranges(&p, kind);
        Self {
            kind,
            pos,
            heading: 0.0,
            radius: mid(radius),
            mass: mid(p.mass),
            max_speed: mid(max),
            preferred_speed: mid(wander),
            armed: false,
        }
    }

    /// Draw per-agent parameters for `kind` from the configured ranges.
    /// Position is left at `pos`; the caller is responsible for placement.
    pub fn sample(kind: AgentKind, pos: Vec2, params: &SpawnParams, rng: &mut SimRng) -> Self {
        let (radius, wander, max) = kind_ranges(params, kind);
        let radius = uniform(rng, radius);
        let max_speed = uniform(rng, max);
        Self {
            kind,
            pos,
            heading: rng.gen_range(0.0..std::f32::consts::TAU),
            radius,
            mass: uniform(rng, params.mass),
            max_speed,
            preferred_speed: uniform(rng, wander).min(max_speed),
            armed: false,
        }
    }

    // ── Fluent overrides ──────────────────────────────────────────────────

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set wander and maximum speed.
    pub fn speeds(mut self, preferred: f32, max: f32) -> Self {
        self.preferred_speed = preferred;
        self.max_speed = max;
        self
    }

    pub fn heading(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }

    pub fn armed(mut self, armed: bool) -> Self {
        self.armed = armed;
        self
    }

    pub fn at(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }
}

fn kind_ranges(p: &SpawnParams, kind: AgentKind) -> ((f32, f32), (f32, f32), (f32, f32)) {
    match kind {
        AgentKind::Student => (p.student_radius, p.student_wander_speed, p.student_max_speed),
        AgentKind::Staff => (p.staff_radius, p.staff_wander_speed, p.staff_max_speed),
    }
}

fn uniform(rng: &mut SimRng, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}
