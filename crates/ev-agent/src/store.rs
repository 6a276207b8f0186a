//! Core agent storage: `AgentStore` (SoA data) and `AgentRngs` (per-agent RNG).
//!
//! # Why two structs?
//!
//! The behavior step needs `&mut AgentRng` for the deciding agent while the
//! rest of the world (positions of everyone else) is read through
//! `&AgentStore`.  Keeping the RNGs in a separate `AgentRngs` lets both
//! borrows coexist without cloning any state.
//!
//! # Handles
//!
//! Agents are appended and never removed from the arrays.  Death and escape
//! clear `alive[i]`; the `AgentId` stays valid as a handle forever, so a
//! stored reference (a shooter's lock) can always be re-checked with
//! [`AgentStore::is_alive`].

use ev_core::{AgentId, AgentKind, AgentRng, Vec2};

use crate::{AgentSpec, Role};

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, separated from [`AgentStore`] so a
/// decision can hold `&mut AgentRng` and `&AgentStore` at once.
pub struct AgentRngs {
    pub inner: Vec<AgentRng>,
    seed: u64,
}

impl AgentRngs {
    pub fn new(global_seed: u64) -> Self {
        Self { inner: Vec::new(), seed: global_seed }
    }

    /// Seed the RNG for a newly pushed agent.  Must be called once per
    /// [`AgentStore::push`], in the same order.
    pub fn push(&mut self, agent: AgentId) {
        debug_assert_eq!(agent.index(), self.inner.len());
        self.inner.push(AgentRng::new(self.seed, agent));
    }

    /// Mutable reference to one agent's RNG.
    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> &mut AgentRng {
        &mut self.inner[agent.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── AgentView ─────────────────────────────────────────────────────────────────

/// Read-only snapshot of one agent, for renderers and tests.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentView {
    pub id: AgentId,
    pub kind: AgentKind,
    pub alive: bool,
    pub pos: Vec2,
    pub vel: Vec2,
    pub heading: f32,
    pub radius: f32,
    pub armed: bool,
    pub role: Role,
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for all agent state.
///
/// Every `Vec` field has exactly `count` elements; the `AgentId` value is the
/// index into all of them:
///
/// ```ignore
/// let p = store.pos[agent.index()];  // O(1), cache-friendly
/// ```
///
/// Motion-model bookkeeping (timers, modes, paths) lives in `ev-mobility`.
#[derive(Default)]
pub struct AgentStore {
    /// Number of agents ever spawned.  Equals the length of every SoA `Vec`.
    pub count: usize,

    // ── Identity ──────────────────────────────────────────────────────────
    pub kind: Vec<AgentKind>,
    /// `false` once the agent has escaped or died.
    pub alive: Vec<bool>,

    // ── Kinematics ────────────────────────────────────────────────────────
    pub pos: Vec<Vec2>,
    pub vel: Vec<Vec2>,
    /// Facing direction in radians.
    pub heading: Vec<f32>,

    // ── Physical parameters (fixed at spawn) ──────────────────────────────
    pub radius: Vec<f32>,
    pub mass: Vec<f32>,
    pub max_speed: Vec<f32>,
    /// Speed used while wandering.
    pub preferred_speed: Vec<f32>,

    // ── Behavior state ────────────────────────────────────────────────────
    /// Holds a weapon (armed staff, or a student who became a shooter).
    pub armed: Vec<bool>,
    pub role: Vec<Role>,

    live: usize,
    max_radius: f32,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            kind: Vec::with_capacity(n),
            alive: Vec::with_capacity(n),
            pos: Vec::with_capacity(n),
            vel: Vec::with_capacity(n),
            heading: Vec::with_capacity(n),
            radius: Vec::with_capacity(n),
            mass: Vec::with_capacity(n),
            max_speed: Vec::with_capacity(n),
            preferred_speed: Vec::with_capacity(n),
            armed: Vec::with_capacity(n),
            role: Vec::with_capacity(n),
            ..Self::default()
        }
    }

    /// Append an agent and return its handle.
    pub fn push(&mut self, spec: AgentSpec) -> AgentId {
        let id = AgentId(self.count as u32);
        self.kind.push(spec.kind);
        self.alive.push(true);
        self.pos.push(spec.pos);
        self.vel.push(Vec2::ZERO);
        self.heading.push(spec.heading);
        self.radius.push(spec.radius);
        self.mass.push(spec.mass);
        self.max_speed.push(spec.max_speed);
        self.preferred_speed.push(spec.preferred_speed);
        self.armed.push(spec.armed);
        self.role.push(Role::initial(spec.kind));
        self.count += 1;
        self.live += 1;
        self.max_radius = self.max_radius.max(spec.radius);
        id
    }

    /// `true` if there are no agents (alive or not).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `false` for dead, escaped and never-issued handles.
    #[inline]
    pub fn is_alive(&self, agent: AgentId) -> bool {
        self.alive.get(agent.index()).copied().unwrap_or(false)
    }

    /// Mark an agent removed.  Returns `false` if it already was.
    pub fn kill(&mut self, agent: AgentId) -> bool {
        match self.alive.get_mut(agent.index()) {
            Some(a) if *a => {
                *a = false;
                self.vel[agent.index()] = Vec2::ZERO;
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Largest radius ever spawned; bounds neighbour queries for overlap tests.
    #[inline]
    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    /// Iterator over live `AgentId`s in ascending index order.
    pub fn live_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agent_ids().filter(|a| self.alive[a.index()])
    }

    #[inline]
    pub fn is_shooter(&self, agent: AgentId) -> bool {
        self.role.get(agent.index()).is_some_and(Role::is_shooter)
    }

    /// Snapshot of one agent, or `None` for a never-issued handle.
    pub fn view(&self, agent: AgentId) -> Option<AgentView> {
        let i = agent.index();
        (i < self.count).then(|| AgentView {
            id: agent,
            kind: self.kind[i],
            alive: self.alive[i],
            pos: self.pos[i],
            vel: self.vel[i],
            heading: self.heading[i],
            radius: self.radius[i],
            armed: self.armed[i],
            role: self.role[i],
        })
    }
}
