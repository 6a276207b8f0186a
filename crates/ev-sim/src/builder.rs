//! Fluent builder for constructing a [`Sim`].

use ev_agent::{AgentRngs, AgentSpec, AgentStore};
use ev_behavior::{BehaviorModel, SchoolBehavior};
use ev_core::{AgentKind, Rect, SimClock, SimConfig, SimRng};
use ev_mobility::MobilityEngine;
use ev_spatial::{GridPathfinder, ObstacleSet, Planner, SpatialIndex, WorldMap};
use tracing::{info, warn};

use crate::{Outcome, Sim, SimResult};

/// Fluent builder for [`Sim<B, P>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: seed, world size, population, tuning parameters
/// - `B: BehaviorModel`: the behavior implementation
/// - `P: Planner`: the path planner (e.g. [`GridPathfinder`])
///
/// # Optional inputs (have defaults)
///
/// | Method         | Default                           |
/// |----------------|-----------------------------------|
/// | `.map(m)`      | `WorldMap::empty()` (open world)  |
/// | `.walls(v)`    | none                              |
/// | `.exits(v)`    | none                              |
/// | `.doors(v)`    | none                              |
/// | `.agent(spec)` | none; placed before the random population |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, SchoolBehavior, GridPathfinder::default())
///     .map(load_map_file("school.json", 10.0))
///     .build()?;
/// ```
pub struct SimBuilder<B: BehaviorModel, P: Planner> {
    config:   SimConfig,
    behavior: B,
    planner:  P,
    map:      WorldMap,
    placed:   Vec<AgentSpec>,
}

impl SimBuilder<SchoolBehavior, GridPathfinder> {
    /// The standard school scenario: [`SchoolBehavior`] with a
    /// [`GridPathfinder`] tuned by `config.planner`.
    pub fn school(config: SimConfig) -> Self {
        let planner = GridPathfinder::new(config.planner.clone());
        Self::new(config, SchoolBehavior, planner)
    }
}

impl<B: BehaviorModel, P: Planner> SimBuilder<B, P> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, behavior: B, planner: P) -> Self {
        Self {
            config,
            behavior,
            planner,
            map:    WorldMap::empty(),
            placed: Vec::new(),
        }
    }

    /// Use the walls, exits and doors of a loaded map, replacing any set so
    /// far.
    pub fn map(mut self, map: WorldMap) -> Self {
        self.map = map;
        self
    }

    pub fn walls(mut self, walls: impl IntoIterator<Item = Rect>) -> Self {
        self.map.walls.extend(walls);
        self
    }

    pub fn exits(mut self, exits: impl IntoIterator<Item = Rect>) -> Self {
        self.map.exits.extend(exits);
        self
    }

    pub fn doors(mut self, doors: impl IntoIterator<Item = Rect>) -> Self {
        self.map.doors.extend(doors);
        self
    }

    /// Place one agent exactly as described (no overlap checks).  Placed
    /// agents get the lowest handles, in call order.
    pub fn agent(mut self, spec: AgentSpec) -> Self {
        self.placed.push(spec);
        self
    }

    /// Validate the config, build the world, place explicit agents, then
    /// rejection-sample the configured population.
    pub fn build(self) -> SimResult<Sim<B, P>> {
        self.config.validate()?;

        let bounds = Rect::from_xywh(0.0, 0.0, self.config.world_width, self.config.world_height);
        if self.map.extent.x > bounds.width() || self.map.extent.y > bounds.height() {
            warn!(extent = %self.map.extent, world = %bounds, "map is larger than the world; clipped");
        }

        let index = SpatialIndex::new(bounds, self.config.spatial_cell_size)?;
        let obstacles = ObstacleSet::new(bounds, self.map.walls);
        let mobility = MobilityEngine::new(self.planner, self.config.motion.clone());
        let seed = self.config.seed;

        let mut sim = Sim {
            clock:           SimClock::new(),
            agents:          AgentStore::with_capacity(self.config.student_count + self.config.staff_count),
            rngs:            AgentRngs::new(seed),
            rng:             SimRng::new(seed).child(1),
            obstacles,
            exits:           self.map.exits,
            doors:           self.map.doors,
            index,
            mobility,
            behavior:        self.behavior,
            shots:           Vec::new(),
            outcome:         Outcome::default(),
            termination:     None,
            emergence_timer: 0.0,
            config:          self.config,
        };

        for spec in self.placed {
            sim.place(spec);
        }

        let students = sim.config.student_count;
        let staff = sim.config.staff_count;
        let armed = sim.config.armed_staff_count.min(staff);
        let mut missing = 0usize;
        for _ in 0..students {
            missing += usize::from(sim.spawn(AgentKind::Student, false).is_none());
        }
        for k in 0..staff {
            missing += usize::from(sim.spawn(AgentKind::Staff, k < armed).is_none());
        }
        if missing > 0 {
            warn!(missing, "some agents could not be placed");
        }

        info!(
            agents = sim.agents.live_count(),
            walls = sim.obstacles.len(),
            exits = sim.exits.len(),
            seed,
            "simulation built"
        );
        Ok(sim)
    }
}
