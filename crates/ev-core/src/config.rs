//! Simulation configuration.
//!
//! Every tunable constant of the motion model, the behavior state machine,
//! the path planner and agent spawning lives here as a plain struct with a
//! `Default` impl.  Applications typically start from `SimConfig::default()`
//! and override a few fields; with the `serde` feature the whole tree can be
//! read from a JSON/TOML file (missing fields fall back to the defaults).
//!
//! Distances are world units, times are simulated seconds, rates are per
//! simulated second.

use std::f32::consts::FRAC_PI_2;

use crate::{EvError, EvResult};

// ── MotionParams ──────────────────────────────────────────────────────────────

/// Steering, avoidance and collision-response constants.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionParams {
    /// Centre-to-centre distance inside which other agents repel.
    pub personal_space: f32,
    /// Scale of the `(personal_space / d - 1)^2` agent repulsion.
    pub agent_avoid_strength: f32,
    /// Magnitude of the push applied to exactly coincident agents.
    pub coincident_push: f32,
    /// Wall avoidance margin as a multiple of the agent radius.
    pub wall_margin_factor: f32,
    /// Scale of the `(margin / d - 1)^2` obstacle repulsion.
    pub wall_strength: f32,
    /// Scale of the cubic world-edge repulsion.
    pub boundary_strength: f32,
    /// Weight of the wall force relative to the agent force.
    pub wall_weight: f32,
    /// Upper bound on the combined avoidance force.
    pub max_force: f32,
    /// Rate of the exponential blend toward the target velocity.
    pub steer_gain: f32,
    /// Fraction of the removed inward speed returned as bounce.
    pub bounce: f32,
    /// Per-second probability of a wandering agent stopping to idle.
    pub idle_probability: f32,
    /// Idle duration range (seconds).
    pub idle_duration: (f32, f32),
    /// How long a wander heading is held before re-rolling (seconds).
    pub path_time: (f32, f32),
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            personal_space:       20.0,
            agent_avoid_strength: 40.0,
            coincident_push:      10.0,
            wall_margin_factor:   3.0,
            wall_strength:        60.0,
            boundary_strength:    80.0,
            wall_weight:          3.0,
            max_force:            400.0,
            steer_gain:           4.0,
            bounce:               0.1,
            idle_probability:     0.05,
            idle_duration:        (1.0, 4.0),
            path_time:            (2.0, 6.0),
        }
    }
}

// ── BehaviorParams ────────────────────────────────────────────────────────────

/// Awareness, evacuation and shooter constants.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BehaviorParams {
    // ── Awareness ─────────────────────────────────────────────────────────
    /// A student who sees an active shooter this close panics.
    pub awareness_radius: f32,
    /// A student panics on a gunshot fired this close…
    pub hearing_radius: f32,
    /// …no more than this many seconds ago.
    pub hearing_window_secs: f32,
    /// Whether panicking students alert others in sight.
    pub scream_enabled: bool,
    pub scream_radius: f32,

    // ── Weapon theft ──────────────────────────────────────────────────────
    /// Per-second probability that a normal student attempts a steal.
    pub steal_rate: f32,
    pub steal_range: f32,

    // ── Evacuation ────────────────────────────────────────────────────────
    /// Emergency speed as a fraction of the agent's max speed.
    pub emergency_speed_factor: f32,
    /// Exit rectangles are grown by this much for the arrival test.
    pub exit_inflation: f32,

    // ── Shooter ───────────────────────────────────────────────────────────
    pub acquire_radius: f32,
    pub release_distance: f32,
    pub max_pursuit_secs: f32,
    pub max_lost_sight_secs: f32,
    pub search_speed_factor: f32,
    pub search_heading_secs: f32,
    /// Below this speed the shooter counts as stuck.
    pub stuck_speed: f32,
    pub stuck_secs: f32,
    pub effective_range: f32,
    pub shot_cooldown_secs: f32,
    pub hit_probability: f32,
    /// Max heading jitter (radians) while advancing without sight.
    pub blind_jitter: f32,
    pub blind_speed_factor: f32,
    /// Heading offset (radians) used to look for a sightline when in range.
    pub reposition_angle: f32,
    pub reposition_speed_factor: f32,
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self {
            awareness_radius:        200.0,
            hearing_radius:          350.0,
            hearing_window_secs:     0.75,
            scream_enabled:          true,
            scream_radius:           100.0,
            steal_rate:              0.002,
            steal_range:             30.0,
            emergency_speed_factor:  0.9,
            exit_inflation:          5.0,
            acquire_radius:          300.0,
            release_distance:        400.0,
            max_pursuit_secs:        20.0,
            max_lost_sight_secs:     3.0,
            search_speed_factor:     0.5,
            search_heading_secs:     3.0,
            stuck_speed:             2.0,
            stuck_secs:              1.0,
            effective_range:         150.0,
            shot_cooldown_secs:      0.8,
            hit_probability:         0.3,
            blind_jitter:            0.6,
            blind_speed_factor:      0.6,
            reposition_angle:        FRAC_PI_2,
            reposition_speed_factor: 0.3,
        }
    }
}

// ── PlannerParams ─────────────────────────────────────────────────────────────

/// Lattice path planner constants.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerParams {
    /// Lattice spacing.
    pub step: f32,
    /// Search succeeds once a popped node is this close to the goal.
    pub goal_tolerance: f32,
    /// Half-size of the square probe tested against walls.
    pub probe_half: f32,
    /// Safety cap on node expansions per query.
    pub max_expansions: usize,
}

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            step:           5.0,
            goal_tolerance: 10.0,
            probe_half:     3.0,
            max_expansions: 200_000,
        }
    }
}

// ── SpawnParams ───────────────────────────────────────────────────────────────

/// Per-kind parameter ranges sampled at spawn.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpawnParams {
    pub student_radius:      (f32, f32),
    pub student_wander_speed: (f32, f32),
    pub student_max_speed:   (f32, f32),
    pub staff_radius:        (f32, f32),
    pub staff_wander_speed:  (f32, f32),
    pub staff_max_speed:     (f32, f32),
    pub mass:                (f32, f32),
    /// Rejection-sampling budget per agent before giving up.
    pub max_spawn_attempts:  u32,
    /// Probability that staff added after construction carry a weapon.
    pub armed_staff_probability: f32,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            student_radius:          (4.0, 6.0),
            student_wander_speed:    (15.0, 30.0),
            student_max_speed:       (60.0, 80.0),
            staff_radius:            (5.0, 7.0),
            staff_wander_speed:      (12.0, 25.0),
            staff_max_speed:         (50.0, 70.0),
            mass:                    (0.8, 1.2),
            max_spawn_attempts:      200,
            armed_staff_probability: 0.2,
        }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    pub world_width: f32,
    pub world_height: f32,

    pub student_count: usize,
    pub staff_count: usize,
    /// How many of the initial staff carry a weapon (capped at `staff_count`).
    pub armed_staff_count: usize,

    /// Spatial index bucket size.  Roughly the largest query radius used
    /// every tick (personal space) keeps radius queries at 3×3 cells.
    pub spatial_cell_size: f32,

    /// Shot events are discarded this many seconds after firing.
    pub shot_event_ttl_secs: f32,

    /// How often the spontaneous-shooter roll happens (seconds).
    pub shooter_emergence_interval_secs: f32,
    /// Probability of promoting a random student on each roll.  0 disables.
    pub shooter_emergence_probability: f32,

    /// Stop ticking after this much simulated time.  `None` runs until the
    /// other end condition (or forever).
    pub time_limit_secs: Option<f64>,
    /// Stop once no student remains who could still escape or die.
    pub stop_when_resolved: bool,

    pub motion: MotionParams,
    pub behavior: BehaviorParams,
    pub planner: PlannerParams,
    pub spawn: SpawnParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:                            42,
            world_width:                     800.0,
            world_height:                    600.0,
            student_count:                   100,
            staff_count:                     10,
            armed_staff_count:               2,
            spatial_cell_size:               20.0,
            shot_event_ttl_secs:             1.0,
            shooter_emergence_interval_secs: 5.0,
            shooter_emergence_probability:   0.0,
            time_limit_secs:                 Some(600.0),
            stop_when_resolved:              true,
            motion:                          MotionParams::default(),
            behavior:                        BehaviorParams::default(),
            planner:                         PlannerParams::default(),
            spawn:                           SpawnParams::default(),
        }
    }
}

impl SimConfig {
    /// Check the handful of values that must be strictly positive.
    ///
    /// Nothing else is constrained: zero agents, zero armed staff and an
    /// absent time limit are all legal.
    pub fn validate(&self) -> EvResult<()> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("spatial_cell_size", self.spatial_cell_size),
            ("planner.step", self.planner.step),
            ("planner.goal_tolerance", self.planner.goal_tolerance),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(EvError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if let Some(limit) = self.time_limit_secs {
            if !(limit > 0.0) {
                return Err(EvError::Config(format!("time_limit_secs must be positive, got {limit}")));
            }
        }
        if !(self.spawn.student_radius.0 > 0.0 && self.spawn.staff_radius.0 > 0.0) {
            return Err(EvError::Config("agent radius ranges must be positive".into()));
        }
        if !(self.spawn.mass.0 > 0.0) {
            return Err(EvError::Config("agent mass range must be positive".into()));
        }
        Ok(())
    }
}
