//! Per-agent motion state.

use ev_core::Vec2;

/// What currently drives an agent's target velocity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotionMode {
    /// Standing still until `idle_timer` reaches `idle_duration`.
    Idle,
    /// Random walk: a heading held for `path_time` seconds, then re-rolled.
    #[default]
    Wandering,
    /// Walking the waypoints in the agent's path.
    FollowingPath,
    /// Heading and speed set directly by the behavior layer.
    Steered,
}

/// The motion state for a single agent.
///
/// Exactly one [`MotionMode`] is active.  The path itself lives in
/// [`MobilityStore::paths`](crate::MobilityStore::paths).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionState {
    pub mode: MotionMode,

    pub idle_timer: f32,
    pub idle_duration: f32,

    /// Seconds the current wander heading has been held.
    pub wander_timer: f32,
    /// Seconds until the wander heading is re-rolled.
    pub path_time: f32,

    /// Unit steering direction (zero means "stop").
    pub target_dir: Vec2,
    pub target_speed: f32,

    /// Speed used while following a path.
    pub path_speed: f32,

    /// Set by [`MobilityEngine::halt`](crate::MobilityEngine::halt): the
    /// agent stands still until the next steering request.
    pub holding: bool,
}

impl MotionState {
    /// A wandering agent heading along `dir` at `speed`.
    pub fn wandering(dir: Vec2, speed: f32, path_time: f32) -> Self {
        Self {
            mode: MotionMode::Wandering,
            idle_timer: 0.0,
            idle_duration: 0.0,
            wander_timer: 0.0,
            path_time,
            target_dir: dir.normalize_or_zero(),
            target_speed: speed,
            path_speed: speed,
            holding: false,
        }
    }

    /// Velocity the steering blend pulls toward.
    #[inline]
    pub fn target_velocity(&self) -> Vec2 {
        self.target_dir * self.target_speed
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.mode == MotionMode::Idle
    }
}

impl Default for MotionState {
    fn default() -> Self {
        Self::wandering(Vec2::ZERO, 0.0, 0.0)
    }
}
