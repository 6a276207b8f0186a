//! High-level mobility engine: turns steering requests into motion.

use tracing::trace;

use ev_agent::AgentStore;
use ev_core::{AgentId, AgentRng, MotionParams, Rect, Vec2};
use ev_spatial::{segment_rect_distance_sq, with_goal_fallback, ObstacleSet, Planner, SpatialIndex};

use crate::{MobilityError, MobilityResult, MobilityStore, MotionMode, MotionState};

/// Below this separation two agents (or an agent and a wall) count as
/// coincident and get a fallback direction.
const COINCIDENT_EPS: f32 = 1e-6;

/// Wraps a [`Planner`] and [`MobilityStore`] to provide the steering API used
/// by `ev-sim` and the per-tick integration step.
///
/// # Type parameter
///
/// `P` must implement [`Planner`] (e.g. [`ev_spatial::GridPathfinder`]).
/// Swap it at compile time for a different planner with no runtime overhead.
pub struct MobilityEngine<P: Planner> {
    /// The path planner.
    pub planner: P,

    /// All per-agent motion state and the path cache.
    pub store: MobilityStore,

    pub params: MotionParams,
}

impl<P: Planner> MobilityEngine<P> {
    pub fn new(planner: P, params: MotionParams) -> Self {
        Self { planner, store: MobilityStore::new(), params }
    }

    /// Register motion state for a newly spawned agent, wandering along
    /// `heading` at `speed`.
    pub fn add_agent(&mut self, agent: AgentId, heading: f32, speed: f32, rng: &mut AgentRng) {
        debug_assert_eq!(agent.index(), self.store.states.len());
        let (lo, hi) = self.params.path_time;
        let path_time = rng.between(lo, hi);
        self.store.states.push(MotionState::wandering(Vec2::from_angle(heading), speed, path_time));
    }

    // ── Steering requests ─────────────────────────────────────────────────

    /// Plan a path from `from` to `goal` and start following it at `speed`.
    ///
    /// An unreachable goal falls back to a straight line; a path that stops
    /// short of the goal gets the exact goal appended.  Returns the number of
    /// waypoints.
    pub fn travel_to(
        &mut self,
        agent: AgentId,
        from: Vec2,
        goal: Vec2,
        speed: f32,
        obstacles: &ObstacleSet,
    ) -> MobilityResult<usize> {
        let state = self.store.states.get_mut(agent.index()).ok_or(MobilityError::UnknownAgent(agent))?;
        let path = with_goal_fallback(self.planner.find_path(from, goal, obstacles), goal);
        let len = path.len();

        state.mode = MotionMode::FollowingPath;
        state.holding = false;
        state.path_speed = speed;
        state.target_speed = speed;
        self.store.paths.insert(agent, path);

        trace!(agent = %agent, waypoints = len, %goal, "path assigned");
        Ok(len)
    }

    /// Steer along `direction` at `speed`, dropping any path.
    pub fn steer(&mut self, agent: AgentId, direction: Vec2, speed: f32) -> MobilityResult<()> {
        let state = self.store.states.get_mut(agent.index()).ok_or(MobilityError::UnknownAgent(agent))?;
        state.mode = MotionMode::Steered;
        state.holding = false;
        state.target_dir = direction.normalize_or_zero();
        state.target_speed = speed.max(0.0);
        self.store.paths.remove(&agent);
        Ok(())
    }

    /// Stop dead: zero the velocity, drop any path, and skip integration
    /// until the next [`steer`](Self::steer) or [`travel_to`](Self::travel_to).
    pub fn halt(&mut self, agent: AgentId, agents: &mut AgentStore) -> MobilityResult<()> {
        let state = self.store.states.get_mut(agent.index()).ok_or(MobilityError::UnknownAgent(agent))?;
        state.mode = MotionMode::Steered;
        state.holding = true;
        state.target_dir = Vec2::ZERO;
        state.target_speed = 0.0;
        self.store.paths.remove(&agent);
        if let Some(vel) = agents.vel.get_mut(agent.index()) {
            *vel = Vec2::ZERO;
        }
        Ok(())
    }

    /// Forget the agent's path and stop steering (death or escape).
    pub fn remove(&mut self, agent: AgentId) {
        self.store.paths.remove(&agent);
        if let Some(state) = self.store.states.get_mut(agent.index()) {
            state.mode = MotionMode::Idle;
            state.holding = false;
            state.target_speed = 0.0;
            state.idle_duration = f32::INFINITY;
        }
    }

    // ── Integration ───────────────────────────────────────────────────────

    /// Advance one agent by `dt` seconds.
    ///
    /// Reads neighbour positions from `agents` as they are at call time, so
    /// agents earlier in the tick order have already moved.
    pub fn step(
        &mut self,
        agent: AgentId,
        dt: f32,
        agents: &mut AgentStore,
        index: &mut SpatialIndex,
        obstacles: &ObstacleSet,
        rng: &mut AgentRng,
    ) -> MobilityResult<()> {
        let i = agent.index();
        if !agents.is_alive(agent) {
            return Err(MobilityError::NotAlive(agent));
        }
        let params = &self.params;
        let MobilityStore { states, paths } = &mut self.store;
        let state = states.get_mut(i).ok_or(MobilityError::UnknownAgent(agent))?;

        let pos = agents.pos[i];
        let radius = agents.radius[i];

        // 1–2. Mode update and target velocity.
        match state.mode {
            MotionMode::Idle => {
                state.idle_timer += dt;
                if state.idle_timer < state.idle_duration {
                    agents.vel[i] = Vec2::ZERO;
                    return Ok(());
                }
                state.mode = MotionMode::Wandering;
                state.target_dir = rng.unit_vector();
                state.target_speed = agents.preferred_speed[i];
                state.wander_timer = 0.0;
                state.path_time = rng.between(params.path_time.0, params.path_time.1);
            }
            MotionMode::Wandering => {
                state.wander_timer += dt;
                if rng.gen_bool((params.idle_probability * dt) as f64) {
                    state.mode = MotionMode::Idle;
                    state.idle_timer = 0.0;
                    state.idle_duration = rng.between(params.idle_duration.0, params.idle_duration.1);
                    agents.vel[i] = Vec2::ZERO;
                    return Ok(());
                }
                if state.wander_timer >= state.path_time {
                    state.wander_timer = 0.0;
                    state.path_time = rng.between(params.path_time.0, params.path_time.1);
                    state.target_dir = rng.unit_vector();
                }
            }
            MotionMode::FollowingPath => {
                let reach = (agents.vel[i].length() * dt).max(0.5 * radius);
                let next = match paths.get_mut(&agent) {
                    Some(path) => {
                        while path.front().is_some_and(|w| w.distance(pos) < reach) {
                            path.pop_front();
                        }
                        path.front()
                    }
                    None => None,
                };
                match next {
                    Some(waypoint) => {
                        state.target_dir = (waypoint - pos).normalize_or_zero();
                        state.target_speed = state.path_speed;
                    }
                    None => {
                        // Path exhausted: keep the last heading until the
                        // behavior layer steers again.
                        paths.remove(&agent);
                        state.mode = MotionMode::Steered;
                    }
                }
            }
            MotionMode::Steered if state.holding => {
                agents.vel[i] = Vec2::ZERO;
                return Ok(());
            }
            MotionMode::Steered => {}
        }
        let target_vel = state.target_velocity();

        // 3. Agent avoidance.
        let mut f_agents = Vec2::ZERO;
        let space = params.personal_space;
        for other in index.query_radius(pos, space) {
            if other == agent || !agents.is_alive(other) {
                continue;
            }
            let away = pos - agents.pos[other.index()];
            let d = away.length();
            if d >= space {
                continue;
            }
            if d < COINCIDENT_EPS {
                f_agents += rng.unit_vector() * params.coincident_push;
            } else {
                let k = space / d - 1.0;
                f_agents += away / d * (params.agent_avoid_strength * k * k);
            }
        }

        // 4. Wall and world-edge avoidance.
        let margin = radius * params.wall_margin_factor;
        let mut f_walls = Vec2::ZERO;
        for wall in obstacles.near(pos, margin) {
            let away = pos - wall.nearest_point(pos);
            let d = away.length();
            if d >= margin {
                continue;
            }
            let dir = if d < COINCIDENT_EPS { (pos - wall.center()).normalize_or_zero() } else { away / d };
            let k = margin / d.max(COINCIDENT_EPS) - 1.0;
            f_walls += dir * (params.wall_strength * k * k);
        }
        f_walls += boundary_force(obstacles.bounds(), pos, margin, params.boundary_strength);

        let force = (f_agents + f_walls * params.wall_weight).clamp_length(params.max_force);

        // 5–7. Integrate, blend toward the target, clamp.
        let mass = agents.mass[i].max(COINCIDENT_EPS);
        let mut vel = agents.vel[i] + force / mass * dt;
        let blend = (params.steer_gain * dt).min(1.0);
        vel += (target_vel - vel) * blend;
        vel = vel.clamp_length(agents.max_speed[i]);
        if !vel.is_finite() {
            vel = Vec2::ZERO;
        }

        // 8. Tentative move, kept inside the world.
        let bounds = obstacles.bounds();
        let mut new_pos = bounds.clamp_inside(pos + vel * dt, radius);

        // Wall collision over the whole swept move, so a large `dt` cannot
        // carry the disk across a thin wall: strip the inward normal
        // component, bounce a little, and give up on the move if that still
        // collides.
        let r2 = radius * radius;
        let collides = |to: Vec2| obstacles.disk_hits_wall(to, radius) || obstacles.sweep_hits_wall(pos, to, radius);
        if collides(new_pos) {
            let swept = Rect::new(pos, new_pos).inflate(radius);
            for wall in obstacles.in_box(swept) {
                if segment_rect_distance_sq(pos, new_pos, wall) >= r2 {
                    continue;
                }
                let mut normal = (pos - wall.nearest_point(pos)).normalize_or_zero();
                if normal == Vec2::ZERO {
                    normal = (pos - wall.center()).normalize_or_zero();
                }
                let vn = vel.dot(normal);
                if vn < 0.0 {
                    vel -= normal * (vn * (1.0 + params.bounce));
                }
            }
            new_pos = bounds.clamp_inside(pos + vel * dt, radius);
            if collides(new_pos) {
                new_pos = pos;
                vel = Vec2::ZERO;
            }
        }

        // Agent-agent: refuse any move that closes in on an overlapping
        // neighbour.
        if new_pos != pos && blocked_by_agent(agent, pos, new_pos, radius, agents, index) {
            new_pos = pos;
            vel = Vec2::ZERO;
        }

        // 9. Commit.
        agents.vel[i] = vel;
        if vel.length_sq() > COINCIDENT_EPS {
            agents.heading[i] = vel.angle();
        }
        if new_pos != pos {
            agents.pos[i] = new_pos;
            index.update(agent, new_pos);
        }
        Ok(())
    }
}

/// Cubic repulsion from the four world edges.
fn boundary_force(bounds: Rect, pos: Vec2, margin: f32, strength: f32) -> Vec2 {
    if !(margin > 0.0) {
        return Vec2::ZERO;
    }
    let push = |d: f32| -> f32 {
        if d < margin {
            let k = (margin - d.max(0.0)) / margin;
            strength * k * k * k
        } else {
            0.0
        }
    };
    Vec2::new(
        push(pos.x - bounds.min.x) - push(bounds.max.x - pos.x),
        push(pos.y - bounds.min.y) - push(bounds.max.y - pos.y),
    )
}

fn blocked_by_agent(
    agent: AgentId,
    from: Vec2,
    to: Vec2,
    radius: f32,
    agents: &AgentStore,
    index: &SpatialIndex,
) -> bool {
    index.query_radius(to, radius + agents.max_radius()).into_iter().any(|other| {
        if other == agent || !agents.is_alive(other) {
            return false;
        }
        let p = agents.pos[other.index()];
        let min_sep = radius + agents.radius[other.index()];
        let d_new = to.distance(p);
        d_new < min_sep && d_new < from.distance(p)
    })
}
