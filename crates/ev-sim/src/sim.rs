//! The `Sim` struct, its tick loop, triggers and queries.

use ev_agent::{AgentRngs, AgentSpec, AgentStore, AgentView, Role, ShooterState, StudentMode};
use ev_behavior::{exit_reached, start_evacuation, BehaviorModel, Intent, SimContext};
use ev_core::{AgentId, AgentKind, Rect, RemovalReason, ShotEvent, SimClock, SimConfig, SimRng, Tick, Vec2};
use ev_mobility::{MobilityEngine, MobilityStore};
use ev_spatial::{has_line_of_sight, ObstacleSet, Planner, SpatialIndex};
use tracing::{debug, info, warn};

use crate::{NoopObserver, Outcome, SimError, SimObserver, SimResult, Termination};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation world.
///
/// `Sim<B, P>` owns every piece of shared state: agents, obstacles, exits,
/// the spatial index, the mobility engine and the shot log.  Behavior and
/// motion code only ever see narrow views (`SimContext`, explicit `&mut`
/// arguments).
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<B: BehaviorModel, P: Planner> {
    pub(crate) config: SimConfig,
    pub(crate) clock: SimClock,

    /// SoA agent state.  Handles are never reused; removed agents stay in
    /// the arrays with `alive = false`.
    pub(crate) agents: AgentStore,
    pub(crate) rngs: AgentRngs,
    /// World-level randomness: roster shuffle, emergence, spawning.
    pub(crate) rng: SimRng,

    pub(crate) obstacles: ObstacleSet,
    pub(crate) exits: Vec<Rect>,
    /// Doors are recorded for consumers but do not block movement.
    pub(crate) doors: Vec<Rect>,
    /// Live agents only.
    pub(crate) index: SpatialIndex,

    pub(crate) mobility: MobilityEngine<P>,
    pub(crate) behavior: B,

    /// Shots fired within the last `shot_event_ttl_secs`, oldest first.
    pub(crate) shots: Vec<ShotEvent>,
    pub(crate) outcome: Outcome,
    pub(crate) termination: Option<Termination>,
    /// Seconds since the last emergence roll.
    pub(crate) emergence_timer: f32,
}

impl<B: BehaviorModel, P: Planner> Sim<B, P> {
    // ── Stepping ──────────────────────────────────────────────────────────

    /// Advance the world by `dt` simulated seconds.
    ///
    /// Does nothing once the run has terminated.  `dt` is not clamped; a
    /// negative value is rejected.
    pub fn step(&mut self, dt: f32) -> SimResult<()> {
        self.step_with(dt, &mut NoopObserver)
    }

    /// [`step`](Self::step) with observer callbacks.
    pub fn step_with<O: SimObserver>(&mut self, dt: f32, observer: &mut O) -> SimResult<()> {
        if !(dt >= 0.0) {
            return Err(SimError::NegativeDelta(dt));
        }
        if self.termination.is_some() {
            return Ok(());
        }

        let tick = self.clock.current_tick;
        observer.on_tick_start(tick);

        self.clock.advance(dt);
        let now = self.clock.now();
        let ttl = self.config.shot_event_ttl_secs as f64;
        self.shots.retain(|s| s.age(now) <= ttl);

        self.roll_emergence(dt);

        let mut order: Vec<AgentId> = self.agents.live_ids().collect();
        self.rng.shuffle(&mut order);
        for agent in order {
            // Shot or escaped earlier in this tick.
            if !self.agents.is_alive(agent) {
                continue;
            }
            self.update_agent(agent, tick, now, dt, observer)?;
        }

        observer.on_tick_end(tick, self.agents.live_count());
        self.check_termination(observer);
        Ok(())
    }

    /// Step until an end condition is met and return the final tallies.
    ///
    /// Never returns if the config has no time limit and the run never
    /// resolves.
    pub fn run_until_done<O: SimObserver>(&mut self, dt: f32, observer: &mut O) -> SimResult<Outcome> {
        if !(dt > 0.0) {
            return Err(SimError::Config(format!("run_until_done needs a positive time step, got {dt}")));
        }
        while self.termination.is_none() {
            self.step_with(dt, observer)?;
        }
        Ok(self.outcome)
    }

    fn update_agent<O: SimObserver>(
        &mut self,
        agent:    AgentId,
        tick:     Tick,
        now:      f64,
        dt:       f32,
        observer: &mut O,
    ) -> SimResult<()> {
        let i = agent.index();

        // Decide.  The role is copied out so the context can borrow the
        // store immutably while the model rewrites it.
        let mut role = self.agents.role[i];
        let intents = {
            let ctx = SimContext {
                tick,
                now,
                dt,
                agents:    &self.agents,
                index:     &self.index,
                obstacles: &self.obstacles,
                exits:     &self.exits,
                shots:     &self.shots,
                mobility:  &self.mobility.store,
                params:    &self.config.behavior,
            };
            self.behavior.decide(agent, &mut role, &ctx, self.rngs.get_mut(agent))
        };
        self.agents.role[i] = role;

        for intent in intents {
            self.apply_intent(agent, intent, now, observer)?;
            if !self.agents.is_alive(agent) {
                return Ok(());
            }
        }

        self.mobility.step(agent, dt, &mut self.agents, &mut self.index, &self.obstacles, self.rngs.get_mut(agent))?;

        if self.agents.role[i].is_emergency()
            && exit_reached(&self.exits, self.agents.pos[i], self.agents.radius[i], self.config.behavior.exit_inflation)
                .is_some()
        {
            self.remove_agent(agent, RemovalReason::Escaped, observer);
        }
        Ok(())
    }

    // ── Intent application ────────────────────────────────────────────────

    fn apply_intent<O: SimObserver>(
        &mut self,
        agent:    AgentId,
        intent:   Intent,
        now:      f64,
        observer: &mut O,
    ) -> SimResult<()> {
        let i = agent.index();
        match intent {
            Intent::Steer { direction, speed } => {
                self.mobility.steer(agent, direction, speed)?;
                if direction.length_sq() > 0.0 {
                    self.agents.heading[i] = direction.angle();
                }
            }

            Intent::Halt { facing } => {
                self.mobility.halt(agent, &mut self.agents)?;
                if facing.length_sq() > 0.0 {
                    self.agents.heading[i] = facing.angle();
                }
            }

            Intent::TravelTo { goal, speed } => {
                let from = self.agents.pos[i];
                let waypoints = self.mobility.travel_to(agent, from, goal, speed, &self.obstacles)?;
                debug!(agent = %agent, waypoints, %goal, "travelling");
            }

            Intent::Shoot { target, hit } => self.resolve_shot(agent, target, hit, now, observer),

            Intent::StealWeapon { victim } => {
                let v = victim.index();
                if self.agents.is_alive(victim) && self.agents.armed.get(v).copied().unwrap_or(false) {
                    self.agents.armed[v] = false;
                    self.agents.armed[i] = true;
                    self.outcome.weapons_stolen += 1;
                    info!(agent = %agent, victim = %victim, tick = %self.clock.current_tick, "weapon stolen");
                } else if self.agents.role[i].is_shooter() && !self.agents.armed[i] {
                    // Victim gone or already disarmed: the theft never happened.
                    self.agents.role[i] = Role::Student(StudentMode::Normal);
                }
            }

            Intent::Escape => self.remove_agent(agent, RemovalReason::Escaped, observer),
        }
        Ok(())
    }

    fn resolve_shot<O: SimObserver>(
        &mut self,
        shooter:  AgentId,
        target:   AgentId,
        hit:      bool,
        now:      f64,
        observer: &mut O,
    ) {
        if !self.agents.is_alive(target) {
            return;
        }
        let origin = self.agents.pos[shooter.index()];
        let aim = self.agents.pos[target.index()];
        if !has_line_of_sight(origin, aim, &self.obstacles) {
            debug!(shooter = %shooter, target = %target, "shot held: no line of sight");
            return;
        }

        let shot = ShotEvent { shooter, origin, target: aim, time: now, hit };
        self.shots.push(shot);
        self.outcome.shots_fired += 1;
        observer.on_shot(&shot);
        debug!(shooter = %shooter, target = %target, hit, "shot fired");

        if hit {
            self.outcome.hits += 1;
            if let Some(state) = self.agents.role[shooter.index()].shooter_mut() {
                if state.locked_target == Some(target) {
                    state.release();
                }
            }
            self.remove_agent(target, RemovalReason::Died, observer);
        }
    }

    fn remove_agent<O: SimObserver>(&mut self, agent: AgentId, reason: RemovalReason, observer: &mut O) {
        if !self.agents.kill(agent) {
            return;
        }
        self.mobility.remove(agent);
        self.index.remove(agent);

        let kind = self.agents.kind[agent.index()];
        self.outcome.record_removal(kind, reason);
        info!(agent = %agent, %kind, %reason, tick = %self.clock.current_tick, "agent removed");
        observer.on_agent_removed(agent, kind, reason);
    }

    // ── World triggers ────────────────────────────────────────────────────

    fn roll_emergence(&mut self, dt: f32) {
        let p = self.config.shooter_emergence_probability;
        if !(p > 0.0) {
            return;
        }
        self.emergence_timer += dt;
        if self.emergence_timer < self.config.shooter_emergence_interval_secs {
            return;
        }
        // A successful roll with nobody to promote is retried next tick.
        if self.rng.gen_bool(p as f64) && self.force_spawn_shooter().is_none() {
            return;
        }
        self.emergence_timer = 0.0;
    }

    /// Promote a random normal student to shooter.  Returns `None` if there
    /// is no candidate.
    pub fn force_spawn_shooter(&mut self) -> Option<AgentId> {
        let candidates: Vec<AgentId> = self
            .agents
            .live_ids()
            .filter(|a| self.agents.role[a.index()].is_normal_student())
            .collect();
        let agent = *self.rng.choose(&candidates)?;
        self.promote_to_shooter(agent).then_some(agent)
    }

    /// Arm `agent` and switch it to the shooter role.
    ///
    /// Returns `false` for dead agents, staff, and existing shooters.
    pub fn promote_to_shooter(&mut self, agent: AgentId) -> bool {
        let i = agent.index();
        if !self.agents.is_alive(agent) || self.agents.kind[i] != AgentKind::Student || self.agents.is_shooter(agent) {
            return false;
        }
        let heading = self.rngs.get_mut(agent).angle();
        self.agents.role[i] = Role::Student(StudentMode::Shooter(ShooterState::new(self.agents.pos[i], heading)));
        self.agents.armed[i] = true;
        self.outcome.shooters_spawned += 1;
        info!(agent = %agent, tick = %self.clock.current_tick, "shooter emerged");
        true
    }

    /// Put every normal student into evacuation.  Returns how many switched.
    pub fn force_evacuate_all(&mut self) -> SimResult<usize> {
        let now = self.clock.now();
        let ids: Vec<AgentId> = self.agents.live_ids().collect();
        let mut count = 0;
        for agent in ids {
            let i = agent.index();
            let mut role = self.agents.role[i];
            if !role.is_normal_student() {
                continue;
            }
            let intent = start_evacuation(
                &mut role,
                self.agents.pos[i],
                self.agents.max_speed[i],
                &self.exits,
                &self.config.behavior,
            );
            self.agents.role[i] = role;
            count += 1;
            if let Some(intent) = intent {
                self.apply_intent(agent, intent, now, &mut NoopObserver)?;
            }
        }
        info!(count, tick = %self.clock.current_tick, "evacuation ordered");
        Ok(count)
    }

    /// Spawn up to `n` students at random free spots.
    pub fn add_students(&mut self, n: usize) -> Vec<AgentId> {
        let added: Vec<AgentId> = (0..n).filter_map(|_| self.spawn(AgentKind::Student, false)).collect();
        info!(requested = n, added = added.len(), "students added");
        added
    }

    /// Spawn up to `n` staff; each is armed with `armed_staff_probability`.
    pub fn add_staff(&mut self, n: usize) -> Vec<AgentId> {
        let p = self.config.spawn.armed_staff_probability as f64;
        let added: Vec<AgentId> = (0..n)
            .filter_map(|_| {
                let armed = self.rng.gen_bool(p);
                self.spawn(AgentKind::Staff, armed)
            })
            .collect();
        info!(requested = n, added = added.len(), "staff added");
        added
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Add an agent exactly as described, without any overlap checks.
    pub fn place(&mut self, spec: AgentSpec) -> AgentId {
        let id = self.agents.push(spec);
        self.rngs.push(id);
        self.index.insert(id, spec.pos);
        self.mobility.add_agent(id, spec.heading, spec.preferred_speed, self.rngs.get_mut(id));
        id
    }

    /// Sample an agent of `kind` and rejection-sample a free position for
    /// it.  Returns `None` after `max_spawn_attempts` misses.
    pub(crate) fn spawn(&mut self, kind: AgentKind, armed: bool) -> Option<AgentId> {
        let attempts = self.config.spawn.max_spawn_attempts.max(1);
        let spec = AgentSpec::sample(kind, Vec2::ZERO, &self.config.spawn, &mut self.rng).armed(armed);
        let bounds = self.obstacles.bounds();
        let (lo, hi) = (bounds.min + Vec2::new(spec.radius, spec.radius), bounds.max - Vec2::new(spec.radius, spec.radius));
        if lo.x > hi.x || lo.y > hi.y {
            warn!(%kind, radius = spec.radius, "world too small to spawn agent");
            return None;
        }

        for _ in 0..attempts {
            let pos = Vec2::new(self.rng.gen_range(lo.x..=hi.x), self.rng.gen_range(lo.y..=hi.y));
            if self.is_free_spot(pos, spec.radius) {
                return Some(self.place(spec.at(pos)));
            }
        }
        warn!(%kind, attempts, "no free spot found for new agent");
        None
    }

    fn is_free_spot(&self, pos: Vec2, radius: f32) -> bool {
        if self.obstacles.disk_hits_wall(pos, radius) || self.exits.iter().any(|e| e.intersects_circle(pos, radius)) {
            return false;
        }
        self.index
            .query_radius(pos, radius + self.agents.max_radius())
            .into_iter()
            .all(|other| {
                let min = radius + self.agents.radius[other.index()];
                self.agents.pos[other.index()].distance_sq(pos) >= min * min
            })
    }

    // ── Termination ───────────────────────────────────────────────────────

    /// `true` when no live student remains who is not a shooter.
    pub fn is_resolved(&self) -> bool {
        !self
            .agents
            .live_ids()
            .any(|a| self.agents.kind[a.index()] == AgentKind::Student && !self.agents.is_shooter(a))
    }

    fn check_termination<O: SimObserver>(&mut self, observer: &mut O) {
        let reason = if self.config.time_limit_secs.is_some_and(|limit| self.clock.now() >= limit) {
            Some(Termination::TimeLimit)
        } else if self.config.stop_when_resolved && self.is_resolved() {
            Some(Termination::Resolved)
        } else {
            None
        };
        let Some(reason) = reason else { return };

        self.termination = Some(reason);
        info!(
            %reason,
            clock = %self.clock,
            escaped = self.outcome.escaped(),
            dead = self.outcome.dead(),
            shots = self.outcome.shots_fired,
            "simulation ended"
        );
        observer.on_sim_end(self.clock.current_tick, &self.outcome);
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn agent_view(&self, agent: AgentId) -> Option<AgentView> {
        self.agents.view(agent)
    }

    pub fn live_agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.live_ids()
    }

    /// Live agents within `r` of `center` (exact distance).
    pub fn nearby_agents(&self, center: Vec2, r: f32) -> Vec<AgentId> {
        let r2 = r * r;
        self.index
            .query_radius(center, r)
            .into_iter()
            .filter(|&a| self.agents.pos[a.index()].distance_sq(center) <= r2)
            .collect()
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    pub fn exits(&self) -> &[Rect] {
        &self.exits
    }

    pub fn doors(&self) -> &[Rect] {
        &self.doors
    }

    pub fn shots(&self) -> &[ShotEvent] {
        &self.shots
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Motion states and active paths, for renderers.
    pub fn mobility(&self) -> &MobilityStore {
        &self.mobility.store
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }
}
