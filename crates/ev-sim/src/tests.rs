//! Integration tests for ev-sim.

use ev_agent::{AgentSpec, Role, StudentMode};
use ev_behavior::{PassiveBehavior, SchoolBehavior};
use ev_core::{AgentId, AgentKind, RemovalReason, ShotEvent, SimConfig, Tick, Vec2};
use ev_spatial::GridPathfinder;

use crate::{Outcome, Sim, SimBuilder, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn empty_config(seed: u64) -> SimConfig {
    SimConfig {
        seed,
        student_count:      0,
        staff_count:        0,
        armed_staff_count:  0,
        time_limit_secs:    None,
        stop_when_resolved: false,
        ..SimConfig::default()
    }
}

fn small_config(students: usize, staff: usize) -> SimConfig {
    SimConfig {
        student_count:     students,
        staff_count:       staff,
        armed_staff_count: 1,
        ..SimConfig::default()
    }
}

fn left_exit() -> ev_core::Rect {
    ev_core::Rect::from_xywh(0.0, 280.0, 10.0, 40.0)
}

fn right_exit() -> ev_core::Rect {
    ev_core::Rect::from_xywh(790.0, 280.0, 10.0, 40.0)
}

#[derive(Default)]
struct Recorder {
    ticks:   usize,
    shots:   Vec<ShotEvent>,
    removed: Vec<(AgentId, AgentKind, RemovalReason)>,
    ended:   Option<(Tick, Outcome)>,
}

impl SimObserver for Recorder {
    fn on_tick_end(&mut self, _tick: Tick, _live: usize) {
        self.ticks += 1;
    }

    fn on_shot(&mut self, shot: &ShotEvent) {
        self.shots.push(*shot);
    }

    fn on_agent_removed(&mut self, agent: AgentId, kind: AgentKind, reason: RemovalReason) {
        self.removed.push((agent, kind, reason));
    }

    fn on_sim_end(&mut self, final_tick: Tick, outcome: &Outcome) {
        self.ended = Some((final_tick, *outcome));
    }
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use ev_core::Rect;

    use super::*;
    use crate::SimError;

    #[test]
    fn spawns_configured_population() {
        let sim = SimBuilder::school(small_config(20, 3)).build().unwrap();
        let agents = sim.agents();
        assert_eq!(agents.count, 23);
        let students = agents.agent_ids().filter(|a| agents.kind[a.index()] == AgentKind::Student).count();
        assert_eq!(students, 20);
        let armed = agents.agent_ids().filter(|a| agents.armed[a.index()]).count();
        assert_eq!(armed, 1);
    }

    #[test]
    fn spawned_agents_avoid_walls_and_each_other() {
        let wall = Rect::from_xywh(200.0, 100.0, 400.0, 300.0);
        let sim = SimBuilder::school(small_config(60, 5)).walls([wall]).build().unwrap();
        let a = sim.agents();
        for i in 0..a.count {
            assert!(!wall.intersects_circle(a.pos[i], a.radius[i]), "agent {i} spawned inside the wall");
            for j in i + 1..a.count {
                let min = a.radius[i] + a.radius[j];
                assert!(a.pos[i].distance(a.pos[j]) >= min - 1e-3, "agents {i} and {j} overlap");
            }
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimConfig { world_width: 0.0, ..SimConfig::default() };
        let result = SimBuilder::school(config).build();
        assert!(matches!(result, Err(SimError::Config(_))));

        let config = SimConfig { spatial_cell_size: -1.0, ..SimConfig::default() };
        assert!(SimBuilder::school(config).build().is_err());
    }

    #[test]
    fn armed_count_is_capped_by_staff_count() {
        let config = SimConfig { armed_staff_count: 10, ..small_config(0, 3) };
        let sim = SimBuilder::school(config).build().unwrap();
        assert_eq!(sim.agents().armed.iter().filter(|&&a| a).count(), 3);
    }

    #[test]
    fn explicit_agents_get_the_first_handles() {
        let spec = AgentSpec::new(AgentKind::Staff, Vec2::new(100.0, 100.0)).armed(true);
        let sim = SimBuilder::school(small_config(5, 0)).agent(spec).build().unwrap();
        let view = sim.agent_view(AgentId(0)).unwrap();
        assert_eq!(view.kind, AgentKind::Staff);
        assert_eq!(view.pos, Vec2::new(100.0, 100.0));
        assert!(view.armed);
        assert_eq!(sim.agents().count, 6);
    }
}

// ── Stepping and termination ──────────────────────────────────────────────────

#[cfg(test)]
mod step_tests {
    use super::*;
    use crate::{SimError, Termination};

    #[test]
    fn negative_dt_is_an_error() {
        let mut sim = SimBuilder::school(small_config(2, 0)).build().unwrap();
        assert!(matches!(sim.step(-0.1), Err(SimError::NegativeDelta(_))));
        assert_eq!(sim.clock().current_tick, Tick(0));
        sim.step(0.0).unwrap();
        assert_eq!(sim.clock().current_tick, Tick(1));
    }

    #[test]
    fn zero_agents_resolve_immediately() {
        let mut sim = SimBuilder::school(small_config(0, 0)).build().unwrap();
        sim.step(0.1).unwrap();
        assert_eq!(sim.termination(), Some(Termination::Resolved));
    }

    #[test]
    fn time_limit_stops_the_run() {
        let config = SimConfig { time_limit_secs: Some(1.0), ..small_config(5, 1) };
        let mut sim = SimBuilder::new(config, PassiveBehavior, GridPathfinder::default()).build().unwrap();
        let mut rec = Recorder::default();
        sim.run_until_done(0.1, &mut rec).unwrap();
        assert_eq!(sim.termination(), Some(Termination::TimeLimit));
        assert!((sim.clock().now() - 1.0).abs() < 0.11);
        assert_eq!(rec.ticks as u64, sim.clock().current_tick.0);
        assert!(rec.ended.is_some());
    }

    #[test]
    fn terminated_sim_does_not_advance() {
        let mut sim = SimBuilder::school(small_config(0, 0)).build().unwrap();
        sim.step(0.1).unwrap();
        assert!(sim.is_terminated());
        let tick = sim.clock().current_tick;
        sim.step(0.1).unwrap();
        assert_eq!(sim.clock().current_tick, tick);
    }

    #[test]
    fn run_until_done_rejects_zero_dt() {
        let mut sim = SimBuilder::school(small_config(1, 0)).build().unwrap();
        assert!(sim.run_until_done(0.0, &mut crate::NoopObserver).is_err());
    }

    #[test]
    fn same_seed_same_trajectories() {
        let run = || {
            let mut sim = SimBuilder::school(small_config(30, 4)).build().unwrap();
            sim.force_spawn_shooter();
            for _ in 0..100 {
                sim.step(0.05).unwrap();
            }
            (sim.agents().pos.clone(), sim.agents().alive.clone(), *sim.outcome())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn shot_events_expire_after_ttl() {
        let mut sim = SimBuilder::school(empty_config(1)).build().unwrap();
        sim.shots.push(ShotEvent {
            shooter: AgentId(0),
            origin:  Vec2::new(10.0, 10.0),
            target:  Vec2::new(20.0, 10.0),
            time:    0.0,
            hit:     false,
        });
        sim.step(0.5).unwrap();
        assert_eq!(sim.shots().len(), 1);
        sim.step(0.6).unwrap();
        assert!(sim.shots().is_empty());
    }
}

// ── Shooting ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod shooting_tests {
    use super::*;

    /// A shooter with a clear shot at a staff member 50 units away.
    fn duel(seed: u64) -> (Sim<SchoolBehavior, GridPathfinder>, AgentId, AgentId) {
        let mut sim = SimBuilder::school(empty_config(seed))
            .agent(AgentSpec::new(AgentKind::Student, Vec2::new(300.0, 300.0)))
            .agent(AgentSpec::new(AgentKind::Staff, Vec2::new(350.0, 300.0)))
            .build()
            .unwrap();
        let (shooter, target) = (AgentId(0), AgentId(1));
        assert!(sim.promote_to_shooter(shooter));
        (sim, shooter, target)
    }

    #[test]
    fn hit_rate_matches_hit_probability() {
        const TRIALS: usize = 10_000;
        let mut hits = 0usize;
        for trial in 0..TRIALS {
            let (mut sim, _, target) = duel(trial as u64);
            sim.step(0.1).unwrap();
            assert_eq!(sim.shots().len(), 1, "trial {trial}: expected exactly one shot");
            let shot = sim.shots()[0];
            assert_eq!(shot.hit, !sim.agents().is_alive(target));
            hits += usize::from(shot.hit);
        }
        // p = 0.3: mean 3000, sd ≈ 45.8; ±210 is about 4.6 sd.
        assert!((2790..=3210).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn hit_removes_target_and_clears_lock() {
        let (mut sim, shooter, target) = duel(3);
        sim.config.behavior.hit_probability = 1.0;
        let mut rec = Recorder::default();
        sim.step_with(0.1, &mut rec).unwrap();

        assert!(!sim.agents().is_alive(target));
        assert!(!sim.index.contains(target));
        assert_eq!(sim.agents().role[shooter.index()].locked_target(), None);
        assert_eq!(rec.shots.len(), 1);
        assert_eq!(rec.removed, vec![(target, AgentKind::Staff, RemovalReason::Died)]);
        assert_eq!(sim.outcome().dead_staff, 1);
        assert_eq!(sim.outcome().hits, 1);
    }

    #[test]
    fn miss_keeps_target_and_lock() {
        let (mut sim, shooter, target) = duel(3);
        sim.config.behavior.hit_probability = 0.0;
        sim.step(0.1).unwrap();
        assert!(sim.agents().is_alive(target));
        assert_eq!(sim.agents().role[shooter.index()].locked_target(), Some(target));
        assert_eq!(sim.outcome().shots_fired, 1);
        // Cooldown: no second shot on the next short tick.
        sim.step(0.1).unwrap();
        assert_eq!(sim.outcome().shots_fired, 1);
    }

    #[test]
    fn engaging_shooter_stands_still() {
        let (mut sim, shooter, target) = duel(5);
        sim.config.behavior.hit_probability = 0.0;
        let i = shooter.index();
        sim.agents.vel[i] = Vec2::new(60.0, 0.0);
        let start = sim.agents().pos[i];

        sim.step(0.1).unwrap();
        assert_eq!(sim.outcome().shots_fired, 1);
        assert_eq!(sim.agents().vel[i], Vec2::ZERO);
        assert_eq!(sim.agents().pos[i], start);

        // Still holding position while the cooldown runs.
        sim.step(0.1).unwrap();
        assert!(sim.agents().is_alive(target));
        assert_eq!(sim.agents().vel[i], Vec2::ZERO);
        assert_eq!(sim.agents().pos[i], start);
    }

    #[test]
    fn nearby_student_hears_the_shot() {
        let (mut sim, _, _) = duel(9);
        sim.config.behavior.hit_probability = 0.0;
        // Out of sight range, inside hearing range.
        let listener = sim.place(AgentSpec::new(AgentKind::Student, Vec2::new(300.0, 580.0)));
        sim.config.behavior.awareness_radius = 10.0;
        sim.config.behavior.scream_enabled = false;
        sim.step(0.1).unwrap();
        sim.step(0.1).unwrap();
        assert!(sim.agents().role[listener.index()].is_emergency());
    }
}

// ── Evacuation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod evacuation_tests {
    use super::*;
    use crate::Termination;

    #[test]
    fn emergency_student_on_exit_escapes_within_one_tick() {
        let mut sim = SimBuilder::school(empty_config(4))
            .exits([left_exit()])
            .agent(AgentSpec::new(AgentKind::Student, Vec2::new(16.0, 300.0)).radius(5.0))
            .build()
            .unwrap();
        let s = AgentId(0);
        sim.agents.role[s.index()] = Role::Student(StudentMode::Emergency { exit: Some(0) });
        let mut rec = Recorder::default();
        sim.step_with(0.05, &mut rec).unwrap();

        assert!(!sim.agents().is_alive(s));
        assert_eq!(sim.outcome().escaped_students, 1);
        assert_eq!(rec.removed, vec![(s, AgentKind::Student, RemovalReason::Escaped)]);
        assert!(sim.nearby_agents(Vec2::new(16.0, 300.0), 50.0).is_empty());
    }

    #[test]
    fn forced_evacuation_empties_the_school() {
        let config = SimConfig { time_limit_secs: Some(120.0), ..small_config(10, 0) };
        let mut sim = SimBuilder::school(config).exits([left_exit(), right_exit()]).build().unwrap();
        assert_eq!(sim.force_evacuate_all().unwrap(), 10);
        assert!(sim.live_agents().all(|a| sim.agents().role[a.index()].is_emergency()));

        let outcome = sim.run_until_done(0.05, &mut crate::NoopObserver).unwrap();
        assert_eq!(sim.termination(), Some(Termination::Resolved));
        assert_eq!(outcome.escaped_students, 10);
        assert_eq!(sim.live_agents().count(), 0);
    }

    #[test]
    fn evacuation_without_exits_keeps_students_wandering() {
        let config = SimConfig { time_limit_secs: Some(2.0), ..small_config(5, 0) };
        let mut sim = SimBuilder::school(config).build().unwrap();
        assert_eq!(sim.force_evacuate_all().unwrap(), 5);
        sim.run_until_done(0.1, &mut crate::NoopObserver).unwrap();
        assert_eq!(sim.termination(), Some(Termination::TimeLimit));
        assert_eq!(sim.live_agents().count(), 5);
        assert!(sim
            .live_agents()
            .all(|a| sim.agents().role[a.index()] == Role::Student(StudentMode::Emergency { exit: None })));
    }
}

// ── Triggers ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod trigger_tests {
    use super::*;

    #[test]
    fn force_spawn_shooter_promotes_a_student() {
        let mut sim = SimBuilder::school(small_config(5, 2)).build().unwrap();
        let shooter = sim.force_spawn_shooter().unwrap();
        assert_eq!(sim.agents().kind[shooter.index()], AgentKind::Student);
        assert!(sim.agents().is_shooter(shooter));
        assert!(sim.agents().armed[shooter.index()]);
        assert_eq!(sim.outcome().shooters_spawned, 1);
    }

    #[test]
    fn force_spawn_shooter_needs_a_student() {
        let mut sim = SimBuilder::school(small_config(0, 3)).build().unwrap();
        assert_eq!(sim.force_spawn_shooter(), None);
        assert!(!sim.promote_to_shooter(AgentId(0)));
    }

    #[test]
    fn emergence_roll_promotes_after_interval() {
        let config = SimConfig {
            shooter_emergence_probability:   1.0,
            shooter_emergence_interval_secs: 0.5,
            ..small_config(5, 0)
        };
        let mut sim = SimBuilder::school(config).build().unwrap();
        for _ in 0..4 {
            sim.step(0.1).unwrap();
        }
        assert_eq!(sim.outcome().shooters_spawned, 0);
        sim.step(0.1).unwrap();
        assert_eq!(sim.outcome().shooters_spawned, 1);
    }

    #[test]
    fn add_students_and_staff() {
        let mut sim = SimBuilder::school(small_config(0, 0)).build().unwrap();
        let students = sim.add_students(4);
        let staff = sim.add_staff(2);
        assert_eq!(students.len(), 4);
        assert_eq!(staff.len(), 2);
        assert_eq!(sim.live_agents().count(), 6);
        for id in staff {
            assert_eq!(sim.agents().kind[id.index()], AgentKind::Staff);
        }
        // Newly added agents are indexed.
        let p = sim.agents().pos[students[0].index()];
        assert!(sim.nearby_agents(p, 1.0).contains(&students[0]));
    }

    #[test]
    fn stealing_moves_the_weapon() {
        let mut sim = SimBuilder::school(empty_config(11))
            .agent(AgentSpec::new(AgentKind::Student, Vec2::new(300.0, 300.0)))
            .agent(AgentSpec::new(AgentKind::Staff, Vec2::new(315.0, 300.0)).armed(true))
            .build()
            .unwrap();
        sim.config.behavior.steal_rate = 1.0e6;
        sim.step(0.1).unwrap();

        let (thief, victim) = (AgentId(0), AgentId(1));
        assert!(sim.agents().is_shooter(thief));
        assert!(sim.agents().armed[thief.index()]);
        assert!(!sim.agents().armed[victim.index()]);
        assert_eq!(sim.outcome().weapons_stolen, 1);
    }
}
