//! Unit tests for ev-mobility.

#[cfg(test)]
mod support {
    use ev_agent::{AgentRngs, AgentSpec, AgentStore};
    use ev_core::{AgentId, AgentKind, MotionParams, Rect, Vec2};
    use ev_spatial::{GridPathfinder, ObstacleSet, SpatialIndex};

    use crate::MobilityEngine;

    /// Minimal world wiring: everything `MobilityEngine::step` needs.
    pub struct World {
        pub agents: AgentStore,
        pub rngs: AgentRngs,
        pub index: SpatialIndex,
        pub obstacles: ObstacleSet,
        pub engine: MobilityEngine<GridPathfinder>,
    }

    impl World {
        pub fn new(walls: Vec<Rect>) -> Self {
            let bounds = Rect::from_xywh(0.0, 0.0, 200.0, 200.0);
            Self {
                agents: AgentStore::new(),
                rngs: AgentRngs::new(17),
                index: SpatialIndex::new(bounds, 20.0).unwrap(),
                obstacles: ObstacleSet::new(bounds, walls),
                engine: MobilityEngine::new(GridPathfinder::default(), MotionParams::default()),
            }
        }

        pub fn spawn(&mut self, pos: Vec2, radius: f32) -> AgentId {
            let spec = AgentSpec::new(AgentKind::Student, pos).radius(radius).speeds(25.0, 70.0);
            let id = self.agents.push(spec);
            self.rngs.push(id);
            self.index.insert(id, pos);
            self.engine.add_agent(id, spec.heading, spec.preferred_speed, self.rngs.get_mut(id));
            id
        }

        pub fn tick(&mut self, dt: f32) {
            let ids: Vec<AgentId> = self.agents.live_ids().collect();
            for id in ids {
                self.engine
                    .step(id, dt, &mut self.agents, &mut self.index, &self.obstacles, self.rngs.get_mut(id))
                    .unwrap();
            }
        }

        pub fn pos(&self, id: AgentId) -> Vec2 {
            self.agents.pos[id.index()]
        }
    }
}

#[cfg(test)]
mod collisions {
    use ev_core::{Rect, Vec2};

    use super::support::World;

    const DT: f32 = 0.05;

    #[test]
    fn head_on_agents_never_overlap() {
        let mut w = World::new(vec![]);
        let a = w.spawn(Vec2::new(60.0, 100.0), 5.0);
        let b = w.spawn(Vec2::new(140.0, 100.0), 5.0);
        w.engine.steer(a, Vec2::new(1.0, 0.0), 60.0).unwrap();
        w.engine.steer(b, Vec2::new(-1.0, 0.0), 60.0).unwrap();
        for _ in 0..300 {
            w.tick(DT);
            let d = w.pos(a).distance(w.pos(b));
            assert!(d >= 10.0 - 1e-3, "agents overlap: separation {d}");
        }
    }

    #[test]
    fn converging_crowd_never_overlaps() {
        let mut w = World::new(vec![]);
        let mut ids = Vec::new();
        for i in 0..6 {
            for j in 0..5 {
                ids.push(w.spawn(Vec2::new(40.0 + i as f32 * 24.0, 40.0 + j as f32 * 30.0), 5.0));
            }
        }
        let center = Vec2::new(100.0, 100.0);
        for &id in &ids {
            let dir = center - w.pos(id);
            w.engine.steer(id, dir, 50.0).unwrap();
        }
        for _ in 0..200 {
            w.tick(DT);
            for (k, &a) in ids.iter().enumerate() {
                for &b in &ids[k + 1..] {
                    let d = w.pos(a).distance(w.pos(b));
                    assert!(d >= 10.0 - 1e-3, "{a} and {b} overlap at separation {d}");
                }
            }
        }
    }

    #[test]
    fn agents_never_enter_walls() {
        let wall = Rect::from_xywh(90.0, 50.0, 20.0, 100.0);
        let mut w = World::new(vec![wall]);
        let a = w.spawn(Vec2::new(50.0, 100.0), 5.0);
        let b = w.spawn(Vec2::new(150.0, 60.0), 5.0);
        w.engine.steer(a, Vec2::new(1.0, 0.1), 70.0).unwrap();
        w.engine.steer(b, Vec2::new(-1.0, 0.5), 70.0).unwrap();
        for _ in 0..300 {
            w.tick(DT);
            for id in [a, b] {
                assert!(!wall.intersects_circle(w.pos(id), 5.0), "{id} entered the wall at {}", w.pos(id));
            }
        }
    }

    #[test]
    fn large_step_cannot_cross_thin_wall() {
        let wall = Rect::from_xywh(100.0, 0.0, 2.0, 200.0);
        let mut w = World::new(vec![wall]);
        let a = w.spawn(Vec2::new(80.0, 100.0), 3.0);
        w.engine.steer(a, Vec2::new(1.0, 0.0), 70.0).unwrap();
        w.agents.vel[a.index()] = Vec2::new(70.0, 0.0);
        for _ in 0..10 {
            w.tick(0.5);
            let p = w.pos(a);
            assert!(p.x + 3.0 <= 100.0 + 1e-3, "tunnelled through the wall to {p}");
        }
    }

    #[test]
    fn diagonal_sweep_past_corner_is_blocked() {
        // The move ends clear of the block but clips its corner on the way.
        let block = Rect::from_xywh(100.0, 100.0, 4.0, 4.0);
        let mut w = World::new(vec![block]);
        let a = w.spawn(Vec2::new(90.0, 114.0), 3.0);
        w.engine.steer(a, Vec2::new(1.0, -1.0), 70.0).unwrap();
        w.agents.vel[a.index()] = Vec2::new(40.0, -40.0);
        w.tick(0.5);
        let p = w.pos(a);
        assert!(!block.intersects_circle(p, 3.0), "ended inside the block at {p}");
        assert!(p.x <= 100.0 || p.y >= 104.0, "crossed the block corner to {p}");
    }

    #[test]
    fn halt_zeroes_velocity_at_once() {
        let mut w = World::new(vec![]);
        let a = w.spawn(Vec2::new(100.0, 100.0), 5.0);
        w.engine.steer(a, Vec2::new(1.0, 0.0), 60.0).unwrap();
        w.agents.vel[a.index()] = Vec2::new(60.0, 0.0);
        w.engine.halt(a, &mut w.agents).unwrap();
        assert_eq!(w.agents.vel[a.index()], Vec2::ZERO);
        for _ in 0..5 {
            w.tick(0.1);
        }
        assert_eq!(w.pos(a), Vec2::new(100.0, 100.0));
        assert_eq!(w.agents.vel[a.index()], Vec2::ZERO);

        // Any new steering request releases the hold.
        w.engine.steer(a, Vec2::new(1.0, 0.0), 60.0).unwrap();
        w.tick(0.1);
        assert!(w.pos(a).x > 100.0);
    }

    #[test]
    fn agents_stay_inside_world() {
        let mut w = World::new(vec![]);
        let a = w.spawn(Vec2::new(20.0, 20.0), 5.0);
        w.engine.steer(a, Vec2::new(-1.0, -1.0), 70.0).unwrap();
        for _ in 0..200 {
            w.tick(DT);
            let p = w.pos(a);
            assert!(p.x >= 5.0 - 1e-3 && p.y >= 5.0 - 1e-3, "escaped bounds at {p}");
        }
    }

    #[test]
    fn coincident_agents_separate() {
        let mut w = World::new(vec![]);
        let a = w.spawn(Vec2::new(100.0, 100.0), 5.0);
        let b = w.spawn(Vec2::new(100.0, 100.0), 5.0);
        w.engine.steer(a, Vec2::ZERO, 0.0).unwrap();
        w.engine.steer(b, Vec2::ZERO, 0.0).unwrap();
        for _ in 0..100 {
            w.tick(DT);
        }
        assert!(w.pos(a).distance(w.pos(b)) > 1.0);
    }
}

#[cfg(test)]
mod paths {
    use ev_core::{Rect, Vec2};

    use super::support::World;
    use crate::{MobilityError, MotionMode};

    const DT: f32 = 0.05;

    #[test]
    fn path_is_consumed_monotonically() {
        let mut w = World::new(vec![Rect::from_xywh(90.0, 0.0, 20.0, 150.0)]);
        let a = w.spawn(Vec2::new(20.0, 100.0), 3.0);
        let goal = Vec2::new(180.0, 100.0);
        let from = w.pos(a);
        let len = w.engine.travel_to(a, from, goal, 60.0, &w.obstacles).unwrap();
        assert!(len > 2);

        let mut previous = w.engine.store.path_len(a);
        let mut finished_at = None;
        for _ in 0..1500 {
            w.tick(DT);
            let now = w.engine.store.path_len(a);
            assert!(now <= previous, "path grew from {previous} to {now}");
            previous = now;
            if now == 0 {
                finished_at = Some(w.pos(a));
                break;
            }
        }
        let end = finished_at.expect("path never completed");
        assert!(end.distance(goal) < 10.0, "finished at {end}");
        assert_eq!(w.engine.store.states[a.index()].mode, MotionMode::Steered);
    }

    #[test]
    fn unreachable_goal_falls_back_to_direct_path() {
        let mut w = World::new(vec![Rect::from_xywh(90.0, 0.0, 20.0, 200.0)]);
        let a = w.spawn(Vec2::new(20.0, 100.0), 5.0);
        let from = w.pos(a);
        let len = w.engine.travel_to(a, from, Vec2::new(180.0, 100.0), 60.0, &w.obstacles).unwrap();
        assert_eq!(len, 1);
        assert_eq!(w.engine.store.path(a).unwrap().front(), Some(Vec2::new(180.0, 100.0)));
    }

    #[test]
    fn steering_drops_the_path() {
        let mut w = World::new(vec![]);
        let a = w.spawn(Vec2::new(20.0, 100.0), 5.0);
        let from = w.pos(a);
        w.engine.travel_to(a, from, Vec2::new(180.0, 100.0), 60.0, &w.obstacles).unwrap();
        assert!(w.engine.store.has_path(a));
        w.engine.steer(a, Vec2::new(0.0, 1.0), 30.0).unwrap();
        assert!(!w.engine.store.has_path(a));
        assert_eq!(w.engine.store.states[a.index()].mode, MotionMode::Steered);
    }

    #[test]
    fn unknown_and_dead_agents_are_rejected() {
        let mut w = World::new(vec![]);
        let a = w.spawn(Vec2::new(20.0, 100.0), 5.0);
        assert!(matches!(
            w.engine.steer(ev_core::AgentId(42), Vec2::ZERO, 1.0),
            Err(MobilityError::UnknownAgent(_))
        ));
        w.agents.kill(a);
        w.engine.remove(a);
        let r = w.engine.step(a, DT, &mut w.agents, &mut w.index, &w.obstacles, w.rngs.get_mut(a));
        assert!(matches!(r, Err(MobilityError::NotAlive(_))));
    }
}

#[cfg(test)]
mod modes {
    use ev_core::Vec2;

    use super::support::World;
    use crate::MotionMode;

    #[test]
    fn idle_agent_does_not_move() {
        let mut w = World::new(vec![]);
        let a = w.spawn(Vec2::new(100.0, 100.0), 5.0);
        {
            let s = &mut w.engine.store.states[a.index()];
            s.mode = MotionMode::Idle;
            s.idle_timer = 0.0;
            s.idle_duration = 10.0;
        }
        for _ in 0..20 {
            w.tick(0.1);
        }
        assert_eq!(w.pos(a), Vec2::new(100.0, 100.0));
        assert_eq!(w.agents.vel[a.index()], Vec2::ZERO);
    }

    #[test]
    fn idle_ends_in_wandering() {
        let mut w = World::new(vec![]);
        w.engine.params.idle_probability = 0.0;
        let a = w.spawn(Vec2::new(100.0, 100.0), 5.0);
        {
            let s = &mut w.engine.store.states[a.index()];
            s.mode = MotionMode::Idle;
            s.idle_timer = 0.0;
            s.idle_duration = 0.5;
        }
        for _ in 0..10 {
            w.tick(0.1);
        }
        assert_eq!(w.engine.store.states[a.index()].mode, MotionMode::Wandering);
        assert!(w.pos(a) != Vec2::new(100.0, 100.0));
    }

    #[test]
    fn wandering_agents_move_and_stay_in_bounds() {
        let mut w = World::new(vec![]);
        let ids: Vec<_> = (0..10).map(|i| w.spawn(Vec2::new(20.0 + i as f32 * 16.0, 100.0), 5.0)).collect();
        let start: Vec<Vec2> = ids.iter().map(|&id| w.pos(id)).collect();
        for _ in 0..200 {
            w.tick(0.05);
        }
        let moved = ids.iter().zip(&start).filter(|&(&id, &p)| w.pos(id).distance(p) > 1.0).count();
        assert!(moved > 0);
        for &id in &ids {
            let p = w.pos(id);
            assert!(p.x >= 0.0 && p.x <= 200.0 && p.y >= 0.0 && p.y <= 200.0);
        }
    }
}
