//! Student decisions: danger awareness, weapon theft, and evacuation.

use ev_agent::{Role, ShooterState, StudentMode};
use ev_core::{AgentId, AgentKind, AgentRng, BehaviorParams, Rect, Vec2};
use tracing::debug;

use crate::context::nearest_exit;
use crate::{Intent, SimContext};

/// What made a student aware of danger.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Cue {
    SawShooter,
    HeardShot,
    HeardScream,
}

/// Switch a normal student to `Emergency` and head for the nearest exit.
///
/// Returns the `TravelTo` intent, or `None` if the world has no exits (the
/// student is still marked as evacuating and keeps wandering).  Roles other
/// than a normal student are left untouched.
pub fn start_evacuation(
    role: &mut Role,
    pos: Vec2,
    max_speed: f32,
    exits: &[Rect],
    params: &BehaviorParams,
) -> Option<Intent> {
    if !role.is_normal_student() {
        return None;
    }
    let exit = nearest_exit(exits, pos);
    *role = Role::Student(StudentMode::Emergency { exit });
    exit.map(|e| Intent::TravelTo {
        goal: exits[e].center(),
        speed: max_speed * params.emergency_speed_factor,
    })
}

pub(crate) fn decide_normal(
    agent: AgentId,
    role: &mut Role,
    ctx: &SimContext<'_>,
    rng: &mut AgentRng,
) -> Vec<Intent> {
    let me = ctx.pos(agent);

    if let Some(cue) = danger_cue(agent, me, ctx) {
        debug!(agent = %agent, ?cue, tick = %ctx.tick, "student aware of danger");
        let max_speed = ctx.agents.max_speed[agent.index()];
        return start_evacuation(role, me, max_speed, ctx.exits, ctx.params).into_iter().collect();
    }

    if let Some(victim) = try_steal(agent, me, ctx, rng) {
        *role = Role::Student(StudentMode::Shooter(ShooterState::new(me, rng.angle())));
        return vec![Intent::StealWeapon { victim }];
    }

    vec![]
}

pub(crate) fn decide_emergency(agent: AgentId, exit: Option<usize>, ctx: &SimContext<'_>) -> Vec<Intent> {
    let me = ctx.pos(agent);
    let i = agent.index();

    if ctx.exit_reached(me, ctx.agents.radius[i]).is_some() {
        return vec![Intent::Escape];
    }
    // No exits at all: wander like everybody else.
    let Some(target) = exit.and_then(|e| ctx.exits.get(e)) else {
        return vec![];
    };
    if ctx.has_path(agent) {
        return vec![];
    }
    vec![Intent::Steer {
        direction: target.center() - me,
        speed: ctx.agents.max_speed[i] * ctx.params.emergency_speed_factor,
    }]
}

/// First danger cue that applies, checked in order: a visible shooter,
/// a recent shot within hearing range, a visible panicking student nearby.
pub(crate) fn danger_cue(agent: AgentId, me: Vec2, ctx: &SimContext<'_>) -> Option<Cue> {
    let p = ctx.params;

    let sees_shooter = ctx
        .nearby_agents(me, p.awareness_radius)
        .into_iter()
        .any(|a| a != agent && ctx.agents.is_shooter(a) && ctx.can_see(me, ctx.pos(a)));
    if sees_shooter {
        return Some(Cue::SawShooter);
    }

    let window = p.hearing_window_secs as f64;
    let hearing2 = p.hearing_radius * p.hearing_radius;
    let heard_shot = ctx
        .shots
        .iter()
        .any(|s| s.age(ctx.now) <= window && s.origin.distance_sq(me) <= hearing2);
    if heard_shot {
        return Some(Cue::HeardShot);
    }

    if p.scream_enabled {
        let heard_scream = ctx
            .nearby_agents(me, p.scream_radius)
            .into_iter()
            .any(|a| a != agent && ctx.agents.role[a.index()].is_emergency() && ctx.can_see(me, ctx.pos(a)));
        if heard_scream {
            return Some(Cue::HeardScream);
        }
    }

    None
}

/// Roll for a theft attempt; on success return the nearest armed staff
/// member in reach and in sight.
fn try_steal(agent: AgentId, me: Vec2, ctx: &SimContext<'_>, rng: &mut AgentRng) -> Option<AgentId> {
    let p = ctx.params;
    if !rng.gen_bool((p.steal_rate * ctx.dt) as f64) {
        return None;
    }
    ctx.nearby_agents(me, p.steal_range)
        .into_iter()
        .filter(|&a| {
            a != agent
                && ctx.agents.kind[a.index()] == AgentKind::Staff
                && ctx.agents.armed[a.index()]
                && ctx.can_see(me, ctx.pos(a))
        })
        .min_by(|&a, &b| ctx.pos(a).distance_sq(me).total_cmp(&ctx.pos(b).distance_sq(me)))
}
