//! Shooter decisions.
//!
//! Each tick a shooter:
//!
//! 1. tracks its own displacement (stuck detection),
//! 2. drops its lock if the target died, turned shooter, got too far away,
//!    has been chased too long, or has been out of sight too long,
//! 3. locks onto the nearest visible non-shooter if it has no lock,
//! 4. searches (no lock) or pursues / engages (lock held).
//!
//! Firing only produces an [`Intent::Shoot`] with the hit already rolled;
//! ev-sim resolves the kill and clears the lock after a hit.

use ev_agent::ShooterState;
use ev_core::{AgentId, AgentRng, Vec2};
use tracing::debug;

use crate::{Intent, SimContext};

pub(crate) fn decide(
    agent: AgentId,
    state: &mut ShooterState,
    ctx: &SimContext<'_>,
    rng: &mut AgentRng,
) -> Vec<Intent> {
    let me = ctx.pos(agent);
    let moved = me.distance(state.last_pos);
    state.last_pos = me;

    let released = validate_lock(agent, me, state, ctx);
    if state.locked_target.is_none() {
        if let Some(target) = acquire(agent, me, released, ctx) {
            debug!(shooter = %agent, target = %target, "target locked");
            state.lock(target, ctx.now);
        }
    }

    let max_speed = ctx.agents.max_speed[agent.index()];
    match state.locked_target {
        None => search(state, moved, ctx, rng, max_speed),
        Some(target) => {
            state.stuck_timer = 0.0;
            engage(me, target, state, ctx, rng, max_speed)
        }
    }
}

/// Drop the lock if it is no longer valid; returns the released target.
fn validate_lock(agent: AgentId, me: Vec2, state: &mut ShooterState, ctx: &SimContext<'_>) -> Option<AgentId> {
    let target = state.locked_target?;
    let p = ctx.params;

    let keep = if !ctx.is_alive(target) || ctx.agents.is_shooter(target) {
        false
    } else {
        let tp = ctx.pos(target);
        if me.distance(tp) > p.release_distance || ctx.now - state.lock_started > p.max_pursuit_secs as f64 {
            false
        } else if ctx.can_see(me, tp) {
            state.last_seen = ctx.now;
            true
        } else {
            ctx.now - state.last_seen <= p.max_lost_sight_secs as f64
        }
    };

    if keep {
        None
    } else {
        debug!(shooter = %agent, target = %target, "lock released");
        state.release();
        Some(target)
    }
}

/// Nearest visible live non-shooter within the acquisition radius.
fn acquire(agent: AgentId, me: Vec2, exclude: Option<AgentId>, ctx: &SimContext<'_>) -> Option<AgentId> {
    ctx.nearby_agents(me, ctx.params.acquire_radius)
        .into_iter()
        .filter(|&a| {
            a != agent
                && Some(a) != exclude
                && !ctx.agents.is_shooter(a)
                && ctx.can_see(me, ctx.pos(a))
        })
        .min_by(|&a, &b| ctx.pos(a).distance_sq(me).total_cmp(&ctx.pos(b).distance_sq(me)))
}

fn search(
    state: &mut ShooterState,
    moved: f32,
    ctx: &SimContext<'_>,
    rng: &mut AgentRng,
    max_speed: f32,
) -> Vec<Intent> {
    let p = ctx.params;
    if moved < p.stuck_speed * ctx.dt {
        state.stuck_timer += ctx.dt;
    } else {
        state.stuck_timer = 0.0;
    }
    state.search_timer += ctx.dt;

    if state.search_timer >= p.search_heading_secs || state.stuck_timer > p.stuck_secs {
        state.search_heading = rng.angle();
        state.search_timer = 0.0;
        state.stuck_timer = 0.0;
    }
    vec![Intent::Steer {
        direction: Vec2::from_angle(state.search_heading),
        speed: max_speed * p.search_speed_factor,
    }]
}

fn engage(
    me: Vec2,
    target: AgentId,
    state: &mut ShooterState,
    ctx: &SimContext<'_>,
    rng: &mut AgentRng,
    max_speed: f32,
) -> Vec<Intent> {
    let p = ctx.params;
    let to_target = ctx.pos(target) - me;
    let visible = ctx.can_see(me, ctx.pos(target));

    if to_target.length() > p.effective_range {
        if visible {
            return vec![Intent::Steer { direction: to_target, speed: max_speed }];
        }
        let jitter = rng.between(-p.blind_jitter, p.blind_jitter);
        return vec![Intent::Steer {
            direction: to_target.rotate(jitter),
            speed: max_speed * p.blind_speed_factor,
        }];
    }

    if !visible {
        // In range but blocked: sidestep to find an angle.
        let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        return vec![Intent::Steer {
            direction: to_target.rotate(side * p.reposition_angle),
            speed: max_speed * p.reposition_speed_factor,
        }];
    }

    // Clear shot: stand still, face the target, fire when the cooldown allows.
    let mut intents = vec![Intent::Halt { facing: to_target }];
    if state.can_fire(ctx.now, p.shot_cooldown_secs) {
        let hit = rng.gen_bool(p.hit_probability as f64);
        state.last_shot = ctx.now;
        intents.push(Intent::Shoot { target, hit });
    }
    intents
}
