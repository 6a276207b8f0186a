//! school: headless run of the rust_evac school evacuation scenario.
//!
//! Builds a synthetic school (corridor, classrooms, two exits), populates it
//! with students and staff, lets a shooter emerge, and runs until everybody
//! has escaped or died or the time limit hits.  Pass a map JSON path as the
//! first argument to use a different floor plan.
//!
//! Logging goes through `tracing`; set `RUST_LOG=debug` to watch individual
//! agents change state.

mod floorplan;

use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ev_core::{AgentId, AgentKind, RemovalReason, ShotEvent, SimConfig, Tick};
use ev_sim::{Outcome, SimBuilder, SimObserver};
use ev_spatial::{load_map_file, load_map_str};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:            u64 = 7;
const STUDENTS:        usize = 150;
const STAFF:           usize = 12;
const ARMED_STAFF:     usize = 3;
/// World units per map cell.
const MAP_SCALE:       f32 = 10.0;
const DT:              f32 = 0.05;
const TIME_LIMIT_SECS: f64 = 300.0;
/// Progress line every this many ticks (5 s of simulated time).
const REPORT_EVERY:    u64 = 100;

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    shots:      usize,
    removals:   Vec<(Tick, AgentId, AgentKind, RemovalReason)>,
    last_tick:  Tick,
    final_tick: Option<Tick>,
}

impl SimObserver for Progress {
    fn on_tick_start(&mut self, tick: Tick) {
        self.last_tick = tick;
    }

    fn on_tick_end(&mut self, tick: Tick, live: usize) {
        if tick.0 % REPORT_EVERY == 0 {
            info!(%tick, live, shots = self.shots, "progress");
        }
    }

    fn on_shot(&mut self, _shot: &ShotEvent) {
        self.shots += 1;
    }

    fn on_agent_removed(&mut self, agent: AgentId, kind: AgentKind, reason: RemovalReason) {
        self.removals.push((self.last_tick, agent, kind, reason));
    }

    fn on_sim_end(&mut self, final_tick: Tick, _outcome: &Outcome) {
        self.final_tick = Some(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== school: rust_evac evacuation scenario ===");
    println!("Students: {STUDENTS}  |  Staff: {STAFF} ({ARMED_STAFF} armed)  |  Seed: {SEED}");
    println!();

    // 1. Floor plan.
    let map = match std::env::args().nth(1) {
        Some(path) => load_map_file(&path, MAP_SCALE),
        None => load_map_str(&floorplan::school_json()?, MAP_SCALE),
    };
    println!(
        "Map: {} walls, {} exits, {} doors ({} × {} world units)",
        map.walls.len(),
        map.exits.len(),
        map.doors.len(),
        map.extent.x,
        map.extent.y,
    );

    // 2. Config.
    let (width, height) = if map.is_empty() {
        (
            floorplan::COLS as f32 * MAP_SCALE,
            floorplan::ROWS as f32 * MAP_SCALE,
        )
    } else {
        (map.extent.x, map.extent.y)
    };
    let config = SimConfig {
        seed:                          SEED,
        world_width:                   width,
        world_height:                  height,
        student_count:                 STUDENTS,
        staff_count:                   STAFF,
        armed_staff_count:             ARMED_STAFF,
        shooter_emergence_probability: 0.5,
        time_limit_secs:               Some(TIME_LIMIT_SECS),
        ..SimConfig::default()
    };

    // 3. Build and run.
    let mut sim = SimBuilder::school(config).map(map).build()?;
    println!("Spawned {} agents", sim.agents().live_count());

    let mut progress = Progress::default();
    let t0 = Instant::now();
    let outcome = sim.run_until_done(DT, &mut progress)?;
    let elapsed = t0.elapsed();

    // 4. Summary.
    println!();
    println!(
        "Simulation ended ({}) at {} after {:.3} s wall time",
        sim.termination().map_or("not terminated", |t| t.as_str()),
        sim.clock(),
        elapsed.as_secs_f64(),
    );
    println!();
    println!("{:<22} {:>8}", "Outcome", "Count");
    println!("{}", "-".repeat(31));
    let rows = [
        ("students escaped", outcome.escaped_students),
        ("staff escaped", outcome.escaped_staff),
        ("students killed", outcome.dead_students),
        ("staff killed", outcome.dead_staff),
        ("shots fired", outcome.shots_fired),
        ("hits", outcome.hits),
        ("weapons stolen", outcome.weapons_stolen),
        ("shooters emerged", outcome.shooters_spawned),
        ("still inside", sim.agents().live_count()),
    ];
    for (label, count) in rows {
        println!("{label:<22} {count:>8}");
    }

    if let Some((tick, agent, kind, reason)) = progress.removals.last() {
        println!();
        println!("Last removal: {agent} ({kind}) {reason} at {tick}");
    }
    if let Some(tick) = progress.final_tick {
        info!(%tick, "done");
    }

    Ok(())
}
