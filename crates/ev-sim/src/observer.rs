//! Simulation observer trait for progress reporting and data collection.

use ev_core::{AgentId, AgentKind, RemovalReason, ShotEvent, Tick};

use crate::Outcome;

/// Callbacks invoked by [`Sim::step_with`][crate::Sim::step_with] and
/// [`Sim::run_until_done`][crate::Sim::run_until_done] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Renderers and result writers hang off this
/// trait; the core never formats or persists anything itself.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, live: usize) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {live} agents left");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with the number of live agents.
    fn on_tick_end(&mut self, _tick: Tick, _live: usize) {}

    /// Called for every shot that was actually fired.
    fn on_shot(&mut self, _shot: &ShotEvent) {}

    /// Called when an agent escapes or dies.
    fn on_agent_removed(&mut self, _agent: AgentId, _kind: AgentKind, _reason: RemovalReason) {}

    /// Called once, on the tick an end condition is met.
    fn on_sim_end(&mut self, _final_tick: Tick, _outcome: &Outcome) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
