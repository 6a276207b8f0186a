//! Simulation time model.
//!
//! # Design
//!
//! The simulation advances in variable-length steps: the caller passes the
//! elapsed simulated time `dt` (seconds) to every tick.  `SimClock` keeps
//! both an integer `Tick` counter (for logging and observer bookkeeping) and
//! the accumulated simulated seconds (for timers, cooldowns and lock
//! durations, which are all compared against elapsed time rather than
//! blocking).
//!
//! Elapsed time is accumulated in `f64` so that a long run at 60 Hz does not
//! lose sub-millisecond resolution.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tick counter plus accumulated simulated seconds.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Number of completed `advance` calls.
    pub current_tick: Tick,
    /// Simulated seconds since the start of the run.
    pub elapsed_secs: f64,
    /// The `dt` of the most recent tick (seconds).
    pub last_dt: f32,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick of `dt` simulated seconds.
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.current_tick = Tick(self.current_tick.0 + 1);
        self.elapsed_secs += dt as f64;
        self.last_dt = dt;
    }

    /// Simulated seconds since the start of the run.
    #[inline]
    pub fn now(&self) -> f64 {
        self.elapsed_secs
    }

    /// Break elapsed time into (minutes, seconds, milliseconds) for
    /// human-readable logging.
    pub fn elapsed_msm(&self) -> (u64, u32, u32) {
        let total_ms = (self.elapsed_secs.max(0.0) * 1000.0) as u64;
        let minutes = total_ms / 60_000;
        let seconds = ((total_ms % 60_000) / 1000) as u32;
        let millis = (total_ms % 1000) as u32;
        (minutes, seconds, millis)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (m, s, ms) = self.elapsed_msm();
        write!(f, "{} ({:02}:{:02}.{:03})", self.current_tick, m, s, ms)
    }
}
