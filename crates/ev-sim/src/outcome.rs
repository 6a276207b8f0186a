//! Run bookkeeping: removal counters and the reason a run stopped.

use ev_core::{AgentKind, RemovalReason};

/// Running totals, updated as events happen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    pub escaped_students: usize,
    pub escaped_staff:    usize,
    pub dead_students:    usize,
    pub dead_staff:       usize,
    pub shots_fired:      usize,
    pub hits:             usize,
    pub weapons_stolen:   usize,
    /// Students promoted by the emergence roll or `force_spawn_shooter`.
    pub shooters_spawned: usize,
}

impl Outcome {
    pub(crate) fn record_removal(&mut self, kind: AgentKind, reason: RemovalReason) {
        let slot = match (reason, kind) {
            (RemovalReason::Escaped, AgentKind::Student) => &mut self.escaped_students,
            (RemovalReason::Escaped, AgentKind::Staff)   => &mut self.escaped_staff,
            (RemovalReason::Died, AgentKind::Student)    => &mut self.dead_students,
            (RemovalReason::Died, AgentKind::Staff)      => &mut self.dead_staff,
        };
        *slot += 1;
    }

    pub fn escaped(&self) -> usize {
        self.escaped_students + self.escaped_staff
    }

    pub fn dead(&self) -> usize {
        self.dead_students + self.dead_staff
    }
}

/// Why the simulation stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// `time_limit_secs` of simulated time elapsed.
    TimeLimit,
    /// No live student is left who is not a shooter.
    Resolved,
}

impl Termination {
    pub fn as_str(self) -> &'static str {
        match self {
            Termination::TimeLimit => "time limit",
            Termination::Resolved  => "resolved",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
