//! Agent kind enum shared across all crates.

/// Which population an agent belongs to.
///
/// Both kinds share the motion model; only students run the
/// normal / emergency / shooter state machine.  Staff wander and may carry a
/// weapon, which makes them a steal target.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentKind {
    #[default]
    Student,
    Staff,
}

impl AgentKind {
    /// Human-readable label, useful for log fields and output columns.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Student => "student",
            AgentKind::Staff   => "staff",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
