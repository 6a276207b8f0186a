//! Kind-specific agent state as a tagged union.
//!
//! Only a shooter can hold a target lock: the lock lives inside
//! [`ShooterState`], which only exists inside [`StudentMode::Shooter`].

use ev_core::{AgentId, AgentKind, Vec2};

// ── ShooterState ──────────────────────────────────────────────────────────────

/// Target lock, search and fire-control timers of an active shooter.
///
/// Times are simulated seconds since the start of the run.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShooterState {
    pub locked_target: Option<AgentId>,
    /// When the current lock was acquired.
    pub lock_started: f64,
    /// When the locked target was last in sight.
    pub last_seen: f64,
    /// When the last shot was fired (`-inf` before the first shot).
    pub last_shot: f64,
    /// Heading (radians) held while searching.
    pub search_heading: f32,
    /// Seconds the current search heading has been held.
    pub search_timer: f32,
    /// Seconds spent below the stuck speed.
    pub stuck_timer: f32,
    /// Position at the previous decision, for displacement-based stuck detection.
    pub last_pos: Vec2,
}

impl ShooterState {
    pub fn new(pos: Vec2, search_heading: f32) -> Self {
        Self {
            locked_target: None,
            lock_started: 0.0,
            last_seen: 0.0,
            last_shot: f64::NEG_INFINITY,
            search_heading,
            search_timer: 0.0,
            stuck_timer: 0.0,
            last_pos: pos,
        }
    }

    /// Lock onto `target` at time `now`.
    pub fn lock(&mut self, target: AgentId, now: f64) {
        self.locked_target = Some(target);
        self.lock_started = now;
        self.last_seen = now;
    }

    pub fn release(&mut self) {
        self.locked_target = None;
    }

    /// `true` once `cooldown` seconds have passed since the last shot.
    #[inline]
    pub fn can_fire(&self, now: f64, cooldown: f32) -> bool {
        now - self.last_shot >= cooldown as f64
    }
}

// ── StudentMode ───────────────────────────────────────────────────────────────

/// The student state machine.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StudentMode {
    /// Wandering / idling, unaware of danger.
    Normal,
    /// Evacuating toward `exit` (index into the world's exit list), or
    /// wandering if the world has no exits.
    Emergency { exit: Option<usize> },
    /// Armed and hunting.
    Shooter(ShooterState),
}

// ── Role ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Staff,
    Student(StudentMode),
}

impl Role {
    /// Initial role for a freshly spawned agent of `kind`.
    pub fn initial(kind: AgentKind) -> Role {
        match kind {
            AgentKind::Student => Role::Student(StudentMode::Normal),
            AgentKind::Staff => Role::Staff,
        }
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Role::Staff => AgentKind::Staff,
            Role::Student(_) => AgentKind::Student,
        }
    }

    #[inline]
    pub fn is_shooter(&self) -> bool {
        matches!(self, Role::Student(StudentMode::Shooter(_)))
    }

    #[inline]
    pub fn is_emergency(&self) -> bool {
        matches!(self, Role::Student(StudentMode::Emergency { .. }))
    }

    #[inline]
    pub fn is_normal_student(&self) -> bool {
        matches!(self, Role::Student(StudentMode::Normal))
    }

    pub fn shooter(&self) -> Option<&ShooterState> {
        match self {
            Role::Student(StudentMode::Shooter(s)) => Some(s),
            _ => None,
        }
    }

    pub fn shooter_mut(&mut self) -> Option<&mut ShooterState> {
        match self {
            Role::Student(StudentMode::Shooter(s)) => Some(s),
            _ => None,
        }
    }

    /// The shooter's current lock, if any.
    pub fn locked_target(&self) -> Option<AgentId> {
        self.shooter().and_then(|s| s.locked_target)
    }

    /// Short label for logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Student(StudentMode::Normal) => "student",
            Role::Student(StudentMode::Emergency { .. }) => "evacuating",
            Role::Student(StudentMode::Shooter(_)) => "shooter",
        }
    }
}
