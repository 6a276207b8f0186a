//! The school evacuation behavior model.

use ev_agent::{Role, StudentMode};
use ev_core::{AgentId, AgentRng};

use crate::{shooter, student, BehaviorModel, Intent, SimContext};

/// Staff wander; students wander until they notice danger and then
/// evacuate, or occasionally steal a weapon and become shooters.
///
/// | Role                 | Decision                                           |
/// |----------------------|----------------------------------------------------|
/// | `Staff`              | none (motion model only)                           |
/// | `Student(Normal)`    | awareness checks, weapon theft roll                |
/// | `Student(Emergency)` | escape on reaching an exit, else head for it       |
/// | `Student(Shooter)`   | lock, search, pursue, fire                         |
#[derive(Clone, Copy, Debug, Default)]
pub struct SchoolBehavior;

impl BehaviorModel for SchoolBehavior {
    fn decide(
        &self,
        agent: AgentId,
        role:  &mut Role,
        ctx:   &SimContext<'_>,
        rng:   &mut AgentRng,
    ) -> Vec<Intent> {
        match *role {
            Role::Staff => vec![],
            Role::Student(StudentMode::Normal) => student::decide_normal(agent, role, ctx, rng),
            Role::Student(StudentMode::Emergency { exit }) => student::decide_emergency(agent, exit, ctx),
            Role::Student(StudentMode::Shooter(ref mut state)) => shooter::decide(agent, state, ctx, rng),
        }
    }
}
