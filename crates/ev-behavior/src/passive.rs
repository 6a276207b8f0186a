//! A passive behavior model: agents never produce intents.

use ev_agent::Role;
use ev_core::{AgentId, AgentRng};

use crate::{BehaviorModel, Intent, SimContext};

/// A [`BehaviorModel`] that always returns an empty intent list.
///
/// Agents only wander and idle under the motion model.  Useful for crowd
/// motion tests and for worlds with no threat scenario.
pub struct PassiveBehavior;

impl BehaviorModel for PassiveBehavior {
    fn decide(
        &self,
        _agent: AgentId,
        _role:  &mut Role,
        _ctx:   &SimContext<'_>,
        _rng:   &mut AgentRng,
    ) -> Vec<Intent> {
        vec![]
    }
}
