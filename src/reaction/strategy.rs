//! Binds a reaction condition to the behavior it should force

use crate::behavior::BehaviorRegistry;
use crate::core::config::ReactionTriggerConfig;
use crate::core::error::Result;
use crate::core::state::RobotState;
use crate::core::types::{BehaviorId, Seconds};

use super::condition::ReactionCondition;

#[derive(Debug, Clone)]
pub struct ReactionTriggerStrategy {
    behavior: BehaviorId,
    condition: ReactionCondition,
    resume_last: bool,
    can_interrupt_self: bool,
    can_interrupt_other: bool,
}

impl ReactionTriggerStrategy {
    pub fn new(behavior: BehaviorId, condition: ReactionCondition) -> Self {
        Self {
            behavior,
            condition,
            resume_last: true,
            can_interrupt_self: false,
            can_interrupt_other: true,
        }
    }

    pub fn from_config(config: &ReactionTriggerConfig, registry: &BehaviorRegistry) -> Result<Self> {
        let behavior = registry.resolve(&config.behavior)?;
        Ok(Self {
            behavior,
            condition: ReactionCondition::from_config(&config.condition),
            resume_last: config.resume_last,
            can_interrupt_self: config.can_interrupt_self,
            can_interrupt_other: config.can_interrupt_other,
        })
    }

    pub fn with_interrupts(mut self, can_interrupt_self: bool, can_interrupt_other: bool) -> Self {
        self.can_interrupt_self = can_interrupt_self;
        self.can_interrupt_other = can_interrupt_other;
        self
    }

    pub fn with_resume_last(mut self, resume_last: bool) -> Self {
        self.resume_last = resume_last;
        self
    }

    pub fn behavior(&self) -> BehaviorId {
        self.behavior
    }

    pub fn resume_last(&self) -> bool {
        self.resume_last
    }

    pub fn condition(&self) -> &ReactionCondition {
        &self.condition
    }

    /// Whether this strategy may preempt given the manager's current state
    ///
    /// Deliberate behaviors can always be interrupted. While a reaction runs, the
    /// strategy needs `can_interrupt_self` to restart its own behavior and
    /// `can_interrupt_other` to replace any other reaction.
    pub fn can_interrupt(&self, current: Option<BehaviorId>, running_reactionary: bool) -> bool {
        if !running_reactionary {
            return true;
        }
        if current == Some(self.behavior) {
            self.can_interrupt_self
        } else {
            self.can_interrupt_other
        }
    }

    pub fn should_trigger(&self, state: &RobotState, now: Seconds) -> bool {
        self.condition.evaluate(state, now)
    }

    pub fn behavior_finished(&mut self, now: Seconds) {
        self.condition.behavior_finished(now);
    }
}
