//! Behavior choosers and activities
//!
//! A chooser answers "what should run next?" from externally observable state.
//! Choosers never mutate the manager directly; anything they need the manager to do
//! (lock reactions, report completion) is pushed onto [`ChooserContext::requests`]
//! and applied after the call returns.

pub mod factory;
pub mod freeplay;
pub mod sequence;
pub mod simple;

pub use factory::{build_chooser, ChooserSet};
pub use freeplay::FreeplayChooser;
pub use sequence::{ActivityState, SequenceActivity};
pub use simple::{NullChooser, PriorityChooser, SelectionChooser};

use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorRegistry;
use crate::core::state::RobotState;
use crate::core::types::{BehaviorId, Seconds};
use crate::event::{EventTag, RobotEvent};

/// How an activity ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityOutcome {
    Succeeded,
    Failed,
    TimedOut,
    Cancelled,
}

/// Deferred manager operations requested by a chooser
#[derive(Debug, Clone, PartialEq)]
pub enum ArbiterRequest {
    /// Disable reactions of these types under `lock`
    DisableReactions {
        lock: String,
        behavior_types: Vec<String>,
    },
    RemoveReactionsLock {
        lock: String,
    },
    /// Stop the current behavior now unless a reaction holds control
    EndCurrentBehavior {
        reason: String,
    },
    ActivityFinished {
        activity: String,
        outcome: ActivityOutcome,
        objectives_completed: u32,
        elapsed_secs: Seconds,
    },
}

/// Read-only manager view plus the request buffer
pub struct ChooserContext<'a> {
    pub registry: &'a BehaviorRegistry,
    pub state: &'a RobotState,
    pub current: Option<BehaviorId>,
    pub running_reactionary: bool,
    pub now: Seconds,
    pub requests: &'a mut Vec<ArbiterRequest>,
}

impl ChooserContext<'_> {
    pub fn request(&mut self, request: ArbiterRequest) {
        self.requests.push(request);
    }

    pub fn is_running(&self, id: BehaviorId) -> bool {
        self.registry.get(id).is_some_and(|b| b.is_running())
    }

    pub fn is_runnable(&self, id: BehaviorId) -> bool {
        self.registry.get(id).is_some_and(|b| b.is_runnable(self.state))
    }

    /// The current behavior, if it is still running
    pub fn running_current(&self) -> Option<BehaviorId> {
        self.current.filter(|&id| self.is_running(id))
    }

    pub fn is_idle(&self, id: BehaviorId) -> bool {
        self.registry.get(id).is_some_and(|b| b.is_idle())
    }
}

pub trait BehaviorChooser {
    fn name(&self) -> &str;

    /// Called once when this chooser becomes active
    fn on_selected(&mut self, _ctx: &mut ChooserContext) {}

    /// Called once when this chooser stops being active; undoes `on_selected`
    fn on_deselected(&mut self, _ctx: &mut ChooserContext) {}

    /// Per-tick bookkeeping, before selection
    fn update(&mut self, _ctx: &mut ChooserContext) {}

    fn choose_next_behavior(&mut self, ctx: &mut ChooserContext) -> Option<BehaviorId>;

    /// Event tags this chooser wants forwarded while active
    fn event_tags(&self) -> Vec<EventTag> {
        Vec::new()
    }

    fn handle_event(&mut self, _event: &RobotEvent, _ctx: &mut ChooserContext) {}

    /// Host asked for a specific behavior; returns false if unsupported
    fn request_behavior(&mut self, _behavior: BehaviorId) -> bool {
        false
    }

    /// Host asked the chooser to wind down
    fn request_end(&mut self) {}
}
