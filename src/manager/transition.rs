//! Behavior transition notifications

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::types::Seconds;

/// Broadcast whenever the current behavior changes, including to or from "none"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorTransition {
    pub old_name: String,
    pub new_name: String,
    pub old_type: String,
    pub new_type: String,
    pub old_reactionary: bool,
    pub new_reactionary: bool,
    pub at: Seconds,
}

impl BehaviorTransition {
    pub fn is_to_none(&self) -> bool {
        self.new_name == "null"
    }
}

impl std::fmt::Display for BehaviorTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.old_name, self.new_name)
    }
}

/// Fire-and-forget receiver of transitions
pub trait TransitionSink {
    fn on_transition(&mut self, transition: &BehaviorTransition);
}

/// Collects transitions; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct TransitionRecorder {
    transitions: Rc<RefCell<Vec<BehaviorTransition>>>,
}

impl TransitionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<BehaviorTransition> {
        self.transitions.borrow().clone()
    }

    /// `(old_name, new_name)` pairs, handy for assertions
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.transitions
            .borrow()
            .iter()
            .map(|t| (t.old_name.clone(), t.new_name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.transitions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.transitions.borrow_mut().clear();
    }
}

impl TransitionSink for TransitionRecorder {
    fn on_transition(&mut self, transition: &BehaviorTransition) {
        self.transitions.borrow_mut().push(transition.clone());
    }
}
