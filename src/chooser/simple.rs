//! Small stateless-ish choosers

use crate::core::types::BehaviorId;

use super::{BehaviorChooser, ChooserContext};

/// Never selects anything; used for unconfigured slots
#[derive(Debug, Clone)]
pub struct NullChooser {
    name: String,
}

impl NullChooser {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for NullChooser {
    fn default() -> Self {
        Self::new("null")
    }
}

impl BehaviorChooser for NullChooser {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_next_behavior(&mut self, _ctx: &mut ChooserContext) -> Option<BehaviorId> {
        None
    }
}

/// Runs whatever behavior the host last asked for
#[derive(Debug, Clone)]
pub struct SelectionChooser {
    name: String,
    selected: Option<BehaviorId>,
}

impl SelectionChooser {
    pub fn new(name: impl Into<String>, default_behavior: Option<BehaviorId>) -> Self {
        Self {
            name: name.into(),
            selected: default_behavior,
        }
    }

    pub fn selected(&self) -> Option<BehaviorId> {
        self.selected
    }
}

impl BehaviorChooser for SelectionChooser {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_next_behavior(&mut self, ctx: &mut ChooserContext) -> Option<BehaviorId> {
        self.selected.filter(|&id| ctx.is_running(id) || ctx.is_runnable(id))
    }

    fn request_behavior(&mut self, behavior: BehaviorId) -> bool {
        tracing::info!(chooser = %self.name, %behavior, "Behavior selected by host");
        self.selected = Some(behavior);
        true
    }
}

/// Strict priority: the first listed behavior that is running or runnable wins
#[derive(Debug, Clone)]
pub struct PriorityChooser {
    name: String,
    behaviors: Vec<BehaviorId>,
}

impl PriorityChooser {
    pub fn new(name: impl Into<String>, behaviors: Vec<BehaviorId>) -> Self {
        Self {
            name: name.into(),
            behaviors,
        }
    }
}

impl BehaviorChooser for PriorityChooser {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_next_behavior(&mut self, ctx: &mut ChooserContext) -> Option<BehaviorId> {
        self.behaviors
            .iter()
            .copied()
            .find(|&id| ctx.is_running(id) || ctx.is_runnable(id))
    }
}
