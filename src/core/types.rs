//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Monotonic time in seconds, as reported by a [`crate::core::clock::Clock`]
pub type Seconds = f64;

/// Stable handle to a behavior owned by the [`crate::behavior::registry::BehaviorRegistry`]
///
/// Behaviors live for the lifetime of the registry and are never removed, so an index
/// is a sufficient identity. Everything outside the registry holds only this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BehaviorId(pub u32);

impl BehaviorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BehaviorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The three top-level chooser slots a manager can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChooserSlot {
    #[default]
    Selection,
    Demo,
    Freeplay,
}

impl ChooserSlot {
    pub const ALL: [ChooserSlot; 3] = [ChooserSlot::Selection, ChooserSlot::Demo, ChooserSlot::Freeplay];

    pub fn as_str(self) -> &'static str {
        match self {
            ChooserSlot::Selection => "selection",
            ChooserSlot::Demo => "demo",
            ChooserSlot::Freeplay => "freeplay",
        }
    }
}

impl std::fmt::Display for ChooserSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
