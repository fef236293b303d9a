//! Externally observable robot and world state
//!
//! Choosers, reaction conditions and behaviors only read this snapshot; the host
//! updates it between ticks.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotState {
    /// False while the robot is picked up, on its side, etc.
    pub on_treads: bool,
    pub carrying_object: bool,
    /// Named scalar metrics (emotion values, detection confidences, battery level...)
    #[serde(default)]
    metrics: AHashMap<String, f32>,
}

impl Default for RobotState {
    fn default() -> Self {
        Self {
            on_treads: true,
            carrying_object: false,
            metrics: AHashMap::new(),
        }
    }
}

impl RobotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metric(&self, name: &str) -> Option<f32> {
        self.metrics.get(name).copied()
    }

    pub fn set_metric(&mut self, name: impl Into<String>, value: f32) {
        self.metrics.insert(name.into(), value);
    }

    pub fn clear_metric(&mut self, name: &str) -> Option<f32> {
        self.metrics.remove(name)
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f32) -> Self {
        self.set_metric(name, value);
        self
    }
}
