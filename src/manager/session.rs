//! Per-session result accumulation
//!
//! Scoped to one `BehaviorManager::init`; nothing here is process-wide.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chooser::ActivityOutcome;
use crate::core::types::Seconds;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorRunStats {
    pub starts: u32,
    pub resumes: u32,
    pub init_failures: u32,
    pub resume_failures: u32,
    pub completions: u32,
    pub failures: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub activity: String,
    pub outcome: ActivityOutcome,
    pub objectives_completed: u32,
    pub elapsed_secs: Seconds,
    pub finished_at: Seconds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub reactions_fired: u32,
    pub transitions_emitted: u32,
    pub behaviors: AHashMap<String, BehaviorRunStats>,
    pub activities: Vec<ActivityReport>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            reactions_fired: 0,
            transitions_emitted: 0,
            behaviors: AHashMap::new(),
            activities: Vec::new(),
        }
    }

    pub fn behavior_mut(&mut self, name: &str) -> &mut BehaviorRunStats {
        self.behaviors.entry(name.to_string()).or_default()
    }

    pub fn behavior(&self, name: &str) -> BehaviorRunStats {
        self.behaviors.get(name).copied().unwrap_or_default()
    }

    pub fn record_activity(&mut self, report: ActivityReport) {
        self.activities.push(report);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
