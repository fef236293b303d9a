//! Manager configuration loaded from TOML
//!
//! Every chooser slot is optional; an absent slot becomes a no-op chooser.
//! Behavior names referenced by choosers and triggers are resolved at init.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{ArbiterError, Result};
use crate::core::types::{ChooserSlot, Seconds};
use crate::event::EventTag;

fn default_true() -> bool {
    true
}

/// What to do when a behavior is registered under a name that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    #[default]
    Fail,
    Overwrite,
}

/// Gate a behavior on a state metric reaching a minimum value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricGate {
    pub metric: String,
    #[serde(default)]
    pub min_value: f32,
}

/// Declares a behavior reactionary and lists the events it responds to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionConfig {
    pub tags: Vec<EventTag>,
    #[serde(default = "default_true")]
    pub resume_last: bool,
    /// Ignore spatial events farther away than this
    #[serde(default)]
    pub max_distance_mm: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorKind {
    /// Idles until stopped
    #[default]
    Wait,
    PlayAnimation {
        animation: String,
        duration_secs: Seconds,
        #[serde(default = "default_loops")]
        loops: u32,
    },
    /// Runs a fixed number of ticks then reports `outcome`
    Scripted {
        #[serde(default)]
        run_ticks: Option<u32>,
        #[serde(default = "default_outcome")]
        outcome: String,
        #[serde(default)]
        fail_init: bool,
        #[serde(default)]
        fail_resume: bool,
    },
}

fn default_loops() -> u32 {
    1
}

fn default_outcome() -> String {
    "complete".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorConfig {
    pub name: String,
    /// Type tag used for reaction locks; defaults to the name
    #[serde(default)]
    pub behavior_type: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub requires_on_treads: bool,
    #[serde(default)]
    pub runnable_metric: Option<MetricGate>,
    #[serde(default)]
    pub reaction: Option<ReactionConfig>,
    #[serde(default)]
    pub kind: BehaviorKind,
}

impl BehaviorConfig {
    pub fn new(name: impl Into<String>, kind: BehaviorKind) -> Self {
        Self {
            name: name.into(),
            behavior_type: None,
            groups: Vec::new(),
            requires_on_treads: false,
            runnable_metric: None,
            reaction: None,
            kind,
        }
    }

    pub fn wait(name: impl Into<String>) -> Self {
        Self::new(name, BehaviorKind::Wait)
    }

    pub fn scripted(name: impl Into<String>, run_ticks: Option<u32>) -> Self {
        Self::new(
            name,
            BehaviorKind::Scripted {
                run_ticks,
                outcome: default_outcome(),
                fail_init: false,
                fail_resume: false,
            },
        )
    }

    pub fn reacting_to(mut self, tags: Vec<EventTag>, resume_last: bool) -> Self {
        self.reaction = Some(ReactionConfig {
            tags,
            resume_last,
            max_distance_mm: None,
        });
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn type_tag(&self) -> &str {
        self.behavior_type.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedBehavior {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

/// Scripted intro / bounded inner selection / outro activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    pub name: String,
    #[serde(default)]
    pub intro: Option<String>,
    pub inner: Box<ChooserConfig>,
    #[serde(default)]
    pub success_outro: Option<String>,
    #[serde(default)]
    pub failure_outro: Option<String>,
    #[serde(default)]
    pub timeout_outro: Option<String>,
    #[serde(default)]
    pub min_duration_secs: Seconds,
    pub max_duration_secs: Seconds,
    /// Zero means "run out the clock", which counts as success
    #[serde(default)]
    pub repetitions: u32,
    /// Objective name counted as one repetition when achieved
    #[serde(default)]
    pub objective: Option<String>,
    /// Behaviors in this group are allowed to finish after the maximum duration
    #[serde(default)]
    pub required_group: Option<String>,
    #[serde(default)]
    pub disable_during_outro: Vec<String>,
    #[serde(default)]
    pub disable_while_active: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChooserConfig {
    Null,
    Selection {
        #[serde(default)]
        default_behavior: Option<String>,
    },
    Priority {
        behaviors: Vec<String>,
    },
    Freeplay {
        behaviors: Vec<WeightedBehavior>,
        #[serde(default)]
        seed: Option<u64>,
    },
    Sequence(SequenceConfig),
}

impl ChooserConfig {
    fn validate(&self) -> Result<()> {
        match self {
            ChooserConfig::Null | ChooserConfig::Selection { .. } => Ok(()),
            ChooserConfig::Priority { behaviors } => {
                if behaviors.is_empty() {
                    return Err(ArbiterError::InvalidConfig(
                        "priority chooser needs at least one behavior".into(),
                    ));
                }
                Ok(())
            }
            ChooserConfig::Freeplay { behaviors, .. } => {
                if behaviors.iter().any(|b| !b.weight.is_finite() || b.weight < 0.0) {
                    return Err(ArbiterError::InvalidConfig(
                        "freeplay weights must be finite and non-negative".into(),
                    ));
                }
                if !behaviors.is_empty() && behaviors.iter().all(|b| b.weight == 0.0) {
                    return Err(ArbiterError::InvalidConfig(
                        "freeplay weights are all zero".into(),
                    ));
                }
                Ok(())
            }
            ChooserConfig::Sequence(seq) => {
                if seq.min_duration_secs < 0.0 || seq.max_duration_secs < 0.0 {
                    return Err(ArbiterError::InvalidConfig(format!(
                        "activity '{}' has a negative duration",
                        seq.name
                    )));
                }
                if seq.min_duration_secs > seq.max_duration_secs {
                    return Err(ArbiterError::InvalidConfig(format!(
                        "activity '{}': min_duration_secs ({}) > max_duration_secs ({})",
                        seq.name, seq.min_duration_secs, seq.max_duration_secs
                    )));
                }
                seq.inner.validate()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionConfig {
    pub metric: String,
    pub max_confidence: f32,
    #[serde(default)]
    pub cooldown_secs: Seconds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionTriggerConfig {
    pub behavior: String,
    pub condition: ConditionConfig,
    #[serde(default = "default_true")]
    pub resume_last: bool,
    #[serde(default)]
    pub can_interrupt_self: bool,
    #[serde(default = "default_true")]
    pub can_interrupt_other: bool,
}

/// Complete manager configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    #[serde(default)]
    pub behaviors: Vec<BehaviorConfig>,
    #[serde(default)]
    pub selection_chooser_config: Option<ChooserConfig>,
    #[serde(default)]
    pub demo_chooser_config: Option<ChooserConfig>,
    #[serde(default)]
    pub freeplay_chooser_config: Option<ChooserConfig>,
    /// Polled reaction strategies, highest priority first
    #[serde(default)]
    pub reaction_triggers: Vec<ReactionTriggerConfig>,
    #[serde(default)]
    pub initial_chooser: ChooserSlot,
    /// Slot activated when the active top-level activity finishes
    #[serde(default)]
    pub activity_return_chooser: ChooserSlot,
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
}

impl ManagerConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ManagerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn chooser_config(&self, slot: ChooserSlot) -> Option<&ChooserConfig> {
        match slot {
            ChooserSlot::Selection => self.selection_chooser_config.as_ref(),
            ChooserSlot::Demo => self.demo_chooser_config.as_ref(),
            ChooserSlot::Freeplay => self.freeplay_chooser_config.as_ref(),
        }
    }

    /// Check values that can be validated without building anything
    pub fn validate(&self) -> Result<()> {
        for behavior in &self.behaviors {
            if behavior.name.trim().is_empty() {
                return Err(ArbiterError::InvalidConfig("behavior with empty name".into()));
            }
            if let BehaviorKind::PlayAnimation { duration_secs, .. } = &behavior.kind {
                if !duration_secs.is_finite() || *duration_secs < 0.0 {
                    return Err(ArbiterError::InvalidConfig(format!(
                        "behavior '{}' has invalid duration {}",
                        behavior.name, duration_secs
                    )));
                }
            }
            if let Some(reaction) = &behavior.reaction {
                if reaction.tags.is_empty() {
                    return Err(ArbiterError::InvalidConfig(format!(
                        "reactionary behavior '{}' declares no event tags",
                        behavior.name
                    )));
                }
            }
        }

        for slot in ChooserSlot::ALL {
            if let Some(chooser) = self.chooser_config(slot) {
                chooser.validate()?;
            }
        }

        for trigger in &self.reaction_triggers {
            if trigger.condition.cooldown_secs < 0.0 || !trigger.condition.max_confidence.is_finite() {
                return Err(ArbiterError::InvalidConfig(format!(
                    "reaction trigger for '{}' has an invalid condition",
                    trigger.behavior
                )));
            }
        }

        Ok(())
    }
}
