//! Threshold predicate with cooldown hysteresis

use crate::core::config::ConditionConfig;
use crate::core::state::RobotState;
use crate::core::types::Seconds;

/// Fires while a metric is below `max_confidence`, at most once per cooldown window
///
/// Evaluating never starts the cooldown. Only [`behavior_finished`](Self::behavior_finished)
/// does, so a reaction that was preempted before it ran stays eligible.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionCondition {
    metric: String,
    max_confidence: f32,
    cooldown_secs: Seconds,
    last_fired: Option<Seconds>,
}

impl ReactionCondition {
    pub fn new(metric: impl Into<String>, max_confidence: f32, cooldown_secs: Seconds) -> Self {
        Self {
            metric: metric.into(),
            max_confidence,
            cooldown_secs,
            last_fired: None,
        }
    }

    pub fn from_config(config: &ConditionConfig) -> Self {
        Self::new(config.metric.clone(), config.max_confidence, config.cooldown_secs)
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn last_fired(&self) -> Option<Seconds> {
        self.last_fired
    }

    pub fn is_cooling_down(&self, now: Seconds) -> bool {
        self.last_fired
            .is_some_and(|fired| now - fired < self.cooldown_secs)
    }

    pub fn evaluate(&self, state: &RobotState, now: Seconds) -> bool {
        let below_threshold = state
            .metric(&self.metric)
            .is_some_and(|value| value < self.max_confidence);

        below_threshold && !self.is_cooling_down(now)
    }

    /// The bound behavior stopped running; start the cooldown
    pub fn behavior_finished(&mut self, now: Seconds) {
        self.last_fired = Some(now);
    }
}
