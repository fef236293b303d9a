//! Behaviors: schedulable units of robot conduct
//!
//! A behavior implements the `on_*` hooks; the provided `init`/`update`/`stop`/`resume`
//! methods wrap them with lifecycle bookkeeping so that `is_running()` is always accurate.
//! Behaviors are owned by the [`registry::BehaviorRegistry`] and referred to elsewhere
//! only by [`BehaviorId`](crate::core::types::BehaviorId).

pub mod builtin;
pub mod registry;

pub use builtin::{PlayAnimationBehavior, ScriptedBehavior, WaitBehavior};
pub use registry::{build_behavior, BehaviorRegistry};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::config::{BehaviorConfig, MetricGate};
use crate::core::error::Result;
use crate::core::state::RobotState;
use crate::core::types::Seconds;
use crate::event::{EventTag, RobotEvent};

/// Result of advancing a behavior by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorStatus {
    Running,
    Complete,
    Failure,
}

impl FromStr for BehaviorStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" => Ok(BehaviorStatus::Running),
            "complete" => Ok(BehaviorStatus::Complete),
            "failure" => Ok(BehaviorStatus::Failure),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Running,
    Stopped,
}

/// Counters for lifecycle hook invocations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStats {
    pub init_calls: u32,
    pub init_failures: u32,
    pub resume_calls: u32,
    pub resume_failures: u32,
    pub stop_calls: u32,
    pub update_calls: u32,
}

/// What makes a behavior reactionary
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionaryTraits {
    pub tags: Vec<EventTag>,
    pub resume_last: bool,
    pub max_distance_mm: Option<f32>,
}

impl ReactionaryTraits {
    pub fn responds_to(&self, tag: EventTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Capability query result; replaces downcasting to a reactionary sub-interface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capability<'a> {
    Deliberate,
    Reactionary(&'a ReactionaryTraits),
}

/// Read-only view handed to behavior hooks
#[derive(Debug, Clone, Copy)]
pub struct BehaviorContext<'a> {
    pub state: &'a RobotState,
    pub now: Seconds,
}

/// Identity, capabilities and lifecycle shared by every behavior
#[derive(Debug, Clone)]
pub struct BehaviorCore {
    pub name: String,
    pub behavior_type: String,
    pub groups: Vec<String>,
    pub reaction: Option<ReactionaryTraits>,
    pub requires_on_treads: bool,
    pub runnable_metric: Option<MetricGate>,
    pub lifecycle: LifecycleState,
    pub stats: LifecycleStats,
    pub started_at: Option<Seconds>,
}

impl BehaviorCore {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            behavior_type: name.clone(),
            name,
            groups: Vec::new(),
            reaction: None,
            requires_on_treads: false,
            runnable_metric: None,
            lifecycle: LifecycleState::Uninitialized,
            stats: LifecycleStats::default(),
            started_at: None,
        }
    }

    pub fn from_config(config: &BehaviorConfig) -> Self {
        Self {
            name: config.name.clone(),
            behavior_type: config.type_tag().to_string(),
            groups: config.groups.clone(),
            reaction: config.reaction.as_ref().map(|r| ReactionaryTraits {
                tags: r.tags.clone(),
                resume_last: r.resume_last,
                max_distance_mm: r.max_distance_mm,
            }),
            requires_on_treads: config.requires_on_treads,
            runnable_metric: config.runnable_metric.clone(),
            lifecycle: LifecycleState::Uninitialized,
            stats: LifecycleStats::default(),
            started_at: None,
        }
    }

    fn gates_pass(&self, state: &RobotState) -> bool {
        if self.requires_on_treads && !state.on_treads {
            return false;
        }
        match &self.runnable_metric {
            Some(gate) => state.metric(&gate.metric).is_some_and(|v| v >= gate.min_value),
            None => true,
        }
    }
}

pub trait Behavior {
    fn core(&self) -> &BehaviorCore;
    fn core_mut(&mut self) -> &mut BehaviorCore;

    fn on_init(&mut self, ctx: &BehaviorContext) -> Result<()>;

    /// Advance one tick. An unrecognizable outcome is `Err(UnrecognizedStatus)`.
    fn on_update(&mut self, ctx: &BehaviorContext) -> Result<BehaviorStatus>;

    /// Release anything acquired in `on_init`/`on_resume`
    fn on_stop(&mut self, _ctx: &BehaviorContext) {}

    /// Lighter re-entry after being preempted by a reaction
    fn on_resume(&mut self, ctx: &BehaviorContext) -> Result<()> {
        self.on_init(ctx)
    }

    /// Behavior-specific runnability on top of the configured gates
    fn can_run(&self, _state: &RobotState) -> bool {
        true
    }

    /// Whether a matching event should actually trigger this reaction
    fn should_run_for_event(&self, event: &RobotEvent, _state: &RobotState) -> bool {
        match (self.reaction_traits().and_then(|r| r.max_distance_mm), event.distance_mm()) {
            (Some(max), Some(distance)) => distance <= max,
            _ => true,
        }
    }

    fn name(&self) -> &str {
        &self.core().name
    }

    fn behavior_type(&self) -> &str {
        &self.core().behavior_type
    }

    fn capability(&self) -> Capability<'_> {
        match &self.core().reaction {
            Some(traits) => Capability::Reactionary(traits),
            None => Capability::Deliberate,
        }
    }

    fn reaction_traits(&self) -> Option<&ReactionaryTraits> {
        self.core().reaction.as_ref()
    }

    fn is_reactionary(&self) -> bool {
        self.core().reaction.is_some()
    }

    fn is_behavior_group(&self, group: &str) -> bool {
        self.core().groups.iter().any(|g| g == group)
    }

    /// Deliberate behaviors always allow resuming whatever they displaced
    fn should_resume_last_behavior(&self) -> bool {
        self.reaction_traits().map_or(true, |r| r.resume_last)
    }

    /// Never finishes on its own; safe to cut short at any time
    fn is_idle(&self) -> bool {
        false
    }

    fn is_running(&self) -> bool {
        self.core().lifecycle == LifecycleState::Running
    }

    fn lifecycle(&self) -> LifecycleState {
        self.core().lifecycle
    }

    fn stats(&self) -> LifecycleStats {
        self.core().stats
    }

    fn is_runnable(&self, state: &RobotState) -> bool {
        self.core().gates_pass(state) && self.can_run(state)
    }

    fn init(&mut self, ctx: &BehaviorContext) -> Result<()> {
        self.core_mut().stats.init_calls += 1;
        match self.on_init(ctx) {
            Ok(()) => {
                let core = self.core_mut();
                core.lifecycle = LifecycleState::Running;
                core.started_at = Some(ctx.now);
                Ok(())
            }
            Err(e) => {
                let core = self.core_mut();
                core.stats.init_failures += 1;
                core.lifecycle = LifecycleState::Stopped;
                Err(e)
            }
        }
    }

    fn resume(&mut self, ctx: &BehaviorContext) -> Result<()> {
        self.core_mut().stats.resume_calls += 1;
        match self.on_resume(ctx) {
            Ok(()) => {
                self.core_mut().lifecycle = LifecycleState::Running;
                Ok(())
            }
            Err(e) => {
                let core = self.core_mut();
                core.stats.resume_failures += 1;
                core.lifecycle = LifecycleState::Stopped;
                Err(e)
            }
        }
    }

    fn update(&mut self, ctx: &BehaviorContext) -> Result<BehaviorStatus> {
        self.core_mut().stats.update_calls += 1;
        self.on_update(ctx)
    }

    /// No-op unless running
    fn stop(&mut self, ctx: &BehaviorContext) {
        if !self.is_running() {
            return;
        }
        self.on_stop(ctx);
        let core = self.core_mut();
        core.stats.stop_calls += 1;
        core.lifecycle = LifecycleState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ArbiterError;

    struct Flaky {
        core: BehaviorCore,
        fail: bool,
    }

    impl Behavior for Flaky {
        fn core(&self) -> &BehaviorCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut BehaviorCore {
            &mut self.core
        }
        fn on_init(&mut self, _ctx: &BehaviorContext) -> Result<()> {
            if self.fail {
                return Err(ArbiterError::BehaviorInitFailed {
                    behavior: self.core.name.clone(),
                    reason: "flaky".into(),
                });
            }
            Ok(())
        }
        fn on_update(&mut self, _ctx: &BehaviorContext) -> Result<BehaviorStatus> {
            Ok(BehaviorStatus::Running)
        }
    }

    fn ctx(state: &RobotState) -> BehaviorContext<'_> {
        BehaviorContext { state, now: 2.0 }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Complete".parse::<BehaviorStatus>(), Ok(BehaviorStatus::Complete));
        assert_eq!("exploded".parse::<BehaviorStatus>(), Err("exploded".to_string()));
    }

    #[test]
    fn test_lifecycle_transitions() {
        let state = RobotState::new();
        let mut b = Flaky {
            core: BehaviorCore::new("flaky"),
            fail: false,
        };

        assert_eq!(b.lifecycle(), LifecycleState::Uninitialized);
        b.init(&ctx(&state)).unwrap();
        assert!(b.is_running());
        assert_eq!(b.core().started_at, Some(2.0));

        b.stop(&ctx(&state));
        b.stop(&ctx(&state));
        assert_eq!(b.lifecycle(), LifecycleState::Stopped);
        assert_eq!(b.stats().stop_calls, 1);
    }

    #[test]
    fn test_failed_init_not_running() {
        let state = RobotState::new();
        let mut b = Flaky {
            core: BehaviorCore::new("flaky"),
            fail: true,
        };

        assert!(b.init(&ctx(&state)).is_err());
        assert!(!b.is_running());
        assert_eq!(b.stats().init_failures, 1);
    }

    #[test]
    fn test_capability_query() {
        let mut core = BehaviorCore::new("startle");
        let b = Flaky {
            core: core.clone(),
            fail: false,
        };
        assert_eq!(b.capability(), Capability::Deliberate);
        assert!(b.should_resume_last_behavior());

        core.reaction = Some(ReactionaryTraits {
            tags: vec![EventTag::CliffDetected],
            resume_last: false,
            max_distance_mm: None,
        });
        let r = Flaky { core, fail: false };
        match r.capability() {
            Capability::Reactionary(traits) => assert!(traits.responds_to(EventTag::CliffDetected)),
            Capability::Deliberate => panic!("expected reactionary capability"),
        }
        assert!(!r.should_resume_last_behavior());
    }

    #[test]
    fn test_runnable_gates() {
        let mut core = BehaviorCore::new("drive");
        core.requires_on_treads = true;
        core.runnable_metric = Some(MetricGate {
            metric: "battery".into(),
            min_value: 0.2,
        });
        let b = Flaky { core, fail: false };

        let mut state = RobotState::new().with_metric("battery", 0.5);
        assert!(b.is_runnable(&state));

        state.on_treads = false;
        assert!(!b.is_runnable(&state));

        let low = RobotState::new().with_metric("battery", 0.1);
        assert!(!b.is_runnable(&low));
    }

    #[test]
    fn test_event_distance_filter() {
        let mut core = BehaviorCore::new("notice_cube");
        core.reaction = Some(ReactionaryTraits {
            tags: vec![EventTag::ObjectObserved],
            resume_last: true,
            max_distance_mm: Some(200.0),
        });
        let b = Flaky { core, fail: false };
        let state = RobotState::new();

        assert!(b.should_run_for_event(&RobotEvent::object_observed(1, 150.0), &state));
        assert!(!b.should_run_for_event(&RobotEvent::object_observed(1, 450.0), &state));
    }
}
