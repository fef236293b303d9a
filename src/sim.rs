//! Scripted simulation runs
//!
//! A script is a TOML timeline of events, host messages and state changes applied
//! at given ticks while a [`Robot`] is driven by a [`ManualClock`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;

use crate::core::clock::ManualClock;
use crate::core::config::ManagerConfig;
use crate::core::error::Result;
use crate::core::types::Seconds;
use crate::event::{HostMessage, RobotEvent};
use crate::manager::{BehaviorTransition, SessionContext, TransitionRecorder};
use crate::robot::Robot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    pub name: String,
    /// `None` removes the metric
    #[serde(default)]
    pub value: Option<f32>,
}

/// Everything applied before the tick with this number runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub tick: u64,
    #[serde(default)]
    pub event: Option<RobotEvent>,
    #[serde(default)]
    pub message: Option<HostMessage>,
    #[serde(default)]
    pub metric: Option<MetricChange>,
    #[serde(default)]
    pub on_treads: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut script: Script = toml::from_str(contents)?;
        script.steps.sort_by_key(|s| s.tick);
        Ok(script)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimOptions {
    pub ticks: u64,
    pub tick_secs: Seconds,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            ticks: 100,
            tick_secs: 0.1,
        }
    }
}

/// Result of a scripted run
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub ticks: u64,
    pub final_behavior: String,
    pub final_chooser: Option<String>,
    pub errors: Vec<String>,
    pub transitions: Vec<BehaviorTransition>,
    pub session: SessionContext,
}

/// Run `script` against a fresh robot built from `config`
///
/// Configuration errors abort the run. Tick and message errors are recorded in the
/// report and the run continues.
pub fn run_script(config: &ManagerConfig, script: &Script, options: SimOptions) -> Result<SimReport> {
    let clock = ManualClock::new();
    let mut robot = Robot::new(Rc::new(clock.clone()));
    let recorder = TransitionRecorder::new();
    robot.manager_mut().add_transition_sink(Box::new(recorder.clone()));
    robot.init(config)?;

    let mut errors = Vec::new();
    let mut steps = script.steps.iter().peekable();

    for tick in 0..options.ticks {
        while let Some(step) = steps.next_if(|s| s.tick <= tick) {
            apply_step(&mut robot, step, &mut errors);
        }

        if let Err(e) = robot.tick() {
            tracing::warn!(tick, error = %e, "Tick failed");
            errors.push(format!("tick {}: {}", tick, e));
        }
        clock.advance(options.tick_secs);
    }

    let manager = robot.manager();
    Ok(SimReport {
        ticks: options.ticks,
        final_behavior: manager.current_behavior_name().to_string(),
        final_chooser: manager.current_chooser().map(|slot| slot.to_string()),
        errors,
        transitions: recorder.transitions(),
        session: manager.session().clone(),
    })
}

fn apply_step(robot: &mut Robot, step: &ScriptStep, errors: &mut Vec<String>) {
    if let Some(change) = &step.metric {
        match change.value {
            Some(value) => robot.state_mut().set_metric(change.name.clone(), value),
            None => {
                robot.state_mut().clear_metric(&change.name);
            }
        }
    }
    if let Some(on_treads) = step.on_treads {
        robot.state_mut().on_treads = on_treads;
    }
    if let Some(message) = &step.message {
        if let Err(e) = robot.handle_message(message.clone()) {
            errors.push(format!("tick {}: {}", step.tick, e));
        }
    }
    if let Some(event) = &step.event {
        robot.publish(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_steps_sorted() {
        let script = Script::from_toml_str(
            r#"
            [[steps]]
            tick = 5
            on_treads = false

            [[steps]]
            tick = 1
            metric = { name = "frustration", value = 0.2 }
            "#,
        )
        .unwrap();

        assert_eq!(script.steps[0].tick, 1);
        assert_eq!(script.steps[1].on_treads, Some(false));
    }

    #[test]
    fn test_empty_config_runs_idle() {
        let report = run_script(&ManagerConfig::default(), &Script::default(), SimOptions::default()).unwrap();

        assert_eq!(report.final_behavior, "null");
        assert_eq!(report.final_chooser.as_deref(), Some("selection"));
        assert!(report.errors.is_empty());
        assert!(report.transitions.is_empty());
    }
}
