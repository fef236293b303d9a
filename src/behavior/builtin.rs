//! Behaviors constructible from configuration

use crate::core::config::BehaviorConfig;
use crate::core::error::{ArbiterError, Result};
use crate::core::types::Seconds;

use super::{Behavior, BehaviorContext, BehaviorCore, BehaviorStatus};

/// Idles until something else is selected
#[derive(Debug, Clone)]
pub struct WaitBehavior {
    core: BehaviorCore,
}

impl WaitBehavior {
    pub fn new(core: BehaviorCore) -> Self {
        Self { core }
    }
}

impl Behavior for WaitBehavior {
    fn core(&self) -> &BehaviorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BehaviorCore {
        &mut self.core
    }

    fn on_init(&mut self, _ctx: &BehaviorContext) -> Result<()> {
        Ok(())
    }

    fn on_update(&mut self, _ctx: &BehaviorContext) -> Result<BehaviorStatus> {
        Ok(BehaviorStatus::Running)
    }

    fn is_idle(&self) -> bool {
        true
    }
}

/// Plays a named animation for a fixed duration
///
/// Rendering is external; this only tracks how long the animation has been playing.
#[derive(Debug, Clone)]
pub struct PlayAnimationBehavior {
    core: BehaviorCore,
    animation: String,
    duration_secs: Seconds,
    loops: u32,
    playing_since: Seconds,
}

impl PlayAnimationBehavior {
    pub fn new(core: BehaviorCore, animation: impl Into<String>, duration_secs: Seconds, loops: u32) -> Self {
        Self {
            core,
            animation: animation.into(),
            duration_secs,
            loops: loops.max(1),
            playing_since: 0.0,
        }
    }

    pub fn animation(&self) -> &str {
        &self.animation
    }

    fn total_secs(&self) -> Seconds {
        self.duration_secs * f64::from(self.loops)
    }
}

impl Behavior for PlayAnimationBehavior {
    fn core(&self) -> &BehaviorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BehaviorCore {
        &mut self.core
    }

    fn on_init(&mut self, ctx: &BehaviorContext) -> Result<()> {
        self.playing_since = ctx.now;
        tracing::debug!(
            behavior = %self.core.name,
            animation = %self.animation,
            loops = self.loops,
            "Playing animation"
        );
        Ok(())
    }

    fn on_update(&mut self, ctx: &BehaviorContext) -> Result<BehaviorStatus> {
        if ctx.now - self.playing_since >= self.total_secs() {
            Ok(BehaviorStatus::Complete)
        } else {
            Ok(BehaviorStatus::Running)
        }
    }

    fn on_stop(&mut self, _ctx: &BehaviorContext) {
        tracing::debug!(behavior = %self.core.name, animation = %self.animation, "Animation stopped");
    }
}

/// Runs for a fixed number of ticks and then reports a configured outcome
///
/// Used for deterministic scenarios. Resuming continues the tick count where it left off.
#[derive(Debug, Clone)]
pub struct ScriptedBehavior {
    core: BehaviorCore,
    run_ticks: Option<u32>,
    outcome: String,
    fail_init: bool,
    fail_resume: bool,
    ticks: u32,
}

impl ScriptedBehavior {
    pub fn new(core: BehaviorCore, run_ticks: Option<u32>, outcome: impl Into<String>) -> Self {
        Self {
            core,
            run_ticks,
            outcome: outcome.into(),
            fail_init: false,
            fail_resume: false,
            ticks: 0,
        }
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_resume(mut self) -> Self {
        self.fail_resume = true;
        self
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}

impl Behavior for ScriptedBehavior {
    fn core(&self) -> &BehaviorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BehaviorCore {
        &mut self.core
    }

    fn on_init(&mut self, _ctx: &BehaviorContext) -> Result<()> {
        if self.fail_init {
            return Err(ArbiterError::BehaviorInitFailed {
                behavior: self.core.name.clone(),
                reason: "configured to fail".into(),
            });
        }
        self.ticks = 0;
        Ok(())
    }

    fn on_resume(&mut self, _ctx: &BehaviorContext) -> Result<()> {
        if self.fail_resume {
            return Err(ArbiterError::ResumeFailed {
                behavior: self.core.name.clone(),
                reason: "configured to fail".into(),
            });
        }
        Ok(())
    }

    fn on_update(&mut self, _ctx: &BehaviorContext) -> Result<BehaviorStatus> {
        self.ticks += 1;
        match self.run_ticks {
            Some(limit) if self.ticks >= limit => {
                self.outcome
                    .parse()
                    .map_err(|status| ArbiterError::UnrecognizedStatus {
                        behavior: self.core.name.clone(),
                        status,
                    })
            }
            _ => Ok(BehaviorStatus::Running),
        }
    }
}

/// Construct the behavior described by `config`
pub fn from_config(config: &BehaviorConfig) -> Box<dyn Behavior> {
    use crate::core::config::BehaviorKind;

    let core = BehaviorCore::from_config(config);
    match &config.kind {
        BehaviorKind::Wait => Box::new(WaitBehavior::new(core)),
        BehaviorKind::PlayAnimation {
            animation,
            duration_secs,
            loops,
        } => Box::new(PlayAnimationBehavior::new(core, animation.clone(), *duration_secs, *loops)),
        BehaviorKind::Scripted {
            run_ticks,
            outcome,
            fail_init,
            fail_resume,
        } => {
            let mut scripted = ScriptedBehavior::new(core, *run_ticks, outcome.clone());
            scripted.fail_init = *fail_init;
            scripted.fail_resume = *fail_resume;
            Box::new(scripted)
        }
    }
}
