//! Scripted activity: intro, bounded inner selection, outro
//!
//! ```text
//! ChooserSelected -> PlayingIntro -> UsingInnerChooser -> WaitingForCurrentToStop -> PlayingOutro -> finished
//!                                                                  |
//!                                                                  +-> EndWhenReactionEnds -> finished
//! ```
//!
//! The activity exits the inner chooser when the minimum time has passed and the
//! repetition target is met, when the maximum time has passed and the running behavior
//! is not one the activity must let finish, or on cancellation. Timeouts and
//! cancellation end the running behavior at once; after a met objective it may finish,
//! unless it is an idle behavior that never would. If a reaction holds control when
//! the activity is ready to leave, the outro is skipped and the activity finishes once
//! the reaction ends on its own.

use serde::{Deserialize, Serialize};

use crate::core::types::{BehaviorId, Seconds};
use crate::event::{EventPayload, EventTag, RobotEvent};

use super::{ActivityOutcome, ArbiterRequest, BehaviorChooser, ChooserContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityState {
    ChooserSelected,
    PlayingIntro,
    UsingInnerChooser,
    WaitingForCurrentToStop,
    PlayingOutro,
    EndWhenReactionEnds,
}

/// Outro animations keyed by outcome
#[derive(Debug, Clone, Default)]
pub struct Outros {
    pub success: Option<BehaviorId>,
    pub failure: Option<BehaviorId>,
    pub timeout: Option<BehaviorId>,
}

impl Outros {
    fn for_outcome(&self, outcome: ActivityOutcome) -> Option<BehaviorId> {
        match outcome {
            ActivityOutcome::Succeeded => self.success,
            ActivityOutcome::Failed => self.failure.or(self.timeout),
            ActivityOutcome::TimedOut => self.timeout.or(self.failure),
            ActivityOutcome::Cancelled => None,
        }
    }
}

/// Limits on how long the inner chooser runs
#[derive(Debug, Clone, Default)]
pub struct ActivityLimits {
    pub min_duration_secs: Seconds,
    pub max_duration_secs: Seconds,
    /// Zero means "run out the clock"
    pub repetitions: u32,
    pub objective: Option<String>,
    pub required_group: Option<String>,
}

pub struct SequenceActivity {
    name: String,
    intro: Option<BehaviorId>,
    inner: Box<dyn BehaviorChooser>,
    outros: Outros,
    limits: ActivityLimits,
    disable_during_outro: Vec<String>,
    disable_while_active: Vec<String>,

    state: ActivityState,
    started_at: Seconds,
    objectives_completed: u32,
    cancel_requested: bool,
    outcome: Option<ActivityOutcome>,
    active_lock_held: bool,
    outro_lock_held: bool,
    finished: bool,
}

impl SequenceActivity {
    pub fn new(
        name: impl Into<String>,
        inner: Box<dyn BehaviorChooser>,
        limits: ActivityLimits,
    ) -> Self {
        Self {
            name: name.into(),
            intro: None,
            inner,
            outros: Outros::default(),
            limits,
            disable_during_outro: Vec::new(),
            disable_while_active: Vec::new(),
            state: ActivityState::ChooserSelected,
            started_at: 0.0,
            objectives_completed: 0,
            cancel_requested: false,
            outcome: None,
            active_lock_held: false,
            outro_lock_held: false,
            finished: false,
        }
    }

    pub fn with_intro(mut self, intro: Option<BehaviorId>) -> Self {
        self.intro = intro;
        self
    }

    pub fn with_outros(mut self, outros: Outros) -> Self {
        self.outros = outros;
        self
    }

    pub fn with_reaction_locks(mut self, while_active: Vec<String>, during_outro: Vec<String>) -> Self {
        self.disable_while_active = while_active;
        self.disable_during_outro = during_outro;
        self
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn outcome(&self) -> Option<ActivityOutcome> {
        self.outcome
    }

    pub fn objectives_completed(&self) -> u32 {
        self.objectives_completed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn active_lock(&self) -> String {
        format!("{}.active", self.name)
    }

    fn outro_lock(&self) -> String {
        format!("{}.outro", self.name)
    }

    fn set_state(&mut self, next: ActivityState) {
        if self.state != next {
            tracing::debug!(activity = %self.name, from = ?self.state, to = ?next, "Activity state change");
            self.state = next;
        }
    }

    /// The outcome to exit with, and whether the exit cuts the running behavior short
    fn exit_outcome(&self, ctx: &ChooserContext) -> Option<(ActivityOutcome, bool)> {
        let elapsed = ctx.now - self.started_at;
        let reps = self.limits.repetitions;

        if self.cancel_requested {
            return Some((ActivityOutcome::Cancelled, true));
        }

        let reps_reached = elapsed >= self.limits.min_duration_secs
            && reps != 0
            && self.objectives_completed >= reps;

        let outside_required = match (&self.limits.required_group, ctx.current) {
            (Some(group), Some(current)) => ctx
                .registry
                .get(current)
                .map_or(true, |b| !b.is_behavior_group(group)),
            _ => true,
        };
        let max_timeout = elapsed >= self.limits.max_duration_secs && outside_required;

        if !(reps_reached || max_timeout) {
            return None;
        }

        let outcome = if reps == 0 || self.objectives_completed >= reps {
            ActivityOutcome::Succeeded
        } else if self.objectives_completed > 0 {
            ActivityOutcome::Failed
        } else {
            ActivityOutcome::TimedOut
        };
        Some((outcome, !reps_reached))
    }

    fn begin_exit(&mut self, outcome: ActivityOutcome, cut_short: bool, ctx: &mut ChooserContext) {
        tracing::info!(
            activity = %self.name,
            ?outcome,
            objectives = self.objectives_completed,
            elapsed_secs = ctx.now - self.started_at,
            "Activity exit condition reached"
        );
        self.outcome = Some(outcome);
        if !self.disable_during_outro.is_empty() {
            ctx.request(ArbiterRequest::DisableReactions {
                lock: self.outro_lock(),
                behavior_types: self.disable_during_outro.clone(),
            });
            self.outro_lock_held = true;
        }
        if cut_short && !ctx.running_reactionary && ctx.running_current().is_some() {
            ctx.request(ArbiterRequest::EndCurrentBehavior {
                reason: format!("{} exiting: {:?}", self.name, outcome),
            });
        }
        self.set_state(ActivityState::WaitingForCurrentToStop);
    }

    fn finish(&mut self, ctx: &mut ChooserContext) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.release_outro_lock(ctx);

        let outcome = self.outcome.unwrap_or(ActivityOutcome::Cancelled);
        tracing::info!(activity = %self.name, ?outcome, "Activity finished");
        ctx.request(ArbiterRequest::ActivityFinished {
            activity: self.name.clone(),
            outcome,
            objectives_completed: self.objectives_completed,
            elapsed_secs: ctx.now - self.started_at,
        });
    }

    fn release_outro_lock(&mut self, ctx: &mut ChooserContext) {
        if self.outro_lock_held {
            self.outro_lock_held = false;
            ctx.request(ArbiterRequest::RemoveReactionsLock {
                lock: self.outro_lock(),
            });
        }
    }
}

impl BehaviorChooser for SequenceActivity {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_selected(&mut self, ctx: &mut ChooserContext) {
        self.state = ActivityState::ChooserSelected;
        self.started_at = ctx.now;
        self.objectives_completed = 0;
        self.cancel_requested = false;
        self.outcome = None;
        self.finished = false;

        if !self.disable_while_active.is_empty() {
            ctx.request(ArbiterRequest::DisableReactions {
                lock: self.active_lock(),
                behavior_types: self.disable_while_active.clone(),
            });
            self.active_lock_held = true;
        }

        tracing::info!(activity = %self.name, "Activity selected");
        self.inner.on_selected(ctx);
    }

    fn on_deselected(&mut self, ctx: &mut ChooserContext) {
        if self.active_lock_held {
            self.active_lock_held = false;
            ctx.request(ArbiterRequest::RemoveReactionsLock {
                lock: self.active_lock(),
            });
        }
        self.release_outro_lock(ctx);

        tracing::info!(activity = %self.name, state = ?self.state, "Activity deselected");
        self.inner.on_deselected(ctx);
    }

    fn update(&mut self, ctx: &mut ChooserContext) {
        if self.finished {
            return;
        }

        if ctx.running_reactionary
            && matches!(self.state, ActivityState::ChooserSelected | ActivityState::PlayingIntro)
        {
            tracing::debug!(activity = %self.name, "Intro interrupted by reaction");
            self.set_state(ActivityState::UsingInnerChooser);
        }

        if self.state == ActivityState::UsingInnerChooser {
            if let Some((outcome, cut_short)) = self.exit_outcome(ctx) {
                self.begin_exit(outcome, cut_short, ctx);
            }
        }

        match self.state {
            ActivityState::WaitingForCurrentToStop if ctx.running_reactionary => {
                tracing::info!(activity = %self.name, "Exit reached during reaction; skipping outro");
                self.set_state(ActivityState::EndWhenReactionEnds);
            }
            ActivityState::EndWhenReactionEnds if !ctx.running_reactionary => {
                self.finish(ctx);
                return;
            }
            _ => {}
        }

        self.inner.update(ctx);
    }

    fn choose_next_behavior(&mut self, ctx: &mut ChooserContext) -> Option<BehaviorId> {
        if self.finished {
            return None;
        }

        match self.state {
            ActivityState::ChooserSelected => {
                if let Some(intro) = self.intro {
                    self.set_state(ActivityState::PlayingIntro);
                    return Some(intro);
                }
                self.set_state(ActivityState::UsingInnerChooser);
                self.inner.choose_next_behavior(ctx)
            }
            ActivityState::PlayingIntro => match ctx.running_current() {
                Some(current) if Some(current) == self.intro => Some(current),
                _ => {
                    self.set_state(ActivityState::UsingInnerChooser);
                    self.inner.choose_next_behavior(ctx)
                }
            },
            ActivityState::UsingInnerChooser => self.inner.choose_next_behavior(ctx),
            ActivityState::WaitingForCurrentToStop => {
                if let Some(current) = ctx.running_current().filter(|&id| !ctx.is_idle(id)) {
                    return Some(current);
                }
                let outro = self
                    .outcome
                    .and_then(|outcome| self.outros.for_outcome(outcome));
                match outro {
                    Some(outro) => {
                        self.set_state(ActivityState::PlayingOutro);
                        Some(outro)
                    }
                    None => {
                        self.finish(ctx);
                        None
                    }
                }
            }
            ActivityState::PlayingOutro => match ctx.running_current() {
                Some(current) => Some(current),
                None => {
                    self.finish(ctx);
                    None
                }
            },
            ActivityState::EndWhenReactionEnds => None,
        }
    }

    fn event_tags(&self) -> Vec<EventTag> {
        let mut tags = self.inner.event_tags();
        if self.limits.objective.is_some() && !tags.contains(&EventTag::ObjectiveAchieved) {
            tags.push(EventTag::ObjectiveAchieved);
        }
        tags
    }

    fn handle_event(&mut self, event: &RobotEvent, ctx: &mut ChooserContext) {
        if let (Some(wanted), EventPayload::Objective { objective }) = (&self.limits.objective, &event.payload) {
            if wanted == objective && self.state == ActivityState::UsingInnerChooser {
                self.objectives_completed += 1;
                tracing::debug!(
                    activity = %self.name,
                    objective = %objective,
                    completed = self.objectives_completed,
                    "Objective achieved"
                );
            }
        }
        self.inner.handle_event(event, ctx);
    }

    fn request_behavior(&mut self, behavior: BehaviorId) -> bool {
        self.inner.request_behavior(behavior)
    }

    fn request_end(&mut self) {
        tracing::info!(activity = %self.name, "Activity cancellation requested");
        self.cancel_requested = true;
    }
}

impl std::fmt::Debug for SequenceActivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceActivity")
            .field("name", &self.name)
            .field("inner", &self.inner.name())
            .field("state", &self.state)
            .field("objectives_completed", &self.objectives_completed)
            .field("outcome", &self.outcome)
            .finish()
    }
}
