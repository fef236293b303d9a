//! Behavior manager: owns the current behavior and arbitrates every switch
//!
//! Each tick the active chooser gets a bookkeeping update, polled reaction strategies
//! may preempt, and unless a reaction holds control the chooser picks the next behavior.
//! The current behavior then advances one step.
//!
//! Event-driven reactions arrive through [`BehaviorManager::handle_event`]. Reactionary
//! behaviors are scanned in registration order and the first eligible one wins.
//!
//! At most one behavior is running at any time. While a reaction runs, the behavior it
//! displaced is kept as the resume target and is resumed (not re-initialized) when the
//! reaction ends, unless the reaction asked not to.

pub mod session;
pub mod transition;

pub use session::{ActivityReport, BehaviorRunStats, SessionContext};
pub use transition::{BehaviorTransition, TransitionRecorder, TransitionSink};

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

use crate::behavior::{Behavior, BehaviorContext, BehaviorRegistry, BehaviorStatus, Capability};
use crate::chooser::{ArbiterRequest, BehaviorChooser, ChooserContext, ChooserSet};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::ManagerConfig;
use crate::core::error::{ArbiterError, Result};
use crate::core::state::RobotState;
use crate::core::types::{BehaviorId, ChooserSlot, Seconds};
use crate::event::{EventBus, EventTag, HostMessage, RobotEvent, SubscriptionHandle};
use crate::reaction::{ReactionLocks, ReactionTriggerStrategy};

pub struct BehaviorManager {
    registry: BehaviorRegistry,
    choosers: ChooserSet,
    current_chooser: Option<ChooserSlot>,

    current: Option<BehaviorId>,
    /// Only set while `running_reactionary`
    behavior_to_resume: Option<BehaviorId>,
    running_reactionary: bool,
    should_resume_after_reaction: bool,

    /// Reactionary behaviors in trigger priority order
    reactionary_behaviors: Vec<BehaviorId>,
    strategies: Vec<ReactionTriggerStrategy>,
    /// Strategy that started the current run; its cooldown begins when the run stops
    triggered_strategy: Option<usize>,
    locks: ReactionLocks,

    inbox: Rc<RefCell<VecDeque<RobotEvent>>>,
    subscriptions: Vec<SubscriptionHandle>,

    clock: Rc<dyn Clock>,
    state: RobotState,
    sinks: Vec<Box<dyn TransitionSink>>,
    session: SessionContext,

    initialized: bool,
    last_chooser_switch: Seconds,
    pending_requests: Vec<ArbiterRequest>,
    pending_chooser_switch: Option<ChooserSlot>,
    activity_return_chooser: ChooserSlot,
}

impl BehaviorManager {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            registry: BehaviorRegistry::default(),
            choosers: ChooserSet::empty(),
            current_chooser: None,
            current: None,
            behavior_to_resume: None,
            running_reactionary: false,
            should_resume_after_reaction: true,
            reactionary_behaviors: Vec::new(),
            strategies: Vec::new(),
            triggered_strategy: None,
            locks: ReactionLocks::new(),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            subscriptions: Vec::new(),
            clock,
            state: RobotState::new(),
            sinks: Vec::new(),
            session: SessionContext::new(),
            initialized: false,
            last_chooser_switch: 0.0,
            pending_requests: Vec::new(),
            pending_chooser_switch: None,
            activity_return_chooser: ChooserSlot::Selection,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Rc::new(SystemClock::new()))
    }

    // === SETUP ===

    /// Register a behavior built outside configuration; call before `init`
    pub fn add_behavior(&mut self, behavior: Box<dyn Behavior>) -> Result<BehaviorId> {
        self.registry.add(behavior)
    }

    /// Replace the chooser in `slot`
    ///
    /// Event tags the chooser wants are subscribed at `init`, so install before then.
    /// Replacing the active chooser re-runs its selection.
    pub fn install_chooser(&mut self, slot: ChooserSlot, chooser: Box<dyn BehaviorChooser>) {
        let active = self.current_chooser == Some(slot);
        if active {
            self.with_chooser(slot, |c, ctx| c.on_deselected(ctx));
            self.apply_requests();
            self.current_chooser = None;
        }
        self.choosers.install(slot, chooser);
        if active {
            self.activate_chooser(slot);
        }
    }

    /// Add a polled reaction strategy; lower priority than those already added
    pub fn add_reaction_strategy(&mut self, strategy: ReactionTriggerStrategy) {
        self.strategies.push(strategy);
    }

    pub fn add_transition_sink(&mut self, sink: Box<dyn TransitionSink>) {
        self.sinks.push(sink);
    }

    /// Build behaviors, choosers and strategies from `config`, subscribe to events,
    /// then activate the initial chooser
    ///
    /// On error the manager stays uninitialized and may be initialized again.
    pub fn init(&mut self, config: &ManagerConfig, bus: &mut EventBus) -> Result<()> {
        if self.initialized {
            tracing::error!("BehaviorManager::init called twice");
            return Err(ArbiterError::AlreadyInitialized);
        }

        let preregistered = self.registry.len();
        if let Err(e) = self.build_from_config(config) {
            tracing::error!(error = %e, "Behavior manager initialization failed");
            self.registry.truncate(preregistered);
            return Err(e);
        }

        self.reactionary_behaviors = self.registry.reactionary_ids();
        self.subscribe_events(bus);

        self.session = SessionContext::new();
        self.activity_return_chooser = config.activity_return_chooser;
        self.initialized = true;

        tracing::info!(
            session = %self.session.session_id,
            behaviors = self.registry.len(),
            reactionary = self.reactionary_behaviors.len(),
            strategies = self.strategies.len(),
            "Behavior manager initialized"
        );

        self.activate_chooser(config.initial_chooser);
        Ok(())
    }

    fn build_from_config(&mut self, config: &ManagerConfig) -> Result<()> {
        config.validate()?;

        self.registry.set_policy(config.collision_policy);
        for behavior in &config.behaviors {
            self.registry.create(behavior)?;
        }

        let mut built = Vec::new();
        for slot in ChooserSlot::ALL {
            match config.chooser_config(slot) {
                Some(chooser_config) => {
                    built.push((slot, crate::chooser::build_chooser(slot.as_str(), chooser_config, &self.registry)?));
                }
                None => tracing::debug!(%slot, "No chooser configured; keeping installed chooser"),
            }
        }

        let strategies = config
            .reaction_triggers
            .iter()
            .map(|t| ReactionTriggerStrategy::from_config(t, &self.registry))
            .collect::<Result<Vec<_>>>()?;

        for (slot, chooser) in built {
            self.choosers.install(slot, chooser);
        }
        self.strategies.extend(strategies);
        Ok(())
    }

    fn subscribe_events(&mut self, bus: &mut EventBus) {
        let mut tags: BTreeSet<EventTag> = BTreeSet::new();
        for &id in &self.reactionary_behaviors {
            if let Some(traits) = self.registry.get(id).and_then(|b| b.reaction_traits()) {
                tags.extend(traits.tags.iter().copied());
            }
        }
        for slot in ChooserSlot::ALL {
            tags.extend(self.choosers.get(slot).event_tags());
        }

        for tag in tags {
            let inbox = Rc::clone(&self.inbox);
            let handle = bus.subscribe(tag, move |event| inbox.borrow_mut().push_back(event.clone()));
            self.subscriptions.push(handle);
            tracing::debug!(?tag, "Subscribed to event");
        }
    }

    /// Cancel every event subscription made by `init`
    pub fn unsubscribe_events(&mut self, bus: &mut EventBus) {
        for handle in self.subscriptions.drain(..) {
            bus.unsubscribe(handle);
        }
    }

    // === TICK ===

    pub fn update(&mut self) -> Result<()> {
        if !self.initialized {
            tracing::error!("BehaviorManager::update called before init");
            return Err(ArbiterError::NotInitialized);
        }

        if let Some(slot) = self.current_chooser {
            self.with_chooser(slot, |c, ctx| c.update(ctx));
            self.apply_requests();
        }

        let switched = self.check_reaction_trigger_strategies();

        if !switched && !self.running_reactionary {
            let next = self.choose_from_active();
            self.switch_to_behavior(next);
        }

        let result = self.update_current_behavior();

        if let Some(slot) = self.pending_chooser_switch.take() {
            tracing::info!(chooser = %slot, "Activity finished; returning to chooser");
            self.activate_chooser(slot);
        }

        result
    }

    fn update_current_behavior(&mut self) -> Result<()> {
        let Some(id) = self.current else {
            return Ok(());
        };

        let ctx = BehaviorContext {
            state: &self.state,
            now: self.clock.now_secs(),
        };
        let Some(behavior) = self.registry.get_mut(id) else {
            return Ok(());
        };
        let status = behavior.update(&ctx);

        match status {
            Ok(BehaviorStatus::Running) => Ok(()),
            Ok(status) => {
                let name = self.registry.name_of(Some(id)).to_string();
                tracing::debug!(behavior = %name, ?status, "Behavior finished");
                let stats = self.session.behavior_mut(&name);
                if status == BehaviorStatus::Complete {
                    stats.completions += 1;
                } else {
                    stats.failures += 1;
                }

                if self.running_reactionary {
                    self.running_reactionary = false;
                    self.switch_to_next_behavior();
                } else {
                    self.switch_to_behavior(None);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    behavior = %self.registry.name_of(Some(id)),
                    error = %e,
                    "Behavior update returned an unusable status"
                );
                self.clear_reaction_state();
                self.switch_to_behavior(None);
                Err(e)
            }
        }
    }

    /// Poll condition-driven reactions; at most one switch per tick
    fn check_reaction_trigger_strategies(&mut self) -> bool {
        if self.strategies.is_empty() || self.locks.all_disabled() {
            return false;
        }

        let now = self.clock.now_secs();
        let triggered = self.strategies.iter().position(|strategy| {
            let Some(behavior) = self.registry.get(strategy.behavior()) else {
                return false;
            };
            self.locks.is_type_enabled(behavior.behavior_type())
                && strategy.can_interrupt(self.current, self.running_reactionary)
                && strategy.should_trigger(&self.state, now)
                && behavior.is_runnable(&self.state)
        });

        let Some(index) = triggered else {
            return false;
        };
        let behavior = self.strategies[index].behavior();
        let resume_last = self.strategies[index].resume_last();
        tracing::info!(
            behavior = %self.registry.name_of(Some(behavior)),
            metric = %self.strategies[index].condition().metric(),
            "Reaction strategy triggered"
        );

        let switched = if self.current == Some(behavior) {
            if !self.running_reactionary {
                // The chooser's own run becomes the reaction; nothing else was displaced
                self.behavior_to_resume = None;
                self.should_resume_after_reaction = true;
                self.running_reactionary = true;
            }
            self.restart_reaction(behavior)
        } else {
            self.switch_to_reactionary(behavior, resume_last)
        };
        if switched {
            self.triggered_strategy = Some(index);
        }
        switched
    }

    // === SWITCHING ===

    /// Make `next` the current behavior
    ///
    /// Switching to the current behavior does nothing. Otherwise the current behavior
    /// is stopped and `next` initialized; if that fails the manager is left with no
    /// behavior and `false` is returned. A transition is broadcast either way.
    pub fn switch_to_behavior(&mut self, next: Option<BehaviorId>) -> bool {
        if next == self.current {
            return true;
        }

        let old = self.current.take();
        if let Some(old_id) = old {
            self.stop_behavior(old_id);
        }

        let mut succeeded = true;
        if let Some(next_id) = next {
            match self.init_behavior(next_id) {
                Ok(()) => self.current = Some(next_id),
                Err(e) => {
                    tracing::warn!(error = %e, "Behavior failed to start; falling back to none");
                    succeeded = false;
                }
            }
        }

        self.broadcast_transition(old, self.current);
        succeeded
    }

    /// Preempt the current behavior with a reaction
    ///
    /// `None` means no reaction and is ignored. The first reaction in a chain records the
    /// displaced behavior as the resume target; later reactions keep that target.
    pub fn switch_to_reactionary_behavior(&mut self, next: Option<BehaviorId>) -> bool {
        match next {
            Some(id) => self.switch_to_reactionary(id, true),
            None => false,
        }
    }

    fn switch_to_reactionary(&mut self, next: BehaviorId, resume_allowed: bool) -> bool {
        if Some(next) == self.current {
            return false;
        }

        let was_reactionary = self.running_reactionary;
        if !was_reactionary && self.behavior_to_resume.is_none() {
            self.behavior_to_resume = self.current;
        }

        if self.switch_to_behavior(Some(next)) {
            let resume_last = resume_allowed
                && self
                    .registry
                    .get(next)
                    .map_or(true, |b| b.should_resume_last_behavior());
            let previous = if was_reactionary {
                self.should_resume_after_reaction
            } else {
                true
            };

            self.running_reactionary = true;
            self.should_resume_after_reaction = previous && resume_last;
            self.session.reactions_fired += 1;

            tracing::info!(
                reaction = %self.registry.name_of(Some(next)),
                resume_target = %self.registry.name_of(self.behavior_to_resume),
                should_resume = self.should_resume_after_reaction,
                "Reaction started"
            );
            return true;
        }

        if was_reactionary {
            // The interrupted reaction is already stopped; end the chain
            self.running_reactionary = false;
            self.switch_to_next_behavior();
        } else {
            self.behavior_to_resume = None;
        }
        false
    }

    /// Stop and re-initialize a reaction that retriggered itself
    fn restart_reaction(&mut self, id: BehaviorId) -> bool {
        self.stop_behavior(id);
        self.current = None;

        match self.init_behavior(id) {
            Ok(()) => {
                self.current = Some(id);
                self.session.reactions_fired += 1;
                tracing::info!(reaction = %self.registry.name_of(Some(id)), "Reaction restarted");
                self.broadcast_transition(Some(id), Some(id));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reaction failed to restart");
                self.broadcast_transition(Some(id), None);
                self.running_reactionary = false;
                self.switch_to_next_behavior();
                false
            }
        }
    }

    /// Leave a finished reaction: resume the displaced behavior or ask the chooser
    pub fn switch_to_next_behavior(&mut self) {
        let target = self.behavior_to_resume.take();
        let should_resume = std::mem::replace(&mut self.should_resume_after_reaction, true);
        self.running_reactionary = false;

        match target {
            Some(target) if should_resume => {
                let old = self.current.take();
                if let Some(old_id) = old {
                    if old_id != target {
                        self.stop_behavior(old_id);
                    }
                }

                match self.resume_behavior(target) {
                    Ok(()) => {
                        self.current = Some(target);
                        self.broadcast_transition(old, self.current);
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Resume failed; selecting a new behavior");
                        if old.is_some() {
                            self.broadcast_transition(old, None);
                        }
                    }
                }
            }
            Some(target) => {
                tracing::debug!(
                    behavior = %self.registry.name_of(Some(target)),
                    "Reaction does not resume; discarding resume target"
                );
                self.switch_to_behavior(None);
                return;
            }
            None => {}
        }

        let next = self.choose_from_active();
        if next.is_some() && next == self.current {
            // Picking the finished reaction again starts a fresh run
            self.switch_to_behavior(None);
        }
        self.switch_to_behavior(next);
    }

    /// Stop whatever is running and forget any reaction in progress
    pub fn force_stop_current_behavior(&mut self, reason: &str) {
        tracing::info!(
            behavior = %self.registry.name_of(self.current),
            reason,
            "Force stopping current behavior"
        );
        self.clear_reaction_state();
        self.switch_to_behavior(None);
    }

    // === CHOOSERS ===

    /// Activate the chooser in `slot`; does nothing if it is already active
    pub fn set_behavior_chooser(&mut self, slot: ChooserSlot) {
        if !self.initialized {
            tracing::error!(chooser = %slot, "set_behavior_chooser called before init");
            return;
        }
        if self.current_chooser == Some(slot) {
            tracing::debug!(chooser = %slot, "Chooser already active");
            return;
        }
        self.activate_chooser(slot);
    }

    fn activate_chooser(&mut self, slot: ChooserSlot) {
        if let Some(old) = self.current_chooser.take() {
            self.with_chooser(old, |c, ctx| c.on_deselected(ctx));
            self.apply_requests();
        }

        self.switch_to_behavior(None);
        self.clear_reaction_state();
        self.pending_chooser_switch = None;

        self.current_chooser = Some(slot);
        self.with_chooser(slot, |c, ctx| c.on_selected(ctx));
        self.apply_requests();
        self.last_chooser_switch = self.clock.now_secs();

        tracing::info!(
            chooser = %slot,
            name = %self.choosers.get(slot).name(),
            "Behavior chooser activated"
        );

        let next = self.choose_from_active();
        self.switch_to_behavior(next);
    }

    fn choose_from_active(&mut self) -> Option<BehaviorId> {
        let slot = self.current_chooser?;
        let next = self.with_chooser(slot, |c, ctx| c.choose_next_behavior(ctx));
        self.apply_requests();
        next
    }

    fn with_chooser<R>(
        &mut self,
        slot: ChooserSlot,
        f: impl FnOnce(&mut dyn BehaviorChooser, &mut ChooserContext<'_>) -> R,
    ) -> R {
        let now = self.clock.now_secs();
        let mut ctx = ChooserContext {
            registry: &self.registry,
            state: &self.state,
            current: self.current,
            running_reactionary: self.running_reactionary,
            now,
            requests: &mut self.pending_requests,
        };
        f(self.choosers.get_mut(slot), &mut ctx)
    }

    fn apply_requests(&mut self) {
        let requests = std::mem::take(&mut self.pending_requests);
        for request in requests {
            match request {
                ArbiterRequest::DisableReactions { lock, behavior_types } => {
                    for behavior_type in &behavior_types {
                        self.locks.disable_type(&lock, behavior_type);
                    }
                }
                ArbiterRequest::RemoveReactionsLock { lock } => {
                    self.locks.remove_lock(&lock);
                }
                ArbiterRequest::EndCurrentBehavior { reason } => {
                    if self.running_reactionary {
                        tracing::debug!(reason = %reason, "Reaction holds control; not ending it");
                    } else if self.current.is_some() {
                        tracing::info!(
                            behavior = %self.registry.name_of(self.current),
                            reason = %reason,
                            "Chooser ended current behavior"
                        );
                        self.switch_to_behavior(None);
                    }
                }
                ArbiterRequest::ActivityFinished {
                    activity,
                    outcome,
                    objectives_completed,
                    elapsed_secs,
                } => {
                    let finished_at = self.clock.now_secs();
                    self.session.record_activity(ActivityReport {
                        activity: activity.clone(),
                        outcome,
                        objectives_completed,
                        elapsed_secs,
                        finished_at,
                    });

                    let top_level = self
                        .current_chooser
                        .filter(|&slot| self.choosers.get(slot).name() == activity);
                    if top_level.is_some() {
                        self.pending_chooser_switch = Some(self.activity_return_chooser);
                    }
                }
            }
        }
    }

    // === EVENTS AND MESSAGES ===

    /// Handle every event delivered by the bus since the last call
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let next = self.inbox.borrow_mut().pop_front();
            match next {
                Some(event) => {
                    self.handle_event(&event);
                    handled += 1;
                }
                None => return handled,
            }
        }
    }

    /// Forward to the active chooser, then fire at most one matching reaction
    pub fn handle_event(&mut self, event: &RobotEvent) {
        if !self.initialized {
            tracing::warn!(tag = ?event.tag, "Event received before init; ignoring");
            return;
        }

        if let Some(slot) = self.current_chooser {
            if self.choosers.get(slot).event_tags().contains(&event.tag) {
                self.with_chooser(slot, |c, ctx| c.handle_event(event, ctx));
                self.apply_requests();
            }
        }

        if self.locks.all_disabled() {
            tracing::debug!(tag = ?event.tag, "Reactions disabled; ignoring event");
            return;
        }

        let matched = self
            .reactionary_behaviors
            .iter()
            .copied()
            .find(|&id| self.reaction_matches(id, event));

        if let Some(id) = matched {
            tracing::info!(
                tag = ?event.tag,
                reaction = %self.registry.name_of(Some(id)),
                "Event triggered reaction"
            );
            self.switch_to_reactionary(id, true);
        }
    }

    fn reaction_matches(&self, id: BehaviorId, event: &RobotEvent) -> bool {
        let Some(behavior) = self.registry.get(id) else {
            return false;
        };
        let Capability::Reactionary(traits) = behavior.capability() else {
            return false;
        };

        traits.responds_to(event.tag)
            && self.locks.is_type_enabled(behavior.behavior_type())
            && behavior.should_run_for_event(event, &self.state)
            && behavior.is_runnable(&self.state)
    }

    /// Add or remove `requester`'s lock on reactions of `behavior_type`
    pub fn request_enable_reactionary_behavior(
        &mut self,
        requester: &str,
        behavior_type: &str,
        enable: bool,
    ) -> bool {
        if enable {
            self.locks.enable_type(requester, behavior_type)
        } else {
            self.locks.disable_type(requester, behavior_type)
        }
    }

    pub fn handle_message(&mut self, message: HostMessage) -> Result<()> {
        if !self.initialized {
            tracing::error!(?message, "Host message received before init");
            return Err(ArbiterError::NotInitialized);
        }
        tracing::debug!(?message, "Handling host message");

        match message {
            HostMessage::ActivateChooser { slot } => self.set_behavior_chooser(slot),
            HostMessage::ExecuteBehavior { behavior } => {
                let id = self.registry.resolve(&behavior)?;
                let slot = ChooserSlot::Selection;
                if !self.choosers.get_mut(slot).request_behavior(id) {
                    tracing::warn!(behavior = %behavior, "Selection chooser cannot execute behaviors");
                }
                self.set_behavior_chooser(slot);
            }
            HostMessage::ForceStop { reason } => self.force_stop_current_behavior(&reason),
            HostMessage::EnableReactionaryBehavior {
                requester,
                behavior_type,
                enable,
            } => {
                self.request_enable_reactionary_behavior(&requester, &behavior_type, enable);
            }
            HostMessage::DisableAllReactions { lock } => {
                self.locks.disable_all(&lock);
            }
            HostMessage::RemoveReactionsLock { lock } => {
                self.locks.remove_lock(&lock);
            }
            HostMessage::CancelActivity => {
                if let Some(slot) = self.current_chooser {
                    self.choosers.get_mut(slot).request_end();
                }
            }
        }
        Ok(())
    }

    // === LIFECYCLE HELPERS ===

    fn init_behavior(&mut self, id: BehaviorId) -> Result<()> {
        let now = self.clock.now_secs();
        let ctx = BehaviorContext {
            state: &self.state,
            now,
        };
        let behavior = self
            .registry
            .get_mut(id)
            .ok_or_else(|| ArbiterError::UnknownBehavior(id.to_string()))?;
        let name = behavior.name().to_string();
        let result = behavior.init(&ctx);

        let stats = self.session.behavior_mut(&name);
        match &result {
            Ok(()) => stats.starts += 1,
            Err(_) => stats.init_failures += 1,
        }
        result
    }

    fn resume_behavior(&mut self, id: BehaviorId) -> Result<()> {
        let now = self.clock.now_secs();
        let ctx = BehaviorContext {
            state: &self.state,
            now,
        };
        let behavior = self
            .registry
            .get_mut(id)
            .ok_or_else(|| ArbiterError::UnknownBehavior(id.to_string()))?;
        let name = behavior.name().to_string();
        let result = behavior.resume(&ctx);

        let stats = self.session.behavior_mut(&name);
        match &result {
            Ok(()) => stats.resumes += 1,
            Err(_) => stats.resume_failures += 1,
        }
        result
    }

    /// Stop `id` if running; a run started by a strategy starts that strategy's cooldown
    fn stop_behavior(&mut self, id: BehaviorId) {
        let now = self.clock.now_secs();
        let ctx = BehaviorContext {
            state: &self.state,
            now,
        };

        let Some(behavior) = self.registry.get_mut(id) else {
            return;
        };
        if !behavior.is_running() {
            return;
        }
        behavior.stop(&ctx);

        let triggered = self
            .triggered_strategy
            .filter(|&index| self.strategies.get(index).is_some_and(|s| s.behavior() == id));
        if let Some(index) = triggered {
            self.triggered_strategy = None;
            if let Some(strategy) = self.strategies.get_mut(index) {
                strategy.behavior_finished(now);
            }
        }
    }

    fn clear_reaction_state(&mut self) {
        self.running_reactionary = false;
        self.behavior_to_resume = None;
        self.should_resume_after_reaction = true;
    }

    fn broadcast_transition(&mut self, old: Option<BehaviorId>, new: Option<BehaviorId>) {
        let describe = |id: Option<BehaviorId>| match id.and_then(|id| self.registry.get(id)) {
            Some(b) => (b.name().to_string(), b.behavior_type().to_string(), b.is_reactionary()),
            None => ("null".to_string(), "null".to_string(), false),
        };
        let (old_name, old_type, old_reactionary) = describe(old);
        let (new_name, new_type, new_reactionary) = describe(new);

        let transition = BehaviorTransition {
            old_name,
            new_name,
            old_type,
            new_type,
            old_reactionary,
            new_reactionary,
            at: self.clock.now_secs(),
        };

        tracing::info!(
            from = %transition.old_name,
            to = %transition.new_name,
            reactionary = transition.new_reactionary,
            "Behavior transition"
        );

        self.session.transitions_emitted += 1;
        for sink in &mut self.sinks {
            sink.on_transition(&transition);
        }
    }

    // === ACCESSORS ===

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn current_behavior(&self) -> Option<BehaviorId> {
        self.current
    }

    pub fn current_behavior_name(&self) -> &str {
        self.registry.name_of(self.current)
    }

    pub fn behavior_to_resume(&self) -> Option<BehaviorId> {
        self.behavior_to_resume
    }

    pub fn is_running_reactionary(&self) -> bool {
        self.running_reactionary
    }

    pub fn should_resume_after_reaction(&self) -> bool {
        self.should_resume_after_reaction
    }

    pub fn current_chooser(&self) -> Option<ChooserSlot> {
        self.current_chooser
    }

    pub fn chooser(&self, slot: ChooserSlot) -> &dyn BehaviorChooser {
        self.choosers.get(slot)
    }

    pub fn last_chooser_switch_time(&self) -> Seconds {
        self.last_chooser_switch
    }

    pub fn registry(&self) -> &BehaviorRegistry {
        &self.registry
    }

    pub fn find_behavior(&self, name: &str) -> Option<BehaviorId> {
        self.registry.find(name)
    }

    pub fn locks(&self) -> &ReactionLocks {
        &self.locks
    }

    pub fn state(&self) -> &RobotState {
        &self.state
    }

    /// Host-side state updates between ticks
    pub fn state_mut(&mut self) -> &mut RobotState {
        &mut self.state
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn now(&self) -> Seconds {
        self.clock.now_secs()
    }
}

impl std::fmt::Debug for BehaviorManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorManager")
            .field("initialized", &self.initialized)
            .field("current_chooser", &self.current_chooser)
            .field("current", &self.current_behavior_name())
            .field("behavior_to_resume", &self.behavior_to_resume)
            .field("running_reactionary", &self.running_reactionary)
            .finish()
    }
}
