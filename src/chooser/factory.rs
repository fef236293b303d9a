//! Build choosers from configuration

use crate::behavior::BehaviorRegistry;
use crate::core::config::{ChooserConfig, SequenceConfig};
use crate::core::error::Result;
use crate::core::types::ChooserSlot;

use super::freeplay::FreeplayChooser;
use super::sequence::{ActivityLimits, Outros, SequenceActivity};
use super::simple::{NullChooser, PriorityChooser, SelectionChooser};
use super::BehaviorChooser;

/// Build a chooser; any behavior name it references must already be registered
pub fn build_chooser(
    name: &str,
    config: &ChooserConfig,
    registry: &BehaviorRegistry,
) -> Result<Box<dyn BehaviorChooser>> {
    let chooser: Box<dyn BehaviorChooser> = match config {
        ChooserConfig::Null => Box::new(NullChooser::new(name)),
        ChooserConfig::Selection { default_behavior } => {
            let default = default_behavior
                .as_deref()
                .map(|n| registry.resolve(n))
                .transpose()?;
            Box::new(SelectionChooser::new(name, default))
        }
        ChooserConfig::Priority { behaviors } => {
            let ids = behaviors
                .iter()
                .map(|n| registry.resolve(n))
                .collect::<Result<Vec<_>>>()?;
            Box::new(PriorityChooser::new(name, ids))
        }
        ChooserConfig::Freeplay { behaviors, seed } => {
            let candidates = behaviors
                .iter()
                .map(|b| registry.resolve(&b.name).map(|id| (id, b.weight)))
                .collect::<Result<Vec<_>>>()?;
            Box::new(FreeplayChooser::new(name, candidates, *seed))
        }
        ChooserConfig::Sequence(seq) => Box::new(build_sequence(seq, registry)?),
    };
    Ok(chooser)
}

fn build_sequence(config: &SequenceConfig, registry: &BehaviorRegistry) -> Result<SequenceActivity> {
    let resolve = |name: &Option<String>| name.as_deref().map(|n| registry.resolve(n)).transpose();

    let inner = build_chooser(&format!("{}.inner", config.name), &config.inner, registry)?;
    let limits = ActivityLimits {
        min_duration_secs: config.min_duration_secs,
        max_duration_secs: config.max_duration_secs,
        repetitions: config.repetitions,
        objective: config.objective.clone(),
        required_group: config.required_group.clone(),
    };

    Ok(SequenceActivity::new(config.name.clone(), inner, limits)
        .with_intro(resolve(&config.intro)?)
        .with_outros(Outros {
            success: resolve(&config.success_outro)?,
            failure: resolve(&config.failure_outro)?,
            timeout: resolve(&config.timeout_outro)?,
        })
        .with_reaction_locks(
            config.disable_while_active.clone(),
            config.disable_during_outro.clone(),
        ))
}

/// The three top-level chooser slots
pub struct ChooserSet {
    selection: Box<dyn BehaviorChooser>,
    demo: Box<dyn BehaviorChooser>,
    freeplay: Box<dyn BehaviorChooser>,
}

impl ChooserSet {
    /// Every slot a `NullChooser`
    pub fn empty() -> Self {
        Self {
            selection: Box::new(NullChooser::new(ChooserSlot::Selection.as_str())),
            demo: Box::new(NullChooser::new(ChooserSlot::Demo.as_str())),
            freeplay: Box::new(NullChooser::new(ChooserSlot::Freeplay.as_str())),
        }
    }

    pub fn install(&mut self, slot: ChooserSlot, chooser: Box<dyn BehaviorChooser>) {
        *self.slot_mut(slot) = chooser;
    }

    pub fn get(&self, slot: ChooserSlot) -> &dyn BehaviorChooser {
        match slot {
            ChooserSlot::Selection => self.selection.as_ref(),
            ChooserSlot::Demo => self.demo.as_ref(),
            ChooserSlot::Freeplay => self.freeplay.as_ref(),
        }
    }

    pub fn get_mut(&mut self, slot: ChooserSlot) -> &mut dyn BehaviorChooser {
        self.slot_mut(slot).as_mut()
    }

    fn slot_mut(&mut self, slot: ChooserSlot) -> &mut Box<dyn BehaviorChooser> {
        match slot {
            ChooserSlot::Selection => &mut self.selection,
            ChooserSlot::Demo => &mut self.demo,
            ChooserSlot::Freeplay => &mut self.freeplay,
        }
    }
}

impl Default for ChooserSet {
    fn default() -> Self {
        Self::empty()
    }
}
