//! Weighted random selection for unsupervised play

use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::BehaviorId;

use super::{BehaviorChooser, ChooserContext};

/// Picks a runnable behavior at random, weighted, and sticks with it while it runs
pub struct FreeplayChooser {
    name: String,
    candidates: Vec<(BehaviorId, f32)>,
    rng: ChaCha8Rng,
}

impl FreeplayChooser {
    pub fn new(name: impl Into<String>, candidates: Vec<(BehaviorId, f32)>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            name: name.into(),
            candidates,
            rng,
        }
    }
}

impl BehaviorChooser for FreeplayChooser {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_next_behavior(&mut self, ctx: &mut ChooserContext) -> Option<BehaviorId> {
        if let Some(current) = ctx.running_current() {
            if self.candidates.iter().any(|(id, _)| *id == current) {
                return Some(current);
            }
        }

        let runnable: Vec<(BehaviorId, f32)> = self
            .candidates
            .iter()
            .copied()
            .filter(|&(id, weight)| weight > 0.0 && ctx.is_runnable(id))
            .collect();

        let dist = WeightedIndex::new(runnable.iter().map(|(_, w)| *w)).ok()?;
        let (choice, _) = runnable[dist.sample(&mut self.rng)];
        tracing::debug!(chooser = %self.name, behavior = %ctx.registry.name_of(Some(choice)), "Freeplay pick");
        Some(choice)
    }
}

impl std::fmt::Debug for FreeplayChooser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreeplayChooser")
            .field("name", &self.name)
            .field("candidates", &self.candidates)
            .finish()
    }
}
