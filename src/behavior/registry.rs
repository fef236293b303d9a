//! Behavior registry: the single owner of every behavior
//!
//! Behaviors are created once at configuration time and never removed, so a
//! [`BehaviorId`] stays valid for the registry's lifetime.

use ahash::AHashMap;

use crate::core::config::{BehaviorConfig, CollisionPolicy};
use crate::core::error::{ArbiterError, Result};
use crate::core::types::BehaviorId;

use super::{builtin, Behavior};

/// Factory entry point: build a behavior from configuration
pub fn build_behavior(config: &BehaviorConfig) -> Box<dyn Behavior> {
    builtin::from_config(config)
}

pub struct BehaviorRegistry {
    /// Arena indexed by `BehaviorId`
    behaviors: Vec<Box<dyn Behavior>>,
    /// Map from name to ID for fast lookup
    by_name: AHashMap<String, BehaviorId>,
    policy: CollisionPolicy,
}

impl BehaviorRegistry {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            behaviors: Vec::new(),
            by_name: AHashMap::new(),
            policy,
        }
    }

    /// Register a behavior and return its ID
    ///
    /// With `CollisionPolicy::Overwrite` a duplicate name replaces the existing behavior
    /// in place and keeps its ID.
    pub fn add(&mut self, behavior: Box<dyn Behavior>) -> Result<BehaviorId> {
        let name = behavior.name().to_string();

        if let Some(&existing) = self.by_name.get(&name) {
            return match self.policy {
                CollisionPolicy::Fail => {
                    tracing::error!(behavior = %name, "Duplicate behavior name");
                    Err(ArbiterError::DuplicateBehavior(name))
                }
                CollisionPolicy::Overwrite => {
                    tracing::warn!(behavior = %name, id = %existing, "Overwriting behavior");
                    self.behaviors[existing.index()] = behavior;
                    Ok(existing)
                }
            };
        }

        let id = BehaviorId(self.behaviors.len() as u32);
        self.behaviors.push(behavior);
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Build a behavior from configuration and register it
    pub fn create(&mut self, config: &BehaviorConfig) -> Result<BehaviorId> {
        let id = self.add(build_behavior(config))?;
        tracing::debug!(behavior = %config.name, %id, "Created behavior");
        Ok(id)
    }

    pub fn set_policy(&mut self, policy: CollisionPolicy) {
        self.policy = policy;
    }

    /// Drop every behavior registered after the first `len`
    pub fn truncate(&mut self, len: usize) {
        self.behaviors.truncate(len);
        self.by_name.retain(|_, id| id.index() < len);
    }

    pub fn find(&self, name: &str) -> Option<BehaviorId> {
        self.by_name.get(name).copied()
    }

    /// Like [`find`](Self::find) but a missing name is a configuration error
    pub fn resolve(&self, name: &str) -> Result<BehaviorId> {
        self.find(name)
            .ok_or_else(|| ArbiterError::UnknownBehavior(name.to_string()))
    }

    pub fn get(&self, id: BehaviorId) -> Option<&dyn Behavior> {
        self.behaviors.get(id.index()).map(|b| b.as_ref())
    }

    pub fn get_mut(&mut self, id: BehaviorId) -> Option<&mut dyn Behavior> {
        match self.behaviors.get_mut(id.index()) {
            Some(behavior) => Some(behavior.as_mut()),
            None => None,
        }
    }

    pub fn name_of(&self, id: Option<BehaviorId>) -> &str {
        id.and_then(|id| self.get(id)).map_or("null", |b| b.name())
    }

    /// All behaviors in registration order
    pub fn iter(&self) -> impl Iterator<Item = (BehaviorId, &dyn Behavior)> {
        self.behaviors
            .iter()
            .enumerate()
            .map(|(i, b)| (BehaviorId(i as u32), b.as_ref()))
    }

    /// Reactionary behaviors in registration order, which is their trigger priority
    pub fn reactionary_ids(&self) -> Vec<BehaviorId> {
        self.iter()
            .filter(|(_, b)| b.is_reactionary())
            .map(|(id, _)| id)
            .collect()
    }

    /// IDs of every behavior currently reporting `is_running()`
    pub fn running_ids(&self) -> Vec<BehaviorId> {
        self.iter()
            .filter(|(_, b)| b.is_running())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::new(CollisionPolicy::default())
    }
}

impl std::fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.behaviors.iter().map(|b| b.name()).collect();
        f.debug_struct("BehaviorRegistry")
            .field("behaviors", &names)
            .field("policy", &self.policy)
            .finish()
    }
}
