//! Requester-keyed locks that disable reactions
//!
//! A behavior type is enabled only while no requester holds a lock on it. Global
//! locks disable every reaction.

use ahash::{AHashMap, AHashSet};

#[derive(Debug, Clone, Default)]
pub struct ReactionLocks {
    global: AHashSet<String>,
    by_type: AHashMap<String, AHashSet<String>>,
}

impl ReactionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and warns) if `requester` already holds this lock
    pub fn disable_type(&mut self, requester: &str, behavior_type: &str) -> bool {
        let holders = self.by_type.entry(behavior_type.to_string()).or_default();
        if !holders.insert(requester.to_string()) {
            tracing::warn!(requester, behavior_type, "Reaction lock already held");
            return false;
        }
        tracing::debug!(requester, behavior_type, holders = holders.len(), "Reaction disabled");
        true
    }

    /// Returns false (and warns) if `requester` held no lock on this type
    pub fn enable_type(&mut self, requester: &str, behavior_type: &str) -> bool {
        let removed = self
            .by_type
            .get_mut(behavior_type)
            .is_some_and(|holders| holders.remove(requester));

        if !removed {
            tracing::warn!(requester, behavior_type, "Removing reaction lock that was not held");
            return false;
        }
        if self.by_type.get(behavior_type).is_some_and(|h| h.is_empty()) {
            self.by_type.remove(behavior_type);
        }
        tracing::debug!(requester, behavior_type, "Reaction lock released");
        true
    }

    pub fn disable_all(&mut self, lock: &str) -> bool {
        if !self.global.insert(lock.to_string()) {
            tracing::warn!(lock, "Global reaction lock already held");
            return false;
        }
        tracing::debug!(lock, "All reactions disabled");
        true
    }

    /// Drop `lock` from the global set and from every per-type set
    pub fn remove_lock(&mut self, lock: &str) -> bool {
        let mut removed = self.global.remove(lock);
        for holders in self.by_type.values_mut() {
            removed |= holders.remove(lock);
        }
        self.by_type.retain(|_, holders| !holders.is_empty());

        if removed {
            tracing::debug!(lock, "Reaction lock removed");
        } else {
            tracing::warn!(lock, "Removing unknown reaction lock");
        }
        removed
    }

    pub fn all_disabled(&self) -> bool {
        !self.global.is_empty()
    }

    pub fn is_type_enabled(&self, behavior_type: &str) -> bool {
        !self.all_disabled() && !self.by_type.contains_key(behavior_type)
    }
}
