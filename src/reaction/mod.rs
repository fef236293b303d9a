//! Reaction gating: threshold conditions, trigger strategies and disable locks

pub mod condition;
pub mod locks;
pub mod strategy;

pub use condition::ReactionCondition;
pub use locks::ReactionLocks;
pub use strategy::ReactionTriggerStrategy;
