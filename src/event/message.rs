//! Host-driven control messages for the behavior manager

use serde::{Deserialize, Serialize};

use crate::core::types::ChooserSlot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    /// Switch the active top-level chooser
    ActivateChooser { slot: ChooserSlot },
    /// Ask the selection chooser to run a specific behavior
    ExecuteBehavior { behavior: String },
    /// Stop whatever is running right now
    ForceStop { reason: String },
    /// Lock or unlock reactions of a behavior type on behalf of a requester
    EnableReactionaryBehavior {
        requester: String,
        behavior_type: String,
        enable: bool,
    },
    DisableAllReactions { lock: String },
    RemoveReactionsLock { lock: String },
    /// End the active activity at its next opportunity
    CancelActivity,
}
