//! Robot/world events that may trigger reactions
//!
//! Events carry a tag, used for subscription routing, and a typed payload.
//! The wire encoding of these events is the host's concern.

pub mod bus;
pub mod message;

pub use bus::{EventBus, SubscriptionHandle};
pub use message::HostMessage;

use serde::{Deserialize, Serialize};

use crate::core::types::Seconds;

/// Subscription key for events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    CliffDetected,
    RobotPickedUp,
    RobotFalling,
    UnexpectedMovement,
    ObjectObserved,
    FaceObserved,
    PetDetected,
    MoodChanged,
    ObjectiveAchieved,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    #[default]
    None,
    Object {
        object_id: u32,
        distance_mm: f32,
    },
    Face {
        face_id: i32,
        #[serde(default)]
        name: Option<String>,
        distance_mm: f32,
    },
    Mood {
        emotion: String,
        value: f32,
    },
    Objective {
        objective: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotEvent {
    pub tag: EventTag,
    #[serde(default)]
    pub payload: EventPayload,
    #[serde(default)]
    pub timestamp: Seconds,
}

impl RobotEvent {
    pub fn new(tag: EventTag) -> Self {
        Self {
            tag,
            payload: EventPayload::None,
            timestamp: 0.0,
        }
    }

    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn at(mut self, timestamp: Seconds) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn object_observed(object_id: u32, distance_mm: f32) -> Self {
        Self::new(EventTag::ObjectObserved).with_payload(EventPayload::Object {
            object_id,
            distance_mm,
        })
    }

    pub fn objective_achieved(objective: impl Into<String>) -> Self {
        Self::new(EventTag::ObjectiveAchieved).with_payload(EventPayload::Objective {
            objective: objective.into(),
        })
    }

    /// Distance to whatever the event is about, if the payload carries one
    pub fn distance_mm(&self) -> Option<f32> {
        match &self.payload {
            EventPayload::Object { distance_mm, .. } | EventPayload::Face { distance_mm, .. } => {
                Some(*distance_mm)
            }
            _ => None,
        }
    }
}
