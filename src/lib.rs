//! Behavior Arbiter - behavior arbitration core for an autonomous robot
//!
//! Each control tick the [`manager::BehaviorManager`] decides which single behavior
//! drives the robot, lets reactions preempt it, and resumes what they displaced.

pub mod behavior;
pub mod chooser;
pub mod core;
pub mod event;
pub mod manager;
pub mod reaction;
pub mod robot;
pub mod sim;

pub use crate::behavior::{Behavior, BehaviorStatus};
pub use crate::chooser::BehaviorChooser;
pub use crate::core::{ArbiterError, BehaviorId, ChooserSlot, Result};
pub use crate::manager::BehaviorManager;
pub use crate::robot::Robot;
