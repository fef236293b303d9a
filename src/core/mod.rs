pub mod clock;
pub mod config;
pub mod error;
pub mod state;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ArbiterError, Result};
pub use state::RobotState;
pub use types::{BehaviorId, ChooserSlot, Seconds};
