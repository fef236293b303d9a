//! Host-facing facade: one manager, one event bus, one clock

use std::rc::Rc;

use crate::core::clock::Clock;
use crate::core::config::ManagerConfig;
use crate::core::error::Result;
use crate::core::state::RobotState;
use crate::event::{EventBus, HostMessage, RobotEvent};
use crate::manager::BehaviorManager;

pub struct Robot {
    manager: BehaviorManager,
    bus: EventBus,
    clock: Rc<dyn Clock>,
}

impl Robot {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            manager: BehaviorManager::new(Rc::clone(&clock)),
            bus: EventBus::new(),
            clock,
        }
    }

    pub fn init(&mut self, config: &ManagerConfig) -> Result<()> {
        self.manager.init(config, &mut self.bus)
    }

    /// Publish an event and let the manager react to it before returning
    ///
    /// Events without a timestamp are stamped with the current time.
    pub fn publish(&mut self, mut event: RobotEvent) -> usize {
        if event.timestamp == 0.0 {
            event.timestamp = self.clock.now_secs();
        }
        let delivered = self.bus.publish(&event);
        self.manager.pump_events();
        delivered
    }

    /// One control tick
    pub fn tick(&mut self) -> Result<()> {
        self.manager.pump_events();
        self.manager.update()
    }

    pub fn handle_message(&mut self, message: HostMessage) -> Result<()> {
        self.manager.handle_message(message)
    }

    pub fn state_mut(&mut self) -> &mut RobotState {
        self.manager.state_mut()
    }

    pub fn manager(&self) -> &BehaviorManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut BehaviorManager {
        &mut self.manager
    }

    /// For subscribers outside the manager
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }
}

impl std::fmt::Debug for Robot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Robot")
            .field("manager", &self.manager)
            .field("bus", &self.bus)
            .finish()
    }
}
