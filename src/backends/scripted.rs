//! In-memory input port for demos and tests.

use std::collections::VecDeque;
use std::time::Duration;

use crate::device::InputPort;
use crate::error::PortError;
use crate::event::{ControlEvent, DeviceIdentity};

/// Port that replays a queue of pre-scripted events.
///
/// When the script runs out the port reports
/// [`PortError::Disconnected`], which lets an
/// [`EventPump`](crate::device::EventPump) wind down on its own.
pub struct ScriptedPort {
    identity: DeviceIdentity,
    queue: VecDeque<ControlEvent>,
}

impl ScriptedPort {
    pub fn new(name: &str) -> Self {
        Self {
            identity: DeviceIdentity::new(name),
            queue: VecDeque::new(),
        }
    }

    /// Queues a raw event.
    pub fn feed(&mut self, event: ControlEvent) {
        self.queue.push_back(event);
    }

    /// Queues a pad press with the given intensity.
    pub fn press(&mut self, control: u8, intensity: i32) {
        let event = ControlEvent::trigger(self.identity.clone(), control, intensity);
        self.feed(event);
    }

    /// Queues a pad release.
    pub fn release(&mut self, control: u8) {
        let event = ControlEvent::trigger(self.identity.clone(), control, 0);
        self.feed(event);
    }

    /// Queues a knob/slider reading.
    pub fn turn(&mut self, control: u8, value: i32) {
        let event = ControlEvent::continuous(self.identity.clone(), control, value);
        self.feed(event);
    }
}

impl InputPort for ScriptedPort {
    fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn read(&mut self, _timeout: Duration) -> Result<Option<ControlEvent>, PortError> {
        match self.queue.pop_front() {
            Some(event) => Ok(Some(event)),
            None => Err(PortError::Disconnected),
        }
    }
}
