//! Event dispatch.
//!
//! The dispatcher resolves an incoming [`ControlEvent`] against the mapping
//! store and executes the bound action on the output adapters. It owns one
//! [`PadOutput`] per attached input device (the 1:1 association behind
//! [`OutputHandle`]) and a single shared virtual keyboard.
//!
//! All output calls are synchronous; the frame is committed before
//! `dispatch` returns, so the caller can process the next event without
//! risking coalesced intermediate states.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::binding::{ActionKind, BindingKey};
use crate::error::OutputError;
use crate::event::{ControlEvent, DeviceIdentity, EventClass};
use crate::output::{Axis, KeyOutput, OutputHandle, PadOutput};
use crate::store::MappingStore;

/// What a dispatch call did, for observability and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Press-then-release pair emitted for this button.
    ButtonTapped(u8),
    /// One axis channel updated and committed.
    AxisSet { axis: Axis, value: i16 },
    /// Key-down/key-up pair emitted.
    KeyTapped(String),
    /// No binding for this event. Informational only.
    Unmapped,
    /// Trigger release (zero intensity); triggers only dispatch on press.
    Ignored,
    /// The event's device has no attached pad output.
    NoOutputDevice,
}

pub struct Dispatcher {
    pads: HashMap<DeviceIdentity, Box<dyn PadOutput>>,
    keyboard: Box<dyn KeyOutput>,
    /// Minimum key hold. A tunable for downstream input recognition, not a
    /// correctness requirement; zero skips the sleep entirely.
    key_hold: Duration,
}

impl Dispatcher {
    pub fn new(keyboard: Box<dyn KeyOutput>, key_hold: Duration) -> Self {
        Self {
            pads: HashMap::new(),
            keyboard,
            key_hold,
        }
    }

    /// Associates a virtual pad with an input device for this session.
    /// Replaces any previous pad for the same identity.
    pub fn attach_pad(
        &mut self,
        identity: DeviceIdentity,
        pad: Box<dyn PadOutput>,
    ) -> OutputHandle {
        self.pads.insert(identity.clone(), pad);
        OutputHandle::new(identity)
    }

    pub fn has_pad(&self, identity: &DeviceIdentity) -> bool {
        self.pads.contains_key(identity)
    }

    /// Resolves and executes the action bound to `event`.
    pub fn dispatch(
        &mut self,
        store: &MappingStore,
        event: &ControlEvent,
    ) -> Result<DispatchOutcome, OutputError> {
        // The source domain has no release action; trigger releases are noise.
        if event.class == EventClass::Trigger && event.value == 0 {
            return Ok(DispatchOutcome::Ignored);
        }

        let key = BindingKey::new(event.device.clone(), event.control, event.class);
        let Some(action) = store.get(&key) else {
            info!("no mapping for {key}");
            return Ok(DispatchOutcome::Unmapped);
        };

        match action {
            ActionKind::ButtonPress { button } => {
                let button = *button;
                let Some(pad) = self.pads.get_mut(&event.device) else {
                    warn!("{}: no pad output attached", event.device);
                    return Ok(DispatchOutcome::NoOutputDevice);
                };
                // Momentary tap: press and release as two committed frames.
                pad.press_button(button)?;
                pad.commit()?;
                pad.release_button(button)?;
                pad.commit()?;
                debug!("{key} -> button {button} tapped");
                Ok(DispatchOutcome::ButtonTapped(button))
            }
            ActionKind::AxisMove { axis, range } => {
                let (axis, value) = (*axis, range.normalize(event.value));
                let Some(pad) = self.pads.get_mut(&event.device) else {
                    warn!("{}: no pad output attached", event.device);
                    return Ok(DispatchOutcome::NoOutputDevice);
                };
                pad.set_axis(axis, value)?;
                pad.commit()?;
                debug!("{key} -> axis {axis} = {value}");
                Ok(DispatchOutcome::AxisSet { axis, value })
            }
            ActionKind::KeyTap { key: name } => {
                let name = name.clone();
                self.keyboard.key_down(&name)?;
                if !self.key_hold.is_zero() {
                    thread::sleep(self.key_hold);
                }
                self.keyboard.key_up(&name)?;
                debug!("{key} -> key {name:?} tapped");
                Ok(DispatchOutcome::KeyTapped(name))
            }
        }
    }
}
