//! hidapi-backed input port.
//!
//! Grid/knob controllers that run in raw report mode emit 3-byte frames:
//! a status byte whose high nibble says what happened, the control number,
//! and the value. The relevant statuses:
//!
//! - `0x9n`: pad pressed (value is intensity; `0` counts as a release)
//! - `0x8n`: pad released
//! - `0xBn`: knob/slider moved (value is the raw reading)
//!
//! Everything else (aftertouch, clock, sysex fragments) is skipped. The low
//! nibble (the channel) is ignored; controls are identified by number only.

use std::time::Duration;

use hidapi::{DeviceInfo, HidApi, HidDevice};
use log::{debug, warn};

use crate::device::InputPort;
use crate::error::PortError;
use crate::event::{ControlEvent, DeviceIdentity};

pub struct HidControlPort {
    identity: DeviceIdentity,
    raw: HidDevice,
}

impl HidControlPort {
    pub fn open(info: &DeviceInfo, api: &HidApi) -> Result<Self, PortError> {
        let raw = info
            .open_device(api)
            .map_err(|err| PortError::Open(err.to_string()))?;
        let name = info.product_string().unwrap_or("Unknown Controller");
        Ok(Self {
            identity: DeviceIdentity::new(name),
            raw,
        })
    }

    fn decode(&self, frame: &[u8]) -> Option<ControlEvent> {
        if frame.len() < 3 {
            return None;
        }
        let (status, control, value) = (frame[0], frame[1] & 0x7f, (frame[2] & 0x7f) as i32);
        match status >> 4 {
            0x9 => Some(ControlEvent::trigger(self.identity.clone(), control, value)),
            0x8 => Some(ControlEvent::trigger(self.identity.clone(), control, 0)),
            0xb => Some(ControlEvent::continuous(self.identity.clone(), control, value)),
            other => {
                debug!("{}: skipping status nibble {other:#x}", self.identity);
                None
            }
        }
    }
}

impl InputPort for HidControlPort {
    fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn read(&mut self, timeout: Duration) -> Result<Option<ControlEvent>, PortError> {
        let mut buf = [0u8; 64];
        let millis = timeout.as_millis().min(i32::MAX as u128) as i32;
        match self.raw.read_timeout(&mut buf, millis) {
            Ok(0) => Ok(None),
            Ok(n) => Ok(self.decode(&buf[..n])),
            Err(err) => Err(PortError::Read(err.to_string())),
        }
    }
}

/// Opens every HID device that will talk to us and wraps it as a port.
/// Open failures are logged and skipped; selection is up to the caller.
pub fn probe_ports(api: &HidApi) -> Vec<Box<dyn InputPort>> {
    let mut found: Vec<Box<dyn InputPort>> = Vec::new();
    for info in api.device_list() {
        match HidControlPort::open(info, api) {
            Ok(port) => found.push(Box::new(port)),
            Err(err) => warn!(
                "{}: {err}",
                info.product_string().unwrap_or("Unknown Controller")
            ),
        }
    }
    found
}
