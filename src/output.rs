//! Output adapter traits.
//!
//! padmap synthesizes effects on virtual output devices through two small
//! capability interfaces: [`PadOutput`] for a gamepad-like device (buttons
//! plus four analog channels forming two 2-D sticks) and [`KeyOutput`] for a
//! virtual keyboard. The drivers behind them (uinput, vJoy, ViGEm, ...) are
//! external collaborators; this crate only defines the contract.
//!
//! # Contract
//! - Calls are synchronous; a call has taken effect when it returns.
//! - [`PadOutput::commit`] publishes the pending frame. Dispatch commits
//!   after every state change, so intermediate states are never coalesced.
//! - [`PadOutput::set_axis`] changes only the addressed channel. The paired
//!   channel of the same stick keeps its last-known value.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::error::OutputError;
use crate::event::DeviceIdentity;

/// One of the four analog channels (two virtual 2-D sticks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::LeftX, Axis::LeftY, Axis::RightX, Axis::RightY];

    /// Wire identifier used in the persisted mapping format.
    pub fn id(&self) -> u8 {
        match self {
            Axis::LeftX => 0,
            Axis::LeftY => 1,
            Axis::RightX => 2,
            Axis::RightY => 3,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Axis::LeftX),
            1 => Some(Axis::LeftY),
            2 => Some(Axis::RightX),
            3 => Some(Axis::RightY),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::LeftX => "LX",
            Axis::LeftY => "LY",
            Axis::RightX => "RX",
            Axis::RightY => "RY",
        };
        f.write_str(name)
    }
}

/// Button and axis output on a virtual gamepad-like device.
///
/// Valid button numbers are `1..=15`. Axis values are signed 16-bit,
/// `-32768..=32767`.
pub trait PadOutput: Send {
    fn press_button(&mut self, button: u8) -> Result<(), OutputError>;
    fn release_button(&mut self, button: u8) -> Result<(), OutputError>;
    fn set_axis(&mut self, axis: Axis, value: i16) -> Result<(), OutputError>;
    /// Publish all state changes since the last commit.
    fn commit(&mut self) -> Result<(), OutputError>;
}

/// Key-tap output on a virtual keyboard. `key` is a symbolic key name
/// (`"a"`, `"space"`, `"enter"`, ...); interpretation is up to the driver.
pub trait KeyOutput: Send {
    fn key_down(&mut self, key: &str) -> Result<(), OutputError>;
    fn key_up(&mut self, key: &str) -> Result<(), OutputError>;
}

/// Opaque reference to one instantiated virtual output device.
///
/// Associated 1:1 with a [`DeviceIdentity`] for the session. Equality is by
/// that stable identity, never by the address of the adapter behind it, so
/// two handles resolved in different sessions still compare as expected.
#[derive(Clone, Debug, Eq)]
pub struct OutputHandle {
    identity: DeviceIdentity,
}

impl OutputHandle {
    pub fn new(identity: DeviceIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }
}

impl PartialEq for OutputHandle {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl std::hash::Hash for OutputHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

/// Frame-keeping pad that logs every committed frame. Stands in for a real
/// driver in the demos.
pub struct LogPad {
    name: String,
    axes: HashMap<Axis, i16>,
    buttons: u16,
}

impl LogPad {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            axes: Axis::ALL.iter().map(|a| (*a, 0)).collect(),
            buttons: 0,
        }
    }

    /// Last committed value of `axis`.
    pub fn axis(&self, axis: Axis) -> i16 {
        self.axes.get(&axis).copied().unwrap_or(0)
    }
}

impl PadOutput for LogPad {
    fn press_button(&mut self, button: u8) -> Result<(), OutputError> {
        if button >= 16 {
            return Err(OutputError::Rejected(format!("button {button} out of range")));
        }
        self.buttons |= 1 << button;
        Ok(())
    }

    fn release_button(&mut self, button: u8) -> Result<(), OutputError> {
        if button >= 16 {
            return Err(OutputError::Rejected(format!("button {button} out of range")));
        }
        self.buttons &= !(1 << button);
        Ok(())
    }

    fn set_axis(&mut self, axis: Axis, value: i16) -> Result<(), OutputError> {
        self.axes.insert(axis, value);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), OutputError> {
        debug!(
            "{}: frame buttons={:#06x} LX={} LY={} RX={} RY={}",
            self.name,
            self.buttons,
            self.axis(Axis::LeftX),
            self.axis(Axis::LeftY),
            self.axis(Axis::RightX),
            self.axis(Axis::RightY),
        );
        Ok(())
    }
}

/// Keyboard that logs taps instead of injecting them.
pub struct LogKeys;

impl KeyOutput for LogKeys {
    fn key_down(&mut self, key: &str) -> Result<(), OutputError> {
        debug!("key down: {key}");
        Ok(())
    }

    fn key_up(&mut self, key: &str) -> Result<(), OutputError> {
        debug!("key up: {key}");
        Ok(())
    }
}
