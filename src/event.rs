//! Events and device identity.
//!
//! padmap represents input changes as small, device-agnostic deltas
//! ([`ControlEvent`]) carrying the raw value the hardware reported.
//!
//! ## Value conventions
//! - **Trigger controls** (pads, buttons): `value` is the press intensity.
//!   `0` means released; anything above `0` counts as pressed.
//! - **Continuous controls** (knobs, sliders): `value` is the raw scalar in
//!   the device's native domain (`0..=127` for most grid controllers).
//!   Raw values are *not* normalized here; normalization happens at dispatch
//!   time against the calibrated range recorded in the binding.
//!
//! Backends preserve the units reported by the hardware ("raw truth"); if a
//! source uses a wider domain, calibration absorbs the difference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Stable logical identifier for a physical input device.
///
/// Built from the device's reported name, assigned once per session, and
/// persisted with every binding created for it. All identity comparisons,
/// including output-handle equality, go through this value, never through a
/// transient object address, so bindings stay valid across restarts.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity(String);

impl DeviceIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of a control event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventClass {
    /// Discrete on/off control carrying a press intensity (pad, button).
    Trigger,
    /// Continuously-valued control carrying a scalar (knob, slider).
    Continuous,
}

impl EventClass {
    /// Tag used in the persisted mapping key.
    pub fn tag(&self) -> &'static str {
        match self {
            EventClass::Trigger => "trigger",
            EventClass::Continuous => "continuous",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "trigger" => Some(EventClass::Trigger),
            "continuous" => Some(EventClass::Continuous),
            _ => None,
        }
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Timestamped input change captured from one device.
///
/// `control` is the device-local control number (`0..=127`); `value` follows
/// the conventions described in the module docs.
#[derive(Clone, Debug)]
pub struct ControlEvent {
    pub device: DeviceIdentity,
    pub control: u8,
    pub class: EventClass,
    pub value: i32,
    /// Capture time (monotonic). Suitable for ordering within a run.
    pub at: Instant,
}

impl ControlEvent {
    pub fn trigger(device: DeviceIdentity, control: u8, value: i32) -> Self {
        Self {
            device,
            control,
            class: EventClass::Trigger,
            value,
            at: Instant::now(),
        }
    }

    pub fn continuous(device: DeviceIdentity, control: u8, value: i32) -> Self {
        Self {
            device,
            control,
            class: EventClass::Continuous,
            value,
            at: Instant::now(),
        }
    }

    /// True for a Trigger event with nonzero intensity.
    pub fn is_press(&self) -> bool {
        self.class == EventClass::Trigger && self.value > 0
    }
}
