//! Binding data model and the persisted wire schema.
//!
//! A binding associates one control on one device ([`BindingKey`]) with an
//! output action ([`ActionKind`]). The full set of bindings is the
//! [`MappingTable`], which serializes to the JSON schema used on disk:
//!
//! ```json
//! {
//!   "Launchpad Mini,36,trigger": { "type": "gamepad", "value": 5 },
//!   "Launchpad Mini,1,continuous": {
//!     "type": "axis", "value": 3, "min_value": 10, "max_value": 100
//!   },
//!   "Launchpad Mini,40,trigger": { "type": "keyboard", "value": "space" }
//! }
//! ```
//!
//! Keys are the comma-joined (device, control, event class) triple. Device
//! names may themselves contain commas, so keys are parsed from the right.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::event::{DeviceIdentity, EventClass};
use crate::output::Axis;

/// Lowest and highest raw values a continuous control was observed to
/// produce during calibration. Invariant: `min_raw < max_raw`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationRange {
    min_raw: i32,
    max_raw: i32,
}

impl CalibrationRange {
    /// Orders the two samples into a range. `None` when the samples are
    /// equal, which means the calibration failed.
    pub fn from_samples(a: i32, b: i32) -> Option<Self> {
        if a == b {
            None
        } else {
            Some(Self {
                min_raw: a.min(b),
                max_raw: a.max(b),
            })
        }
    }

    pub fn min_raw(&self) -> i32 {
        self.min_raw
    }

    pub fn max_raw(&self) -> i32 {
        self.max_raw
    }

    /// Maps a raw reading onto the full signed 16-bit axis domain:
    /// `min_raw` maps to `-32768`, `max_raw` to `32767`, out-of-range
    /// readings clamp.
    pub fn normalize(&self, raw: i32) -> i16 {
        // Subtract in f64: the file is hand-editable, so the range can span
        // the whole i32 domain and an i32 difference would overflow.
        let min = self.min_raw as f64;
        let span = self.max_raw as f64 - min;
        let scaled = ((raw as f64 - min) / span * 65535.0).round() - 32768.0;
        scaled.clamp(-32768.0, 32767.0) as i16
    }
}

/// Unique key of a binding: which control on which device, and whether the
/// discrete or the continuous reading of it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingKey {
    pub device: DeviceIdentity,
    pub control: u8,
    pub class: EventClass,
}

impl BindingKey {
    pub fn new(device: DeviceIdentity, control: u8, class: EventClass) -> Self {
        Self {
            device,
            control,
            class,
        }
    }

    fn wire_key(&self) -> String {
        format!("{},{},{}", self.device.as_str(), self.control, self.class.tag())
    }

    /// Parses the comma-joined triple. Split from the right: the last two
    /// fields are the control number and class tag, everything before them
    /// is the device name (which may contain commas).
    fn from_wire_key(key: &str) -> Option<Self> {
        let mut parts = key.rsplitn(3, ',');
        let class = EventClass::from_tag(parts.next()?)?;
        let control: u8 = parts.next()?.trim().parse().ok()?;
        let device = parts.next()?;
        if device.is_empty() || control > 127 {
            return None;
        }
        Some(Self::new(DeviceIdentity::new(device), control, class))
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.device, self.control, self.class)
    }
}

/// Output action a control is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// Momentary tap of a gamepad button, `1..=15`.
    ButtonPress { button: u8 },
    /// Deflection of one analog channel, normalized through `range`.
    AxisMove { axis: Axis, range: CalibrationRange },
    /// Tap of a symbolic keyboard key.
    KeyTap { key: String },
}

pub const BUTTON_ID_MIN: u8 = 1;
pub const BUTTON_ID_MAX: u8 = 15;

/// True for a button number a virtual pad can represent.
pub fn valid_button_id(id: i64) -> bool {
    (BUTTON_ID_MIN as i64..=BUTTON_ID_MAX as i64).contains(&id)
}

/// Ordered table of bindings, unique per [`BindingKey`].
///
/// There is no unmap operation; a key can only be overwritten. Mutation goes
/// through [`MappingStore`](crate::store::MappingStore), which persists the
/// whole table after every change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MappingTable(BTreeMap<BindingKey, ActionKind>);

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &BindingKey) -> Option<&ActionKind> {
        self.0.get(key)
    }

    /// Inserts with overwrite semantics; returns the action it replaced.
    pub fn insert(&mut self, key: BindingKey, action: ActionKind) -> Option<ActionKind> {
        self.0.insert(key, action)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BindingKey, &ActionKind)> {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Wire schema

#[derive(Serialize, Deserialize)]
struct WireEntry {
    #[serde(rename = "type")]
    kind: String,
    value: WireValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_value: Option<i32>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireValue {
    Number(i64),
    Text(String),
}

impl From<&ActionKind> for WireEntry {
    fn from(action: &ActionKind) -> Self {
        match action {
            ActionKind::ButtonPress { button } => WireEntry {
                kind: "gamepad".into(),
                value: WireValue::Number(*button as i64),
                min_value: None,
                max_value: None,
            },
            ActionKind::AxisMove { axis, range } => WireEntry {
                kind: "axis".into(),
                value: WireValue::Number(axis.id() as i64),
                min_value: Some(range.min_raw()),
                max_value: Some(range.max_raw()),
            },
            ActionKind::KeyTap { key } => WireEntry {
                kind: "keyboard".into(),
                value: WireValue::Text(key.clone()),
                min_value: None,
                max_value: None,
            },
        }
    }
}

impl WireEntry {
    fn into_action(self) -> Result<ActionKind, String> {
        match (self.kind.as_str(), self.value) {
            ("gamepad", WireValue::Number(id)) => {
                if !valid_button_id(id) {
                    return Err(format!("button id {id} outside {BUTTON_ID_MIN}..={BUTTON_ID_MAX}"));
                }
                Ok(ActionKind::ButtonPress { button: id as u8 })
            }
            ("axis", WireValue::Number(id)) => {
                let axis = Axis::from_id(id).ok_or_else(|| format!("unknown axis id {id}"))?;
                let (min, max) = match (self.min_value, self.max_value) {
                    (Some(min), Some(max)) => (min, max),
                    _ => return Err("axis entry missing min_value/max_value".into()),
                };
                let range = CalibrationRange::from_samples(min, max)
                    .ok_or_else(|| format!("degenerate axis range {min}..{max}"))?;
                Ok(ActionKind::AxisMove { axis, range })
            }
            ("keyboard", WireValue::Text(key)) if !key.is_empty() => {
                Ok(ActionKind::KeyTap { key })
            }
            ("keyboard", _) => Err("keyboard entry needs a non-empty key name".into()),
            (other, _) => Err(format!("unknown or mismatched entry type {other:?}")),
        }
    }
}

impl Serialize for MappingTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.0
                .iter()
                .map(|(key, action)| (key.wire_key(), WireEntry::from(action))),
        )
    }
}

impl<'de> Deserialize<'de> for MappingTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, WireEntry>::deserialize(deserializer)?;
        let mut table = BTreeMap::new();
        for (key, entry) in raw {
            let parsed = BindingKey::from_wire_key(&key)
                .ok_or_else(|| D::Error::custom(format!("bad mapping key {key:?}")))?;
            let action = entry
                .into_action()
                .map_err(|reason| D::Error::custom(format!("entry {key:?}: {reason}")))?;
            table.insert(parsed, action);
        }
        Ok(MappingTable(table))
    }
}
