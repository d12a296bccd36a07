//! padmap maps grid/knob controller events onto virtual gamepad and
//! keyboard actions.
//!
//! The crate is the mapping and dispatch engine behind a "use your pad
//! controller as a game input device" tool: a persistent event→action
//! table ([`MappingStore`]), a calibration procedure for continuous
//! controls ([`Calibrator`]), a dispatcher that normalizes and executes
//! bound actions ([`Dispatcher`]), and the state machine that switches
//! between live dispatch and learning new bindings ([`ModeController`]).
//!
//! Device opening, virtual output drivers, and the user interface are
//! collaborators behind traits: [`InputPort`], [`PadOutput`] /
//! [`KeyOutput`], and [`Frontend`].

pub mod backends;
pub mod binding;
pub mod calibration;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod frontend;
pub mod output;
pub mod session;
pub mod settings;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use binding::{ActionKind, BindingKey, CalibrationRange, MappingTable};
pub use calibration::{CalibrationOutcome, CalibrationStage, Calibrator};
pub use device::{EventPump, InputPort};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{CalibrationError, OutputError, PortError, StoreError};
pub use event::{ControlEvent, DeviceIdentity, EventClass};
pub use frontend::{ActionChoice, Frontend};
pub use output::{Axis, KeyOutput, OutputHandle, PadOutput};
pub use session::{Command, Mode, ModeController};
pub use settings::Settings;
pub use store::MappingStore;
