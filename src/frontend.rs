//! Frontend collaborator interface.
//!
//! The presentation layer (menus, dialogs, a console prompt) lives outside
//! this crate. During Setup the [`ModeController`](crate::session::ModeController)
//! talks to it through this trait: ask what a control should do, prompt
//! during calibration, report invalid choices and results.

use crate::binding::{ActionKind, BindingKey};
use crate::calibration::CalibrationStage;
use crate::error::CalibrationError;
use crate::event::ControlEvent;

/// What the user picked for a control during Setup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionChoice {
    /// Bind to a gamepad button, `1..=15`. Raw user input, validated by the
    /// controller; out-of-range values are rejected and re-prompted.
    GamepadButton(i64),
    /// Bind a continuous control to an analog channel, `0..=3`.
    AxisChannel(i64),
    /// Bind to a symbolic keyboard key.
    Key(String),
    /// Leave this control unbound and wait for the next one.
    Skip,
    /// Leave Setup mode.
    Cancel,
}

/// Collaborator the mode controller prompts and notifies.
///
/// Implementations are expected to block in [`choose_action`] until the
/// user answered; the controller holds no other work while learning.
pub trait Frontend: Send {
    /// Asks what action to bind to the control that produced `event`.
    fn choose_action(&mut self, event: &ControlEvent) -> ActionChoice;

    /// The previous choice was invalid; `reason` says why. The controller
    /// re-prompts after this.
    fn invalid_choice(&mut self, choice: &ActionChoice, reason: &str);

    /// Tells the user which extreme to drive the control to.
    fn calibration_prompt(&mut self, event: &ControlEvent, stage: CalibrationStage);

    /// A binding was validated, persisted, and is live.
    fn binding_saved(&mut self, key: &BindingKey, action: &ActionKind);

    /// Calibration failed; no binding was created or overwritten.
    fn calibration_failed(&mut self, event: &ControlEvent, error: &CalibrationError);
}
