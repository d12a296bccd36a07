//! Shared fakes for unit tests: recording output adapters and a scripted
//! frontend. Compiled only for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::binding::{ActionKind, BindingKey};
use crate::calibration::CalibrationStage;
use crate::error::{CalibrationError, OutputError};
use crate::event::ControlEvent;
use crate::frontend::{ActionChoice, Frontend};
use crate::output::{Axis, KeyOutput, PadOutput};

/// One observed output adapter call, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Press(u8),
    Release(u8),
    SetAxis(Axis, i16),
    Commit,
    KeyDown(String),
    KeyUp(String),
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Call>>>);

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn record(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }
}

/// Pad that records calls and keeps last-known axis values.
pub struct FakePad {
    rec: Recorder,
    axes: std::collections::HashMap<Axis, i16>,
}

impl FakePad {
    pub fn new(rec: Recorder) -> Self {
        Self {
            rec,
            axes: std::collections::HashMap::new(),
        }
    }
}

impl PadOutput for FakePad {
    fn press_button(&mut self, button: u8) -> Result<(), OutputError> {
        self.rec.record(Call::Press(button));
        Ok(())
    }

    fn release_button(&mut self, button: u8) -> Result<(), OutputError> {
        self.rec.record(Call::Release(button));
        Ok(())
    }

    fn set_axis(&mut self, axis: Axis, value: i16) -> Result<(), OutputError> {
        self.axes.insert(axis, value);
        self.rec.record(Call::SetAxis(axis, value));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), OutputError> {
        self.rec.record(Call::Commit);
        Ok(())
    }
}

pub struct FakeKeys(pub Recorder);

impl KeyOutput for FakeKeys {
    fn key_down(&mut self, key: &str) -> Result<(), OutputError> {
        self.0.record(Call::KeyDown(key.into()));
        Ok(())
    }

    fn key_up(&mut self, key: &str) -> Result<(), OutputError> {
        self.0.record(Call::KeyUp(key.into()));
        Ok(())
    }
}

/// Everything a [`ScriptedFrontend`] was told, plus the replies it still
/// owes. Tests keep the `Arc` and inspect it after the run.
#[derive(Default)]
pub struct FrontendLog {
    pub replies: VecDeque<ActionChoice>,
    pub saved: Vec<(BindingKey, ActionKind)>,
    pub invalid: Vec<(ActionChoice, String)>,
    pub failures: Vec<CalibrationError>,
    pub stages: Vec<CalibrationStage>,
}

/// Frontend that answers `choose_action` from a scripted reply queue.
/// Replies exhausted means `Skip`.
pub struct ScriptedFrontend(pub Arc<Mutex<FrontendLog>>);

impl ScriptedFrontend {
    pub fn with_replies(replies: Vec<ActionChoice>) -> (Self, Arc<Mutex<FrontendLog>>) {
        let log = Arc::new(Mutex::new(FrontendLog {
            replies: replies.into(),
            ..FrontendLog::default()
        }));
        (Self(Arc::clone(&log)), log)
    }
}

impl Frontend for ScriptedFrontend {
    fn choose_action(&mut self, _event: &ControlEvent) -> ActionChoice {
        self.0
            .lock()
            .unwrap()
            .replies
            .pop_front()
            .unwrap_or(ActionChoice::Skip)
    }

    fn invalid_choice(&mut self, choice: &ActionChoice, reason: &str) {
        self.0
            .lock()
            .unwrap()
            .invalid
            .push((choice.clone(), reason.to_string()));
    }

    fn calibration_prompt(&mut self, _event: &ControlEvent, stage: CalibrationStage) {
        self.0.lock().unwrap().stages.push(stage);
    }

    fn binding_saved(&mut self, key: &BindingKey, action: &ActionKind) {
        self.0
            .lock()
            .unwrap()
            .saved
            .push((key.clone(), action.clone()));
    }

    fn calibration_failed(&mut self, _event: &ControlEvent, error: &CalibrationError) {
        self.0.lock().unwrap().failures.push(error.clone());
    }
}
