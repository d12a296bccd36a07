//! Full-stack scenarios: scripted ports pumped into a running mode
//! controller, with recording output adapters standing in for the virtual
//! device drivers.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::unbounded;
use padmap::backends::scripted::ScriptedPort;
use padmap::{
    ActionChoice, ActionKind, Axis, BindingKey, CalibrationError, CalibrationStage, Calibrator,
    Command, ControlEvent, DeviceIdentity, Dispatcher, EventClass, EventPump, Frontend, KeyOutput,
    MappingStore, Mode, ModeController, OutputError, PadOutput,
};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Press(u8),
    Release(u8),
    SetAxis(Axis, i16),
    Commit,
    KeyDown(String),
    KeyUp(String),
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    axes: Arc<Mutex<HashMap<Axis, i16>>>,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn axis(&self, axis: Axis) -> i16 {
        self.axes.lock().unwrap().get(&axis).copied().unwrap_or(0)
    }

    fn seed_axis(&self, axis: Axis, value: i16) {
        self.axes.lock().unwrap().insert(axis, value);
    }
}

struct RecordingPad(Recorder);

impl PadOutput for RecordingPad {
    fn press_button(&mut self, button: u8) -> Result<(), OutputError> {
        self.0.calls.lock().unwrap().push(Call::Press(button));
        Ok(())
    }

    fn release_button(&mut self, button: u8) -> Result<(), OutputError> {
        self.0.calls.lock().unwrap().push(Call::Release(button));
        Ok(())
    }

    fn set_axis(&mut self, axis: Axis, value: i16) -> Result<(), OutputError> {
        self.0.axes.lock().unwrap().insert(axis, value);
        self.0.calls.lock().unwrap().push(Call::SetAxis(axis, value));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), OutputError> {
        self.0.calls.lock().unwrap().push(Call::Commit);
        Ok(())
    }
}

struct RecordingKeys(Recorder);

impl KeyOutput for RecordingKeys {
    fn key_down(&mut self, key: &str) -> Result<(), OutputError> {
        self.0.calls.lock().unwrap().push(Call::KeyDown(key.into()));
        Ok(())
    }

    fn key_up(&mut self, key: &str) -> Result<(), OutputError> {
        self.0.calls.lock().unwrap().push(Call::KeyUp(key.into()));
        Ok(())
    }
}

struct ReplyQueue(VecDeque<ActionChoice>);

impl Frontend for ReplyQueue {
    fn choose_action(&mut self, _event: &ControlEvent) -> ActionChoice {
        self.0.pop_front().unwrap_or(ActionChoice::Skip)
    }

    fn invalid_choice(&mut self, choice: &ActionChoice, reason: &str) {
        panic!("unexpected invalid choice {choice:?}: {reason}");
    }

    fn calibration_prompt(&mut self, _event: &ControlEvent, _stage: CalibrationStage) {}

    fn binding_saved(&mut self, _key: &BindingKey, _action: &ActionKind) {}

    fn calibration_failed(&mut self, _event: &ControlEvent, error: &CalibrationError) {
        panic!("unexpected calibration failure: {error}");
    }
}

fn dev() -> DeviceIdentity {
    DeviceIdentity::new("PadA")
}

fn controller(
    path: &std::path::Path,
    rec: &Recorder,
    replies: Vec<ActionChoice>,
) -> ModeController {
    let store = MappingStore::load(path);
    let mut dispatcher = Dispatcher::new(Box::new(RecordingKeys(rec.clone())), Duration::ZERO);
    dispatcher.attach_pad(dev(), Box::new(RecordingPad(rec.clone())));
    ModeController::new(
        store,
        dispatcher,
        Calibrator::new(Duration::from_millis(200)),
        Box::new(ReplyQueue(replies.into())),
    )
}

/// Learn a trigger binding in one session, dispatch it in a fresh session
/// from the persisted table: exactly one press-then-release pair.
#[test]
fn trigger_learned_in_setup_taps_exactly_once_in_listen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mappings.json");

    // Session 1: learn pad 36 -> gamepad button 5.
    {
        let rec = Recorder::default();
        let mut session = controller(&path, &rec, vec![ActionChoice::GamepadButton(5)]);
        session.apply_command(Command::Setup(vec![dev()]));

        let (ev_tx, ev_rx) = unbounded();
        let (cmd_tx, cmd_rx) = unbounded::<Command>();
        ev_tx.send(ControlEvent::trigger(dev(), 36, 100)).unwrap();
        drop(ev_tx);
        drop(cmd_tx);
        session.run(&cmd_rx, &ev_rx);

        let key = BindingKey::new(dev(), 36, EventClass::Trigger);
        assert_eq!(
            session.store().get(&key),
            Some(&ActionKind::ButtonPress { button: 5 })
        );
    }

    // Session 2: a restart. The binding comes back from disk and fires.
    let rec = Recorder::default();
    let mut session = controller(&path, &rec, vec![]);
    session.apply_command(Command::Listen(vec![dev()]));

    let mut port = ScriptedPort::new("PadA");
    port.press(36, 127);
    port.release(36);

    let (ev_tx, ev_rx) = unbounded();
    let (cmd_tx, cmd_rx) = unbounded::<Command>();
    let mut pump = EventPump::spawn(Box::new(port), ev_tx);
    drop(cmd_tx);
    session.run(&cmd_rx, &ev_rx);
    pump.stop();

    assert_eq!(session.mode(), Mode::Exiting);
    assert_eq!(
        rec.calls(),
        vec![Call::Press(5), Call::Commit, Call::Release(5), Call::Commit]
    );
}

/// Calibrate a knob onto the right-stick Y channel, then dispatch a reading
/// through it: one set-axis plus commit, paired channel untouched.
#[test]
fn knob_calibrated_in_setup_drives_one_axis_in_listen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mappings.json");

    // Session 1: bind knob 1 to axis 3 (right-stick Y), range 10..100.
    {
        let rec = Recorder::default();
        let mut session = controller(&path, &rec, vec![ActionChoice::AxisChannel(3)]);
        session.apply_command(Command::Setup(vec![dev()]));

        let (ev_tx, ev_rx) = unbounded();
        let (cmd_tx, cmd_rx) = unbounded::<Command>();
        // First reading opens the learn; the next two are the samples.
        ev_tx.send(ControlEvent::continuous(dev(), 1, 42)).unwrap();
        ev_tx.send(ControlEvent::continuous(dev(), 1, 10)).unwrap();
        ev_tx.send(ControlEvent::continuous(dev(), 1, 100)).unwrap();
        drop(ev_tx);
        drop(cmd_tx);
        session.run(&cmd_rx, &ev_rx);

        let key = BindingKey::new(dev(), 1, EventClass::Continuous);
        assert!(session.store().get(&key).is_some());
    }

    // Session 2: dispatch a mid-range reading.
    let rec = Recorder::default();
    rec.seed_axis(Axis::RightX, 777);
    let mut session = controller(&path, &rec, vec![]);
    session.apply_command(Command::Listen(vec![dev()]));

    let mut port = ScriptedPort::new("PadA");
    port.turn(1, 10);
    port.turn(1, 100);

    let (ev_tx, ev_rx) = unbounded();
    let (cmd_tx, cmd_rx) = unbounded::<Command>();
    let mut pump = EventPump::spawn(Box::new(port), ev_tx);
    drop(cmd_tx);
    session.run(&cmd_rx, &ev_rx);
    pump.stop();

    assert_eq!(
        rec.calls(),
        vec![
            Call::SetAxis(Axis::RightY, -32768),
            Call::Commit,
            Call::SetAxis(Axis::RightY, 32767),
            Call::Commit,
        ]
    );
    // The paired channel of the same stick kept its last-known value.
    assert_eq!(rec.axis(Axis::RightX), 777);
}

/// Keyboard bindings fire a down/up pair through the shared key output.
#[test]
fn key_binding_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mappings.json");

    {
        let mut store = MappingStore::load(&path);
        store
            .put(
                BindingKey::new(dev(), 40, EventClass::Trigger),
                ActionKind::KeyTap { key: "space".into() },
            )
            .unwrap();
    }

    let rec = Recorder::default();
    let mut session = controller(&path, &rec, vec![]);
    session.apply_command(Command::Listen(vec![dev()]));

    let (ev_tx, ev_rx) = unbounded();
    let (cmd_tx, cmd_rx) = unbounded::<Command>();
    ev_tx.send(ControlEvent::trigger(dev(), 40, 64)).unwrap();
    drop(ev_tx);
    drop(cmd_tx);
    session.run(&cmd_rx, &ev_rx);

    assert_eq!(
        rec.calls(),
        vec![Call::KeyDown("space".into()), Call::KeyUp("space".into())]
    );
}
