//! Headless walkthrough of the whole engine, no hardware needed.
//!
//! A scripted port stands in for the controller: a learn session binds one
//! pad and one knob, then a listen session replays input through the saved
//! table onto logging output adapters.
//!
//! Run with `RUST_LOG=debug cargo run --example scripted_session`.

use std::collections::VecDeque;
use std::time::Duration;

use crossbeam_channel::unbounded;
use padmap::backends::scripted::ScriptedPort;
use padmap::output::{LogKeys, LogPad};
use padmap::{
    ActionChoice, ActionKind, BindingKey, CalibrationError, CalibrationStage, Calibrator, Command,
    ControlEvent, DeviceIdentity, Dispatcher, EventPump, Frontend, MappingStore, ModeController,
};

/// Frontend that answers from a canned reply list and narrates to stdout.
struct CannedFrontend(VecDeque<ActionChoice>);

impl Frontend for CannedFrontend {
    fn choose_action(&mut self, event: &ControlEvent) -> ActionChoice {
        let choice = self.0.pop_front().unwrap_or(ActionChoice::Skip);
        println!(
            "control {} on {} -> {:?}",
            event.control, event.device, choice
        );
        choice
    }

    fn invalid_choice(&mut self, choice: &ActionChoice, reason: &str) {
        println!("rejected {choice:?}: {reason}");
    }

    fn calibration_prompt(&mut self, event: &ControlEvent, stage: CalibrationStage) {
        println!("calibrating control {}: drive it to {stage:?}", event.control);
    }

    fn binding_saved(&mut self, key: &BindingKey, action: &ActionKind) {
        println!("saved {key} -> {action:?}");
    }

    fn calibration_failed(&mut self, event: &ControlEvent, error: &CalibrationError) {
        println!("calibration of control {} failed: {error}", event.control);
    }
}

fn session(store_path: &std::path::Path, replies: Vec<ActionChoice>) -> ModeController {
    let store = MappingStore::load(store_path);
    let mut dispatcher = Dispatcher::new(Box::new(LogKeys), Duration::from_millis(50));
    dispatcher.attach_pad(
        DeviceIdentity::new("Scripted Grid"),
        Box::new(LogPad::new("virtual pad")),
    );
    ModeController::new(
        store,
        dispatcher,
        Calibrator::new(Duration::from_secs(1)),
        Box::new(CannedFrontend(replies.into())),
    )
}

fn main() {
    env_logger::init();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("mappings.json");
    let device = DeviceIdentity::new("Scripted Grid");

    println!("--- setup: learn a pad and a knob ---");
    let mut learn = session(
        &path,
        vec![ActionChoice::GamepadButton(5), ActionChoice::AxisChannel(1)],
    );
    learn.apply_command(Command::Setup(vec![device.clone()]));

    let mut port = ScriptedPort::new("Scripted Grid");
    port.press(36, 127); // opens the first learn
    port.turn(8, 42); // opens the second learn...
    port.turn(8, 0); // ...then the two calibration samples
    port.turn(8, 127);

    let (ev_tx, ev_rx) = unbounded();
    let (cmd_tx, cmd_rx) = unbounded::<Command>();
    drop(cmd_tx); // no interactive commands; the run ends when the script does
    let mut pump = EventPump::spawn(Box::new(port), ev_tx);
    learn.run(&cmd_rx, &ev_rx);
    pump.stop();

    println!("--- listen: replay input through the saved table ---");
    let mut live = session(&path, vec![]);
    live.apply_command(Command::Listen(vec![device]));

    let mut port = ScriptedPort::new("Scripted Grid");
    port.press(36, 100);
    port.turn(8, 64);
    port.turn(8, 127);
    port.press(99, 100); // unmapped, produces a notice only

    let (ev_tx, ev_rx) = unbounded();
    let (cmd_tx, cmd_rx) = unbounded::<Command>();
    drop(cmd_tx);
    let mut pump = EventPump::spawn(Box::new(port), ev_tx);
    live.run(&cmd_rx, &ev_rx);
    pump.stop();

    println!("done; table had {} binding(s)", live.store().table().len());
}
