//! Interactive console session against real hardware.
//!
//! Probes HID ports, opens the one you pick, and runs the engine with
//! logging output adapters in place of real virtual-device drivers (wire in
//! uinput/ViGEm adapters to go further).
//!
//! One thread reads stdin. Lines starting with `:` are session commands,
//! everything else answers the current Setup prompt:
//!
//! ```text
//! :listen     forward events to the outputs
//! :setup      learn bindings for incoming controls
//! :cancel     back to the menu (also aborts a calibration wait)
//! :quit       exit
//!
//! b <1-15>    bind to a gamepad button
//! a <0-3>     bind a knob to an analog channel (starts calibration)
//! k <name>    bind to a keyboard key
//! s           skip this control
//! c           leave setup
//! ```

use std::io::{self, BufRead, Write as _};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use padmap::backends;
use padmap::output::{LogKeys, LogPad};
use padmap::{
    ActionChoice, ActionKind, BindingKey, CalibrationError, CalibrationStage, Calibrator, Command,
    ControlEvent, Dispatcher, EventPump, Frontend, MappingStore, ModeController, Settings,
};

struct ConsoleFrontend {
    answers: Receiver<String>,
}

impl ConsoleFrontend {
    fn ask(&mut self, prompt: &str) -> String {
        print!("{prompt} ");
        let _ = io::stdout().flush();
        self.answers.recv().unwrap_or_default()
    }
}

impl Frontend for ConsoleFrontend {
    fn choose_action(&mut self, event: &ControlEvent) -> ActionChoice {
        let line = self.ask(&format!(
            "map {} control {} ({}) to [b/a/k/s/c]:",
            event.device, event.control, event.class
        ));
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("b"), Some(id)) => id
                .parse()
                .map(ActionChoice::GamepadButton)
                .unwrap_or(ActionChoice::Skip),
            (Some("a"), Some(id)) => id
                .parse()
                .map(ActionChoice::AxisChannel)
                .unwrap_or(ActionChoice::Skip),
            (Some("k"), Some(key)) => ActionChoice::Key(key.to_string()),
            (Some("c"), _) => ActionChoice::Cancel,
            _ => ActionChoice::Skip,
        }
    }

    fn invalid_choice(&mut self, choice: &ActionChoice, reason: &str) {
        println!("rejected {choice:?}: {reason}");
    }

    fn calibration_prompt(&mut self, event: &ControlEvent, stage: CalibrationStage) {
        let end = match stage {
            CalibrationStage::Low => "one extreme",
            CalibrationStage::High => "the opposite extreme",
        };
        println!("drive control {} to {end} and let it rest", event.control);
    }

    fn binding_saved(&mut self, key: &BindingKey, action: &ActionKind) {
        println!("saved {key} -> {action:?}");
    }

    fn calibration_failed(&mut self, event: &ControlEvent, error: &CalibrationError) {
        println!("calibration of control {} failed: {error}", event.control);
    }
}

/// Splits stdin into commands (`:`-prefixed) and prompt answers.
fn spawn_stdin_router(commands: Sender<Command>, answers: Sender<String>, devices: Vec<padmap::DeviceIdentity>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim().to_string();
            if let Some(command) = line.strip_prefix(':') {
                let command = match command {
                    "listen" => Command::Listen(devices.clone()),
                    "setup" => Command::Setup(devices.clone()),
                    "cancel" => Command::Cancel,
                    "quit" => Command::Quit,
                    other => {
                        println!("unknown command :{other}");
                        continue;
                    }
                };
                let quit = command == Command::Quit;
                if commands.send(command).is_err() || quit {
                    break;
                }
            } else if answers.send(line).is_err() {
                break;
            }
        }
    });
}

fn main() {
    env_logger::init();
    let settings = Settings::load(std::path::Path::new("padmap.toml"));

    let mut ports = backends::probe_ports();
    if ports.is_empty() {
        eprintln!("no input ports found");
        return;
    }
    println!("input ports:");
    for (i, port) in ports.iter().enumerate() {
        println!("  {i}: {}", port.identity());
    }
    print!("pick one: ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return;
    }
    let Ok(index) = line.trim().parse::<usize>() else {
        eprintln!("not a number");
        return;
    };
    if index >= ports.len() {
        eprintln!("no such port");
        return;
    }
    let port = ports.swap_remove(index);
    let identity = port.identity().clone();
    println!("opened {identity}");

    let store = MappingStore::load(&settings.mappings_path);
    let mut dispatcher = Dispatcher::new(Box::new(LogKeys), settings.key_hold());
    dispatcher.attach_pad(identity.clone(), Box::new(LogPad::new("virtual pad")));

    let (ev_tx, ev_rx) = unbounded();
    let (cmd_tx, cmd_rx) = unbounded();
    let (ans_tx, ans_rx) = unbounded();
    let mut pump = EventPump::spawn(port, ev_tx);
    spawn_stdin_router(cmd_tx, ans_tx, vec![identity]);

    let mut controller = ModeController::new(
        store,
        dispatcher,
        Calibrator::new(settings.calibration_timeout()),
        Box::new(ConsoleFrontend { answers: ans_rx }),
    );
    println!("commands: :listen  :setup  :cancel  :quit");
    controller.run(&cmd_rx, &ev_rx);
    pump.stop();
    println!("bye");

    // Give the router a beat to notice the closed channels.
    thread::sleep(Duration::from_millis(50));
}
