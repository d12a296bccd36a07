//! Mode controller: the session state machine.
//!
//! One loop owns the mapping store, the dispatcher, and the frontend, and
//! consumes two queues: commands from the presentation layer and control
//! events fanned in from the device pumps. Mutating shared state from UI
//! callbacks is exactly what this design replaces; everything funnels
//! through [`Command`].
//!
//! ```text
//!            Listen                 Setup
//!   Idle ------------> Listening     |
//!    ^  <-- Cancel --------'         |
//!    |                               v
//!    '<------ Cancel ------------- Setup <---> Calibrating
//!
//!   any state -- Quit --> Exiting
//! ```
//!
//! Setup learns exactly one binding at a time; a second learn cannot start
//! until the current one finished, so concurrent learn sessions are
//! structurally impossible.

use std::collections::HashSet;

use crossbeam_channel::{never, select, Receiver};
use log::{debug, info, warn};

use crate::binding::{valid_button_id, ActionKind, BindingKey, BUTTON_ID_MAX, BUTTON_ID_MIN};
use crate::calibration::{CalibrationOutcome, Calibrator};
use crate::dispatch::Dispatcher;
use crate::event::{ControlEvent, DeviceIdentity, EventClass};
use crate::frontend::{ActionChoice, Frontend};
use crate::output::Axis;
use crate::store::MappingStore;

/// Instruction from the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Forward events from these devices straight to the dispatcher.
    Listen(Vec<DeviceIdentity>),
    /// Learn new bindings for events from these devices.
    Setup(Vec<DeviceIdentity>),
    /// Back to Idle (or abort a running calibration wait).
    Cancel,
    /// End the session.
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Listening,
    Setup,
    Calibrating,
    Exiting,
}

pub struct ModeController {
    mode: Mode,
    active: HashSet<DeviceIdentity>,
    store: MappingStore,
    dispatcher: Dispatcher,
    calibrator: Calibrator,
    frontend: Box<dyn Frontend>,
}

impl ModeController {
    pub fn new(
        store: MappingStore,
        dispatcher: Dispatcher,
        calibrator: Calibrator,
        frontend: Box<dyn Frontend>,
    ) -> Self {
        Self {
            mode: Mode::Idle,
            active: HashSet::new(),
            store,
            dispatcher,
            calibrator,
            frontend,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Consumes both queues until a quit command arrives or both queues
    /// close. Ends in [`Mode::Exiting`].
    pub fn run(&mut self, commands: &Receiver<Command>, events: &Receiver<ControlEvent>) {
        let no_commands: Receiver<Command> = never();
        let no_events: Receiver<ControlEvent> = never();
        let mut commands_open = true;
        let mut events_open = true;

        while self.mode != Mode::Exiting && (commands_open || events_open) {
            let command_src = if commands_open { commands } else { &no_commands };
            let event_src = if events_open { events } else { &no_events };
            select! {
                recv(command_src) -> msg => match msg {
                    Ok(command) => self.apply_command(command),
                    Err(_) => {
                        debug!("command queue closed");
                        commands_open = false;
                    }
                },
                recv(event_src) -> msg => match msg {
                    Ok(event) => self.process_event(event, commands, events),
                    Err(_) => {
                        debug!("event queue closed");
                        events_open = false;
                    }
                },
            }
        }
        self.mode = Mode::Exiting;
    }

    /// Applies one command to the state machine.
    pub fn apply_command(&mut self, command: Command) {
        match (self.mode, command) {
            (_, Command::Quit) => {
                info!("quit requested");
                self.mode = Mode::Exiting;
            }
            (Mode::Idle, Command::Listen(devices)) => {
                info!("listening on {devices:?}");
                self.active = devices.into_iter().collect();
                self.mode = Mode::Listening;
            }
            (Mode::Idle, Command::Setup(devices)) => {
                info!("setup for {devices:?}");
                self.active = devices.into_iter().collect();
                self.mode = Mode::Setup;
            }
            (Mode::Listening | Mode::Setup, Command::Cancel) => {
                info!("back to idle");
                self.active.clear();
                self.mode = Mode::Idle;
            }
            (Mode::Idle, Command::Cancel) => {}
            (mode, command) => debug!("ignoring {command:?} in {mode:?}"),
        }
    }

    /// Routes one control event according to the current mode. The two
    /// receivers are only consulted while a calibration wait is running.
    pub fn process_event(
        &mut self,
        event: ControlEvent,
        commands: &Receiver<Command>,
        events: &Receiver<ControlEvent>,
    ) {
        match self.mode {
            Mode::Listening => {
                if !self.active.contains(&event.device) {
                    debug!("{}: not an active device, dropping event", event.device);
                    return;
                }
                match self.dispatcher.dispatch(&self.store, &event) {
                    Ok(outcome) => debug!("dispatched: {outcome:?}"),
                    Err(err) => warn!("output failure: {err}"),
                }
            }
            Mode::Setup => {
                if !self.active.contains(&event.device) {
                    debug!("{}: not an active device, dropping event", event.device);
                    return;
                }
                self.learn(event, commands, events);
            }
            mode => debug!("dropping event in {mode:?}"),
        }
    }

    /// Learns one binding for the control behind `event`, re-prompting on
    /// invalid choices. Only a pressed trigger or a continuous reading
    /// starts a learn.
    fn learn(
        &mut self,
        event: ControlEvent,
        commands: &Receiver<Command>,
        events: &Receiver<ControlEvent>,
    ) {
        if event.class == EventClass::Trigger && !event.is_press() {
            return;
        }

        loop {
            let choice = self.frontend.choose_action(&event);
            match choice {
                ActionChoice::Cancel => {
                    info!("setup cancelled");
                    self.active.clear();
                    self.mode = Mode::Idle;
                    return;
                }
                ActionChoice::Skip => return,
                ActionChoice::GamepadButton(id) => {
                    if !valid_button_id(id) {
                        self.frontend.invalid_choice(
                            &choice,
                            &format!("button id must be {BUTTON_ID_MIN}..={BUTTON_ID_MAX}"),
                        );
                        continue;
                    }
                    if event.class != EventClass::Trigger {
                        self.frontend
                            .invalid_choice(&choice, "continuous controls can only drive axes");
                        continue;
                    }
                    self.persist(&event, ActionKind::ButtonPress { button: id as u8 });
                    return;
                }
                ActionChoice::Key(ref name) => {
                    if name.is_empty() {
                        self.frontend.invalid_choice(&choice, "key name must not be empty");
                        continue;
                    }
                    if event.class != EventClass::Trigger {
                        self.frontend
                            .invalid_choice(&choice, "continuous controls can only drive axes");
                        continue;
                    }
                    self.persist(&event, ActionKind::KeyTap { key: name.clone() });
                    return;
                }
                ActionChoice::AxisChannel(id) => {
                    let Some(axis) = Axis::from_id(id) else {
                        self.frontend.invalid_choice(&choice, "axis id must be 0..=3");
                        continue;
                    };
                    if event.class != EventClass::Continuous {
                        self.frontend
                            .invalid_choice(&choice, "axis bindings need a continuous control");
                        continue;
                    }
                    self.mode = Mode::Calibrating;
                    let frontend = self.frontend.as_mut();
                    let outcome = self.calibrator.run(
                        &event.device,
                        event.control,
                        events,
                        commands,
                        |stage| frontend.calibration_prompt(&event, stage),
                    );
                    match outcome {
                        CalibrationOutcome::Calibrated(range) => {
                            self.mode = Mode::Setup;
                            self.persist(&event, ActionKind::AxisMove { axis, range });
                        }
                        CalibrationOutcome::Failed(err) => {
                            // Any prior binding for this control stays as it was.
                            self.mode = Mode::Setup;
                            warn!("calibration failed: {err}");
                            self.frontend.calibration_failed(&event, &err);
                        }
                        CalibrationOutcome::Cancelled => {
                            info!("calibration aborted");
                            self.mode = Mode::Setup;
                        }
                        CalibrationOutcome::Quit => {
                            self.mode = Mode::Exiting;
                        }
                    }
                    return;
                }
            }
        }
    }

    fn persist(&mut self, event: &ControlEvent, action: ActionKind) {
        let key = BindingKey::new(event.device.clone(), event.control, event.class);
        match self.store.put(key.clone(), action.clone()) {
            Ok(()) => {
                info!("bound {key} -> {action:?}");
                self.frontend.binding_saved(&key, &action);
            }
            // The table changed in memory but the disk kept its previous
            // state; the next successful save catches up.
            Err(err) => warn!("could not persist {key}: {err}"),
        }
    }
}
