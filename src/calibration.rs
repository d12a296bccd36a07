//! Calibration of continuous controls.
//!
//! Before a knob or slider can drive an axis, padmap has to learn the raw
//! range it actually produces. The procedure is two samples: prompt the user
//! to push the control to one extreme, take the next matching reading,
//! prompt for the opposite extreme, take the next matching reading. The two
//! samples ordered become the [`CalibrationRange`]; equal samples mean the
//! control never moved and the calibration fails.
//!
//! Each wait selects over the fan-in event queue, the command queue (so a
//! `Cancel` or `Quit` aborts immediately) and a configurable deadline.
//! Readings from other controls or devices are ignored, not consumed as
//! samples.

use std::time::{Duration, Instant};

use crossbeam_channel::{at, select, Receiver};
use log::{debug, info};

use crate::binding::CalibrationRange;
use crate::error::CalibrationError;
use crate::event::{ControlEvent, DeviceIdentity, EventClass};
use crate::session::Command;

/// Which extreme the user is being asked to drive the control to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationStage {
    /// First sample: one extreme (conventionally the low end).
    Low,
    /// Second sample: the opposite extreme.
    High,
}

/// How a calibration attempt ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalibrationOutcome {
    Calibrated(CalibrationRange),
    /// Flat range, timeout or device loss. No binding may be created.
    Failed(CalibrationError),
    /// User abort. Not a failure; the session stays in Setup.
    Cancelled,
    /// A quit command arrived mid-wait; the session must exit.
    Quit,
}

pub struct Calibrator {
    timeout: Duration,
}

enum SampleWait {
    Sample(i32),
    Failed(CalibrationError),
    Cancelled,
    Quit,
}

impl Calibrator {
    /// `timeout` bounds each individual sample wait.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Runs the two-sample protocol for `control` on `device`.
    ///
    /// `prompt` is invoked before each wait so the collaborating frontend
    /// can tell the user what to do. Commands other than `Cancel`/`Quit`
    /// arriving during a wait are dropped with a debug log.
    pub fn run(
        &self,
        device: &DeviceIdentity,
        control: u8,
        events: &Receiver<ControlEvent>,
        commands: &Receiver<Command>,
        mut prompt: impl FnMut(CalibrationStage),
    ) -> CalibrationOutcome {
        prompt(CalibrationStage::Low);
        let sample_a = match self.wait_sample(device, control, events, commands) {
            SampleWait::Sample(v) => v,
            SampleWait::Failed(err) => return CalibrationOutcome::Failed(err),
            SampleWait::Cancelled => return CalibrationOutcome::Cancelled,
            SampleWait::Quit => return CalibrationOutcome::Quit,
        };

        prompt(CalibrationStage::High);
        let sample_b = match self.wait_sample(device, control, events, commands) {
            SampleWait::Sample(v) => v,
            SampleWait::Failed(err) => return CalibrationOutcome::Failed(err),
            SampleWait::Cancelled => return CalibrationOutcome::Cancelled,
            SampleWait::Quit => return CalibrationOutcome::Quit,
        };

        match CalibrationRange::from_samples(sample_a, sample_b) {
            Some(range) => {
                info!(
                    "{device}/{control}: calibrated {}..{}",
                    range.min_raw(),
                    range.max_raw()
                );
                CalibrationOutcome::Calibrated(range)
            }
            None => CalibrationOutcome::Failed(CalibrationError::FlatRange(sample_a)),
        }
    }

    fn wait_sample(
        &self,
        device: &DeviceIdentity,
        control: u8,
        events: &Receiver<ControlEvent>,
        commands: &Receiver<Command>,
    ) -> SampleWait {
        let deadline = Instant::now() + self.timeout;
        let no_commands: Receiver<Command> = crossbeam_channel::never();
        let mut commands_open = true;
        loop {
            let command_src = if commands_open { commands } else { &no_commands };
            select! {
                recv(events) -> msg => match msg {
                    Ok(event) => {
                        if event.device == *device
                            && event.control == control
                            && event.class == EventClass::Continuous
                        {
                            return SampleWait::Sample(event.value);
                        }
                        debug!("ignoring {event:?} while calibrating {device}/{control}");
                    }
                    Err(_) => return SampleWait::Failed(CalibrationError::Disconnected),
                },
                recv(command_src) -> msg => match msg {
                    Ok(Command::Cancel) => return SampleWait::Cancelled,
                    Ok(Command::Quit) => return SampleWait::Quit,
                    Ok(other) => debug!("dropping {other:?} during calibration"),
                    // Command source gone: nobody can cancel us anymore.
                    // Keep waiting on events and the deadline.
                    Err(_) => commands_open = false,
                },
                recv(at(deadline)) -> _ => return SampleWait::Failed(CalibrationError::TimedOut),
            }
        }
    }
}
