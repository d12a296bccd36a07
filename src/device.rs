//! Input ports and the per-device event pump.
//!
//! Reading a physical device is a blocking operation. Each open device is an
//! [`InputPort`]; the [`EventPump`] runs one worker thread per port and
//! forwards its events into a shared fan-in channel. Events from one device
//! keep their causal order; no ordering is guaranteed across devices.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use log::{debug, warn};

use crate::error::PortError;
use crate::event::{ControlEvent, DeviceIdentity};

/// Pull-based stream of control events from one open device.
pub trait InputPort: Send {
    fn identity(&self) -> &DeviceIdentity;

    /// Blocks up to `timeout` for the next event. `Ok(None)` means no event
    /// arrived in time; the caller should poll again. The bounded wait is
    /// what keeps pumps cancellable.
    fn read(&mut self, timeout: Duration) -> Result<Option<ControlEvent>, PortError>;
}

/// Worker thread feeding one port's events into the fan-in channel.
///
/// A read error stops this pump only; other devices are unaffected. The
/// pump also stops when the receiving side of the channel goes away.
pub struct EventPump {
    identity: DeviceIdentity,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

const POLL_SLICE: Duration = Duration::from_millis(20);

impl EventPump {
    pub fn spawn(mut port: Box<dyn InputPort>, sink: Sender<ControlEvent>) -> Self {
        let identity = port.identity().clone();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let id = identity.clone();

        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                match port.read(POLL_SLICE) {
                    Ok(Some(event)) => {
                        if sink.send(event).is_err() {
                            debug!("{id}: event sink closed");
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(PortError::Disconnected) => {
                        warn!("{id}: input device disconnected");
                        break;
                    }
                    Err(err) => {
                        warn!("{id}: {err}");
                        break;
                    }
                }
            }
            debug!("{id}: event pump stopped");
        });

        Self {
            identity,
            stop,
            handle: Some(handle),
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Signals the worker and waits for it to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EventPump {
    fn drop(&mut self) {
        self.stop();
    }
}
