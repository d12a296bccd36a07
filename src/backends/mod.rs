//! Input backends for `padmap`.
//!
//! Implementations of [`InputPort`](crate::device::InputPort) for concrete
//! input sources.
//!
//! # Feature flags
//! - **`hid`**: enables the hidapi-backed port for grid controllers that
//!   expose their control stream as raw HID reports (default).
//!
//! The scripted backend is always available; demos and tests use it in
//! place of hardware.

use crate::device::InputPort;

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

pub mod scripted;

/// Unified discovery across enabled backends.
pub fn probe_ports() -> Vec<Box<dyn InputPort>> {
    #[allow(unused_mut)]
    let mut out: Vec<Box<dyn InputPort>> = Vec::new();

    #[cfg(feature = "hid")]
    {
        match hidapi::HidApi::new() {
            Ok(api) => out.extend(hid::probe_ports(&api)),
            Err(err) => log::warn!("could not initialize HID API: {err}"),
        }
    }

    out
}
