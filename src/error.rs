//! Error types, one small enum per concern.

use thiserror::Error;

/// Failure while persisting the mapping table.
///
/// Load never produces these; a missing or malformed file degrades to an
/// empty table. Only `save` (and `put`, which saves) can fail.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not write mapping table: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode mapping table: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of a calibration attempt. User cancellation is not an error;
/// see [`CalibrationOutcome`](crate::calibration::CalibrationOutcome).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("both samples read {0}; the control never moved")]
    FlatRange(i32),
    #[error("timed out waiting for a calibration sample")]
    TimedOut,
    #[error("input device disconnected during calibration")]
    Disconnected,
}

/// Failure reported by a virtual output device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OutputError {
    #[error("virtual output device is gone")]
    Disconnected,
    #[error("virtual output device rejected the call: {0}")]
    Rejected(String),
}

/// Failure on an input port. Fatal to that device's session only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("could not open input device: {0}")]
    Open(String),
    #[error("read error on input device: {0}")]
    Read(String),
    #[error("input device disconnected")]
    Disconnected,
}
