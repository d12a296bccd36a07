//! Session tunables, loaded from a TOML file.
//!
//! Everything here has a sensible default; a missing or malformed file
//! degrades to defaults with a log line, mirroring how the mapping store
//! treats its file.
//!
//! ```toml
//! mappings_path = "mappings.json"
//! calibration_timeout_ms = 30000
//! key_hold_ms = 50
//! ```

use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the mapping table lives.
    pub mappings_path: String,
    /// Upper bound on each calibration sample wait.
    pub calibration_timeout_ms: u64,
    /// Minimum hold between key-down and key-up. Zero disables the hold.
    pub key_hold_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mappings_path: "mappings.json".into(),
            calibration_timeout_ms: 30_000,
            key_hold_ms: 50,
        }
    }
}

impl Settings {
    /// Loads settings, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!("{}: malformed settings ({err}); using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn calibration_timeout(&self) -> Duration {
        Duration::from_millis(self.calibration_timeout_ms)
    }

    pub fn key_hold(&self) -> Duration {
        Duration::from_millis(self.key_hold_ms)
    }
}
