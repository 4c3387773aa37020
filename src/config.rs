// Session defaults and config loading. The hard defaults describe the
// bench rig: four X-series actuators oscillating 400 units either side of
// mid-travel.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::control::{ActuatorConfig, OperatingMode, TargetPair};
use crate::error::RigError;

// Serial port for the actuator bus
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD_RATE: u32 = 1_000_000;

// Actuator ids on the bench rig
pub const DEFAULT_IDS: [u8; 4] = [1, 2, 13, 14];

// Proportional gain applied to the position error
pub const DEFAULT_GAIN: i32 = 10;

// PWM saturation limit written to each actuator and applied to commands
pub const DEFAULT_PWM_LIMIT: u16 = 200;

// Position error at or under this counts as arrived
pub const DEFAULT_ARRIVAL_THRESHOLD: i32 = 20;

// Ticks per burst between operator decisions
pub const DEFAULT_BURST_TICKS: u32 = 100;

// Oscillation span around mid-travel
const CENTER_POSITION: i32 = 2048;
const SWING: i32 = 400;

/// Everything a session needs, overridable from a JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub port: String,
    pub baud_rate: u32,
    pub ids: Vec<u8>,
    pub mode: OperatingMode,
    pub pwm_limit: u16,
    pub gain: i32,
    pub arrival_threshold: i32,
    pub burst_ticks: u32,
    pub targets: TargetPair,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            ids: DEFAULT_IDS.to_vec(),
            mode: OperatingMode::Pwm,
            pwm_limit: DEFAULT_PWM_LIMIT,
            gain: DEFAULT_GAIN,
            arrival_threshold: DEFAULT_ARRIVAL_THRESHOLD,
            burst_ticks: DEFAULT_BURST_TICKS,
            targets: TargetPair {
                low: CENTER_POSITION - SWING,
                high: CENTER_POSITION + SWING,
            },
        }
    }
}

impl SessionConfig {
    pub fn from_file(path: &Path) -> Result<Self, RigError> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| RigError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The ordered actuator registry this config describes.
    pub fn registry(&self) -> Vec<ActuatorConfig> {
        self.ids.iter().map(|&id| ActuatorConfig::x_series(id)).collect()
    }
}
