// Static description of the controlled actuators.

use serde::Deserialize;

/// Operating modes (X-series mode select values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    Velocity,
    Position,
    Pwm,
}

impl OperatingMode {
    /// Value written to the mode select register.
    pub const fn raw(self) -> u8 {
        match self {
            OperatingMode::Velocity => 1,
            OperatingMode::Position => 3,
            OperatingMode::Pwm => 16,
        }
    }

    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(OperatingMode::Velocity),
            3 => Some(OperatingMode::Position),
            16 => Some(OperatingMode::Pwm),
            _ => None,
        }
    }
}

/// Register layout of one actuator family. Defaults are the X-series
/// control table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControlTable {
    pub operating_mode: u16,
    pub pwm_limit: u16,
    pub torque_enable: u16,
    pub goal_pwm: u16,
    pub present_position: u16,
}

impl Default for ControlTable {
    fn default() -> Self {
        Self {
            operating_mode: 11,
            pwm_limit: 36,
            torque_enable: 64,
            goal_pwm: 100,
            present_position: 132,
        }
    }
}

/// One actuator on the bus. Immutable once the registry is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorConfig {
    pub id: u8,
    pub table: ControlTable,
}

impl ActuatorConfig {
    pub fn x_series(id: u8) -> Self {
        Self {
            id,
            table: ControlTable::default(),
        }
    }
}

/// The two positions every actuator oscillates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TargetPair {
    pub low: i32,
    pub high: i32,
}

impl TargetPair {
    pub const fn select(self, index: u8) -> i32 {
        if index == 0 { self.low } else { self.high }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_series_control_table() {
        let table = ControlTable::default();
        assert_eq!(table.operating_mode, 11);
        assert_eq!(table.pwm_limit, 36);
        assert_eq!(table.torque_enable, 64);
        assert_eq!(table.goal_pwm, 100);
        assert_eq!(table.present_position, 132);
    }

    #[test]
    fn test_mode_register_values() {
        assert_eq!(OperatingMode::Velocity.raw(), 1);
        assert_eq!(OperatingMode::Position.raw(), 3);
        assert_eq!(OperatingMode::Pwm.raw(), 16);
        assert_eq!(OperatingMode::from_raw(16), Some(OperatingMode::Pwm));
        assert_eq!(OperatingMode::from_raw(2), None);
    }

    #[test]
    fn test_target_selection() {
        let targets = TargetPair {
            low: 1648,
            high: 2448,
        };
        assert_eq!(targets.select(0), 1648);
        assert_eq!(targets.select(1), 2448);
    }
}
