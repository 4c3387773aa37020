// PWM oscillation control
//
// Provides:
// - Static actuator description (control table, targets, modes)
// - Bring-up and release sequences
// - The oscillation driver (proportional PWM law, arrival detection,
//   round-robin burst loop)
// - Bus health monitoring and burst throughput measurement

pub mod actuator;
pub mod driver;
pub mod init;
pub mod monitor;
pub mod probe;

pub use actuator::{ActuatorConfig, ControlTable, OperatingMode, TargetPair};
pub use driver::{ActuatorState, Arrival, OscillationDriver, PwmLaw};
pub use monitor::ErrorMonitor;
pub use probe::BurstTiming;
