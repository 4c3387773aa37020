// PWM oscillation rig for Dynamixel X-series actuators.
//
// Oscillates each actuator on one shared serial bus between two target
// positions using proportional, saturated PWM commands, and measures the
// achievable control-loop rate. One bus, one thread, one transaction in
// flight at a time.

pub mod bus;
pub mod config;
pub mod control;
pub mod error;
pub mod runtime;
pub mod session;

pub use bus::{DynamixelBus, RegisterBus, TxReport};
pub use config::SessionConfig;
pub use error::RigError;
pub use session::Session;
