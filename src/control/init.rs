// Actuator bring-up and release.

use tracing::debug;

use super::actuator::{ActuatorConfig, OperatingMode};
use super::monitor::ErrorMonitor;
use crate::bus::{RegWidth, RegisterBus};

pub const TORQUE_ENABLE: u32 = 1;
pub const TORQUE_DISABLE: u32 = 0;

/// Bring one actuator into the requested operating mode.
///
/// Write order is fixed: operating mode, then PWM limit, then torque enable.
/// A failed write is reported through the monitor and the sequence moves on;
/// re-running the sequence re-applies the same writes. Returns true when all
/// three writes were clean.
pub fn initialize(
    bus: &mut dyn RegisterBus,
    monitor: &mut ErrorMonitor,
    actuator: &ActuatorConfig,
    mode: OperatingMode,
    pwm_limit: u16,
) -> bool {
    let table = &actuator.table;

    debug!(id = actuator.id, ?mode, "selecting operating mode");
    let mut healthy = monitor.check(&bus.write_register(
        actuator.id,
        table.operating_mode,
        RegWidth::Byte,
        u32::from(mode.raw()),
    ));

    debug!(id = actuator.id, pwm_limit, "limiting pwm");
    healthy &= monitor.check(&bus.write_register(
        actuator.id,
        table.pwm_limit,
        RegWidth::Word,
        u32::from(pwm_limit),
    ));

    debug!(id = actuator.id, "enabling torque");
    healthy &= monitor.check(&bus.write_register(
        actuator.id,
        table.torque_enable,
        RegWidth::Byte,
        TORQUE_ENABLE,
    ));

    healthy
}

/// Best-effort torque release. Safe to call whether or not bring-up ever ran.
pub fn shutdown(bus: &mut dyn RegisterBus, actuator: &ActuatorConfig) {
    debug!(id = actuator.id, "disabling torque");
    bus.write_register(
        actuator.id,
        actuator.table.torque_enable,
        RegWidth::Byte,
        TORQUE_DISABLE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mock::MockBus;
    use crate::bus::CommStatus;

    #[test]
    fn test_bring_up_write_order() {
        let mut bus = MockBus::new();
        let mut monitor = ErrorMonitor::new();
        let actuator = ActuatorConfig::x_series(1);

        assert!(initialize(
            &mut bus,
            &mut monitor,
            &actuator,
            OperatingMode::Pwm,
            200
        ));

        let writes = bus.writes_for(1);
        assert_eq!(writes.len(), 3);
        assert_eq!((writes[0].addr, writes[0].value), (11, 16));
        assert_eq!((writes[1].addr, writes[1].value), (36, 200));
        assert_eq!((writes[2].addr, writes[2].value), (64, 1));
        assert_eq!(writes[0].width, RegWidth::Byte);
        assert_eq!(writes[1].width, RegWidth::Word);
        assert_eq!(writes[2].width, RegWidth::Byte);
    }

    #[test]
    fn test_failed_write_does_not_stop_the_sequence() {
        let mut bus = MockBus::new();
        bus.comm = Some(CommStatus::TxFail);
        let mut monitor = ErrorMonitor::new();
        let actuator = ActuatorConfig::x_series(2);

        assert!(!initialize(
            &mut bus,
            &mut monitor,
            &actuator,
            OperatingMode::Pwm,
            200
        ));

        // All three writes still issued, each one reported
        assert_eq!(bus.writes_for(2).len(), 3);
        assert_eq!(monitor.transport_failures(), 3);
    }

    #[test]
    fn test_reinitialize_repeats_the_same_writes() {
        let mut bus = MockBus::new();
        let mut monitor = ErrorMonitor::new();
        let actuator = ActuatorConfig::x_series(1);

        initialize(&mut bus, &mut monitor, &actuator, OperatingMode::Pwm, 200);
        initialize(&mut bus, &mut monitor, &actuator, OperatingMode::Pwm, 200);

        let writes = bus.writes_for(1);
        assert_eq!(writes.len(), 6);
        assert_eq!(writes[..3], writes[3..]);
    }

    #[test]
    fn test_shutdown_disables_torque() {
        let mut bus = MockBus::new();
        let actuator = ActuatorConfig::x_series(14);

        shutdown(&mut bus, &actuator);

        let writes = bus.writes_for(14);
        assert_eq!(writes.len(), 1);
        assert_eq!((writes[0].addr, writes[0].value), (64, 0));
    }
}
