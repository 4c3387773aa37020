// Session lifecycle: open the bus, bring the actuators up, run bursts,
// release everything on the way out.

use tracing::{info, warn};

use crate::bus::{DynamixelBus, RegWidth, RegisterBus};
use crate::config::SessionConfig;
use crate::control::{init, ActuatorConfig, BurstTiming, OperatingMode, OscillationDriver, PwmLaw};
use crate::error::RigError;

pub struct Session<B: RegisterBus = DynamixelBus> {
    bus: B,
    registry: Vec<ActuatorConfig>,
    driver: OscillationDriver,
    mode: OperatingMode,
    pwm_limit: u16,
    burst_ticks: u32,
    needs_release: bool,
}

impl Session<DynamixelBus> {
    /// Open the serial port at the configured baud rate and build the
    /// session. Port and baud failures are the only fatal bus errors; every
    /// later fault is diagnostic.
    pub fn open(cfg: &SessionConfig) -> Result<Self, RigError> {
        let bus = DynamixelBus::open(&cfg.port, cfg.baud_rate)?;
        info!(port = %cfg.port, baud = cfg.baud_rate, "serial port ready");
        Ok(Self::with_bus(bus, cfg))
    }
}

impl<B: RegisterBus> Session<B> {
    pub fn with_bus(bus: B, cfg: &SessionConfig) -> Self {
        let registry = cfg.registry();
        let law = PwmLaw::new(cfg.gain, cfg.pwm_limit, cfg.arrival_threshold);
        let driver = OscillationDriver::new(law, cfg.targets, registry.len());
        Self {
            bus,
            registry,
            driver,
            mode: cfg.mode,
            pwm_limit: cfg.pwm_limit,
            burst_ticks: cfg.burst_ticks,
            needs_release: false,
        }
    }

    /// Bring every actuator into the configured operating mode.
    pub fn initialize(&mut self) {
        let mut healthy = true;
        for actuator in &self.registry {
            healthy &= init::initialize(
                &mut self.bus,
                self.driver.monitor_mut(),
                actuator,
                self.mode,
                self.pwm_limit,
            );
        }
        self.needs_release = true;
        if healthy {
            info!("all actuators connected");
        }
    }

    /// Run one burst of control ticks. Cancellation is the caller's
    /// business and only happens between bursts.
    pub fn run_burst(&mut self) -> BurstTiming {
        self.driver
            .run_burst(&mut self.bus, &self.registry, self.burst_ticks)
    }

    /// Release torque on every actuator and log the session's fault totals.
    pub fn shutdown(&mut self) {
        info!("releasing actuators");
        for actuator in &self.registry {
            init::shutdown(&mut self.bus, actuator);
        }
        self.driver.monitor_mut().check(&self.bus.last_report());
        self.needs_release = false;

        let monitor = self.driver.monitor();
        if !monitor.is_clean() {
            warn!(
                transport_failures = monitor.transport_failures(),
                device_faults = monitor.device_faults(),
                "bus faults were observed this session"
            );
        }
    }

    /// Read-only bus check: ping each actuator and report its mode, torque
    /// state, and present position. Never writes.
    pub fn scan(&mut self) {
        for actuator in &self.registry {
            let id = actuator.id;
            let report = self.bus.ping(id);
            if !report.healthy() {
                warn!(id, comm = %report.comm, "actuator not responding");
                continue;
            }

            let mode = self
                .bus
                .read_register(id, actuator.table.operating_mode, RegWidth::Byte);
            let torque = self
                .bus
                .read_register(id, actuator.table.torque_enable, RegWidth::Byte);
            let position = self
                .bus
                .read_register(id, actuator.table.present_position, RegWidth::DWord);

            info!(
                id,
                mode = mode_name(mode.value),
                torque = if torque.value == 1 { "on" } else { "off" },
                position = position.value,
                "actuator responding"
            );
        }
    }

    pub fn driver(&self) -> &OscillationDriver {
        &self.driver
    }

    pub fn registry(&self) -> &[ActuatorConfig] {
        &self.registry
    }
}

impl<B: RegisterBus> Drop for Session<B> {
    fn drop(&mut self) {
        // Safety net for sessions torn down without an explicit shutdown:
        // brake, then release
        if self.needs_release {
            for actuator in &self.registry {
                self.bus
                    .write_register(actuator.id, actuator.table.goal_pwm, RegWidth::Word, 0);
                init::shutdown(&mut self.bus, actuator);
            }
        }
    }
}

fn mode_name(raw: u32) -> &'static str {
    match OperatingMode::from_raw(raw as u8) {
        Some(OperatingMode::Velocity) => "velocity",
        Some(OperatingMode::Position) => "position",
        Some(OperatingMode::Pwm) => "pwm",
        None => "unknown",
    }
}
