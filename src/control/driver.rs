// The oscillation control loop.
//
// Each actuator coasts at proportional, saturated PWM toward its current
// target and reverses direction only after crossing inside the arrival
// band: bang-bang oscillation between the two configured positions.

use tracing::debug;

use super::actuator::{ActuatorConfig, TargetPair};
use super::monitor::ErrorMonitor;
use super::probe::{self, BurstTiming};
use crate::bus::{RegWidth, RegisterBus};

/// Proportional PWM law with saturation.
#[derive(Debug, Clone, Copy)]
pub struct PwmLaw {
    gain: i32,
    limit: i32,
    threshold: i32,
}

impl PwmLaw {
    pub fn new(gain: i32, limit: u16, threshold: i32) -> Self {
        // The goal PWM register is a signed 16-bit value
        let limit = i32::from(limit.min(i16::MAX as u16));
        Self {
            gain,
            limit,
            threshold,
        }
    }

    /// PWM command for the given goal and present position, clamped to the
    /// closed interval [-limit, +limit].
    pub fn command(&self, goal: i32, present: i32) -> i16 {
        (goal - present)
            .saturating_mul(self.gain)
            .clamp(-self.limit, self.limit) as i16
    }

    /// Arrival uses an inclusive bound: an error equal to the threshold
    /// counts as arrived.
    pub fn arrived(&self, goal: i32, present: i32) -> bool {
        (goal - present).abs() <= self.threshold
    }
}

/// Per-actuator runtime record. Owned by the driver; there are no other
/// writers.
#[derive(Debug, Clone, Copy)]
pub struct ActuatorState {
    /// Selects between the two targets: 0 = low, 1 = high.
    pub target: u8,
    /// Last observed present position. Unhealthy reads leave it untouched.
    pub position: i32,
    /// Last commanded PWM.
    pub last_pwm: i16,
}

impl ActuatorState {
    pub fn new(target: u8) -> Self {
        Self {
            target,
            position: 0,
            last_pwm: 0,
        }
    }

    pub fn toggle_target(&mut self) {
        self.target ^= 1;
    }
}

/// Outcome of one control step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    Arrived,
    InFlight,
}

pub struct OscillationDriver {
    law: PwmLaw,
    targets: TargetPair,
    states: Vec<ActuatorState>,
    monitor: ErrorMonitor,
}

impl OscillationDriver {
    pub fn new(law: PwmLaw, targets: TargetPair, actuator_count: usize) -> Self {
        // Neighbouring actuators start toward opposite targets so the rig
        // oscillates in antiphase
        let states = (0..actuator_count)
            .map(|i| ActuatorState::new((i % 2) as u8))
            .collect();
        Self {
            law,
            targets,
            states,
            monitor: ErrorMonitor::new(),
        }
    }

    pub fn states(&self) -> &[ActuatorState] {
        &self.states
    }

    pub fn monitor(&self) -> &ErrorMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut ErrorMonitor {
        &mut self.monitor
    }

    /// One read-compute-write pass for a single actuator.
    ///
    /// Arrival is decided from the position alone, independent of the
    /// transaction reports; an unhealthy read falls back to the last
    /// observed position.
    pub fn step(
        &mut self,
        bus: &mut dyn RegisterBus,
        actuator: &ActuatorConfig,
        index: usize,
    ) -> Arrival {
        let goal = self.targets.select(self.states[index].target);

        let reading = bus.read_register(
            actuator.id,
            actuator.table.present_position,
            RegWidth::DWord,
        );
        if reading.report.healthy() {
            self.states[index].position = reading.value as i32;
        }
        let present = self.states[index].position;

        let pwm = self.law.command(goal, present);
        bus.write_register(
            actuator.id,
            actuator.table.goal_pwm,
            RegWidth::Word,
            encode_pwm(pwm),
        );
        self.states[index].last_pwm = pwm;

        if self.law.arrived(goal, present) {
            // Brake: hold the actuator inside the arrival band
            bus.write_register(actuator.id, actuator.table.goal_pwm, RegWidth::Word, 0);
            self.states[index].last_pwm = 0;
            Arrival::Arrived
        } else {
            Arrival::InFlight
        }
    }

    /// One full round-robin pass over the registry, visiting actuators in
    /// registry order, then a single health check on the tick's most recent
    /// transaction.
    pub fn tick(&mut self, bus: &mut dyn RegisterBus, registry: &[ActuatorConfig]) {
        for (index, actuator) in registry.iter().enumerate() {
            if self.step(bus, actuator, index) == Arrival::Arrived {
                self.states[index].toggle_target();
                debug!(
                    id = actuator.id,
                    target = self.states[index].target,
                    "target reached, reversing"
                );
            }
        }
        self.monitor.check(&bus.last_report());
    }

    /// Run a fixed number of ticks, then brake every actuator before
    /// handing control back for the next burst decision. The safety stop
    /// runs outside the measured window.
    pub fn run_burst(
        &mut self,
        bus: &mut dyn RegisterBus,
        registry: &[ActuatorConfig],
        ticks: u32,
    ) -> BurstTiming {
        let timing = probe::measure(ticks, || {
            for _ in 0..ticks {
                self.tick(&mut *bus, registry);
            }
        });

        for actuator in registry {
            bus.write_register(actuator.id, actuator.table.goal_pwm, RegWidth::Word, 0);
        }
        for state in &mut self.states {
            state.last_pwm = 0;
        }

        timing
    }
}

/// Two's-complement 16-bit wire encoding of a signed PWM command.
fn encode_pwm(pwm: i16) -> u32 {
    u32::from(pwm as u16)
}
