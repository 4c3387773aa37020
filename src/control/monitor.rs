// Bus health monitoring. Faults are reported and counted, never allowed to
// interrupt the control loop.

use tracing::warn;

use crate::bus::{CommStatus, TxReport};

#[derive(Debug, Default)]
pub struct ErrorMonitor {
    transport_failures: u64,
    device_faults: u64,
}

impl ErrorMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the report is clean. A transport failure is
    /// reported in preference to a device error when both are present.
    pub fn check(&mut self, report: &TxReport) -> bool {
        if report.comm != CommStatus::Success {
            self.transport_failures += 1;
            warn!("{}", report.comm);
            false
        } else if !report.device_error.is_clear() {
            self.device_faults += 1;
            warn!("{}", report.device_error);
            false
        } else {
            true
        }
    }

    pub fn transport_failures(&self) -> u64 {
        self.transport_failures
    }

    pub fn device_faults(&self) -> u64 {
        self.device_faults
    }

    pub fn is_clean(&self) -> bool {
        self.transport_failures == 0 && self.device_faults == 0
    }
}
