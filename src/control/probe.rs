// Wall-clock throughput measurement for a burst of control ticks.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct BurstTiming {
    pub ticks: u32,
    pub elapsed: Duration,
}

impl BurstTiming {
    /// Effective tick rate. An empty or unmeasurably short burst reports 0.
    pub fn rate_hz(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if self.ticks == 0 || secs == 0.0 {
            0.0
        } else {
            f64::from(self.ticks) / secs
        }
    }
}

/// Time a burst closure. Pure measurement, no effect on control.
pub fn measure<F: FnOnce()>(ticks: u32, burst: F) -> BurstTiming {
    let start = Instant::now();
    burst();
    BurstTiming {
        ticks,
        elapsed: start.elapsed(),
    }
}
