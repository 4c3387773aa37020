// Interactive burst shell: any key runs a burst, ESC or q ends the session.
// The stop decision is polled only between bursts; a burst that has started
// always runs to completion.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::info;

use crate::bus::RegisterBus;
use crate::config::SessionConfig;
use crate::error::RigError;
use crate::session::Session;

/// Operator decision taken between bursts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstDecision {
    Continue,
    Stop,
}

/// Source of the between-burst go/stop decision. Keeps the control loop
/// independent of any particular input mechanism.
pub trait BurstGate {
    fn wait(&mut self) -> Result<BurstDecision, RigError>;
}

/// Blocks on the keyboard: any key continues, ESC or q stops.
pub struct KeyboardGate;

impl BurstGate for KeyboardGate {
    fn wait(&mut self) -> Result<BurstDecision, RigError> {
        enable_raw_mode()?;
        let decision = loop {
            if let Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) = event::read()?
            {
                match code {
                    KeyCode::Esc | KeyCode::Char('q') => break BurstDecision::Stop,
                    _ => break BurstDecision::Continue,
                }
            }
        };
        disable_raw_mode()?;
        Ok(decision)
    }
}

pub fn run(cfg: &SessionConfig) -> Result<(), RigError> {
    let mut session = Session::open(cfg)?;
    session.initialize();

    let result = drive(&mut session, &mut KeyboardGate);
    session.shutdown();
    result
}

/// Read-only diagnostic pass over the configured actuators.
pub fn scan(cfg: &SessionConfig) -> Result<(), RigError> {
    let mut session = Session::open(cfg)?;
    session.scan();
    Ok(())
}

/// The burst loop: gate, burst, report, repeat.
pub fn drive<B: RegisterBus>(
    session: &mut Session<B>,
    gate: &mut dyn BurstGate,
) -> Result<(), RigError> {
    loop {
        info!("press any key to run a burst (ESC to quit)");
        if gate.wait()? == BurstDecision::Stop {
            break;
        }

        let timing = session.run_burst();
        info!(
            "burst: {} ticks in {:.2}s ({:.2} Hz)",
            timing.ticks,
            timing.elapsed.as_secs_f64(),
            timing.rate_hz()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mock::MockBus;

    struct ScriptedGate {
        decisions: Vec<BurstDecision>,
    }

    impl BurstGate for ScriptedGate {
        fn wait(&mut self) -> Result<BurstDecision, RigError> {
            Ok(self.decisions.remove(0))
        }
    }

    #[test]
    fn test_drive_runs_bursts_until_stop() {
        let cfg = SessionConfig {
            ids: vec![1, 2],
            burst_ticks: 4,
            ..SessionConfig::default()
        };
        let mut session = Session::with_bus(MockBus::new(), &cfg);
        session.initialize();

        let mut gate = ScriptedGate {
            decisions: vec![
                BurstDecision::Continue,
                BurstDecision::Continue,
                BurstDecision::Stop,
            ],
        };
        drive(&mut session, &mut gate).unwrap();

        // Every decision was consumed: two bursts ran, then the stop
        assert!(gate.decisions.is_empty());
        // Each burst ends braked
        assert!(session.driver().states().iter().all(|s| s.last_pwm == 0));
        session.shutdown();
    }

    #[test]
    fn test_stop_before_any_burst() {
        let cfg = SessionConfig {
            ids: vec![1],
            ..SessionConfig::default()
        };
        let mut session = Session::with_bus(MockBus::new(), &cfg);

        let mut gate = ScriptedGate {
            decisions: vec![BurstDecision::Stop],
        };
        drive(&mut session, &mut gate).unwrap();
    }
}
