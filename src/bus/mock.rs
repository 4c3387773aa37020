// Scripted in-memory bus so control logic is testable without hardware.

use std::collections::{HashMap, VecDeque};

use super::{CommStatus, DeviceError, Reading, RegWidth, RegisterBus, TxReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WriteRecord {
    pub id: u8,
    pub addr: u16,
    pub width: RegWidth,
    pub value: u32,
}

#[derive(Default)]
pub(crate) struct MockBus {
    positions: HashMap<u8, VecDeque<u32>>,
    last_position: HashMap<u8, u32>,
    pub writes: Vec<WriteRecord>,
    pub reads: Vec<(u8, u16)>,
    /// When set, every transaction reports this transport result.
    pub comm: Option<CommStatus>,
    /// Device error attached to otherwise-successful transactions.
    pub device_error: DeviceError,
    last_report: TxReport,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a present-position reply for one actuator. Once the queue
    /// drains, reads keep returning the last queued value.
    pub fn script_position(&mut self, id: u8, position: u32) {
        self.positions.entry(id).or_default().push_back(position);
    }

    pub fn writes_for(&self, id: u8) -> Vec<WriteRecord> {
        self.writes.iter().copied().filter(|w| w.id == id).collect()
    }

    fn report(&mut self) -> TxReport {
        let report = TxReport {
            comm: self.comm.unwrap_or(CommStatus::Success),
            device_error: self.device_error,
        };
        self.last_report = report;
        report
    }
}

impl RegisterBus for MockBus {
    fn read_register(&mut self, id: u8, addr: u16, _width: RegWidth) -> Reading {
        self.reads.push((id, addr));
        let report = self.report();
        let value = if report.comm == CommStatus::Success {
            let value = self
                .positions
                .get_mut(&id)
                .and_then(|queue| queue.pop_front())
                .or_else(|| self.last_position.get(&id).copied())
                .unwrap_or(0);
            self.last_position.insert(id, value);
            value
        } else {
            0
        };
        Reading { value, report }
    }

    fn write_register(&mut self, id: u8, addr: u16, width: RegWidth, value: u32) -> TxReport {
        self.writes.push(WriteRecord {
            id,
            addr,
            width,
            value,
        });
        self.report()
    }

    fn ping(&mut self, _id: u8) -> TxReport {
        self.report()
    }

    fn last_report(&self) -> TxReport {
        self.last_report
    }
}
