// Serial transport for the actuator bus.
//
// Every transaction is a blocking round trip: the instruction packet goes
// out, the status packet is awaited under the port timeout, and the outcome
// lands in a TxReport. Transport and device faults never escape as errors
// from read/write; only opening the port can fail the session.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use super::protocol::{self, Instruction, StatusPacket};
use super::{CommStatus, DeviceError, Reading, RegWidth, RegisterBus, TxReport};
use crate::error::RigError;

pub const DEFAULT_TIMEOUT_MS: u64 = 100;

// Status packets are short; anything longer than this is line noise.
const MAX_STATUS_BODY: usize = 0xFF;

pub struct DynamixelBus {
    port: Box<dyn SerialPort>,
    last_report: TxReport,
}

impl DynamixelBus {
    /// Open the port at the given baud rate. This is one of the two fatal
    /// failure points of a session; everything after it is diagnostic.
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, RigError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self {
            port,
            last_report: TxReport::success(),
        })
    }

    fn transact(&mut self, id: u8, instruction: Instruction, params: &[u8]) -> (Vec<u8>, TxReport) {
        let (params, report) = match self.exchange(id, instruction, params) {
            Ok(status) => {
                let report = TxReport {
                    comm: CommStatus::Success,
                    device_error: DeviceError::from_raw(status.error),
                };
                (status.params, report)
            }
            Err(comm) => (Vec::new(), TxReport::comm_failure(comm)),
        };
        self.last_report = report;
        (params, report)
    }

    fn exchange(
        &mut self,
        id: u8,
        instruction: Instruction,
        params: &[u8],
    ) -> Result<StatusPacket, CommStatus> {
        let packet = protocol::build_packet(id, instruction, params);
        debug!(id, ?instruction, len = packet.len(), "bus transaction");

        self.port.write_all(&packet).map_err(|_| CommStatus::TxFail)?;
        self.port.flush().map_err(|_| CommStatus::TxFail)?;

        self.read_status(id)
    }

    fn read_status(&mut self, expected_id: u8) -> Result<StatusPacket, CommStatus> {
        // Header, id, and length first, then exactly the announced body
        let mut head = [0u8; 7];
        self.port.read_exact(&mut head).map_err(classify_io)?;

        if head[..4] != protocol::HEADER {
            return Err(CommStatus::RxCorrupt);
        }
        let length = u16::from_le_bytes([head[5], head[6]]) as usize;
        if length < 3 || length > MAX_STATUS_BODY {
            return Err(CommStatus::RxCorrupt);
        }

        let mut body = vec![0u8; length];
        self.port.read_exact(&mut body).map_err(classify_io)?;

        let mut packet = head.to_vec();
        packet.extend_from_slice(&body);

        let status = protocol::parse_status(&packet).map_err(|_| CommStatus::RxCorrupt)?;
        if status.id != expected_id {
            return Err(CommStatus::RxCorrupt);
        }
        Ok(status)
    }
}

impl RegisterBus for DynamixelBus {
    fn read_register(&mut self, id: u8, addr: u16, width: RegWidth) -> Reading {
        let mut params = [0u8; 4];
        params[..2].copy_from_slice(&addr.to_le_bytes());
        params[2..].copy_from_slice(&(width.bytes() as u16).to_le_bytes());

        let (data, report) = self.transact(id, Instruction::Read, &params);
        let value = if report.comm == CommStatus::Success && data.len() >= width.bytes() {
            decode_le(&data[..width.bytes()])
        } else {
            0
        };
        Reading { value, report }
    }

    fn write_register(&mut self, id: u8, addr: u16, width: RegWidth, value: u32) -> TxReport {
        let mut params = Vec::with_capacity(2 + width.bytes());
        params.extend_from_slice(&addr.to_le_bytes());
        params.extend_from_slice(&value.to_le_bytes()[..width.bytes()]);

        let (_, report) = self.transact(id, Instruction::Write, &params);
        report
    }

    fn ping(&mut self, id: u8) -> TxReport {
        let (_, report) = self.transact(id, Instruction::Ping, &[]);
        report
    }

    fn last_report(&self) -> TxReport {
        self.last_report
    }
}

fn classify_io(e: std::io::Error) -> CommStatus {
    if e.kind() == std::io::ErrorKind::TimedOut {
        CommStatus::RxTimeout
    } else {
        CommStatus::RxFail
    }
}

fn decode_le(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .rev()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_le() {
        assert_eq!(decode_le(&[0x38]), 0x38);
        assert_eq!(decode_le(&[0x38, 0xFF]), 0xFF38);
        assert_eq!(decode_le(&[0x70, 0x09, 0x00, 0x00]), 2416);
    }

    #[test]
    fn test_classify_io() {
        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "t");
        assert_eq!(classify_io(timeout), CommStatus::RxTimeout);

        let broken = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "b");
        assert_eq!(classify_io(broken), CommStatus::RxFail);
    }
}
