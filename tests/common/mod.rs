//! Shared test doubles for the switch hardware seams.

#![allow(dead_code)]

use std::collections::VecDeque;

use ksz_switch_rs::{
    Delay, FrameMedium, MacController, MacSettings, Phy, PhyError, SerialBus,
};

/// One register-level operation observed on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Read(u8),
    Write(u8, u8),
}

/// A register file behind the IC's serial protocol.
///
/// Decodes opcode and address bytes exactly as the IC does and records every
/// transaction.
pub struct MockBus {
    pub regs: [u8; 256],
    pub ops: Vec<BusOp>,
    pub packets: Vec<Vec<u8>>,
    pub fail_at: Option<u8>,
    selected: bool,
    pending_read: Option<u8>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            regs: [0; 256],
            ops: Vec::new(),
            packets: Vec::new(),
            fail_at: None,
            selected: false,
            pending_read: None,
        }
    }

    /// Register writes in issue order.
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                BusOp::Write(a, v) => Some((a, v)),
                BusOp::Read(_) => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.packets.clear();
    }
}

impl SerialBus for MockBus {
    type Error = &'static str;

    fn select(&mut self) -> Result<(), Self::Error> {
        if self.selected {
            return Err("already selected");
        }
        self.selected = true;
        Ok(())
    }

    fn write_packet(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if !self.selected {
            return Err("not selected");
        }
        self.packets.push(bytes.to_vec());
        let addr = (bytes[1] >> 1) | ((bytes[0] & 0x01) << 7);
        if self.fail_at == Some(addr) {
            return Err("bus stuck");
        }
        match (bytes[0] & 0xFE, bytes.len()) {
            (0x60, 2) => self.pending_read = Some(addr),
            (0x40, 3) => {
                self.regs[addr as usize] = bytes[2];
                self.ops.push(BusOp::Write(addr, bytes[2]));
            }
            _ => return Err("malformed command"),
        }
        Ok(())
    }

    fn read_packet(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        let addr = self.pending_read.take().ok_or("read without command")?;
        buf[0] = self.regs[addr as usize];
        self.ops.push(BusOp::Read(addr));
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.selected = false;
        self.pending_read = None;
        Ok(())
    }
}

/// Delay that only accumulates the requested time.
#[derive(Default)]
pub struct MockDelay {
    pub total_us: u64,
    pub calls: usize,
}

impl Delay for MockDelay {
    fn delay_us(&mut self, us: u32) {
        self.total_us += u64::from(us);
        self.calls += 1;
    }
}

/// MAC controller recording what bring-up asked of it.
#[derive(Default)]
pub struct MockMac {
    pub clock_enabled: bool,
    pub settings: Option<MacSettings>,
}

impl MacController for MockMac {
    fn enable_clock(&mut self) {
        self.clock_enabled = true;
    }

    fn configure(&mut self, settings: &MacSettings) {
        self.settings = Some(*settings);
    }
}

/// PHY with scripted results.
pub struct MockPhy {
    pub init_result: Result<(), PhyError>,
    pub link_result: Result<(), PhyError>,
    pub link_attempts: usize,
}

impl MockPhy {
    pub fn up() -> Self {
        Self {
            init_result: Ok(()),
            link_result: Ok(()),
            link_attempts: 0,
        }
    }

    pub fn link_fails() -> Self {
        Self {
            link_result: Err(PhyError::NegotiationFailed),
            ..Self::up()
        }
    }
}

impl Phy for MockPhy {
    fn init(&mut self) -> Result<(), PhyError> {
        self.init_result
    }

    fn set_link(&mut self) -> Result<(), PhyError> {
        self.link_attempts += 1;
        self.link_result
    }
}

/// Frame medium with a scripted receive queue and a transmit log.
#[derive(Default)]
pub struct MockMedium {
    pub rx: VecDeque<Vec<u8>>,
    pub tx: Vec<Vec<u8>>,
    pub broken: bool,
}

impl FrameMedium for MockMedium {
    type Error = &'static str;

    fn try_receive(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.broken {
            return Err("dma error");
        }
        match self.rx.pop_front() {
            Some(frame) => {
                buf[..frame.len()].copy_from_slice(&frame);
                Ok(frame.len())
            }
            None => Ok(0),
        }
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        if self.broken {
            return Err("dma error");
        }
        self.tx.push(frame.to_vec());
        Ok(())
    }
}
