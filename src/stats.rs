//! Per-port statistics counters.
//!
//! Counters live in the IC's MIB table and are read through the indirect
//! access window: select the MIB table and counter address, then read the
//! two data registers. Each call is a fresh round trip; nothing is cached.

use crate::registers::{IndirectOp, IndirectTable, indirect, indirect_address, indirect_control};
use crate::transport::{Delay, RegisterTransport, SerialBus};
use crate::types::Port;
use crate::Result;

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    /// Received frames with a bad CRC.
    RxCrcErr,
    /// Received bytes.
    RxBytes,
    /// Transmitted bytes.
    TxBytes,
    /// Received frames dropped.
    RxDrop,
    /// Transmitted frames dropped.
    TxDrop,
}

impl CounterKind {
    /// 10-bit MIB address of this counter for `port`.
    ///
    /// CRC errors sit in the per-port counter blocks (32 counters per port);
    /// the byte and drop totals sit in the block at 0x100 with four
    /// counters per port.
    pub const fn mib_address(self, port: Port) -> u16 {
        let p = (port.number() - 1) as u16;
        match self {
            CounterKind::RxCrcErr => 6 + 32 * p,
            CounterKind::RxBytes => 0x100 + 4 * p,
            CounterKind::TxBytes => 0x100 + 1 + 4 * p,
            CounterKind::RxDrop => 0x100 + 2 + 4 * p,
            CounterKind::TxDrop => 0x100 + 3 + 4 * p,
        }
    }

    /// Value written to the indirect control register.
    pub const fn control_value(self, port: Port) -> u8 {
        indirect_control(IndirectOp::Read, IndirectTable::Mib, self.mib_address(port))
    }

    /// Value written to the indirect address register.
    pub const fn sub_register(self, port: Port) -> u8 {
        indirect_address(self.mib_address(port))
    }
}

/// Snapshot of every counter for one port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortCounters {
    /// Received frames with a bad CRC.
    pub rx_crc_err: u32,
    /// Received bytes.
    pub rx_bytes: u32,
    /// Transmitted bytes.
    pub tx_bytes: u32,
    /// Received frames dropped.
    pub rx_drop: u32,
    /// Transmitted frames dropped.
    pub tx_drop: u32,
}

impl<B: SerialBus, D: Delay> RegisterTransport<B, D> {
    /// Read one statistics counter for `port`.
    ///
    /// Issues exactly: write control, write address, read high, read low.
    pub fn read_counter(&mut self, kind: CounterKind, port: Port) -> Result<u32> {
        self.write(indirect::CONTROL, kind.control_value(port))?;
        self.write(indirect::ADDRESS, kind.sub_register(port))?;
        let high = u32::from(self.read(indirect::DATA_HIGH)?);
        let low = u32::from(self.read(indirect::DATA_LOW)?);
        Ok(high * 256 + low)
    }

    /// Read all five counters for `port`.
    pub fn read_port_counters(&mut self, port: Port) -> Result<PortCounters> {
        Ok(PortCounters {
            rx_crc_err: self.read_counter(CounterKind::RxCrcErr, port)?,
            rx_bytes: self.read_counter(CounterKind::RxBytes, port)?,
            tx_bytes: self.read_counter(CounterKind::TxBytes, port)?,
            rx_drop: self.read_counter(CounterKind::RxDrop, port)?,
            tx_drop: self.read_counter(CounterKind::TxDrop, port)?,
        })
    }
}
