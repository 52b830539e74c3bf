//! Register map of the switch IC.
//!
//! Addresses and values are grouped by function: serial command opcodes,
//! global mode registers, the per-port register blocks, and the indirect
//! access window shared by the VLAN table and the MIB statistics counters.

use crate::types::Port;

/// Serial command opcodes.
///
/// The IC addresses 256 registers with a 7-bit field shifted left by one; the
/// eighth address bit travels in the low bit of the opcode.
pub mod opcode {
    /// Read, registers 0..=127.
    pub const READ_LOW: u8 = 0x60;
    /// Read, registers 128..=255.
    pub const READ_HIGH: u8 = 0x61;
    /// Write, registers 0..=127.
    pub const WRITE_LOW: u8 = 0x40;
    /// Write, registers 128..=255.
    pub const WRITE_HIGH: u8 = 0x41;

    /// Opcode for reading `addr`.
    pub const fn read(addr: u8) -> u8 {
        if addr < 128 { READ_LOW } else { READ_HIGH }
    }

    /// Opcode for writing `addr`.
    pub const fn write(addr: u8) -> u8 {
        if addr < 128 { WRITE_LOW } else { WRITE_HIGH }
    }
}

/// Global mode registers and the values bring-up writes to them.
pub mod global {
    /// Global control 2: frame-size checks.
    pub const CONTROL_2: u8 = 4;
    /// Legal-size check disabled; the tail tag pushes a 1518-byte frame to 1519.
    pub const CONTROL_2_NO_SIZE_CHECK: u8 = 242;

    /// Global control 3: 802.1Q VLAN enable.
    pub const CONTROL_3: u8 = 5;
    /// 802.1Q disabled.
    pub const VLAN_DISABLED: u8 = 0;
    /// 802.1Q enabled.
    pub const VLAN_ENABLED: u8 = 128;

    /// Global control 10: tail tag mode.
    pub const CONTROL_10: u8 = 12;
    /// Tail tag mode on.
    pub const TAIL_TAG_ON: u8 = 70;

    /// CPU port default VID (low byte).
    pub const CPU_DEFAULT_VID: u8 = 84;

    /// CPU port interface selection.
    pub const CPU_INTERFACE: u8 = 86;
    /// CPU port uses MII.
    pub const CPU_INTERFACE_MII: u8 = 232;
}

/// Per-port register block.
///
/// Port `n` (1-based) occupies registers `16 * n ..= 16 * n + 15`.
pub mod port {
    /// Port control 0: tag insertion.
    pub const TAG_CONTROL: u8 = 0;
    /// Egress frames leave with an 802.1Q tag.
    pub const TAGGED: u8 = 4;
    /// Egress frames leave untagged.
    pub const UNTAGGED: u8 = 0;

    /// Port control 4: default ingress VID (low byte).
    pub const DEFAULT_VID: u8 = 4;

    /// Port control 5: authentication mode.
    pub const AUTH_CONTROL: u8 = 5;
    /// Trap authentication-class frames to the CPU port.
    pub const AUTH_TRAP_TO_CPU: u8 = 3;

    /// Stride between consecutive port blocks.
    pub const STRIDE: u8 = 16;
}

/// Address of register `offset` inside the block belonging to `port`.
pub const fn port_register(port: Port, offset: u8) -> u8 {
    port::STRIDE * port.number() + offset
}

/// Indirect access window.
///
/// Tables inside the IC are reached by writing a selector to
/// [`CONTROL`](indirect::CONTROL) and the low address byte to
/// [`ADDRESS`](indirect::ADDRESS), then moving data through the data
/// registers ending at [`DATA_LOW`](indirect::DATA_LOW).
pub mod indirect {
    /// Indirect access control 0: operation, table, address bits 9..8.
    pub const CONTROL: u8 = 110;
    /// Indirect access control 1: address bits 7..0.
    pub const ADDRESS: u8 = 111;
    /// Second-to-last indirect data register.
    pub const DATA_HIGH: u8 = 119;
    /// Last indirect data register.
    pub const DATA_LOW: u8 = 120;
}

/// Direction of an indirect access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndirectOp {
    /// Table contents are written from the data registers.
    Write = 0x00,
    /// Table contents are loaded into the data registers.
    Read = 0x10,
}

/// Table reached through the indirect access window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndirectTable {
    /// Static MAC address table.
    StaticMac = 0x00,
    /// VLAN membership table.
    Vlan = 0x04,
    /// Dynamic MAC address table.
    DynamicMac = 0x08,
    /// MIB statistics counters.
    Mib = 0x0C,
}

/// Value for [`indirect::CONTROL`] selecting `table` at the 10-bit `addr`.
pub const fn indirect_control(op: IndirectOp, table: IndirectTable, addr: u16) -> u8 {
    op as u8 | table as u8 | ((addr >> 8) & 0x03) as u8
}

/// Value for [`indirect::ADDRESS`] selecting the 10-bit `addr`.
pub const fn indirect_address(addr: u16) -> u8 {
    (addr & 0xFF) as u8
}
