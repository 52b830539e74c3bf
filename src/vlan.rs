//! VLAN table encoding.
//!
//! The IC keeps VLAN membership in a table of 1024 rows, four VLAN ids per
//! row, reached through the indirect access window. Each id owns two data
//! registers in the window: `119 - 2 * index` (high) and `120 - 2 * index`
//! (low), where `index = id % 4` and the row is `id / 4`.
//!
//! High byte layout:
//!
//! | bit | meaning                              |
//! |-----|--------------------------------------|
//! | 4   | entry valid                          |
//! | 3   | CPU port member (Default VLANs)      |
//! | 2   | port 4 member                        |
//! | 1   | port 3 member                        |
//! | 0   | port 2 member                        |
//!
//! Low byte layout: bit 7 is port 1 membership, bits 6..0 the forwarding id
//! (the VLAN's slot number plus one).
//!
//! [`encode_vlan`] is pure; it produces the complete ordered list of register
//! writes for one slot, which [`RegisterTransport::program_vlan`] replays.
//! Tag mode is a per-port register, so when two VLANs share a port the slot
//! programmed last decides that port's tagging.

use heapless::Vec;

use crate::config::{PortMap, VlanEntry, VlanKind};
use crate::registers::{
    IndirectOp, IndirectTable, global, indirect, indirect_address, indirect_control, port,
    port_register,
};
use crate::transport::{Delay, RegisterTransport, SerialBus};
use crate::types::{Port, VlanId};
use crate::Result;

/// High byte: entry valid.
pub const HIGH_VALID: u8 = 0x10;
/// High byte: CPU port member, set for Default VLANs.
pub const HIGH_CPU_MEMBER: u8 = 0x08;
/// Low byte: port 1 member.
pub const LOW_PORT1_MEMBER: u8 = 0x80;
/// Low byte: forwarding id mask.
pub const LOW_FID_MASK: u8 = 0x7F;

/// Most register writes one slot can need:
/// CPU VID, 4 port VIDs, row select, 4 tag modes, 2 data bytes, row commit.
pub const MAX_SLOT_WRITES: usize = 15;

/// One register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Register address.
    pub addr: u8,
    /// Value written.
    pub value: u8,
}

impl RegisterWrite {
    /// Create a register write.
    pub const fn new(addr: u8, value: u8) -> Self {
        Self { addr, value }
    }
}

/// The encoded form of one VLAN slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanProgram {
    /// VLAN id.
    pub id: VlanId,
    /// Slot position in the configuration.
    pub slot: usize,
    /// VLAN table row (`id / 4`).
    pub offset: u16,
    /// Sub-entry within the row (`id % 4`).
    pub index: u8,
    /// Encoded high byte.
    pub high: u8,
    /// Encoded low byte.
    pub low: u8,
    /// Ordered register writes committing this slot.
    pub writes: Vec<RegisterWrite, MAX_SLOT_WRITES>,
}

impl VlanProgram {
    /// Data register receiving the high byte.
    pub const fn high_register(&self) -> u8 {
        data_high_register(self.index)
    }

    /// Data register receiving the low byte.
    pub const fn low_register(&self) -> u8 {
        data_low_register(self.index)
    }
}

/// Data register holding the high byte of sub-entry `index`.
pub const fn data_high_register(index: u8) -> u8 {
    indirect::DATA_HIGH - 2 * index
}

/// Data register holding the low byte of sub-entry `index`.
pub const fn data_low_register(index: u8) -> u8 {
    indirect::DATA_LOW - 2 * index
}

/// Tag-control value for member ports of a VLAN.
const fn tag_mode(tagged: bool) -> u8 {
    if tagged { port::TAGGED } else { port::UNTAGGED }
}

/// Encode the active VLAN `entry` held in configuration slot `slot`.
///
/// Write order:
/// 1. CPU port default VID (Default VLANs only).
/// 2. Default ingress VID of every member port.
/// 3. Row select for reading.
/// 4. Tag mode of ports 4, 3, 2, then 1, for each member.
/// 5. High and low data bytes.
/// 6. Row commit.
pub fn encode_vlan(entry: &VlanEntry, slot: usize) -> Result<VlanProgram> {
    let id = entry.vlan_id()?;
    let offset = id.table_offset();
    let index = id.table_index();
    let tag = tag_mode(entry.tagged);
    let mut writes: Vec<RegisterWrite, MAX_SLOT_WRITES> = Vec::new();

    let mut push = |addr: u8, value: u8| {
        // Capacity is the worst case, MAX_SLOT_WRITES
        let _ = writes.push(RegisterWrite::new(addr, value));
    };

    if entry.kind == VlanKind::Default {
        push(global::CPU_DEFAULT_VID, id.low_byte());
    }
    for member in entry.portmap.ports() {
        push(port_register(member, port::DEFAULT_VID), id.low_byte());
    }

    push(
        indirect::CONTROL,
        indirect_control(IndirectOp::Read, IndirectTable::Vlan, offset),
    );
    push(indirect::ADDRESS, indirect_address(offset));

    let mut high = HIGH_VALID;
    if entry.kind == VlanKind::Default {
        high |= HIGH_CPU_MEMBER;
    }
    for (member, bit) in [(Port::P4, 0x04), (Port::P3, 0x02), (Port::P2, 0x01)] {
        if entry.portmap.contains(member) {
            high |= bit;
            push(port_register(member, port::TAG_CONTROL), tag);
        }
    }

    let mut low = fid_for_slot(slot);
    if entry.portmap.contains(Port::P1) {
        low |= LOW_PORT1_MEMBER;
        push(port_register(Port::P1, port::TAG_CONTROL), tag);
    }

    push(data_high_register(index), high);
    push(data_low_register(index), low);

    push(
        indirect::CONTROL,
        indirect_control(IndirectOp::Write, IndirectTable::Vlan, offset),
    );
    push(indirect::ADDRESS, indirect_address(offset));

    Ok(VlanProgram {
        id,
        slot,
        offset,
        index,
        high,
        low,
        writes,
    })
}

/// Forwarding id assigned to configuration slot `slot`.
pub const fn fid_for_slot(slot: usize) -> u8 {
    ((slot + 1) as u8) & LOW_FID_MASK
}

/// A VLAN table entry decoded from its two data bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanRow {
    /// Entry valid bit.
    pub valid: bool,
    /// CPU port membership (Default VLANs).
    pub cpu_member: bool,
    /// Front-panel port membership.
    pub members: PortMap,
    /// Forwarding id.
    pub fid: u8,
}

impl VlanRow {
    /// Decode a table entry from its high and low data bytes.
    pub fn decode(high: u8, low: u8) -> Self {
        Self {
            valid: high & HIGH_VALID != 0,
            cpu_member: high & HIGH_CPU_MEMBER != 0,
            members: PortMap::from([
                low & LOW_PORT1_MEMBER != 0,
                high & 0x01 != 0,
                high & 0x02 != 0,
                high & 0x04 != 0,
            ]),
            fid: low & LOW_FID_MASK,
        }
    }

    /// VLAN kind implied by the CPU membership bit.
    pub fn kind(&self) -> VlanKind {
        if self.cpu_member {
            VlanKind::Default
        } else {
            VlanKind::Unassigned
        }
    }
}

impl<B: SerialBus, D: Delay> RegisterTransport<B, D> {
    /// Replay an encoded slot against the IC.
    pub fn program_vlan(&mut self, program: &VlanProgram) -> Result<()> {
        log::debug!(
            "programming VLAN {} (slot {}, row {}, index {}): high={:#04x} low={:#04x}",
            program.id,
            program.slot,
            program.offset,
            program.index,
            program.high,
            program.low
        );
        for w in &program.writes {
            self.write(w.addr, w.value)?;
        }
        Ok(())
    }

    /// Load the table entry for `id` and decode it.
    pub fn read_vlan_row(&mut self, id: VlanId) -> Result<VlanRow> {
        let offset = id.table_offset();
        let index = id.table_index();
        self.write(
            indirect::CONTROL,
            indirect_control(IndirectOp::Read, IndirectTable::Vlan, offset),
        )?;
        self.write(indirect::ADDRESS, indirect_address(offset))?;
        let high = self.read(data_high_register(index))?;
        let low = self.read(data_low_register(index))?;
        Ok(VlanRow::decode(high, low))
    }
}

impl From<&VlanProgram> for VlanRow {
    fn from(program: &VlanProgram) -> Self {
        VlanRow::decode(program.high, program.low)
    }
}

/// Encode `entry` if its slot is active; inactive slots produce nothing.
pub fn encode_active(entry: &VlanEntry, slot: usize) -> Result<Option<VlanProgram>> {
    if !entry.active {
        return Ok(None);
    }
    encode_vlan(entry, slot).map(Some)
}
