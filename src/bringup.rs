//! Device bring-up sequence.
//!
//! Bring-up takes the IC from reset to forwarding in one linear pass:
//!
//! ```text
//! Reset -> PhyWait -> ClockEnable -> ModeRegisters -> LinkUp
//!       -> VlanProgram (x active slots) -> Enable8021q -> TrapRegisters -> Ready
//! ```
//!
//! Each pass reprograms everything from the configuration snapshot it is
//! given; nothing is patched incrementally, so running it twice with the same
//! configuration issues the same register writes twice.

use heapless::Vec;

use crate::config::{DeviceConfig, VlanKind};
use crate::error::PhyError;
use crate::registers::{global, port, port_register};
use crate::transport::{Delay, RegisterTransport, SerialBus};
use crate::types::{MAX_VLANS, MacAddress, Port, VlanId};
use crate::vlan::{VlanProgram, encode_active};
use crate::{Error, Result};

/// Time the PHY needs after power-up before it can be configured.
pub const PHY_SETTLE_MS: u32 = 400;

/// Stages of the bring-up sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BringUpStage {
    /// Nothing done yet.
    Reset,
    /// Waiting for the PHY to settle.
    PhyWait,
    /// Enabling the MAC peripheral clock.
    ClockEnable,
    /// Writing global mode registers.
    ModeRegisters,
    /// Configuring the MAC and bringing up the PHY link.
    LinkUp,
    /// Programming VLAN slots.
    VlanProgram,
    /// Enabling 802.1Q.
    Enable8021q,
    /// Trapping authentication frames to the CPU port.
    TrapRegisters,
    /// Switch is forwarding.
    Ready,
}

/// MAC options applied during bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacSettings {
    /// Receive every frame regardless of destination address.
    pub copy_all_frames: bool,
    /// Drop broadcast frames.
    pub no_broadcast: bool,
    /// Station address.
    pub mac: MacAddress,
}

impl MacSettings {
    /// Promiscuous settings for the CPU-side MAC of a switch.
    pub const fn promiscuous(mac: MacAddress) -> Self {
        Self {
            copy_all_frames: true,
            no_broadcast: false,
            mac,
        }
    }
}

/// CPU-side Ethernet MAC facing the switch IC.
pub trait MacController {
    /// Enable the peripheral clock.
    fn enable_clock(&mut self);

    /// Apply MAC options and enable the receive path.
    fn configure(&mut self, settings: &MacSettings);
}

/// PHY between the CPU MAC and the switch IC.
pub trait Phy {
    /// Initialise the PHY.
    fn init(&mut self) -> core::result::Result<(), PhyError>;

    /// Bring the link up.
    fn set_link(&mut self) -> core::result::Result<(), PhyError>;
}

/// Summary of a completed bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BringUpReport {
    /// Number of VLAN slots programmed.
    pub vlans_programmed: usize,
    /// VID written as the CPU port default, from the last Default VLAN.
    pub cpu_default_vid: Option<VlanId>,
}

/// Tracks the current stage so failures and logs can name it.
struct Sequencer {
    stage: BringUpStage,
}

impl Sequencer {
    fn enter(&mut self, stage: BringUpStage) {
        debug_assert!(stage > self.stage);
        log::debug!("bring-up: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    fn link_fault(&self, cause: PhyError) -> Error {
        log::error!("bring-up aborted in {:?}: {}", self.stage, cause);
        Error::LinkFault {
            stage: self.stage,
            cause,
        }
    }
}

/// Run the full bring-up sequence against the IC.
///
/// Active slots are encoded first; an invalid VLAN id is reported before any
/// register is written. A PHY failure aborts with [`Error::LinkFault`] and
/// leaves the switch non-functional; there is no retry.
pub fn bring_up<B, D, M, P>(
    transport: &mut RegisterTransport<B, D>,
    mac: &mut M,
    phy: &mut P,
    config: &DeviceConfig,
) -> Result<BringUpReport>
where
    B: SerialBus,
    D: Delay,
    M: MacController,
    P: Phy,
{
    let mut seq = Sequencer {
        stage: BringUpStage::Reset,
    };

    // Nothing reaches the IC unless every active slot encodes
    let mut programs: Vec<(VlanProgram, VlanKind), MAX_VLANS> = Vec::new();
    for (slot, entry) in config.vlans.iter().enumerate() {
        if let Some(program) = encode_active(entry, slot)? {
            // One program per slot, so capacity is never exceeded
            let _ = programs.push((program, entry.kind));
        }
    }

    seq.enter(BringUpStage::PhyWait);
    transport.delay_us(PHY_SETTLE_MS * 1_000);

    seq.enter(BringUpStage::ClockEnable);
    mac.enable_clock();

    seq.enter(BringUpStage::ModeRegisters);
    transport.write(global::CPU_INTERFACE, global::CPU_INTERFACE_MII)?;
    transport.write(global::CONTROL_10, global::TAIL_TAG_ON)?;
    transport.write(global::CONTROL_2, global::CONTROL_2_NO_SIZE_CHECK)?;
    transport.write(global::CONTROL_3, global::VLAN_DISABLED)?;

    seq.enter(BringUpStage::LinkUp);
    mac.configure(&MacSettings::promiscuous(config.mac));
    phy.init().map_err(|e| seq.link_fault(e))?;
    phy.set_link().map_err(|e| seq.link_fault(e))?;

    seq.enter(BringUpStage::VlanProgram);
    let mut report = BringUpReport {
        vlans_programmed: 0,
        cpu_default_vid: None,
    };
    for (program, kind) in &programs {
        transport.program_vlan(program)?;
        if *kind == VlanKind::Default {
            report.cpu_default_vid = Some(program.id);
        }
        report.vlans_programmed += 1;
    }

    seq.enter(BringUpStage::Enable8021q);
    transport.write(global::CONTROL_3, global::VLAN_ENABLED)?;

    seq.enter(BringUpStage::TrapRegisters);
    for p in Port::ALL {
        transport.write(port_register(p, port::AUTH_CONTROL), port::AUTH_TRAP_TO_CPU)?;
    }

    seq.enter(BringUpStage::Ready);
    log::info!(
        "switch ready: {} VLANs programmed, CPU default VID {:?}",
        report.vlans_programmed,
        report.cpu_default_vid.map(VlanId::get)
    );
    Ok(report)
}
