//! The switch IC as seen by the rest of the firmware.

use crate::bringup::{BringUpReport, MacController, Phy, bring_up};
use crate::config::DeviceConfig;
use crate::stats::{CounterKind, PortCounters};
use crate::transport::{Delay, RegisterTransport, SerialBus};
use crate::types::{Port, VlanId};
use crate::vlan::VlanRow;
use crate::Result;

/// Owns the register transport and exposes bring-up and the diagnostic
/// surface used by the command shell.
pub struct SwitchDevice<B, D> {
    transport: RegisterTransport<B, D>,
}

impl<B: SerialBus, D: Delay> SwitchDevice<B, D> {
    /// Create a device on `bus`, using `delay` for settle times.
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            transport: RegisterTransport::new(bus, delay),
        }
    }

    /// Program the switch from `config`. See [`bring_up`].
    pub fn bring_up<M: MacController, P: Phy>(
        &mut self,
        config: &DeviceConfig,
        mac: &mut M,
        phy: &mut P,
    ) -> Result<BringUpReport> {
        bring_up(&mut self.transport, mac, phy, config)
    }

    /// Read one register.
    pub fn read_register(&mut self, addr: u8) -> Result<u8> {
        self.transport.read(addr)
    }

    /// Write one register, returning the value read back.
    pub fn write_register(&mut self, addr: u8, value: u8) -> Result<u8> {
        self.transport.write(addr, value)
    }

    /// Read one statistics counter.
    pub fn read_counter(&mut self, kind: CounterKind, port: Port) -> Result<u32> {
        self.transport.read_counter(kind, port)
    }

    /// Read every statistics counter of `port`.
    pub fn read_port_counters(&mut self, port: Port) -> Result<PortCounters> {
        self.transport.read_port_counters(port)
    }

    /// Read back the VLAN table entry for `id`.
    pub fn read_vlan_row(&mut self, id: VlanId) -> Result<VlanRow> {
        self.transport.read_vlan_row(id)
    }

    /// Get a reference to the register transport.
    pub fn transport(&self) -> &RegisterTransport<B, D> {
        &self.transport
    }

    /// Get a mutable reference to the register transport.
    pub fn transport_mut(&mut self) -> &mut RegisterTransport<B, D> {
        &mut self.transport
    }

    /// Consume the device and return the bus and delay source.
    pub fn into_parts(self) -> (B, D) {
        self.transport.into_parts()
    }
}
