//! Shared value types for switch configuration and frame handling.
//!
//! These types are plain `Copy` values without heap allocation, making them
//! usable in both std and no_std environments.

use core::fmt;

use crate::{Error, Result};

/// Number of front-panel ports on the switch.
pub const TOTAL_PORTS: usize = 4;

/// Number of VLAN slots held by a [`DeviceConfig`](crate::DeviceConfig).
pub const MAX_VLANS: usize = 4;

/// A physical front-panel port, numbered 1 through [`TOTAL_PORTS`].
///
/// Ports are 1-indexed everywhere outside this crate. [`Port::index`] gives the
/// 0-based position used for port maps and register arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Port(u8);

impl Port {
    /// Port 1.
    pub const P1: Port = Port(1);
    /// Port 2.
    pub const P2: Port = Port(2);
    /// Port 3.
    pub const P3: Port = Port(3);
    /// Port 4.
    pub const P4: Port = Port(4);

    /// All ports in ascending order.
    pub const ALL: [Port; TOTAL_PORTS] = [Port::P1, Port::P2, Port::P3, Port::P4];

    /// Create a port from its 1-based number.
    pub fn new(number: u8) -> Result<Self> {
        if (1..=TOTAL_PORTS as u8).contains(&number) {
            Ok(Self(number))
        } else {
            Err(Error::InvalidPort(number))
        }
    }

    /// The 1-based port number.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// The 0-based port index.
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u8> for Port {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self> {
        Port::new(number)
    }
}

impl From<Port> for u8 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port {}", self.0)
    }
}

/// An IEEE 802.1Q VLAN identifier in the range 1..=4095.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
pub struct VlanId(u16);

impl VlanId {
    /// Highest assignable VLAN id.
    pub const MAX: u16 = 4095;

    /// Create a VLAN id, rejecting 0 and values above [`VlanId::MAX`].
    pub fn new(id: u16) -> Result<Self> {
        if (1..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(Error::InvalidVlanId(id))
        }
    }

    /// The numeric id.
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Row of the IC's VLAN table holding this id (four ids per row).
    pub const fn table_offset(self) -> u16 {
        self.0 / 4
    }

    /// Sub-entry within the table row.
    pub const fn table_index(self) -> u8 {
        (self.0 % 4) as u8
    }

    /// Low byte of the id, as held by the IC's 8-bit default-VID registers.
    pub const fn low_byte(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl TryFrom<u16> for VlanId {
    type Error = Error;

    fn try_from(id: u16) -> Result<Self> {
        VlanId::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(id: VlanId) -> Self {
        id.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// MAC address representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Create a MAC address from bytes.
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Create a zero/unspecified MAC address.
    pub const fn zero() -> Self {
        Self([0x00; 6])
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_bounds() {
        assert!(Port::new(0).is_err());
        assert_eq!(Port::new(1).unwrap(), Port::P1);
        assert_eq!(Port::new(4).unwrap().index(), 3);
        assert!(matches!(Port::new(5), Err(Error::InvalidPort(5))));
    }

    #[test]
    fn test_vlan_id_bounds() {
        assert!(VlanId::new(0).is_err());
        assert!(VlanId::new(1).is_ok());
        assert!(VlanId::new(4095).is_ok());
        assert!(matches!(VlanId::new(4096), Err(Error::InvalidVlanId(4096))));
    }

    #[test]
    fn test_vlan_table_position() {
        let id = VlanId::new(100).unwrap();
        assert_eq!(id.table_offset(), 25);
        assert_eq!(id.table_index(), 0);

        let id = VlanId::new(5).unwrap();
        assert_eq!(id.table_offset(), 1);
        assert_eq!(id.table_index(), 1);

        let id = VlanId::new(0x123).unwrap();
        assert_eq!(id.low_byte(), 0x23);
    }

    #[test]
    fn test_mac_display() {
        use core::fmt::Write;

        let mac = MacAddress::new([0x70, 0xb3, 0xd5, 0x6c, 0x00, 0x01]);
        let mut text: heapless::String<17> = heapless::String::new();
        write!(text, "{mac}").unwrap();
        assert_eq!(text.as_str(), "70:b3:d5:6c:00:01");
    }
}
