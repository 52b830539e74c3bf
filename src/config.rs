//! Logical switch configuration.
//!
//! [`DeviceConfig`] is the value the command shell edits and persists, and the
//! snapshot [`bring_up`](crate::bring_up) programs into the IC. The editing
//! methods here enforce the rules the shell relies on (free slots, one VLAN
//! per port); bring-up itself never validates and programs whatever it is
//! given.
//!
//! # Example
//!
//! ```ignore
//! use ksz_switch_rs::{DeviceConfig, MacAddress, Port, VlanId, VlanKind};
//!
//! let mut config = DeviceConfig::factory_default(MacAddress::new([0x70, 0xb3, 0xd5, 0x6c, 0, 1]));
//! config.remove_vlan_port(Port::P4)?;
//!
//! let mgmt = VlanId::new(200)?;
//! config.add_vlan(mgmt, "mgmt")?;
//! config.add_vlan_port(mgmt, Port::P4)?;
//! config.set_vlan_tagging(mgmt, true)?;
//!
//! config.save_to_file("switch.json")?;
//! ```

use heapless::String;

use crate::error::ConfigError;
use crate::types::{MAX_VLANS, MacAddress, Port, TOTAL_PORTS, VlanId};

/// Longest VLAN or device name kept, in bytes.
pub const MAX_NAME_LEN: usize = 15;

/// Name storage for VLANs and the device.
pub type Name = String<MAX_NAME_LEN>;

/// Role of a VLAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VlanKind {
    /// Ordinary VLAN.
    #[default]
    Unassigned,
    /// VLAN whose id becomes the CPU port's default VID.
    Default,
}

/// Port membership bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortMap([bool; TOTAL_PORTS]);

impl PortMap {
    /// Every port is a member.
    pub const fn all() -> Self {
        Self([true; TOTAL_PORTS])
    }

    /// Build a map from a list of member ports.
    pub fn from_ports(ports: &[Port]) -> Self {
        let mut map = Self::default();
        for &port in ports {
            map.insert(port);
        }
        map
    }

    /// Whether `port` is a member.
    pub fn contains(&self, port: Port) -> bool {
        self.0[port.index()]
    }

    /// Add `port`.
    pub fn insert(&mut self, port: Port) {
        self.0[port.index()] = true;
    }

    /// Remove `port`.
    pub fn remove(&mut self, port: Port) {
        self.0[port.index()] = false;
    }

    /// Member ports in ascending order.
    pub fn ports(&self) -> impl Iterator<Item = Port> + '_ {
        Port::ALL.into_iter().filter(|&p| self.contains(p))
    }

    /// Whether no port is a member.
    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&m| m)
    }
}

impl From<[bool; TOTAL_PORTS]> for PortMap {
    fn from(members: [bool; TOTAL_PORTS]) -> Self {
        Self(members)
    }
}

/// One VLAN slot.
///
/// `id` is kept raw because an inactive slot carries 0; bring-up validates it
/// for active slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VlanEntry {
    /// VLAN id, 1..=4095 when active.
    pub id: u16,
    /// Display label, not interpreted by the switch.
    pub name: Name,
    /// Inactive slots are skipped by bring-up.
    pub active: bool,
    /// VLAN role.
    pub kind: VlanKind,
    /// Egress tagging for every member port.
    pub tagged: bool,
    /// Member ports.
    pub portmap: PortMap,
}

impl VlanEntry {
    /// Create an active, untagged, memberless VLAN.
    pub fn new(id: VlanId, name: &str) -> Self {
        Self {
            id: id.get(),
            name: truncate_name(name),
            active: true,
            ..Self::default()
        }
    }

    /// Set the member ports.
    pub fn with_ports(mut self, ports: &[Port]) -> Self {
        self.portmap = PortMap::from_ports(ports);
        self
    }

    /// Set the VLAN role.
    pub fn with_kind(mut self, kind: VlanKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set egress tagging.
    pub fn with_tagged(mut self, tagged: bool) -> Self {
        self.tagged = tagged;
        self
    }

    /// Mark the slot inactive without clearing it.
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Validated VLAN id.
    pub fn vlan_id(&self) -> crate::Result<VlanId> {
        VlanId::new(self.id)
    }
}

/// Everything bring-up needs to program the switch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Device name.
    pub name: Name,
    /// Station MAC address of the CPU port.
    pub mac: MacAddress,
    /// IPv4 address of the management interface.
    pub ip_address: [u8; 4],
    /// IPv4 netmask.
    pub netmask: [u8; 4],
    /// IPv4 default gateway.
    pub gateway: [u8; 4],
    /// VLAN slots, programmed in this order.
    pub vlans: [VlanEntry; MAX_VLANS],
}

impl DeviceConfig {
    /// Out-of-the-box configuration: VLAN 100 "Default" on every port,
    /// untagged, management address 10.0.1.99/24.
    pub fn factory_default(mac: MacAddress) -> Self {
        let mut config = Self {
            name: truncate_name("Switch"),
            mac,
            ip_address: [10, 0, 1, 99],
            netmask: [255, 255, 255, 0],
            gateway: [10, 0, 1, 1],
            vlans: Default::default(),
        };
        config.vlans[0] = VlanEntry {
            id: 100,
            name: truncate_name("Default"),
            active: true,
            kind: VlanKind::Default,
            tagged: false,
            portmap: PortMap::all(),
        };
        config
    }

    /// Set the device name, truncated to [`MAX_NAME_LEN`] bytes.
    pub fn set_name(&mut self, name: &str) {
        self.name = truncate_name(name);
    }

    /// Active slots with their slot index.
    pub fn active_vlans(&self) -> impl Iterator<Item = (usize, &VlanEntry)> {
        self.vlans.iter().enumerate().filter(|(_, v)| v.active)
    }

    /// First active VLAN of kind [`VlanKind::Default`].
    pub fn default_vlan(&self) -> Option<&VlanEntry> {
        self.active_vlans()
            .map(|(_, v)| v)
            .find(|v| v.kind == VlanKind::Default)
    }

    /// Active VLAN holding `port`, if any.
    pub fn vlan_of_port(&self, port: Port) -> Option<&VlanEntry> {
        self.active_vlans()
            .map(|(_, v)| v)
            .find(|v| v.portmap.contains(port))
    }

    /// Activate the first free slot as VLAN `id`. Returns the slot index.
    pub fn add_vlan(&mut self, id: VlanId, name: &str) -> Result<usize, ConfigError> {
        if self.find_active(id).is_some() {
            return Err(ConfigError::DuplicateVlanId(id));
        }
        let slot = self
            .vlans
            .iter()
            .position(|v| !v.active)
            .ok_or(ConfigError::NoFreeSlot)?;
        self.vlans[slot] = VlanEntry::new(id, name);
        log::debug!("added VLAN {id} in slot {slot}");
        Ok(slot)
    }

    /// Clear the slot holding VLAN `id`.
    pub fn delete_vlan(&mut self, id: VlanId) -> Result<(), ConfigError> {
        let slot = self.find_active(id).ok_or(ConfigError::UnknownVlan(id))?;
        self.vlans[slot] = VlanEntry::default();
        log::debug!("deleted VLAN {id} from slot {slot}");
        Ok(())
    }

    /// Set the role of VLAN `id`.
    pub fn set_vlan_kind(&mut self, id: VlanId, kind: VlanKind) -> Result<(), ConfigError> {
        self.entry_mut(id)?.kind = kind;
        Ok(())
    }

    /// Set egress tagging of VLAN `id`.
    pub fn set_vlan_tagging(&mut self, id: VlanId, tagged: bool) -> Result<(), ConfigError> {
        self.entry_mut(id)?.tagged = tagged;
        Ok(())
    }

    /// Add `port` to VLAN `id`.
    ///
    /// A port belongs to at most one VLAN; assigning a port that is already a
    /// member anywhere is rejected.
    pub fn add_vlan_port(&mut self, id: VlanId, port: Port) -> Result<(), ConfigError> {
        if let Some(holder) = self.vlan_of_port(port) {
            return Err(ConfigError::PortAlreadyAssigned {
                port,
                vlan: VlanId::new(holder.id).unwrap_or(id),
            });
        }
        self.entry_mut(id)?.portmap.insert(port);
        Ok(())
    }

    /// Remove `port` from whichever VLAN holds it.
    pub fn remove_vlan_port(&mut self, port: Port) -> Result<(), ConfigError> {
        let entry = self
            .vlans
            .iter_mut()
            .find(|v| v.active && v.portmap.contains(port))
            .ok_or(ConfigError::PortNotAssigned(port))?;
        entry.portmap.remove(port);
        Ok(())
    }

    /// Check that no port is a member of two active VLANs and that no two
    /// active VLANs share an id.
    ///
    /// Bring-up does not call this; a configuration that fails it is still
    /// programmed, with the later slot winning each contested port's tag mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (slot, entry) in self.active_vlans() {
            for (_, other) in self.active_vlans().filter(|(s, _)| *s > slot) {
                if other.id == entry.id {
                    if let Ok(id) = VlanId::new(entry.id) {
                        return Err(ConfigError::DuplicateVlanId(id));
                    }
                }
                if let Some(port) = entry.portmap.ports().find(|&p| other.portmap.contains(p)) {
                    if let Ok(vlan) = VlanId::new(entry.id) {
                        return Err(ConfigError::PortAlreadyAssigned { port, vlan });
                    }
                }
            }
        }
        Ok(())
    }

    fn find_active(&self, id: VlanId) -> Option<usize> {
        self.vlans
            .iter()
            .position(|v| v.active && v.id == id.get())
    }

    fn entry_mut(&mut self, id: VlanId) -> Result<&mut VlanEntry, ConfigError> {
        let slot = self.find_active(id).ok_or(ConfigError::UnknownVlan(id))?;
        Ok(&mut self.vlans[slot])
    }
}

#[cfg(feature = "std")]
impl DeviceConfig {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<std::string::String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            crate::Error::Serialization(format!("JSON serialization failed: {}", e))
        })
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            crate::Error::Serialization(format!("JSON deserialization failed: {}", e))
        })
    }

    /// Save the configuration as a JSON file.
    ///
    /// Requires the `std` feature.
    pub fn save_to_file(&self, path: &str) -> crate::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(crate::Error::IOError)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    ///
    /// Requires the `std` feature.
    pub fn load_from_file(path: &str) -> crate::Result<Self> {
        let json = std::fs::read_to_string(path).map_err(crate::Error::IOError)?;
        Self::from_json(&json)
    }
}

/// Copy `name` into fixed storage, cutting at a character boundary.
fn truncate_name(name: &str) -> Name {
    let mut out = Name::new();
    for c in name.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid(id: u16) -> VlanId {
        VlanId::new(id).unwrap()
    }

    #[test]
    fn test_factory_default() {
        let config = DeviceConfig::factory_default(MacAddress::zero());
        let vlan = &config.vlans[0];
        assert_eq!(vlan.id, 100);
        assert_eq!(vlan.name.as_str(), "Default");
        assert!(vlan.active);
        assert_eq!(vlan.kind, VlanKind::Default);
        assert!(!vlan.tagged);
        assert_eq!(vlan.portmap, PortMap::all());
        assert!(config.vlans[1..].iter().all(|v| !v.active));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_name_truncation() {
        let mut config = DeviceConfig::default();
        config.set_name("a-very-long-device-name");
        assert_eq!(config.name.as_str(), "a-very-long-dev");

        let entry = VlanEntry::new(vid(7), "ünïcödé-vlan-label");
        assert!(entry.name.len() <= MAX_NAME_LEN);
        assert!("ünïcödé-vlan-label".starts_with(entry.name.as_str()));
    }

    #[test]
    fn test_add_vlan_fills_slots() {
        let mut config = DeviceConfig::factory_default(MacAddress::zero());
        assert_eq!(config.add_vlan(vid(10), "a"), Ok(1));
        assert_eq!(config.add_vlan(vid(20), "b"), Ok(2));
        assert_eq!(config.add_vlan(vid(30), "c"), Ok(3));
        assert_eq!(config.add_vlan(vid(40), "d"), Err(ConfigError::NoFreeSlot));
        assert_eq!(
            config.add_vlan(vid(10), "again"),
            Err(ConfigError::DuplicateVlanId(vid(10)))
        );
    }

    #[test]
    fn test_delete_vlan_frees_slot() {
        let mut config = DeviceConfig::factory_default(MacAddress::zero());
        config.delete_vlan(vid(100)).unwrap();
        assert_eq!(config.vlans[0], VlanEntry::default());
        assert_eq!(
            config.delete_vlan(vid(100)),
            Err(ConfigError::UnknownVlan(vid(100)))
        );
        assert_eq!(config.add_vlan(vid(5), "new"), Ok(0));
        assert!(config.vlans[0].portmap.is_empty());
    }

    #[test]
    fn test_port_assignment_is_exclusive() {
        let mut config = DeviceConfig::factory_default(MacAddress::zero());
        config.add_vlan(vid(200), "mgmt").unwrap();

        assert_eq!(
            config.add_vlan_port(vid(200), Port::P4),
            Err(ConfigError::PortAlreadyAssigned {
                port: Port::P4,
                vlan: vid(100)
            })
        );

        config.remove_vlan_port(Port::P4).unwrap();
        assert_eq!(
            config.remove_vlan_port(Port::P4),
            Err(ConfigError::PortNotAssigned(Port::P4))
        );

        config.add_vlan_port(vid(200), Port::P4).unwrap();
        assert_eq!(config.vlan_of_port(Port::P4).map(|v| v.id), Some(200));
        assert_eq!(
            config.add_vlan_port(vid(300), Port::P4),
            Err(ConfigError::PortAlreadyAssigned {
                port: Port::P4,
                vlan: vid(200)
            })
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_overlap() {
        let mut config = DeviceConfig::factory_default(MacAddress::zero());
        config.vlans[1] = VlanEntry::new(vid(200), "overlap").with_ports(&[Port::P2]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::PortAlreadyAssigned {
                port: Port::P2,
                vlan: vid(100)
            })
        );
    }

    #[test]
    fn test_kind_and_tagging() {
        let mut config = DeviceConfig::default();
        config.add_vlan(vid(42), "x").unwrap();
        config.set_vlan_kind(vid(42), VlanKind::Default).unwrap();
        config.set_vlan_tagging(vid(42), true).unwrap();
        let vlan = config.default_vlan().unwrap();
        assert_eq!(vlan.id, 42);
        assert!(vlan.tagged);
        assert_eq!(
            config.set_vlan_tagging(vid(43), true),
            Err(ConfigError::UnknownVlan(vid(43)))
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_json_roundtrip() {
        let mut config = DeviceConfig::factory_default(MacAddress::new([1, 2, 3, 4, 5, 6]));
        config.add_vlan(vid(300), "lab").unwrap();
        let json = config.to_json().unwrap();
        assert_eq!(DeviceConfig::from_json(&json).unwrap(), config);
        assert!(DeviceConfig::from_json("{\"name\": 3}").is_err());
    }
}
