//! Error types for switch control operations.
//!
//! This module defines the [`Error`] enum which represents every failure that
//! can surface while talking to the switch IC, bringing it up, moving frames
//! through the tail-tag gateway, or editing the logical configuration.
//!
//! Transport and link faults are terminal: nothing in this crate retries a
//! register transaction or a PHY negotiation. Callers are expected to treat
//! them as a boot failure.
//!
//! # Example
//!
//! ```ignore
//! use ksz_switch_rs::{Error, SwitchDevice};
//!
//! match device.bring_up(&config, &mut mac, &mut phy) {
//!     Ok(report) => log::info!("{} VLANs programmed", report.vlans_programmed),
//!     Err(Error::LinkFault { stage, cause }) => {
//!         log::error!("PHY failed during {stage:?}: {cause}");
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```

use core::fmt;

use crate::bringup::BringUpStage;
use crate::types::{Port, VlanId};

/// Failures reported by a [`Phy`](crate::Phy) implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhyError {
    /// The PHY did not answer on its management interface.
    NotResponding,
    /// Auto-negotiation did not complete.
    NegotiationFailed,
    /// The PHY did not reach the requested state in time.
    Timeout,
}

impl fmt::Display for PhyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhyError::NotResponding => write!(f, "PHY not responding"),
            PhyError::NegotiationFailed => write!(f, "link negotiation failed"),
            PhyError::Timeout => write!(f, "PHY timed out"),
        }
    }
}

/// Rejections raised while editing a [`DeviceConfig`](crate::DeviceConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Every VLAN slot is already active.
    NoFreeSlot,
    /// No active VLAN carries the given id.
    UnknownVlan(VlanId),
    /// Another active VLAN already uses this id.
    DuplicateVlanId(VlanId),
    /// The port is already a member of the given VLAN.
    PortAlreadyAssigned {
        /// Port being assigned
        port: Port,
        /// VLAN currently holding the port
        vlan: VlanId,
    },
    /// The port is not a member of any VLAN.
    PortNotAssigned(Port),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoFreeSlot => write!(f, "No more VLANs available"),
            ConfigError::UnknownVlan(id) => write!(f, "Unknown VLAN ID {id}"),
            ConfigError::DuplicateVlanId(id) => write!(f, "VLAN {id} already exists"),
            ConfigError::PortAlreadyAssigned { port, vlan } => {
                write!(f, "Port {} is already assigned to VLAN {vlan}", port.number())
            }
            ConfigError::PortNotAssigned(port) => {
                write!(f, "Port {} is not assigned to a VLAN", port.number())
            }
        }
    }
}

/// Errors that can occur during switch control operations.
#[derive(Debug)]
pub enum Error {
    /// A serial bus transaction with the switch IC could not complete.
    ///
    /// The bus is assumed reliable, so this indicates a hardware fault.
    Transport {
        /// Register being accessed when the fault occurred
        addr: u8,
    },

    /// The PHY failed to come up during bring-up.
    ///
    /// The switch is left non-functional; bring-up does not retry.
    LinkFault {
        /// Stage that was executing when the fault occurred
        stage: BringUpStage,
        /// Underlying PHY failure
        cause: PhyError,
    },

    /// The frame medium (MAC driver) reported a failure.
    Medium,

    /// A port number outside 1..=4.
    InvalidPort(u8),

    /// A VLAN id outside 1..=4095.
    InvalidVlanId(u16),

    /// An ingress tail tag that does not decode to a front-panel port.
    InvalidTailTag(u8),

    /// A frame longer than the hardware maximum was offered for transmission.
    ///
    /// Only returned by [`FrameGateway::send_strict`](crate::FrameGateway::send_strict).
    FrameTooLarge {
        /// Length of the rejected frame
        len: usize,
        /// Largest frame the medium accepts
        max: usize,
    },

    /// A configuration edit was rejected.
    Config(ConfigError),

    /// Configuration (de)serialization failed.
    ///
    /// Only available with the `std` feature.
    #[cfg(feature = "std")]
    Serialization(String),

    /// An I/O error occurred while persisting configuration.
    ///
    /// Only available with the `std` feature.
    #[cfg(feature = "std")]
    IOError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport { addr } => {
                write!(f, "Serial bus transaction failed at register {addr}")
            }
            Error::LinkFault { stage, cause } => {
                write!(f, "Link fault during {stage:?}: {cause}")
            }
            Error::Medium => write!(f, "Frame medium failure"),
            Error::InvalidPort(port) => {
                write!(f, "Invalid port number {port}, ports are numbered 1 - 4")
            }
            Error::InvalidVlanId(id) => write!(f, "Invalid VLAN ID {id}"),
            Error::InvalidTailTag(raw) => write!(f, "Invalid tail tag {raw:#04x}"),
            Error::FrameTooLarge { len, max } => {
                write!(f, "Frame of {len} bytes exceeds maximum of {max}")
            }
            Error::Config(e) => write!(f, "{e}"),
            #[cfg(feature = "std")]
            Error::Serialization(s) => write!(f, "Configuration serialization error: {s}"),
            #[cfg(feature = "std")]
            Error::IOError(e) => write!(f, "I/O error: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

/// A specialized Result type for switch operations.
///
/// This is defined as `core::result::Result<T, Error>` for convenience.
pub type Result<T> = core::result::Result<T, Error>;
