#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # ksz-switch-rs
//!
//! Control plane for a 4-port Ethernet switch IC of the KSZ8795 family,
//! managed over its serial register bus and attached to the CPU through a
//! MII port running in tail tag mode.
//!
//! ## Features
//!
//! - **Register transport**: framed single-byte reads and writes with
//!   read-back verification
//! - **VLAN table codec**: logical VLAN slots encoded into the IC's table rows
//!   and per-port tag/default-VID registers
//! - **Bring-up**: the fixed reset-to-forwarding programming sequence
//! - **Statistics**: per-port MIB counters through the indirect access window
//! - **Frame gateway**: tail tag insertion and removal with short-frame padding
//! - **Configuration**: the logical `DeviceConfig` with JSON persistence
//!
//! ## Quick Start
//!
//! ```ignore
//! use ksz_switch_rs::{DeviceConfig, FrameBuffer, FrameGateway, MacAddress, SpinDelay, SwitchDevice};
//!
//! let config = DeviceConfig::factory_default(MacAddress::new([0x70, 0xb3, 0xd5, 0x6c, 0x00, 0x01]));
//!
//! let mut switch = SwitchDevice::new(spi, SpinDelay::new(120_000_000));
//! switch.bring_up(&config, &mut gmac, &mut phy)?;
//!
//! let mut gateway = FrameGateway::new(gmac);
//! let mut rx = [0u8; ksz_switch_rs::MAX_FRAME_LEN];
//! let mut tx = FrameBuffer::new();
//! if let Some(frame) = gateway.receive(&mut rx)? {
//!     gateway.send(frame.data, frame.port, &mut tx)?;
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`registers`] | Named register addresses and values |
//! | [`transport`] | [`SerialBus`] and [`Delay`] seams, [`RegisterTransport`] |
//! | [`vlan`] | VLAN table encoding and decoding |
//! | [`bringup`] | The bring-up sequence and its MAC/PHY seams |
//! | [`stats`] | Statistics counters |
//! | [`gateway`] | Tail-tagged frame I/O |
//! | [`config`] | Logical device and VLAN configuration |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Serial bus and PHY failures
//! are fatal and never retried; see [`Error`].

pub mod bringup;
pub mod config;
pub mod error;
pub mod gateway;
pub mod registers;
pub mod stats;
pub mod transport;
pub mod vlan;

mod device;
mod types;

// Re-export commonly used types at the crate root
pub use bringup::{
    BringUpReport, BringUpStage, MacController, MacSettings, PHY_SETTLE_MS, Phy, bring_up,
};
pub use config::{DeviceConfig, PortMap, VlanEntry, VlanKind};
pub use device::SwitchDevice;
pub use error::{ConfigError, Error, PhyError, Result};
pub use gateway::{
    FrameBuffer, FrameGateway, FrameMedium, MAX_FRAME_LEN, MIN_PAYLOAD, SendOutcome, TailTag,
    TaggedFrame,
};
pub use stats::{CounterKind, PortCounters};
#[cfg(feature = "std")]
pub use transport::StdDelay;
pub use transport::{Delay, RegisterTransport, SerialBus, SpinDelay};
pub use types::{MAX_VLANS, MacAddress, Port, TOTAL_PORTS, VlanId};
pub use vlan::{RegisterWrite, VlanProgram, VlanRow, encode_vlan};
