//! Register transport over the switch IC's serial management bus.
//!
//! Every register access is one complete transaction: select the device,
//! shift out an opcode and the shifted address (plus the value for writes),
//! shift in one byte for reads, deselect. Writes are always followed by a
//! settling delay and a read-back of the same register.
//!
//! The bus is assumed reliable. A failed transaction is reported as
//! [`Error::Transport`] and never retried.

use core::fmt;

use crate::registers::opcode;
use crate::{Error, Result};

/// Time the IC needs between the end of a write and the confirming read.
pub const WRITE_SETTLE_US: u32 = 2_500;

/// Chip-select framed byte transport to the switch IC.
///
/// Implemented by the board support code on top of its SPI (or USART-in-SPI)
/// peripheral. Only one transaction is in flight at a time, guaranteed by the
/// `&mut self` receivers.
pub trait SerialBus {
    /// Error reported by the underlying peripheral.
    type Error: fmt::Debug;

    /// Assert chip select.
    fn select(&mut self) -> core::result::Result<(), Self::Error>;

    /// Shift out `bytes`.
    fn write_packet(&mut self, bytes: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Shift in `buf.len()` bytes.
    fn read_packet(&mut self, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;

    /// Release chip select.
    fn deselect(&mut self) -> core::result::Result<(), Self::Error>;
}

impl<T: SerialBus + ?Sized> SerialBus for &mut T {
    type Error = T::Error;

    fn select(&mut self) -> core::result::Result<(), Self::Error> {
        (**self).select()
    }

    fn write_packet(&mut self, bytes: &[u8]) -> core::result::Result<(), Self::Error> {
        (**self).write_packet(bytes)
    }

    fn read_packet(&mut self, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        (**self).read_packet(buf)
    }

    fn deselect(&mut self) -> core::result::Result<(), Self::Error> {
        (**self).deselect()
    }
}

/// Blocking delay source.
pub trait Delay {
    /// Wait at least `us` microseconds.
    fn delay_us(&mut self, us: u32);
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Calibrated busy-wait for targets without a timer.
///
/// Assumes roughly three CPU cycles per loop iteration, so the wait scales
/// with the core clock passed to [`SpinDelay::new`].
#[derive(Debug, Clone, Copy)]
pub struct SpinDelay {
    cpu_hz: u32,
}

impl SpinDelay {
    /// Create a spin delay for a core running at `cpu_hz`.
    pub const fn new(cpu_hz: u32) -> Self {
        Self { cpu_hz }
    }

    /// Loop iterations needed to wait `us` microseconds.
    pub fn iterations(&self, us: u32) -> u64 {
        (u64::from(self.cpu_hz) * u64::from(us)).div_ceil(3_000_000)
    }
}

impl Delay for SpinDelay {
    fn delay_us(&mut self, us: u32) {
        for _ in 0..self.iterations(us) {
            core::hint::spin_loop();
        }
    }
}

/// Delay backed by [`std::thread::sleep`].
///
/// Only available with the `std` feature.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(u64::from(us)));
    }
}

/// Single-owner handle for register reads and writes.
///
/// No register state is cached: every call reaches the hardware.
pub struct RegisterTransport<B, D> {
    bus: B,
    delay: D,
}

impl<B: SerialBus, D: Delay> RegisterTransport<B, D> {
    /// Create a transport from a bus and a delay source.
    pub fn new(bus: B, delay: D) -> Self {
        Self { bus, delay }
    }

    /// Read one register.
    pub fn read(&mut self, addr: u8) -> Result<u8> {
        let cmd = [opcode::read(addr), addr << 1];
        let mut response = [0u8; 1];
        self.transaction(addr, &cmd, &mut response)?;
        log::trace!("read reg {addr} = {:#04x}", response[0]);
        Ok(response[0])
    }

    /// Write one register and return its value read back after settling.
    pub fn write(&mut self, addr: u8, value: u8) -> Result<u8> {
        let cmd = [opcode::write(addr), addr << 1, value];
        log::trace!("write reg {addr} <- {value:#04x}");
        self.transaction(addr, &cmd, &mut [])?;
        self.delay.delay_us(WRITE_SETTLE_US);
        self.read(addr)
    }

    /// Block for `us` microseconds using the transport's delay source.
    pub fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    /// Get a reference to the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a mutable reference to the underlying bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consume the transport and return the bus and delay source.
    pub fn into_parts(self) -> (B, D) {
        (self.bus, self.delay)
    }

    fn transaction(&mut self, addr: u8, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        self.bus.select().map_err(|e| transport_fault(addr, e))?;

        let transfer = self.bus.write_packet(tx).and_then(|()| {
            if rx.is_empty() {
                Ok(())
            } else {
                self.bus.read_packet(rx)
            }
        });
        // Chip select is released even when the transfer failed
        let release = self.bus.deselect();

        transfer.and(release).map_err(|e| transport_fault(addr, e))
    }
}

fn transport_fault<E: fmt::Debug>(addr: u8, err: E) -> Error {
    log::error!("serial bus fault at register {addr}: {err:?}");
    Error::Transport { addr }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LoopbackBus {
        regs: [u8; 256],
        pending: Option<u8>,
        packets: usize,
    }

    impl LoopbackBus {
        fn new() -> Self {
            Self {
                regs: [0; 256],
                pending: None,
                packets: 0,
            }
        }
    }

    impl SerialBus for LoopbackBus {
        type Error = ();

        fn select(&mut self) -> core::result::Result<(), ()> {
            Ok(())
        }

        fn write_packet(&mut self, bytes: &[u8]) -> core::result::Result<(), ()> {
            self.packets += 1;
            let addr = (bytes[1] >> 1) | ((bytes[0] & 0x01) << 7);
            match bytes.len() {
                2 => self.pending = Some(addr),
                3 => self.regs[addr as usize] = bytes[2],
                _ => return Err(()),
            }
            Ok(())
        }

        fn read_packet(&mut self, buf: &mut [u8]) -> core::result::Result<(), ()> {
            let addr = self.pending.take().ok_or(())?;
            buf[0] = self.regs[addr as usize];
            Ok(())
        }

        fn deselect(&mut self) -> core::result::Result<(), ()> {
            Ok(())
        }
    }

    struct NoDelay;

    impl Delay for NoDelay {
        fn delay_us(&mut self, _us: u32) {}
    }

    #[test]
    fn test_write_reads_back() {
        let mut transport = RegisterTransport::new(LoopbackBus::new(), NoDelay);
        assert_eq!(transport.write(200, 0x5A).unwrap(), 0x5A);
        assert_eq!(transport.read(200).unwrap(), 0x5A);
        // write + read-back + read
        assert_eq!(transport.bus().packets, 3);
    }

    #[test]
    fn test_spin_delay_iterations() {
        let delay = SpinDelay::new(120_000_000);
        assert_eq!(delay.iterations(1), 40);
        assert_eq!(delay.iterations(400_000), 16_000_000);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_std_delay_sleeps() {
        let start = std::time::Instant::now();
        StdDelay.delay_us(2_000);
        assert!(start.elapsed() >= std::time::Duration::from_micros(2_000));
    }

    #[test]
    fn test_spin_delay_slow_clock() {
        // Partial iterations round up
        let delay = SpinDelay::new(2_000_000);
        assert_eq!(delay.iterations(1), 1);
        assert_eq!(delay.iterations(WRITE_SETTLE_US), 1_667);
        assert_eq!(delay.iterations(400_000), 266_667);

        let delay = SpinDelay::new(4_000_000);
        assert_eq!(delay.iterations(400_000), 533_334);
        assert_eq!(SpinDelay::new(1).iterations(0), 0);
    }
}
