//! Tail-tagged frame exchange with the switch IC.
//!
//! In tail tag mode the IC appends one byte to every frame it forwards to the
//! CPU port, naming the ingress port, and expects one trailing byte on every
//! frame from the CPU naming the egress port. [`FrameGateway`] is the only
//! place that byte is added or removed.
//!
//! The two directions are not symmetric. Ingress tags carry the 0-based port
//! index and are decoded by adding one; egress tags are written as the
//! 1-based port number unchanged. This matches the hardware as deployed.
//!
//! Frames shorter than [`MIN_PAYLOAD`] bytes are zero-padded to exactly
//! [`MIN_PAYLOAD`] before the tag, so short frames always leave as
//! `MIN_PAYLOAD + 1` bytes.
//!
//! # Example
//!
//! ```ignore
//! use ksz_switch_rs::{FrameBuffer, FrameGateway, Port};
//!
//! let mut gateway = FrameGateway::new(gmac);
//! let mut rx = [0u8; ksz_switch_rs::MAX_FRAME_LEN];
//! let mut tx = FrameBuffer::new();
//!
//! loop {
//!     if let Some(frame) = gateway.receive(&mut rx)? {
//!         let out_port = if frame.port == Port::P1 { Port::P2 } else { Port::P1 };
//!         gateway.send(frame.data, out_port, &mut tx)?;
//!     }
//! }
//! ```

use core::fmt;

use crate::types::Port;
use crate::{Error, Result};

/// Largest frame the MAC moves, without the tail tag.
pub const MAX_FRAME_LEN: usize = 1536;

/// Frames shorter than this are padded before tagging.
pub const MIN_PAYLOAD: usize = 60;

/// Length of the tail tag.
pub const TAIL_TAG_LEN: usize = 1;

/// Raw frame source and sink: the CPU-side MAC driver.
pub trait FrameMedium {
    /// Error reported by the driver.
    type Error: fmt::Debug;

    /// Copy one pending frame into `buf` and return its length, or 0 when no
    /// frame is waiting. Must not block.
    fn try_receive(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error>;

    /// Queue `frame` for transmission.
    fn transmit(&mut self, frame: &[u8]) -> core::result::Result<(), Self::Error>;
}

impl<T: FrameMedium + ?Sized> FrameMedium for &mut T {
    type Error = T::Error;

    fn try_receive(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error> {
        (**self).try_receive(buf)
    }

    fn transmit(&mut self, frame: &[u8]) -> core::result::Result<(), Self::Error> {
        (**self).transmit(frame)
    }
}

/// Tail tag conversions.
pub struct TailTag;

impl TailTag {
    /// Port named by a tag received from the IC.
    pub fn decode_ingress(raw: u8) -> Result<Port> {
        Port::new(raw.wrapping_add(1)).map_err(|_| Error::InvalidTailTag(raw))
    }

    /// Tag byte addressing `port` on transmit.
    pub const fn encode_egress(port: Port) -> u8 {
        port.number()
    }
}

/// A received frame with its tail tag removed.
#[derive(Debug, PartialEq, Eq)]
pub struct TaggedFrame<'a> {
    /// Frame bytes without the tag.
    pub data: &'a [u8],
    /// Ingress port.
    pub port: Port,
}

/// Scratch space for building outgoing frames.
///
/// Sized for the largest frame plus its tag. Callers own it and lend it to
/// [`FrameGateway::send`], so no transmit state outlives a call.
pub struct FrameBuffer {
    bytes: [u8; MAX_FRAME_LEN + TAIL_TAG_LEN],
}

impl FrameBuffer {
    /// Create a zeroed buffer.
    pub const fn new() -> Self {
        Self {
            bytes: [0; MAX_FRAME_LEN + TAIL_TAG_LEN],
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a send request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame was handed to the medium; carries the on-wire length
    /// including padding and tag.
    Sent(usize),
    /// The frame exceeded [`MAX_FRAME_LEN`] and was discarded.
    Dropped,
}

/// Write `frame` followed by the egress tag for `port` into `out`.
///
/// Returns the number of bytes to transmit, or `None` when the frame exceeds
/// [`MAX_FRAME_LEN`] or `out` is too small.
pub fn tail_tag_frame(frame: &[u8], port: Port, out: &mut [u8]) -> Option<usize> {
    if frame.len() > MAX_FRAME_LEN {
        return None;
    }
    let tag_at = frame.len().max(MIN_PAYLOAD);
    let total = tag_at + TAIL_TAG_LEN;
    let out = out.get_mut(..total)?;

    out[..frame.len()].copy_from_slice(frame);
    out[frame.len()..tag_at].fill(0);
    out[tag_at] = TailTag::encode_egress(port);
    Some(total)
}

/// Moves frames between the medium and the rest of the firmware, adding and
/// stripping tail tags.
pub struct FrameGateway<M> {
    medium: M,
}

impl<M: FrameMedium> FrameGateway<M> {
    /// Wrap a frame medium.
    pub fn new(medium: M) -> Self {
        Self { medium }
    }

    /// Poll the medium once.
    ///
    /// Returns `None` when no frame is pending. The returned frame borrows
    /// `buf` and excludes the tail tag.
    pub fn receive<'a>(&mut self, buf: &'a mut [u8]) -> Result<Option<TaggedFrame<'a>>> {
        let len = self.medium.try_receive(buf).map_err(medium_fault)?;
        let len = len.min(buf.len());
        let Some(&raw) = buf[..len].last() else {
            return Ok(None);
        };
        let port = TailTag::decode_ingress(raw).inspect_err(|_| {
            log::warn!("discarding {len}-byte frame with tail tag {raw:#04x}");
        })?;
        Ok(Some(TaggedFrame {
            data: &buf[..len - TAIL_TAG_LEN],
            port,
        }))
    }

    /// Transmit `frame` out of `port`, building the tagged copy in `scratch`.
    ///
    /// Frames longer than [`MAX_FRAME_LEN`] are dropped without error.
    pub fn send(
        &mut self,
        frame: &[u8],
        port: Port,
        scratch: &mut FrameBuffer,
    ) -> Result<SendOutcome> {
        let Some(total) = tail_tag_frame(frame, port, &mut scratch.bytes) else {
            log::warn!("dropping oversize frame of {} bytes for {port}", frame.len());
            return Ok(SendOutcome::Dropped);
        };
        self.medium
            .transmit(&scratch.bytes[..total])
            .map_err(medium_fault)?;
        Ok(SendOutcome::Sent(total))
    }

    /// Like [`send`](Self::send), but reports oversize frames as
    /// [`Error::FrameTooLarge`].
    pub fn send_strict(
        &mut self,
        frame: &[u8],
        port: Port,
        scratch: &mut FrameBuffer,
    ) -> Result<usize> {
        match self.send(frame, port, scratch)? {
            SendOutcome::Sent(total) => Ok(total),
            SendOutcome::Dropped => Err(Error::FrameTooLarge {
                len: frame.len(),
                max: MAX_FRAME_LEN,
            }),
        }
    }

    /// Get a reference to the underlying medium.
    pub fn medium(&self) -> &M {
        &self.medium
    }
}

fn medium_fault<E: fmt::Debug>(err: E) -> Error {
    log::error!("frame medium fault: {err:?}");
    Error::Medium
}
