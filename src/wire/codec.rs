//! Length-prefix envelopes for the Notecard I2C sub-protocol.
//!
//! Outbound, every chunk carries its own length:
//! ```text
//! ┌────────────┬──────────────────────┐
//! │ Length (1B)│ Chunk bytes (≤ 32 B) │
//! └────────────┴──────────────────────┘
//! ```
//!
//! Inbound is a two-step poll. The host first writes a control frame
//! asking for `count` bytes, then reads `count + 2` bytes back:
//! ```text
//! control write:  [0x00][count]
//! data read:      [available][count echo][count payload bytes]
//! ```
//! `available` is what the peripheral still has buffered after this read.

use crate::error::TransportError;
use crate::wire::chunked::MAX_CHUNK_SIZE;

/// Largest `available` value a well-behaved peripheral reports
/// (255 minus the two header bytes).
pub const MAX_AVAILABLE: u8 = 255 - 2;

/// Header bytes in front of every data-phase read.
pub const POLL_HEADER_SIZE: usize = 2;

/// Largest outbound envelope: length byte plus a full chunk.
pub const MAX_ENVELOPE: usize = 1 + MAX_CHUNK_SIZE as usize;

/// Largest data-phase read: header plus a full chunk.
pub const MAX_POLL_READ: usize = POLL_HEADER_SIZE + MAX_CHUNK_SIZE as usize;

/// Wrap one chunk as `[len][bytes]` into `out`.
///
/// Returns `None` if the chunk is longer than a single transaction allows or
/// `out` is too small.
pub fn encode_chunk<'a>(chunk: &[u8], out: &'a mut [u8]) -> Option<&'a [u8]> {
    let total = 1 + chunk.len();
    if chunk.len() > MAX_CHUNK_SIZE as usize || total > out.len() {
        return None;
    }
    out[0] = chunk.len() as u8;
    out[1..total].copy_from_slice(chunk);
    Some(&out[..total])
}

/// Control frame asking the peripheral for `requested` bytes.
pub const fn control_frame(requested: u8) -> [u8; 2] {
    [0x00, requested]
}

/// Validated data-phase read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReply<'a> {
    /// Bytes still buffered on the peripheral after this read.
    pub available: u8,
    /// The payload bytes delivered by this read.
    pub payload: &'a [u8],
}

impl<'a> PollReply<'a> {
    /// Check a raw data-phase read against the count that was requested.
    pub fn parse(raw: &'a [u8], requested: u8) -> Result<Self, TransportError> {
        if raw.is_empty() {
            return Err(TransportError::NoResponse);
        }
        if raw.len() != usize::from(requested) + POLL_HEADER_SIZE {
            return Err(TransportError::ProtocolMismatch);
        }
        let available = raw[0];
        if available > MAX_AVAILABLE {
            return Err(TransportError::ProtocolMismatch);
        }
        if raw[1] != requested {
            return Err(TransportError::ProtocolMismatch);
        }
        Ok(Self {
            available,
            payload: &raw[POLL_HEADER_SIZE..],
        })
    }
}
