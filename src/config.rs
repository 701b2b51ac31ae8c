//! Link configuration parameters
//!
//! All timing and framing knobs for the Notecard I2C link. The defaults match
//! what the Notecard firmware expects; host code normally only changes the
//! address or shortens the reply timeout in tests.

use serde::{Deserialize, Serialize};

use crate::wire::chunked::MAX_CHUNK_SIZE;

/// Default 7-bit I2C address of the Notecard.
pub const DEFAULT_ADDRESS: u8 = 0x17;

/// Default wire buffer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// 7-bit peripheral address
    pub address: u8,
    /// Largest payload per bus transaction (1-32)
    pub max_chunk: u16,

    // --- Outbound pacing ---
    /// Delay before every outbound chunk (ms)
    pub chunk_pacing_ms: u32,
    /// Delay after every outbound chunk (ms)
    pub chunk_settle_ms: u32,
    /// Bytes sent before the peripheral gets a drain pause
    pub segment_bytes: u16,
    /// Drain pause length (ms)
    pub segment_pause_ms: u32,

    // --- Inbound polling ---
    /// Attempts for each control write before the poll fails
    pub control_attempts: u8,
    /// Delay between the control write and the data read (ms)
    pub control_settle_ms: u32,
    /// Delay between consecutive payload bytes (ms)
    pub byte_pacing_ms: u32,
    /// Delay between polls that returned nothing (ms)
    pub idle_poll_ms: u32,
    /// Wall-clock budget for a complete reply (ms)
    pub reply_timeout_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            max_chunk: MAX_CHUNK_SIZE,

            chunk_pacing_ms: 6,
            chunk_settle_ms: 20,
            segment_bytes: 250,
            segment_pause_ms: 250,

            control_attempts: 3,
            control_settle_ms: 2,
            byte_pacing_ms: 6,
            idle_poll_ms: 50,
            reply_timeout_ms: 30_000,
        }
    }
}

impl LinkConfig {
    /// Same defaults, different peripheral address.
    pub fn with_address(address: u8) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    /// Reject settings the wire protocol cannot carry.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.address > 0x7F {
            return Err("address must be a 7-bit value");
        }
        if self.max_chunk == 0 || self.max_chunk > MAX_CHUNK_SIZE {
            return Err("max_chunk must be 1-32");
        }
        if self.control_attempts == 0 {
            return Err("control_attempts must be at least 1");
        }
        Ok(())
    }
}
