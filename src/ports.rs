//! Port traits: the boundary between the link logic and the host platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BusLink / NoteSession
//! ```
//!
//! The transport never touches a driver directly. Host adapters (an
//! `embedded-hal` I2C bus, a monotonic clock, a logger) implement these
//! traits, and tests substitute simulated peripherals and virtual time.

use crate::error::BusFault;
use crate::events::LinkEvent;

// ───────────────────────────────────────────────────────────────
// Bus port (driven adapter: link → peripheral)
// ───────────────────────────────────────────────────────────────

/// Address-targeted, short-transaction bus.
pub trait Bus {
    /// Write `bytes` to the device at `address` in one transaction.
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusFault>;

    /// Read up to `buf.len()` bytes from the device at `address`.
    ///
    /// Returns how many bytes the device actually delivered, which may be
    /// fewer than requested (or zero) on controllers that report short reads.
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, BusFault>;

    /// Stop and restart the bus controller after an error.
    fn reset(&mut self);
}

impl<T: Bus + ?Sized> Bus for &mut T {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusFault> {
        (**self).write(address, bytes)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, BusFault> {
        (**self).read(address, buf)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock used for the reply timeout.
///
/// Blocking sleeps go through [`embedded_hal::delay::DelayNs`] instead.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

// ───────────────────────────────────────────────────────────────
// Diagnostic sink port (driven adapter: link → logging)
// ───────────────────────────────────────────────────────────────

/// The link reports what it is doing through this port. Adapters decide
/// where events go (serial log, ring buffer, test recorder).
pub trait DiagnosticSink {
    fn emit(&mut self, event: &LinkEvent);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn emit(&mut self, event: &LinkEvent) {
        (**self).emit(event);
    }
}

/// Sink that drops every event. The default for a new session.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _event: &LinkEvent) {}
}
