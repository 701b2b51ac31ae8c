//! `embedded-hal` I2C adapter: bridges any HAL bus to the [`Bus`] port.
//!
//! HAL drivers have no notion of "restart the controller", so the reset is
//! an optional hook supplied by the board code (for example, re-running the
//! peripheral init sequence). Without a hook, `reset` only logs.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use log::{debug, warn};

use crate::error::BusFault;
use crate::ports::Bus;

/// Concrete adapter over an `embedded_hal::i2c::I2c` implementation.
pub struct HalBus<I2C> {
    i2c: I2C,
    on_reset: Option<fn(&mut I2C)>,
}

impl<I2C: I2c> HalBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c, on_reset: None }
    }

    /// Adapter that calls `hook` whenever the link asks for a bus reset.
    pub fn with_reset(i2c: I2C, hook: fn(&mut I2C)) -> Self {
        Self {
            i2c,
            on_reset: Some(hook),
        }
    }

    pub fn inner(&self) -> &I2C {
        &self.i2c
    }

    pub fn inner_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}

/// Map a HAL error kind onto the link's fault classes.
pub fn classify(kind: ErrorKind) -> BusFault {
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => BusFault::AddressNack,
        ErrorKind::NoAcknowledge(_) => BusFault::DataNack,
        _ => BusFault::Unknown,
    }
}

// ── Bus implementation ───────────────────────────────────────

impl<I2C: I2c> Bus for HalBus<I2C> {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusFault> {
        self.i2c.write(address, bytes).map_err(|e| {
            let fault = classify(e.kind());
            warn!("I2C: write to 0x{:02x} failed: {}", address, fault);
            fault
        })
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, BusFault> {
        match self.i2c.read(address, buf) {
            Ok(()) => Ok(buf.len()),
            Err(e) => {
                let fault = classify(e.kind());
                warn!("I2C: read from 0x{:02x} failed: {}", address, fault);
                Err(fault)
            }
        }
    }

    fn reset(&mut self) {
        match self.on_reset {
            Some(hook) => {
                hook(&mut self.i2c);
                debug!("I2C: bus restarted");
            }
            None => debug!("I2C: reset requested, no hook installed"),
        }
    }
}
