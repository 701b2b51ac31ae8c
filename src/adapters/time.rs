//! Hosted time adapters.
//!
//! - [`StdClock`] implements the [`Clock`] port on `std::time::Instant`.
//! - [`StdDelay`] implements `embedded_hal::delay::DelayNs` with
//!   `std::thread::sleep`.
//!
//! Useful on Linux hosts (e.g. a Raspberry Pi driving the Notecard over
//! `/dev/i2c-*`) and in simulation. MCU targets supply their HAL's delay and
//! a timer-backed clock instead.

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

use crate::ports::Clock;

/// Monotonic clock counting from construction.
pub struct StdClock {
    start: Instant,
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Blocking delay on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
