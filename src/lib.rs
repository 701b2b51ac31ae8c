//! Notelink — host-side driver for the Blues Notecard I2C protocol.
//!
//! Moves newline-terminated JSON requests and replies over a bus that only
//! allows short, address-targeted transactions, and provides the shallow
//! JSON document used to build requests and read replies.
//!
//! ```no_run
//! use notelink::adapters::{HalBus, StdClock, StdDelay};
//! use notelink::session::NoteSession;
//! # fn demo<I: embedded_hal::i2c::I2c>(i2c: I) -> notelink::Result<()> {
//! let mut card = NoteSession::new(HalBus::new(i2c), StdDelay, StdClock::new());
//! card.begin_request("card.version");
//! card.send_request()?;
//! let version = card.document().get_str("version");
//! # Ok(()) }
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod config;
pub mod events;
pub mod json;
pub mod ports;
pub mod session;
pub mod wire;

mod error;

pub use error::{BusFault, DocumentError, Error, Result, TransportError};
pub use session::NoteSession;
