//! Notecard I2C wire protocol.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Wire Stack                          │
//! │                                                          │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────────────────┐  │
//! │  │ chunked  │──▶│  codec   │──▶│  link (BusLink)      │  │
//! │  │ (split)  │   │ (framing)│   │  → Bus port          │  │
//! │  └──────────┘   └──────────┘   └──────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod chunked;
pub mod codec;
pub mod link;
