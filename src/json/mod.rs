//! JSON payloads exchanged with the Notecard.
//!
//! [`document::Document`] builds requests and reads replies;
//! [`base64`] embeds binary sensor data in string fields.

pub mod base64;
pub mod document;

pub use document::{Document, Scalar, Value};
