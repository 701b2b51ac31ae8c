//! Unified error types for the Notecard link.
//!
//! A single `Error` enum that every layer converts into, so a collaborator
//! calling [`NoteSession::send_request`](crate::session::NoteSession::send_request)
//! handles one type. All variants are `Copy` so they can be reported through
//! the diagnostic sink and returned without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bus transaction or the request/reply exchange failed.
    Transport(TransportError),
    /// A document could not be built from or rendered to JSON text.
    Document(DocumentError),
    /// A link setting is outside what the wire protocol can carry.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Document(e) => write!(f, "document: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Outcome of one failed request/reply exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The peripheral did not acknowledge its address.
    AddressNack,
    /// The peripheral did not acknowledge a data byte.
    DataNack,
    /// The request does not fit the wire buffer, or a bus payload was oversize.
    BufferTooLong,
    /// The bus driver reported an error it could not classify.
    UnknownTxError,
    /// The bus timed out, or the reply did not complete within the budget.
    Timeout,
    /// A poll reply violated the length/echo sub-protocol.
    ProtocolMismatch,
    /// The accumulated reply exceeded the wire buffer capacity.
    Overflow,
    /// The peripheral returned no bytes for a data read.
    NoResponse,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressNack => write!(f, "NACK on address"),
            Self::DataNack => write!(f, "NACK on data"),
            Self::BufferTooLong => write!(f, "buffer too long"),
            Self::UnknownTxError => write!(f, "unknown bus error"),
            Self::Timeout => write!(f, "timeout"),
            Self::ProtocolMismatch => write!(f, "protocol mismatch"),
            Self::Overflow => write!(f, "reply overflow"),
            Self::NoResponse => write!(f, "no response"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Bus faults
// ---------------------------------------------------------------------------

/// Classification of one failed bus transaction.
///
/// The variants line up with the status codes returned by Arduino's
/// `TwoWire::endTransmission()`, which is what most Notecard host firmware
/// sits on top of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BusFault {
    /// Payload too long for the controller's transmit buffer.
    TooLong = 1,
    /// NACK while sending the address byte.
    AddressNack = 2,
    /// NACK while sending a data byte.
    DataNack = 3,
    /// Any other driver error.
    Unknown = 4,
    /// The controller gave up waiting for the bus.
    Timeout = 5,
}

impl BusFault {
    /// Map an `endTransmission()`-style status code. `0` means success.
    pub const fn from_status(code: u8) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(Self::TooLong),
            2 => Some(Self::AddressNack),
            3 => Some(Self::DataNack),
            5 => Some(Self::Timeout),
            _ => Some(Self::Unknown),
        }
    }
}

impl fmt::Display for BusFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong => write!(f, "data too long to fit in transmit buffer"),
            Self::AddressNack => write!(f, "received NACK on transmit of address"),
            Self::DataNack => write!(f, "received NACK on transmit of data"),
            Self::Unknown => write!(f, "unknown bus error"),
            Self::Timeout => write!(f, "bus timeout"),
        }
    }
}

impl From<BusFault> for TransportError {
    fn from(f: BusFault) -> Self {
        match f {
            BusFault::TooLong => Self::BufferTooLong,
            BusFault::AddressNack => Self::AddressNack,
            BusFault::DataNack => Self::DataNack,
            BusFault::Unknown => Self::UnknownTxError,
            BusFault::Timeout => Self::Timeout,
        }
    }
}

impl From<BusFault> for Error {
    fn from(f: BusFault) -> Self {
        Self::Transport(f.into())
    }
}

// ---------------------------------------------------------------------------
// Document errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentError {
    /// The rendered JSON does not fit the destination buffer.
    TooLarge,
    /// The input is not a JSON object.
    Malformed,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge => write!(f, "document exceeds buffer capacity"),
            Self::Malformed => write!(f, "malformed JSON object"),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<DocumentError> for Error {
    fn from(e: DocumentError) -> Self {
        Self::Document(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
