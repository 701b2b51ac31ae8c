//! Diagnostic events emitted by the link.
//!
//! The [`BusLink`](crate::wire::link::BusLink) emits these through the
//! [`DiagnosticSink`](crate::ports::DiagnosticSink) port. Nothing in the core
//! depends on them being observed.

use crate::error::{BusFault, TransportError};
use crate::wire::link::RxState;

/// Which bus transaction a fault happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Outbound `[len][chunk]` write.
    Transmit,
    /// Inbound `[0x00][count]` control write.
    Control,
    /// Inbound `count + 2` byte data read.
    Data,
}

/// Structured events emitted by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A serialized request is about to go out (length includes the newline).
    Transmitting { bytes: usize },

    /// One outbound chunk was accepted by the bus.
    ChunkWritten { len: u8 },

    /// The drain pause after a full segment.
    SegmentPause { sent: u16 },

    /// A bus transaction failed. `attempt` is 1-based.
    BusFault {
        phase: Phase,
        fault: BusFault,
        attempt: u8,
    },

    /// The bus controller was restarted.
    BusReset,

    /// One poll completed.
    Polled { requested: u16, available: u8 },

    /// The receive state machine moved.
    RxTransition { from: RxState, to: RxState },

    /// A complete reply was accumulated.
    ReplyComplete { bytes: usize, polls: u32 },

    /// The exchange was abandoned.
    Failed(TransportError),
}
