//! Request session: the entry point for code that talks to a Notecard.
//!
//! ```text
//!   begin_request("card.version")       document = {"req":"card.version"}
//!   document_mut().set(...)              add parameters
//!   send_request()                       serialize + \n → transmit → receive
//!                                        → document = reply
//!   document().get_str("version")        read the reply
//! ```
//!
//! A session owns the document, the wire buffer and the transport for one
//! peripheral. Every call takes `&mut self`, so only one request can be in
//! flight per session. Nothing here retries: a failed `send_request` leaves
//! the document as the caller built it, and the caller decides whether to
//! try again.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::config::{DEFAULT_CAPACITY, LinkConfig};
use crate::error::{DocumentError, Error, Result, TransportError};
use crate::json::Document;
use crate::ports::{Bus, Clock, DiagnosticSink, NullSink};
use crate::wire::link::BusLink;

/// Conventional reply field carrying an application-level error.
pub const ERR_KEY: &str = "err";

/// Request/reply session bound to one peripheral.
///
/// `N` is the wire buffer capacity, shared by the outbound request and the
/// inbound reply.
pub struct NoteSession<B, D, C, S = NullSink, const N: usize = DEFAULT_CAPACITY> {
    link: BusLink<B, D, C, S>,
    document: Document,
    wire: Vec<u8, N>,
    reply_len: usize,
}

impl<B, D, C> NoteSession<B, D, C>
where
    B: Bus,
    D: DelayNs,
    C: Clock,
{
    /// Session at the default address (0x17) with default timing.
    pub fn new(bus: B, delay: D, clock: C) -> Self {
        Self::from_link(BusLink::with_defaults(bus, delay, clock))
    }

    /// Session with custom address or timing. Rejects a config that fails
    /// [`LinkConfig::validate`] before any bus traffic.
    pub fn with_config(bus: B, delay: D, clock: C, config: LinkConfig) -> Result<Self> {
        Ok(Self::from_link(BusLink::new(bus, delay, clock, config)?))
    }
}

impl<B, D, C, S, const N: usize> NoteSession<B, D, C, S, N>
where
    B: Bus,
    D: DelayNs,
    C: Clock,
    S: DiagnosticSink,
{
    pub fn from_link(link: BusLink<B, D, C, S>) -> Self {
        Self {
            link,
            document: Document::new(),
            wire: Vec::new(),
            reply_len: 0,
        }
    }

    /// Route transport diagnostics to `sink`.
    pub fn with_sink<S2: DiagnosticSink>(self, sink: S2) -> NoteSession<B, D, C, S2, N> {
        NoteSession {
            link: self.link.with_sink(sink),
            document: self.document,
            wire: Vec::new(),
            reply_len: 0,
        }
    }

    /// Rebuild the session with a wire buffer of `M` bytes.
    pub fn with_capacity<const M: usize>(self) -> NoteSession<B, D, C, S, M> {
        NoteSession {
            link: self.link,
            document: self.document,
            wire: Vec::new(),
            reply_len: 0,
        }
    }

    pub fn address(&self) -> u8 {
        self.link.address()
    }

    pub fn config(&self) -> &LinkConfig {
        self.link.config()
    }

    pub fn link(&self) -> &BusLink<B, D, C, S> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut BusLink<B, D, C, S> {
        &mut self.link
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Give back the bus, delay and clock.
    pub fn release(self) -> (B, D, C) {
        self.link.release()
    }

    // ── Requests ─────────────────────────────────────────────

    /// Start a new request named `name` (e.g. `"card.version"`).
    pub fn begin_request(&mut self, name: &str) -> &mut Document {
        self.begin("req", name)
    }

    /// Start a command: like a request, but the Notecard sends no reply.
    pub fn begin_command(&mut self, name: &str) -> &mut Document {
        self.begin("cmd", name)
    }

    fn begin(&mut self, envelope: &str, name: &str) -> &mut Document {
        self.reply_len = 0;
        self.document.clear();
        self.document.set(envelope, name);
        &mut self.document
    }

    /// Send the current document and replace it with the reply.
    ///
    /// Success only means the exchange completed; check
    /// [`reply_error`](Self::reply_error) for an application-level failure.
    pub fn send_request(&mut self) -> Result<()> {
        self.stage_request()?;
        self.link.transmit(&self.wire)?;
        self.link.receive(&mut self.wire)?;

        let reply = Document::from_json(&self.wire)?;
        self.document = reply;
        self.reply_len = self.wire.len();
        Ok(())
    }

    /// [`send_request`](Self::send_request), also copying the raw reply text
    /// into `raw` as NUL-terminated bytes, truncated to `raw.len() - 1`.
    /// Returns the text bytes copied (terminator excluded).
    pub fn send_request_into(&mut self, raw: &mut [u8]) -> Result<usize> {
        self.send_request()?;
        let Some(room) = raw.len().checked_sub(1) else {
            return Ok(0);
        };
        let reply = self.last_reply();
        let n = reply.len().min(room);
        raw[..n].copy_from_slice(&reply[..n]);
        raw[n] = 0;
        Ok(n)
    }

    /// Send the current document without waiting for a reply.
    pub fn send_command(&mut self) -> Result<()> {
        self.stage_request()?;
        self.link.transmit(&self.wire)?;
        Ok(())
    }

    /// Raw text of the last successful reply, newline included.
    pub fn last_reply(&self) -> &[u8] {
        &self.wire[..self.reply_len]
    }

    /// The reply's `"err"` field, if it has one.
    pub fn reply_error(&self) -> Option<&str> {
        if self.reply_len == 0 {
            return None;
        }
        self.document.get_str(ERR_KEY)
    }

    /// Render the document plus framing newline into the wire buffer.
    fn stage_request(&mut self) -> Result<()> {
        self.reply_len = 0;
        self.wire.clear();
        self.document
            .serialize_into(&mut self.wire)
            .map_err(|e| match e {
                DocumentError::TooLarge => Error::from(TransportError::BufferTooLong),
                other => Error::from(other),
            })?;
        self.wire
            .push(b'\n')
            .map_err(|_| TransportError::BufferTooLong)?;
        Ok(())
    }
}
