//! Bus transport: one chunked write sequence and one polling read sequence
//! against a single peripheral.
//!
//! ```text
//!  transmit:   ┌─ pace ─┐┌─ [len][chunk] ─┐┌─ settle ─┐  × ceil(n / 32)
//!              (+ drain pause every ~250 bytes)
//!
//!  receive:    POLLING ──(available > 0)──▶ DRAINING
//!                 ▲                            │
//!                 └──(available == 0, no \n)───┤
//!                                              └──(available == 0, ends in \n)──▶ DONE
//!              any error ──▶ FAILED(err)
//! ```
//!
//! Every call is a single attempt: apart from the control-write retries the
//! protocol itself demands, nothing here retries. Bus faults always reset the
//! controller before the error is returned.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::config::LinkConfig;
use crate::error::{BusFault, Error, TransportError};
use crate::events::{LinkEvent, Phase};
use crate::ports::{Bus, Clock, DiagnosticSink, NullSink};
use crate::wire::chunked::{MAX_CHUNK_SIZE, chunks, next_request_len};
use crate::wire::codec::{
    MAX_ENVELOPE, MAX_POLL_READ, POLL_HEADER_SIZE, PollReply, control_frame, encode_chunk,
};

/// Receive-side state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxState {
    /// Waiting for the peripheral to have something buffered.
    Polling,
    /// Pulling buffered bytes out chunk by chunk.
    Draining,
    /// A full newline-terminated reply was received and nothing is pending.
    Done,
    /// The exchange was abandoned.
    Failed(TransportError),
}

/// Chunked, polling transport bound to one peripheral address.
pub struct BusLink<B, D, C, S = NullSink> {
    bus: B,
    delay: D,
    clock: C,
    sink: S,
    config: LinkConfig,
    /// `available` from the last successful poll.
    available: u8,
}

impl<B, D, C> BusLink<B, D, C, NullSink>
where
    B: Bus,
    D: DelayNs,
    C: Clock,
{
    /// Bind a link to `config.address`.
    ///
    /// Fails with [`Error::Config`] if `config` does not pass
    /// [`LinkConfig::validate`]; nothing touches the bus in that case.
    pub fn new(bus: B, delay: D, clock: C, config: LinkConfig) -> Result<Self, Error> {
        config.validate().map_err(Error::Config)?;
        Ok(Self::with_valid_config(bus, delay, clock, config))
    }

    /// Link with the default address and timing.
    pub fn with_defaults(bus: B, delay: D, clock: C) -> Self {
        Self::with_valid_config(bus, delay, clock, LinkConfig::default())
    }

    fn with_valid_config(bus: B, delay: D, clock: C, config: LinkConfig) -> Self {
        Self {
            bus,
            delay,
            clock,
            sink: NullSink,
            config,
            available: 0,
        }
    }
}

impl<B, D, C, S> BusLink<B, D, C, S>
where
    B: Bus,
    D: DelayNs,
    C: Clock,
    S: DiagnosticSink,
{
    /// Attach a diagnostic sink, replacing the current one.
    pub fn with_sink<S2: DiagnosticSink>(self, sink: S2) -> BusLink<B, D, C, S2> {
        BusLink {
            bus: self.bus,
            delay: self.delay,
            clock: self.clock,
            sink,
            config: self.config,
            available: self.available,
        }
    }

    pub fn address(&self) -> u8 {
        self.config.address
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Give back the bus, delay and clock.
    pub fn release(self) -> (B, D, C) {
        (self.bus, self.delay, self.clock)
    }

    // ── Outbound ─────────────────────────────────────────────

    /// Write `payload` to the peripheral as a sequence of `[len][chunk]`
    /// transactions.
    ///
    /// `payload` must already carry its terminating newline.
    pub fn transmit(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.sink.emit(&LinkEvent::Transmitting {
            bytes: payload.len(),
        });

        let mut envelope = [0u8; MAX_ENVELOPE];
        let mut sent_in_segment: u16 = 0;

        for chunk in chunks(payload, self.config.max_chunk) {
            self.delay.delay_ms(self.config.chunk_pacing_ms);

            let Some(frame) = encode_chunk(chunk, &mut envelope) else {
                return self.fail(TransportError::BufferTooLong);
            };
            if let Err(fault) = self.bus.write(self.config.address, frame) {
                self.report_fault(Phase::Transmit, fault, 1);
                self.reset_bus();
                return self.fail(fault.into());
            }
            self.sink.emit(&LinkEvent::ChunkWritten {
                len: chunk.len() as u8,
            });

            sent_in_segment = sent_in_segment.saturating_add(chunk.len() as u16);
            if sent_in_segment > self.config.segment_bytes {
                self.sink.emit(&LinkEvent::SegmentPause {
                    sent: sent_in_segment,
                });
                sent_in_segment = 0;
                self.delay.delay_ms(self.config.segment_pause_ms);
            }
            self.delay.delay_ms(self.config.chunk_settle_ms);
        }
        Ok(())
    }

    // ── Inbound ──────────────────────────────────────────────

    /// Poll the peripheral until a complete newline-terminated reply has been
    /// drained into `reply`.
    ///
    /// `reply` is cleared first. On error its contents are unspecified.
    pub fn receive<const N: usize>(&mut self, reply: &mut Vec<u8, N>) -> Result<(), TransportError> {
        reply.clear();
        self.available = 0;

        let started = self.clock.now_ms();
        let budget = u64::from(self.config.reply_timeout_ms);
        let mut state = RxState::Polling;
        let mut requested: u16 = 0;
        let mut polls: u32 = 0;

        loop {
            if self.clock.now_ms().saturating_sub(started) >= budget {
                return self.abort(state, TransportError::Timeout);
            }
            if reply.len() + usize::from(requested) > N {
                return self.abort(state, TransportError::Overflow);
            }

            self.delay.delay_ms(self.config.chunk_pacing_ms);
            let available = match self.poll(requested as u8, reply) {
                Ok(a) => a,
                Err(e) => return self.abort(state, e),
            };
            polls += 1;

            let newline = reply.last() == Some(&b'\n');
            requested = next_request_len(u32::from(available), self.config.max_chunk);

            if requested > 0 {
                state = self.transition(state, RxState::Draining);
                continue;
            }
            if newline {
                self.transition(state, RxState::Done);
                self.sink.emit(&LinkEvent::ReplyComplete {
                    bytes: reply.len(),
                    polls,
                });
                return Ok(());
            }
            if reply.is_full() {
                return self.abort(state, TransportError::Overflow);
            }

            state = self.transition(state, RxState::Polling);
            self.delay.delay_ms(self.config.idle_poll_ms);
        }
    }

    /// One poll cycle: control write, data read, payload append.
    ///
    /// `requested` may not exceed the `available` count reported by the
    /// previous poll (zero before the first one). Returns the peripheral's
    /// new `available` count.
    pub fn poll<const N: usize>(
        &mut self,
        requested: u8,
        reply: &mut Vec<u8, N>,
    ) -> Result<u8, TransportError> {
        if u16::from(requested) > MAX_CHUNK_SIZE {
            return Err(TransportError::BufferTooLong);
        }
        if requested > self.available {
            return Err(TransportError::ProtocolMismatch);
        }
        self.send_control(requested)?;

        // Give the peripheral time to stage the data for its I2C ISR.
        self.delay.delay_ms(self.config.control_settle_ms);

        let want = usize::from(requested) + POLL_HEADER_SIZE;
        let mut raw = [0u8; MAX_POLL_READ];
        let got = match self.bus.read(self.config.address, &mut raw[..want]) {
            Ok(n) => n.min(want),
            Err(fault) => {
                self.report_fault(Phase::Data, fault, 1);
                self.reset_bus();
                return Err(fault.into());
            }
        };

        let parsed = PollReply::parse(&raw[..got], requested)?;
        for &byte in parsed.payload {
            reply.push(byte).map_err(|_| TransportError::Overflow)?;
            self.delay.delay_ms(self.config.byte_pacing_ms);
        }

        self.available = parsed.available;
        self.sink.emit(&LinkEvent::Polled {
            requested: u16::from(requested),
            available: parsed.available,
        });
        Ok(parsed.available)
    }

    fn send_control(&mut self, requested: u8) -> Result<(), TransportError> {
        let frame = control_frame(requested);
        let attempts = self.config.control_attempts.max(1);
        let mut last = BusFault::Unknown;

        for attempt in 1..=attempts {
            match self.bus.write(self.config.address, &frame) {
                Ok(()) => return Ok(()),
                Err(fault) => {
                    self.report_fault(Phase::Control, fault, attempt);
                    self.reset_bus();
                    last = fault;
                }
            }
        }
        Err(last.into())
    }

    // ── Helpers ──────────────────────────────────────────────

    fn reset_bus(&mut self) {
        self.bus.reset();
        self.sink.emit(&LinkEvent::BusReset);
    }

    fn report_fault(&mut self, phase: Phase, fault: BusFault, attempt: u8) {
        self.sink.emit(&LinkEvent::BusFault {
            phase,
            fault,
            attempt,
        });
    }

    fn transition(&mut self, from: RxState, to: RxState) -> RxState {
        if from != to {
            self.sink.emit(&LinkEvent::RxTransition { from, to });
        }
        to
    }

    fn abort<T>(&mut self, state: RxState, err: TransportError) -> Result<T, TransportError> {
        self.transition(state, RxState::Failed(err));
        self.fail(err)
    }

    fn fail<T>(&mut self, err: TransportError) -> Result<T, TransportError> {
        self.sink.emit(&LinkEvent::Failed(err));
        Err(err)
    }
}

// ── Tests ────────────────────────────────────────────────────
