//! Log-based diagnostic sink adapter.
//!
//! Implements [`DiagnosticSink`] by writing link events to the `log` facade.
//! Per-chunk traffic goes to `trace`/`debug`, faults to `warn`, completed
//! exchanges to `info`.

use log::{debug, info, trace, warn};

use crate::events::LinkEvent;
use crate::ports::DiagnosticSink;

/// Adapter that logs every [`LinkEvent`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for LogSink {
    fn emit(&mut self, event: &LinkEvent) {
        match event {
            LinkEvent::Transmitting { bytes } => {
                debug!("NOTE | TX {} bytes", bytes);
            }
            LinkEvent::ChunkWritten { len } => {
                trace!("NOTE | TX chunk len={}", len);
            }
            LinkEvent::SegmentPause { sent } => {
                trace!("NOTE | TX drain pause after {} bytes", sent);
            }
            LinkEvent::BusFault {
                phase,
                fault,
                attempt,
            } => {
                warn!("NOTE | {:?} fault (attempt {}): {}", phase, attempt, fault);
            }
            LinkEvent::BusReset => {
                debug!("NOTE | bus reset");
            }
            LinkEvent::Polled {
                requested,
                available,
            } => {
                trace!("NOTE | RX poll requested={} available={}", requested, available);
            }
            LinkEvent::RxTransition { from, to } => {
                trace!("NOTE | RX {:?} -> {:?}", from, to);
            }
            LinkEvent::ReplyComplete { bytes, polls } => {
                info!("NOTE | RX {} bytes in {} polls", bytes, polls);
            }
            LinkEvent::Failed(err) => {
                warn!("NOTE | exchange failed: {}", err);
            }
        }
    }
}
