//! Fuzz target: `PollReply::parse`
//!
//! The first byte picks the requested count, the rest is treated as the raw
//! data-phase read. Parsing must never panic, and an accepted reply must
//! carry exactly the requested payload with a legal `available` count.
//!
//! cargo fuzz run fuzz_poll_reply

#![no_main]

use libfuzzer_sys::fuzz_target;
use notelink::wire::codec::{MAX_AVAILABLE, PollReply};

fuzz_target!(|data: &[u8]| {
    let Some((&requested, raw)) = data.split_first() else {
        return;
    };
    let requested = requested % 33;

    if let Ok(reply) = PollReply::parse(raw, requested) {
        assert_eq!(reply.payload.len(), usize::from(requested));
        assert!(reply.available <= MAX_AVAILABLE);
    }
});
