//! BusLink against the simulated Notecard: chunking, pacing, polling,
//! timeouts and fault handling.

use crate::mock_bus::{Recorder, SimNotecard, VirtualTime};

use heapless::Vec;
use notelink::TransportError;
use notelink::config::LinkConfig;
use notelink::events::{LinkEvent, Phase};
use notelink::wire::link::{BusLink, RxState};

type SimLink<'a> = BusLink<&'a mut SimNotecard, VirtualTime, VirtualTime, Recorder>;

fn sim_link(card: &mut SimNotecard, config: LinkConfig) -> (SimLink<'_>, VirtualTime) {
    let time = VirtualTime::new();
    let link = BusLink::new(card, time.clone(), time.clone(), config)
        .unwrap()
        .with_sink(Recorder::new());
    (link, time)
}

// ── Transmit ─────────────────────────────────────────────────

#[test]
fn request_is_reassembled_from_chunks() {
    let mut card = SimNotecard::new();
    let request = b"{\"req\":\"hub.set\",\"product\":\"com.example.tracker\"}\n";
    {
        let (mut link, _) = sim_link(&mut card, LinkConfig::default());
        link.transmit(request).unwrap();
    }

    assert_eq!(
        card.requests,
        vec!["{\"req\":\"hub.set\",\"product\":\"com.example.tracker\"}".to_string()]
    );
    let chunks = card.chunk_writes();
    assert_eq!(chunks.len(), request.len().div_ceil(32));
    assert!(chunks.iter().all(|c| usize::from(c[0]) + 1 == c.len()));
}

#[test]
fn long_request_pauses_every_segment() {
    let mut card = SimNotecard::new();
    let mut request = vec![b'a'; 600];
    request.push(b'\n');

    let (mut link, time) = sim_link(&mut card, LinkConfig::default());
    link.transmit(&request).unwrap();

    // 601 bytes: 19 chunks, the counter crosses 250 after chunk 8 and 16.
    let pauses = link
        .sink()
        .count(|e| matches!(e, LinkEvent::SegmentPause { .. }));
    assert_eq!(pauses, 2);
    assert_eq!(
        link.sink().count(|e| matches!(e, LinkEvent::ChunkWritten { .. })),
        19
    );
    // 19 × (6 + 20) ms of pacing plus 2 × 250 ms of drain pauses.
    assert_eq!(time.elapsed_ms(), 19 * 26 + 500);
}

#[test]
fn smaller_chunk_limit_is_honoured() {
    let mut card = SimNotecard::new();
    let config = LinkConfig {
        max_chunk: 8,
        ..LinkConfig::default()
    };
    {
        let (mut link, _) = sim_link(&mut card, config);
        link.transmit(b"{\"req\":\"card.time\"}\n").unwrap();
    }
    assert!(card.chunk_writes().iter().all(|c| c.len() <= 9));
    assert_eq!(card.requests, vec!["{\"req\":\"card.time\"}".to_string()]);
}

#[test]
fn transmit_nack_resets_and_stops() {
    let mut card = SimNotecard::new();
    card.nack_writes = true;
    {
        let (mut link, _) = sim_link(&mut card, LinkConfig::default());
        let err = link.transmit(&[b'z'; 100]).unwrap_err();
        assert_eq!(err, TransportError::AddressNack);
        assert!(link.sink().events.contains(&LinkEvent::BusFault {
            phase: Phase::Transmit,
            fault: notelink::BusFault::AddressNack,
            attempt: 1,
        }));
    }
    assert_eq!(card.resets, 1);
    assert!(card.writes.is_empty());
}

#[test]
fn wrong_address_is_a_nack() {
    let mut card = SimNotecard::new();
    let (mut link, _) = sim_link(&mut card, LinkConfig::with_address(0x42));
    assert_eq!(
        link.transmit(b"{}\n"),
        Err(TransportError::AddressNack)
    );
}

// ── Receive ──────────────────────────────────────────────────

#[test]
fn receive_returns_exact_reply_bytes() {
    let mut card = SimNotecard::new();
    card.preload(&[b"{\"time\":1700000000,\"zone\":\"UTC\"}\n"]);

    let (mut link, _) = sim_link(&mut card, LinkConfig::default());
    let mut reply: Vec<u8, 256> = Vec::new();
    link.receive(&mut reply).unwrap();

    assert_eq!(&reply[..], b"{\"time\":1700000000,\"zone\":\"UTC\"}\n");
    assert!(link.sink().events.iter().any(|e| matches!(
        e,
        LinkEvent::ReplyComplete { bytes, .. } if *bytes == reply.len()
    )));
}

#[test]
fn reply_above_available_cap_is_fully_drained() {
    let mut text = std::vec::Vec::from(&b"{\"payload\":\""[..]);
    text.extend(std::iter::repeat_n(b'q', 400));
    text.extend_from_slice(b"\"}\n");

    let mut card = SimNotecard::new();
    card.preload(&[text.as_slice()]);

    let (mut link, _) = sim_link(&mut card, LinkConfig::default());
    let mut reply: Vec<u8, 1024> = Vec::new();
    link.receive(&mut reply).unwrap();
    assert_eq!(&reply[..], &text[..]);

    let max_available = link
        .sink()
        .events
        .iter()
        .filter_map(|e| match e {
            LinkEvent::Polled { available, .. } => Some(*available),
            _ => None,
        })
        .max();
    assert_eq!(max_available, Some(253));
}

#[test]
fn receive_waits_through_idle_polls() {
    let mut card = SimNotecard::new();
    card.preload(&[b"{\"a\":", b"1}\n"]);

    let (mut link, _) = sim_link(&mut card, LinkConfig::default());
    let mut reply: Vec<u8, 64> = Vec::new();
    link.receive(&mut reply).unwrap();

    assert_eq!(&reply[..], b"{\"a\":1}\n");
    assert!(link.sink().events.contains(&LinkEvent::RxTransition {
        from: RxState::Draining,
        to: RxState::Polling,
    }));
}

#[test]
fn silent_peripheral_times_out() {
    let mut card = SimNotecard::new();
    let config = LinkConfig {
        reply_timeout_ms: 200,
        ..LinkConfig::default()
    };

    let (mut link, time) = sim_link(&mut card, config);
    let mut reply: Vec<u8, 64> = Vec::new();
    assert_eq!(link.receive(&mut reply), Err(TransportError::Timeout));
    assert!(time.elapsed_ms() >= 200);
    assert!(time.elapsed_ms() < 300);
}

#[test]
fn never_completing_reply_times_out() {
    let mut card = SimNotecard::new();
    card.endless = true;
    let config = LinkConfig {
        reply_timeout_ms: 200,
        ..LinkConfig::default()
    };

    let (mut link, time) = sim_link(&mut card, config);
    let mut reply: Vec<u8, 4096> = Vec::new();
    assert_eq!(link.receive(&mut reply), Err(TransportError::Timeout));
    assert!(time.elapsed_ms() >= 200);
    assert!(link.sink().events.contains(&LinkEvent::RxTransition {
        from: RxState::Draining,
        to: RxState::Failed(TransportError::Timeout),
    }));
}

#[test]
fn default_timeout_is_thirty_seconds() {
    let mut card = SimNotecard::new();
    let (mut link, time) = sim_link(&mut card, LinkConfig::default());
    let mut reply: Vec<u8, 64> = Vec::new();

    assert_eq!(link.receive(&mut reply), Err(TransportError::Timeout));
    assert!(time.elapsed_ms() >= 30_000);
    assert!(time.elapsed_ms() < 30_100);
}

#[test]
fn reply_larger_than_buffer_overflows() {
    let mut card = SimNotecard::new();
    card.preload(&[&[b'x'; 100][..]]);

    let (mut link, _) = sim_link(&mut card, LinkConfig::default());
    let mut reply: Vec<u8, 64> = Vec::new();
    assert_eq!(link.receive(&mut reply), Err(TransportError::Overflow));
}

#[test]
fn bad_echo_is_a_protocol_mismatch() {
    let mut card = SimNotecard::new();
    card.bad_echo = true;
    card.preload(&[b"{}\n"]);

    let (mut link, _) = sim_link(&mut card, LinkConfig::default());
    let mut reply: Vec<u8, 64> = Vec::new();
    assert_eq!(
        link.receive(&mut reply),
        Err(TransportError::ProtocolMismatch)
    );
}

#[test]
fn control_nacks_are_retried_within_budget() {
    let mut card = SimNotecard::new();
    card.nack_controls = 2;
    card.preload(&[b"{}\n"]);

    {
        let (mut link, _) = sim_link(&mut card, LinkConfig::default());
        let mut reply: Vec<u8, 64> = Vec::new();
        link.receive(&mut reply).unwrap();
        assert_eq!(&reply[..], b"{}\n");
        assert_eq!(
            link.sink()
                .count(|e| matches!(e, LinkEvent::BusFault { phase: Phase::Control, .. })),
            2
        );
    }
    assert_eq!(card.resets, 2);
}

#[test]
fn control_nacks_exhaust_attempts() {
    let mut card = SimNotecard::new();
    card.nack_controls = 3;

    {
        let (mut link, _) = sim_link(&mut card, LinkConfig::default());
        let mut reply: Vec<u8, 64> = Vec::new();
        assert_eq!(link.receive(&mut reply), Err(TransportError::DataNack));
    }
    assert_eq!(card.resets, 3);
    assert_eq!(card.reads, 0);
}
