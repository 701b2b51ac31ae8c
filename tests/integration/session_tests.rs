//! NoteSession end to end: document → wire → simulated Notecard → document.

use crate::mock_bus::{Recorder, SimNotecard, VirtualTime};

use notelink::adapters::LogSink;
use notelink::config::LinkConfig;
use notelink::events::LinkEvent;
use notelink::{DocumentError, Error, NoteSession, TransportError};

fn session(card: &mut SimNotecard) -> NoteSession<&mut SimNotecard, VirtualTime, VirtualTime> {
    let time = VirtualTime::new();
    NoteSession::new(card, time.clone(), time)
}

#[test]
fn card_version_over_two_payload_polls() {
    let mut card = SimNotecard::new();
    card.reply_in_bursts(&[b"{\"version\"", b":\"1.2.3\"}\n"]);

    let polls = {
        let time = VirtualTime::new();
        let mut s = NoteSession::new(&mut card, time.clone(), time).with_sink(Recorder::new());
        s.begin_request("card.version");
        s.send_request().unwrap();

        assert_eq!(s.document().get_str("version"), Some("1.2.3"));
        assert_eq!(s.last_reply(), b"{\"version\":\"1.2.3\"}\n");
        assert_eq!(s.reply_error(), None);

        s.link()
            .sink()
            .events
            .iter()
            .filter(|e| matches!(e, LinkEvent::Polled { requested, .. } if *requested > 0))
            .count()
    };

    assert_eq!(polls, 2);
    assert_eq!(card.requests, vec!["{\"req\":\"card.version\"}".to_string()]);
}

#[test]
fn parameters_reach_the_card_in_order() {
    let mut card = SimNotecard::new();
    card.reply(b"{}\n");
    {
        let mut s = session(&mut card);
        let req = s.begin_request("hub.set");
        req.set("product", "com.example.tracker");
        req.set("mode", "periodic");
        req.set("outbound", 60);
        req.set("sync", true);
        s.send_request().unwrap();
        assert!(s.document().is_empty());
    }
    assert_eq!(
        card.requests,
        vec![
            "{\"req\":\"hub.set\",\"product\":\"com.example.tracker\",\"mode\":\"periodic\",\"outbound\":60,\"sync\":true}"
                .to_string()
        ]
    );
}

#[test]
fn nested_reply_fields_are_readable() {
    let mut card = SimNotecard::new();
    card.reply(b"{\"mode\":\"continuous\",\"body\":{\"temp\":21.5,\"count\":3,\"ok\":true}}\n");

    let mut s = session(&mut card);
    s.begin_request("hub.get");
    s.send_request().unwrap();

    let doc = s.document();
    assert_eq!(doc.get_str("mode"), Some("continuous"));
    assert_eq!(doc.get_nested_f32("body", "temp"), Some(21.5));
    assert_eq!(doc.get_nested_u32("body", "count"), Some(3));
    assert_eq!(doc.get_nested_bool("body", "ok"), Some(true));
    assert!(doc.has_nested("body", "temp"));
    assert!(!doc.has_nested("mode", "temp"));
}

#[test]
fn nack_on_every_write_fails_without_reading() {
    let mut card = SimNotecard::new();
    card.nack_writes = true;
    card.reply(b"{\"version\":\"1.2.3\"}\n");
    {
        let mut s = session(&mut card);
        s.begin_request("card.version");

        assert_eq!(
            s.send_request(),
            Err(Error::Transport(TransportError::AddressNack))
        );
        assert_eq!(s.document().get_str("req"), Some("card.version"));
        assert!(!s.document().has("version"));
        assert!(s.last_reply().is_empty());
    }
    assert_eq!(card.reads, 0);
    assert!(card.resets >= 1);
}

#[test]
fn oversize_request_writes_nothing() {
    let mut card = SimNotecard::new();
    let body = "x".repeat(5000);
    {
        let mut s = session(&mut card);
        s.begin_request("note.add").set("payload", body.as_str());
        assert_eq!(
            s.send_request(),
            Err(Error::Transport(TransportError::BufferTooLong))
        );
    }
    assert!(card.writes.is_empty());
}

#[test]
fn silent_card_times_out() {
    let mut card = SimNotecard::new();
    let time = VirtualTime::new();
    let config = LinkConfig {
        reply_timeout_ms: 200,
        ..LinkConfig::default()
    };
    let mut s = NoteSession::with_config(&mut card, time.clone(), time.clone(), config).unwrap();
    s.begin_request("card.status");

    assert_eq!(
        s.send_request(),
        Err(Error::Transport(TransportError::Timeout))
    );
    assert!(time.elapsed_ms() >= 200);
    assert_eq!(s.document().get_str("req"), Some("card.status"));
}

#[test]
fn eight_bit_address_is_refused_before_any_traffic() {
    let mut card = SimNotecard::new();
    card.address = 0x80;
    card.reply(b"{}\n");

    let time = VirtualTime::new();
    let refused =
        NoteSession::with_config(&mut card, time.clone(), time, LinkConfig::with_address(0x80));
    assert!(matches!(
        refused,
        Err(Error::Config("address must be a 7-bit value"))
    ));
    drop(refused);
    assert!(card.writes.is_empty());
    assert_eq!(card.reads, 0);
}

#[test]
fn application_error_is_surfaced() {
    let mut card = SimNotecard::new();
    card.reply(b"{\"err\":\"no sim card {no-sim}\"}\n");

    let mut s = session(&mut card);
    s.begin_request("card.wireless");
    s.send_request().unwrap();
    assert_eq!(s.reply_error(), Some("no sim card {no-sim}"));
}

#[test]
fn malformed_reply_keeps_request() {
    let mut card = SimNotecard::new();
    card.reply(b"not json at all\n");

    let mut s = session(&mut card);
    s.begin_request("card.temp");
    assert_eq!(
        s.send_request(),
        Err(Error::Document(DocumentError::Malformed))
    );
    assert_eq!(s.document().get_str("req"), Some("card.temp"));
    assert_eq!(s.reply_error(), None);
}

#[test]
fn reply_larger_than_session_buffer_overflows() {
    let mut card = SimNotecard::new();
    let mut reply = b"{\"text\":\"".to_vec();
    reply.extend(std::iter::repeat_n(b'a', 200));
    reply.extend_from_slice(b"\"}\n");
    card.reply(&reply);

    let time = VirtualTime::new();
    let mut s = NoteSession::new(&mut card, time.clone(), time).with_capacity::<128>();
    s.begin_request("card.location");
    assert_eq!(
        s.send_request(),
        Err(Error::Transport(TransportError::Overflow))
    );
}

#[test]
fn raw_reply_copy_is_truncated() {
    let mut card = SimNotecard::new();
    card.reply(b"{\"time\":1700000000}\n");

    let mut s = session(&mut card);
    s.begin_request("card.time");

    let mut raw = [0xFFu8; 8];
    assert_eq!(s.send_request_into(&mut raw), Ok(7));
    assert_eq!(&raw, b"{\"time\"\0");
    assert_eq!(s.document().get_u32("time"), Some(1_700_000_000));
}

#[test]
fn raw_reply_copy_fits_with_terminator() {
    let mut card = SimNotecard::new();
    card.reply(b"{\"ok\":true}\n");
    card.reply(b"{\"ok\":true}\n");

    let mut s = session(&mut card);
    s.begin_request("card.status");
    let mut raw = [0xFFu8; 32];
    let n = s.send_request_into(&mut raw).unwrap();
    assert_eq!(&raw[..n], b"{\"ok\":true}\n");
    assert_eq!(raw[n], 0);

    // An empty buffer still runs the exchange.
    s.begin_request("card.status");
    let mut empty: [u8; 0] = [];
    assert_eq!(s.send_request_into(&mut empty), Ok(0));
    assert_eq!(s.document().get_bool("ok"), Some(true));
}

#[test]
fn command_is_sent_without_polling() {
    let mut card = SimNotecard::new();
    {
        let mut s = session(&mut card);
        s.begin_command("card.attn").set("mode", "sleep");
        s.send_command().unwrap();
    }
    assert_eq!(
        card.requests,
        vec!["{\"cmd\":\"card.attn\",\"mode\":\"sleep\"}".to_string()]
    );
    assert_eq!(card.control_writes(), 0);
    assert_eq!(card.reads, 0);
}

#[test]
fn back_to_back_requests_reuse_the_session() {
    let mut card = SimNotecard::new();
    card.reply(b"{\"version\":\"1.2.3\"}\n");
    card.reply(b"{\"temp\":22.25}\n");

    let mut s = session(&mut card);
    s.begin_request("card.version");
    s.send_request().unwrap();
    assert_eq!(s.document().get_str("version"), Some("1.2.3"));

    s.begin_request("card.temp");
    assert!(!s.document().has("version"));
    s.send_request().unwrap();
    assert_eq!(s.document().get_f32("temp"), Some(22.25));
    assert_eq!(s.last_reply(), b"{\"temp\":22.25}\n");
}

#[test]
fn base64_payload_is_sent_as_text() {
    let mut card = SimNotecard::new();
    card.reply(b"{\"total\":1}\n");
    {
        let mut s = session(&mut card);
        s.begin_request("note.add")
            .set_nested_base64("body", "bin", b"\x00\x01\x02hello");
        s.send_request().unwrap();
        assert_eq!(s.document().get_i32("total"), Some(1));
    }
    assert_eq!(
        card.requests,
        vec!["{\"req\":\"note.add\",\"body\":{\"bin\":\"AAECaGVsbG8=\"}}".to_string()]
    );
}

#[test]
fn log_sink_drives_a_full_exchange() {
    let mut card = SimNotecard::new();
    card.reply(b"{\"connected\":true}\n");

    let time = VirtualTime::new();
    let mut s = NoteSession::new(&mut card, time.clone(), time).with_sink(LogSink::new());
    s.begin_request("hub.status");
    s.send_request().unwrap();
    assert_eq!(s.document().get_bool("connected"), Some(true));
}

#[test]
fn release_returns_the_bus() {
    let mut card = SimNotecard::new();
    card.reply(b"{}\n");

    let mut s = session(&mut card);
    s.begin_request("card.restore");
    s.send_request().unwrap();
    let (bus, _, _) = s.release();
    assert_eq!(bus.requests.len(), 1);
}
