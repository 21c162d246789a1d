//! Framing Tests
//!
//! Tests for FramedChannel send/receive over scripted and loopback streams.

#[path = "../common/mod.rs"]
mod common;

use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use common::{ReadStep, ScriptedStream};
use shiftwire::protocol::{FramedChannel, Validation, MAX_FIELD_SIZE};
use shiftwire::{ErrorClass, ShiftError};

const TIMEOUT: Duration = Duration::from_millis(200);

fn channel(stream: ScriptedStream) -> FramedChannel<ScriptedStream> {
    FramedChannel::new(stream, TIMEOUT)
}

// =============================================================================
// Send Tests
// =============================================================================

#[test]
fn test_send_numeric_field_is_big_endian() {
    let mut ch = channel(ScriptedStream::new(vec![]));
    ch.send_numeric_field(15).unwrap();
    ch.send_numeric_field(0x0102_0304).unwrap();

    assert_eq!(ch.into_inner().written(), vec![0, 0, 0, 15, 1, 2, 3, 4]);
}

#[test]
fn test_send_bytes_handles_partial_writes() {
    let mut ch = channel(ScriptedStream::new(vec![]).max_write(1));
    ch.send_bytes(b"lorenipsumdolur").unwrap();

    assert_eq!(ch.into_inner().written(), b"lorenipsumdolur");
}

#[test]
fn test_send_stall_times_out() {
    let mut ch = channel(ScriptedStream::new(vec![]).max_write(2).write_budget(2));

    let start = Instant::now();
    let err = ch.send_numeric_field(7).unwrap_err();

    assert!(start.elapsed() >= TIMEOUT);
    match err {
        ShiftError::TimedOut { expected, received, .. } => {
            assert_eq!(expected, 4);
            assert_eq!(received, 2);
        }
        other => panic!("Expected TimedOut, got {:?}", other),
    }
}

// =============================================================================
// Receive Tests
// =============================================================================

#[test]
fn test_receive_numeric_field_across_fragments() {
    let stream = ScriptedStream::new(vec![
        ReadStep::Data(vec![0]),
        ReadStep::Interrupt,
        ReadStep::Data(vec![0, 0]),
        ReadStep::Data(vec![15]),
    ]);
    let mut ch = channel(stream);

    assert_eq!(ch.receive_numeric_field().unwrap(), 15);
}

#[test]
fn test_receive_numeric_field_accepts_binary_bytes() {
    let mut ch = channel(ScriptedStream::with_data(&[0xde, 0xad, 0xbe, 0xef]));
    assert_eq!(ch.receive_numeric_field().unwrap(), 0xdead_beef);
}

#[test]
fn test_receive_exact_reproduces_bytes() {
    let payload: Vec<u8> = (b'a'..=b'z').cycle().take(10_000).collect();
    let mut ch = channel(ScriptedStream::with_data(&payload).max_read(7));

    let field = ch.receive_exact(payload.len(), Validation::Lowercase).unwrap();
    assert_eq!(&field[..], &payload[..]);
}

#[test]
fn test_receive_exact_leaves_following_bytes() {
    let mut ch = channel(ScriptedStream::with_data(b"abcdef"));

    assert_eq!(&ch.receive_exact(2, Validation::None).unwrap()[..], b"ab");
    assert_eq!(&ch.receive_exact(4, Validation::None).unwrap()[..], b"cdef");
}

#[test]
fn test_receive_exact_zero_length() {
    let mut ch = channel(ScriptedStream::new(vec![]));
    assert!(ch.receive_exact(0, Validation::Lowercase).unwrap().is_empty());
}

#[test]
fn test_receive_exact_peer_close_is_truncation() {
    let mut ch = channel(ScriptedStream::with_data(b"abc"));

    let err = ch.receive_exact(5, Validation::Lowercase).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Transport);
    assert!(matches!(
        err,
        ShiftError::Truncated { expected: 5, received: 3 }
    ));
}

#[test]
fn test_truncation_wins_over_bad_content() {
    // Bad bytes in a field that never completes are a transport failure.
    let mut ch = channel(ScriptedStream::with_data(b"aB"));

    let err = ch.receive_exact(4, Validation::Lowercase).unwrap_err();
    assert!(matches!(err, ShiftError::Truncated { .. }));
}

#[test]
fn test_lowercase_validation_rejects_full_field() {
    let mut ch = channel(ScriptedStream::with_data(b"abCde"));

    let err = ch.receive_exact(5, Validation::Lowercase).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);
    match err {
        ShiftError::Validation { class, offset, byte } => {
            assert_eq!(class, Validation::Lowercase);
            assert_eq!(offset, 2);
            assert_eq!(byte, b'C');
        }
        other => panic!("Expected Validation, got {:?}", other),
    }
}

#[test]
fn test_numeric_validation() {
    let mut ch = channel(ScriptedStream::with_data(b"0042004x"));

    assert_eq!(&ch.receive_exact(4, Validation::Numeric).unwrap()[..], b"0042");
    let err = ch.receive_exact(4, Validation::Numeric).unwrap_err();
    assert!(matches!(err, ShiftError::Validation { offset: 3, .. }));
}

#[test]
fn test_oversized_field_rejected_without_reading() {
    let mut ch = channel(ScriptedStream::new(vec![]));

    let err = ch.receive_exact(MAX_FIELD_SIZE + 1, Validation::None).unwrap_err();
    assert!(matches!(err, ShiftError::FieldTooLarge { .. }));
}

#[test]
fn test_receive_stall_times_out_after_deadline() {
    let stream = ScriptedStream::new(vec![ReadStep::Data(vec![0, 0]), ReadStep::Stall]);
    let mut ch = channel(stream);

    let start = Instant::now();
    let err = ch.receive_numeric_field().unwrap_err();
    let elapsed = start.elapsed();

    assert!(elapsed >= TIMEOUT, "returned early after {:?}", elapsed);
    assert!(elapsed < TIMEOUT * 5, "returned late after {:?}", elapsed);
    assert!(matches!(
        err,
        ShiftError::TimedOut { expected: 4, received: 2, .. }
    ));
}

#[test]
fn test_unrepresentable_timeout_means_no_deadline() {
    let stream = ScriptedStream::with_data(b"abcdefgh");
    let mut ch = FramedChannel::new(stream, Duration::MAX);

    assert_eq!(&ch.receive_exact(3, Validation::Lowercase).unwrap()[..], b"abc");
    ch.send_bytes(b"xyz").unwrap();
    assert_eq!(&ch.receive_at_least(5).unwrap()[..], b"defgh");
    assert_eq!(ch.into_inner().written(), b"xyz");
}

// =============================================================================
// Open-ended Reply Tests
// =============================================================================

#[test]
fn test_receive_at_least_reads_to_close() {
    let mut ch = channel(ScriptedStream::with_data(b"lorenipsum").max_read(3));
    assert_eq!(&ch.receive_at_least(10).unwrap()[..], b"lorenipsum");
}

#[test]
fn test_receive_at_least_accepts_longer_reply() {
    let mut ch = channel(ScriptedStream::with_data(b"abcdef"));
    assert_eq!(&ch.receive_at_least(3).unwrap()[..], b"abcdef");
}

#[test]
fn test_receive_at_least_short_reply_is_protocol_error() {
    let mut ch = channel(ScriptedStream::with_data(b"abc"));

    match ch.receive_at_least(5).unwrap_err() {
        ShiftError::Protocol { expected, received, partial } => {
            assert_eq!(expected, 5);
            assert_eq!(received, 3);
            assert_eq!(partial, "abc");
        }
        other => panic!("Expected Protocol, got {:?}", other),
    }
}

#[test]
fn test_receive_at_least_open_connection_ends_at_deadline() {
    let stream = ScriptedStream::new(vec![ReadStep::Data(b"abc".to_vec()), ReadStep::Stall]);
    let mut ch = channel(stream);

    assert_eq!(&ch.receive_at_least(3).unwrap()[..], b"abc");
}

#[test]
fn test_receive_at_least_stall_is_timeout() {
    let stream = ScriptedStream::new(vec![ReadStep::Data(b"a".to_vec()), ReadStep::Stall]);
    let mut ch = channel(stream);

    let err = ch.receive_at_least(3).unwrap_err();
    assert!(matches!(err, ShiftError::TimedOut { received: 1, .. }));
}

// =============================================================================
// Loopback TCP Tests
// =============================================================================

fn tcp_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();
    (client, server)
}

#[test]
fn test_tcp_fields_round_trip() {
    let (client, server) = tcp_pair();

    let writer = thread::spawn(move || {
        let mut ch = FramedChannel::new(client, TIMEOUT);
        ch.send_numeric_field(3).unwrap();
        ch.send_bytes(b"xyz").unwrap();
    });

    let mut ch = FramedChannel::new(server, TIMEOUT);
    let len = ch.receive_numeric_field().unwrap() as usize;
    let text = ch.receive_exact(len, Validation::Lowercase).unwrap();
    assert_eq!(&text[..], b"xyz");

    writer.join().unwrap();
}

#[test]
fn test_tcp_peer_close_mid_field() {
    let (mut client, server) = tcp_pair();
    client.write_all(b"ab").unwrap();
    drop(client);

    let mut ch = FramedChannel::new(server, TIMEOUT);
    let err = ch.receive_exact(4, Validation::None).unwrap_err();
    assert!(matches!(
        err,
        ShiftError::Truncated { expected: 4, received: 2 }
    ));
}

#[test]
fn test_tcp_silent_peer_times_out() {
    let (mut client, server) = tcp_pair();
    client.write_all(b"ab").unwrap();

    let mut ch = FramedChannel::new(server, TIMEOUT);
    let start = Instant::now();
    let err = ch.receive_exact(4, Validation::None).unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, ShiftError::TimedOut { .. }));
    assert!(elapsed >= TIMEOUT, "returned early after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "returned late after {:?}", elapsed);

    // Keep the peer open until the deadline has passed.
    drop(client);
}
