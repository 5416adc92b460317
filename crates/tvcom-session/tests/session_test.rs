//! End-to-end command execution over the scripted mock link.
//!
//! Every test drives the public pipeline: `execute` with a raw code string,
//! scripted device replies, then assertions on the returned result and on
//! the journal of frames that actually hit the wire.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

use serial_test::serial;
use tvcom_link::mock::{Journal, MockDialer, MockReply};
use tvcom_link::{LinkConfig, LinkManager, PeerAddress};
use tvcom_protocol::{DeviceInstance, DeviceInventory};
use tvcom_session::{CommandError, CommandSession, StatusReading};

const STATUS_FRAME: &[u8] = b"kf 00 ff\r";

fn device(long_name: &str) -> DeviceInstance {
    DeviceInventory::standard()
        .unwrap()
        .get(long_name)
        .unwrap()
        .clone()
}

fn peer() -> PeerAddress {
    PeerAddress::serial("/dev/ttyUSB0", 9600)
}

/// Session wired to a mock dialer; push scripts on the returned dialer.
fn harness() -> (CommandSession, MockDialer, Journal) {
    let journal = Journal::new();
    let dialer = MockDialer::new(journal.clone());
    let manager = LinkManager::new(Box::new(dialer.clone()), LinkConfig::default());
    (CommandSession::new(Arc::new(manager)), dialer, journal)
}

fn ok_reply(value: &str) -> MockReply {
    MockReply::Frame(format!("a 01 OK{value}x").into_bytes())
}

fn nack_reply() -> MockReply {
    MockReply::Frame(b"a 01 NG00x".to_vec())
}

#[test]
fn test_named_commands_round_trip_every_standard_code() {
    let (session, dialer, journal) = harness();
    // Echo device: validate the frame shape, acknowledge with the keycode.
    dialer.push_responder(|frame| {
        assert_eq!(frame.len(), 9, "unexpected frame {frame:?}");
        assert_eq!(&frame[2..6], b" 00 ", "unexpected frame {frame:?}");
        assert_eq!(frame[8], b'\r', "unexpected frame {frame:?}");
        let keycode = String::from_utf8_lossy(&frame[6..8]).into_owned();
        MockReply::Frame(format!("a 01 OK{keycode}x").into_bytes())
    });

    let inventory = DeviceInventory::standard().unwrap();
    let mut executed = 0;
    for dev in inventory.iter() {
        for (keycode, name) in dev.table().entries() {
            if name == "status" {
                continue;
            }
            let result = session.execute(dev, &peer(), name).unwrap();
            assert_eq!(result.raw_status, "OK");
            assert_eq!(result.raw_value, keycode);
            assert_eq!(result.reading, None);
            executed += 1;
        }
    }

    assert_eq!(journal.sent_frames().len(), executed);
    assert_eq!(journal.dial_count(), 1, "one shared link for the whole run");
}

#[test]
fn test_status_query_decodes_slider_level() {
    let (session, dialer, journal) = harness();
    dialer.push_script([ok_reply("28")]);

    let result = session.execute(&device("volume"), &peer(), "status").unwrap();

    assert_eq!(result.raw_value, "28");
    assert_eq!(result.reading, Some(StatusReading::Level(40)));
    assert_eq!(journal.sent_frames(), vec![STATUS_FRAME.to_vec()]);
}

#[test]
fn test_status_query_decodes_named_code() {
    let (session, dialer, _journal) = harness();
    dialer.push_script([ok_reply("90")]);

    let result = session.execute(&device("input"), &peer(), "status").unwrap();

    assert_eq!(result.reading, Some(StatusReading::Named("hdmi1".to_string())));
}

#[test]
fn test_status_query_passes_unmapped_value_through() {
    let (session, dialer, _journal) = harness();
    dialer.push_script([ok_reply("77")]);

    let result = session.execute(&device("input"), &peer(), "status").unwrap();

    assert_eq!(result.reading, Some(StatusReading::Raw("77".to_string())));
}

#[test]
fn test_relative_down_resolves_against_current_level() {
    let (session, dialer, journal) = harness();
    // Device reports level 40; -15 must land at 25 (0x19).
    dialer.push_script([ok_reply("28"), ok_reply("19")]);

    let result = session.execute(&device("volume"), &peer(), "-15").unwrap();

    assert_eq!(result.raw_status, "OK");
    assert_eq!(
        journal.sent_frames(),
        vec![STATUS_FRAME.to_vec(), b"kf 00 19\r".to_vec()],
        "status query first, then the resolved write"
    );
}

#[test]
fn test_relative_up_is_exactly_two_exchanges() {
    let (session, dialer, journal) = harness();
    dialer.push_script([ok_reply("28"), ok_reply("2d")]);

    session.execute(&device("volume"), &peer(), "+5").unwrap();

    assert_eq!(
        journal.sent_frames(),
        vec![STATUS_FRAME.to_vec(), b"kf 00 2d\r".to_vec()]
    );
}

#[test]
fn test_relative_clamps_at_zero() {
    let (session, dialer, journal) = harness();
    dialer.push_script([ok_reply("0a"), ok_reply("00")]);

    session.execute(&device("volume"), &peer(), "-50").unwrap();

    assert_eq!(journal.sent_frames()[1], b"kf 00 00\r".to_vec());
}

#[test]
fn test_relative_aborts_after_status_nack() {
    let (session, dialer, journal) = harness();
    dialer.push_script([nack_reply()]);

    let err = session
        .execute(&device("volume"), &peer(), "+5")
        .unwrap_err();

    assert!(matches!(err, CommandError::DeviceNack { .. }), "got {err:?}");
    assert_eq!(
        journal.sent_frames(),
        vec![STATUS_FRAME.to_vec()],
        "no write after a failed status query"
    );
}

#[test]
fn test_relative_aborts_on_non_level_status_value() {
    let (session, dialer, journal) = harness();
    dialer.push_script([ok_reply("zz")]);

    let err = session
        .execute(&device("volume"), &peer(), "+5")
        .unwrap_err();

    match err {
        CommandError::UnexpectedReply { value } => assert_eq!(value, "zz"),
        other => panic!("expected UnexpectedReply, got {other:?}"),
    }
    assert_eq!(journal.sent_frames().len(), 1);
}

#[test]
fn test_invalid_code_never_touches_the_wire() {
    let (session, _dialer, journal) = harness();

    for (dev, code) in [
        ("power", "abc"),
        ("power", "42"),
        ("volume", "1234"),
        ("volume", "+"),
        ("volume", ""),
    ] {
        let err = session.execute(&device(dev), &peer(), code).unwrap_err();
        assert!(
            matches!(err, CommandError::InvalidCommand { .. }),
            "{dev}/{code:?} should be invalid, got {err:?}"
        );
    }

    assert!(journal.is_empty(), "no dial, no frames: {:?}", journal.events());
}

#[test]
fn test_write_nack_maps_to_device_nack() {
    let (session, dialer, _journal) = harness();
    dialer.push_script([nack_reply()]);

    let err = session.execute(&device("power"), &peer(), "on").unwrap_err();

    match err {
        CommandError::DeviceNack { status } => assert_eq!(status, "NG"),
        other => panic!("expected DeviceNack, got {other:?}"),
    }
}

#[test]
fn test_silent_device_maps_to_timeout() {
    let (session, dialer, _journal) = harness();
    dialer.push_script([MockReply::Silence]);

    let err = session.execute(&device("power"), &peer(), "on").unwrap_err();
    assert!(matches!(err, CommandError::Timeout { .. }), "got {err:?}");
}

#[test]
fn test_hangup_maps_to_no_response() {
    let (session, dialer, _journal) = harness();
    dialer.push_script([MockReply::Hangup]);

    let err = session.execute(&device("power"), &peer(), "on").unwrap_err();
    assert!(matches!(err, CommandError::NoResponse), "got {err:?}");
}

#[test]
fn test_partial_reply_maps_to_short_frame() {
    let (session, dialer, _journal) = harness();
    dialer.push_script([MockReply::Frame(b"a 01".to_vec())]);

    let err = session.execute(&device("power"), &peer(), "on").unwrap_err();
    assert!(
        matches!(
            err,
            CommandError::ShortFrame {
                expected: 10,
                actual: 4
            }
        ),
        "got {err:?}"
    );
}

#[test]
fn test_unreachable_peer_maps_to_no_response() {
    let (session, _dialer, journal) = harness();
    // No scripts queued: the dial itself fails.

    let err = session.execute(&device("power"), &peer(), "on").unwrap_err();

    assert!(matches!(err, CommandError::NoResponse), "got {err:?}");
    assert_eq!(journal.dial_count(), 0);
}

#[test]
#[serial]
fn test_concurrent_relative_commands_do_not_interleave() {
    let journal = Journal::new();
    let dialer = MockDialer::new(journal.clone());

    // Emulated device: status reports the level, writes replace it.
    let level = Arc::new(AtomicU8::new(40));
    let emulated = level.clone();
    dialer.push_responder(move |frame| {
        let keycode = String::from_utf8_lossy(&frame[6..8]).into_owned();
        if keycode == "ff" {
            let current = emulated.load(Ordering::SeqCst);
            MockReply::Frame(format!("f 01 OK{current:02x}x").into_bytes())
        } else {
            match u8::from_str_radix(&keycode, 16) {
                Ok(target) => {
                    emulated.store(target, Ordering::SeqCst);
                    MockReply::Frame(format!("f 01 OK{keycode}x").into_bytes())
                }
                Err(_) => MockReply::Hangup,
            }
        }
    });

    let manager = LinkManager::new(Box::new(dialer), LinkConfig::default());
    let session = Arc::new(CommandSession::new(Arc::new(manager)));

    let mut handles = Vec::new();
    for delta in ["+5", "-5"] {
        let session = session.clone();
        handles.push(thread::spawn(move || {
            let volume = device("volume");
            for _ in 0..4 {
                session.execute(&volume, &peer(), delta).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Balanced deltas from 40 never clamp, so any serial order ends at 40.
    assert_eq!(level.load(Ordering::SeqCst), 40);

    // Each command's two frames must sit adjacent in the journal.
    let frames = journal.sent_frames();
    assert_eq!(frames.len(), 16);
    for pair in frames.chunks(2) {
        assert_eq!(
            pair[0],
            STATUS_FRAME.to_vec(),
            "every command opens with its status query: {frames:?}"
        );
        assert_ne!(
            pair[1],
            STATUS_FRAME.to_vec(),
            "every status query is followed by its own write: {frames:?}"
        );
    }
    assert_eq!(journal.dial_count(), 1);
}

#[test]
#[serial]
fn test_concurrent_mixed_commands_keep_exchange_pairs_contiguous() {
    let journal = Journal::new();
    let dialer = MockDialer::new(journal.clone());
    let emulated = Arc::new(AtomicU8::new(50));
    let level = emulated.clone();
    dialer.push_responder(move |frame| {
        let keycode = String::from_utf8_lossy(&frame[6..8]).into_owned();
        if keycode == "ff" {
            let current = level.load(Ordering::SeqCst);
            MockReply::Frame(format!("f 01 OK{current:02x}x").into_bytes())
        } else {
            if let Ok(target) = u8::from_str_radix(&keycode, 16) {
                level.store(target, Ordering::SeqCst);
            }
            MockReply::Frame(format!("f 01 OK{keycode}x").into_bytes())
        }
    });

    let manager = LinkManager::new(Box::new(dialer), LinkConfig::default());
    let session = Arc::new(CommandSession::new(Arc::new(manager)));

    let adjuster = {
        let session = session.clone();
        thread::spawn(move || {
            let volume = device("volume");
            for _ in 0..8 {
                session.execute(&volume, &peer(), "+0").unwrap();
            }
        })
    };
    let reader = {
        let session = session.clone();
        thread::spawn(move || {
            let volume = device("volume");
            for _ in 0..8 {
                let result = session.execute(&volume, &peer(), "status").unwrap();
                // The emulated level only ever holds 0x32; a torn exchange
                // would surface some other token here.
                assert_eq!(result.reading, Some(StatusReading::Level(50)));
            }
        })
    };
    adjuster.join().unwrap();
    reader.join().unwrap();

    // "+0" rewrites the current level, so nothing may drift.
    assert_eq!(emulated.load(Ordering::SeqCst), 50);
    assert_eq!(journal.sent_frames().len(), 8 * 2 + 8);
}
