mod common;

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use common::{FixedClock, MemoryEventLog};
use doorhub::frame::{decode, encode, open, seal, DoorState, PresharedKey, RawFrame, TelemetryRecord};
use doorhub::uplink::{ConnectivityManager, LinkState, RetryPolicy, Uplink};
use doorhub::validate::{Classification, Validator, DEFAULT_EXPECTED_TAG};
use doorhub::{
    Coordinator, Dispatch, FileEventLog, Hub, HubConfig, HubExit, TextDisplay, REJECTED_MESSAGE,
};
use doorhub_radio::MockRadio;
use doorhub_uplink::{RecordingDelay, ScriptedSession};
use proptest::prelude::*;

type Link = ConnectivityManager<ScriptedSession, RecordingDelay>;

fn key() -> PresharedKey {
    PresharedKey::new(b"K").expect("key")
}

fn door_frame(key: &PresharedKey, tag: u16, state: DoorState) -> RawFrame {
    seal(&encode(&TelemetryRecord::new(tag, state, 3, 3300)), key)
}

fn link(session: ScriptedSession, max_attempts: u32) -> Link {
    let policy = RetryPolicy {
        max_attempts,
        retry_delay: Duration::from_secs(5),
    };
    ConnectivityManager::with_delay(session, policy, RecordingDelay::default())
}

fn coordinator<L: doorhub::EventLog>(
    session: ScriptedSession,
    log: L,
) -> Coordinator<TextDisplay<Vec<u8>>, Link, L, FixedClock> {
    Coordinator::new(
        key(),
        Validator::new(),
        TextDisplay::new(Vec::new()),
        link(session, 3),
        log,
        FixedClock("21:04:17"),
    )
}

#[test]
fn open_door_is_displayed_published_and_logged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("aLog.txt");
    let record = TelemetryRecord::new(DEFAULT_EXPECTED_TAG, DoorState::Open, 3, 3300);
    let frame = seal(&encode(&record), &key());

    assert_eq!(decode(&open(&frame, &key())), record);
    assert_eq!(Validator::new().classify(&record), Classification::Valid);

    let mut hub = coordinator(ScriptedSession::reachable(), FileEventLog::new(&log_path));
    let result = hub.handle(&frame);
    assert!(matches!(result, Dispatch::Delivered { logged: true, .. }));

    assert_eq!(hub.display().screen(), &["SID: 3 V:3300", "Status: OPEN"]);
    let log = std::fs::read_to_string(&log_path).expect("log written");
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("OPEN\tpublishSuc: YES"), "{}", lines[0]);
}

#[test]
fn wrong_key_is_rejected_without_log() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("aLog.txt");
    let sender = PresharedKey::new(b"not-K").expect("key");

    let mut hub = coordinator(ScriptedSession::reachable(), FileEventLog::new(&log_path));
    let result = hub.handle(&door_frame(&sender, DEFAULT_EXPECTED_TAG, DoorState::Open));

    assert_eq!(result, Dispatch::Rejected);
    assert_eq!(hub.display().screen(), &[REJECTED_MESSAGE]);
    assert!(!log_path.exists());
    assert_eq!(hub.uplink().session().publish_attempts(), 0);
}

#[test]
fn three_connect_failures_halt_before_publish() {
    let mut hub = coordinator(ScriptedSession::unreachable(), MemoryEventLog::new());
    let frame = door_frame(&key(), DEFAULT_EXPECTED_TAG, DoorState::Open);

    for _ in 0..4 {
        assert!(hub.handle(&frame).is_halted());
    }

    let link = hub.uplink();
    assert_eq!(link.state(), LinkState::Halted);
    assert_eq!(link.session().connect_attempts(), 3);
    assert_eq!(link.session().publish_attempts(), 0);
    assert_eq!(link.delay().waits(), &[Duration::from_secs(5); 3]);
    assert!(hub.event_log().entries().is_empty());
}

#[test]
fn rejected_publish_is_logged_as_no() {
    let session = ScriptedSession::reachable().with_publish_default(false);
    let mut hub = coordinator(session, MemoryEventLog::new());

    let result = hub.handle(&door_frame(&key(), DEFAULT_EXPECTED_TAG, DoorState::Closed));

    let Dispatch::Delivered { outcome, logged } = result else {
        panic!("expected delivery");
    };
    assert!(!outcome.published);
    assert!(logged);
    assert_eq!(hub.event_log().entries(), &["21:04:17\tCLOSED\tpublishSuc: NO"]);
}

#[test]
fn log_entry_differs_only_in_publish_field() {
    let mut ok = coordinator(ScriptedSession::reachable(), MemoryEventLog::new());
    let session = ScriptedSession::reachable().with_publish_default(false);
    let mut failed = coordinator(session, MemoryEventLog::new());
    let frame = door_frame(&key(), DEFAULT_EXPECTED_TAG, DoorState::Open);

    ok.handle(&frame);
    failed.handle(&frame);

    let ok = ok.event_log().entries();
    let failed = failed.event_log().entries();
    assert_eq!(ok.len(), 1);
    assert_eq!(failed.len(), 1);
    assert_eq!(
        ok[0].trim_end_matches("YES"),
        failed[0].trim_end_matches("NO")
    );
}

#[test]
fn retry_budget_is_configurable() {
    for budget in 1..=5u32 {
        let mut link = link(ScriptedSession::unreachable(), budget);
        assert_eq!(link.ensure_connected(), LinkState::Halted);
        assert_eq!(link.session().connect_attempts(), budget as usize);
        assert!(!link.publish("OPEN"));
    }
}

#[test]
fn hub_preserves_arrival_order() {
    let k = key();
    let radio = MockRadio::from_frames([
        door_frame(&k, DEFAULT_EXPECTED_TAG, DoorState::Open),
        door_frame(&k, 1, DoorState::Open),
        door_frame(&k, DEFAULT_EXPECTED_TAG, DoorState::Closed),
        door_frame(&k, DEFAULT_EXPECTED_TAG, DoorState::Open),
    ]);
    let mut hub = Hub::new(
        radio,
        coordinator(ScriptedSession::reachable(), MemoryEventLog::new()),
        HubConfig::default(),
    );

    assert_eq!(
        hub.run(&AtomicBool::new(false)).expect("run"),
        HubExit::SourceClosed
    );
    let coordinator = hub.coordinator();
    assert_eq!(
        coordinator.uplink().session().published(),
        &["OPEN", "CLOSED", "OPEN"]
    );
    assert_eq!(coordinator.event_log().entries().len(), 3);
    assert_eq!(hub.stats().rejected, 1);
}

proptest! {
    #[test]
    fn invalid_tags_never_publish_or_log(tag in any::<u16>().prop_filter("not expected", |t| *t != DEFAULT_EXPECTED_TAG)) {
        let mut hub = coordinator(ScriptedSession::reachable(), MemoryEventLog::new());
        let result = hub.handle(&door_frame(&key(), tag, DoorState::Open));

        prop_assert_eq!(result, Dispatch::Rejected);
        prop_assert_eq!(hub.uplink().session().connect_attempts(), 0);
        prop_assert!(hub.event_log().entries().is_empty());
    }

    #[test]
    fn every_valid_frame_logs_once(accept in any::<bool>(), open_door in any::<bool>()) {
        let session = ScriptedSession::reachable().with_publish_default(accept);
        let mut hub = coordinator(session, MemoryEventLog::new());
        let state = if open_door { DoorState::Open } else { DoorState::Closed };
        hub.handle(&door_frame(&key(), DEFAULT_EXPECTED_TAG, state));

        let entries = hub.event_log().entries();
        prop_assert_eq!(entries.len(), 1);
        let suffix = if accept { "YES" } else { "NO" };
        prop_assert!(entries[0].ends_with(suffix));
    }
}
