//! Integration tests for the DeviceSession event dispatch.
//!
//! Drives the session with link events and timer ticks against the mock
//! adapters and checks the frames on the wire, the display and the feeder.

use super::mock_hw::{MockHardware, MockLink};

use aquanode::app::identity::DeviceIdentity;
use aquanode::app::session::{DeviceSession, SessionState};
use aquanode::error::{Error, LinkError, MalformedKind};
use aquanode::events::Event;

const ACTIVATE: &str = r#"{"action":"activate"}"#;
const DEACTIVATE: &str = r#"{"action":"deactivate"}"#;
const FEED: &str = r#"{"action":"feed"}"#;

struct Rig {
    session: DeviceSession,
    hw: MockHardware,
    link: MockLink,
}

impl Rig {
    fn new() -> Self {
        let mut rig = Self {
            session: DeviceSession::new(DeviceIdentity::new("ESP32_001").unwrap(), 2000),
            hw: MockHardware::new(),
            link: MockLink::new(),
        };
        rig.session.start(&mut rig.hw);
        rig
    }

    fn send(&mut self, event: Event) {
        self.session.handle(event, &mut self.link, &mut self.hw);
    }

    fn text(&mut self, frame: &str) {
        self.send(Event::text(frame));
    }

    fn connected_and_active() -> Self {
        let mut rig = Self::new();
        rig.send(Event::Connected);
        rig.text(ACTIVATE);
        rig
    }
}

// ── Scenario A: connect → identify ────────────────────────────

#[test]
fn connect_sends_identify_and_shows_status() {
    let mut rig = Rig::new();
    assert!(rig.hw.shows("WS: Disconnected", "Device: Inactive"));

    rig.send(Event::Connected);

    assert_eq!(
        rig.link.sent,
        [r#"{"action":"identify","unique_address":"ESP32_001"}"#]
    );
    assert!(rig.hw.shows("WS: Connected", "Device: Inactive"));
    assert_eq!(
        rig.session.state(),
        SessionState {
            connected: true,
            active: false
        }
    );
}

// ── Scenario B: activate + tick → telemetry ───────────────────

#[test]
fn tick_while_active_sends_one_telemetry_frame() {
    let mut rig = Rig::connected_and_active();
    rig.hw.advance(700);
    rig.send(Event::TimerTick);

    assert_eq!(rig.link.actions(), ["identify", "water_parameters"]);
    let frame = &rig.link.frames()[1];
    assert_eq!(frame["unique_address"], "ESP32_001");
    let p = &frame["parameters"];
    assert_eq!(p["ph"], 2048.0);
    assert_eq!(p["temperature"], 24.5);
    assert_eq!(p["salinity"], 1000.0);
    assert_eq!(p["oxygen_level"], 3000.0);
    assert_eq!(p["measured_at"], "700");

    assert!(rig.hw.shows("T:24.5 pH:2048.0", "S:1000.0 O2:3000"));
    assert_eq!(rig.session.last_telemetry_ms(), Some(700));
}

// ── Scenario C: feed while active ─────────────────────────────

#[test]
fn feed_dispenses_once_then_reports_and_samples() {
    let mut rig = Rig::connected_and_active();
    rig.text(r#"{"action":"feed","food_type":"flakes","quantity":3}"#);

    assert_eq!(rig.hw.dispenses, 1);
    assert_eq!(rig.link.actions(), ["identify", "feed_result", "water_parameters"]);
    assert_eq!(rig.link.frames()[1]["success"], true);
    assert_eq!(rig.link.frames()[1]["unique_address"], "ESP32_001");

    // Banner, 2 s hold, then the value view from the follow-up cycle.
    assert!(rig.hw.writes.iter().any(|(row, t)| *row == 0 && t == "Feeding..."));
    assert_eq!(rig.hw.delays, [2000]);
    assert_eq!(rig.link.frames()[2]["parameters"]["measured_at"], "2000");
    assert!(rig.hw.shows("T:24.5 pH:2048.0", "S:1000.0 O2:3000"));
    assert_eq!(rig.session.stats().feeds, 1);
}

#[test]
fn failed_dispense_reports_failure_and_still_samples() {
    let mut rig = Rig::connected_and_active();
    rig.hw.fail_dispense = true;
    rig.text(FEED);

    assert_eq!(rig.link.actions(), ["identify", "feed_result", "water_parameters"]);
    assert_eq!(rig.link.frames()[1]["success"], false);
    assert_eq!(rig.session.stats().failed_feeds, 1);
}

#[test]
fn feed_with_odd_details_still_dispenses() {
    let mut rig = Rig::connected_and_active();
    rig.text(r#"{"action":"feed","quantity":1.5}"#);
    rig.text(r#"{"action":"feed","quantity":"1","food_type":7}"#);

    assert_eq!(rig.hw.dispenses, 2);
    assert_eq!(rig.link.count("feed_result"), 2);
    assert_eq!(rig.session.stats().rejected_frames, 0);
}

#[test]
fn activate_with_stray_fields_activates() {
    let mut rig = Rig::new();
    rig.send(Event::Connected);
    rig.text(r#"{"action":"activate","food_type":7}"#);
    assert!(rig.session.is_active());
}

#[test]
fn feed_while_inactive_does_nothing() {
    let mut rig = Rig::new();
    rig.send(Event::Connected);
    rig.text(FEED);

    assert_eq!(rig.hw.dispenses, 0);
    assert_eq!(rig.link.actions(), ["identify"]);
    assert!(rig.hw.delays.is_empty());
}

// ── Scenario D: deactivate ────────────────────────────────────

#[test]
fn deactivate_stops_telemetry_until_reactivated() {
    let mut rig = Rig::connected_and_active();
    rig.send(Event::TimerTick);
    rig.text(DEACTIVATE);

    assert!(!rig.session.is_active());
    assert!(rig.hw.shows("WS: Connected", "Device: Inactive"));

    rig.link.clear();
    for _ in 0..5 {
        rig.hw.advance(600);
        rig.send(Event::TimerTick);
    }
    assert!(rig.link.sent.is_empty());

    rig.text(ACTIVATE);
    rig.send(Event::TimerTick);
    assert_eq!(rig.link.actions(), ["water_parameters"]);
}

// ── Scenario E: malformed frame ───────────────────────────────

#[test]
fn malformed_frame_changes_nothing() {
    let mut rig = Rig::connected_and_active();
    let before = rig.session.state();
    let writes = rig.hw.writes.len();

    rig.text("{not json");

    assert_eq!(rig.session.state(), before);
    assert_eq!(rig.link.actions(), ["identify"]);
    assert_eq!(rig.hw.writes.len(), writes);
    assert_eq!(rig.session.stats().rejected_frames, 1);
    assert_eq!(
        rig.session.last_error(),
        Some(Error::Link(LinkError::Malformed(MalformedKind::Syntax)))
    );
}

#[test]
fn unknown_action_is_ignored_without_counting_as_rejected() {
    let mut rig = Rig::connected_and_active();
    rig.text(r#"{"action":"reboot"}"#);
    rig.text(r#"{"hello":"world"}"#);
    rig.text(r#"{"action":7}"#);
    assert!(rig.session.is_active());
    assert_eq!(rig.session.stats().rejected_frames, 0);
    assert_eq!(rig.link.actions(), ["identify"]);
}

// ── Connection lifecycle ──────────────────────────────────────

#[test]
fn active_survives_reconnect_and_identify_comes_first() {
    let mut rig = Rig::connected_and_active();
    rig.send(Event::Disconnected);

    assert!(!rig.session.is_connected());
    assert!(rig.session.is_active());

    rig.link.clear();
    rig.send(Event::Connected);
    rig.send(Event::TimerTick);

    // No fresh activate needed; identify still leads.
    assert_eq!(rig.link.actions(), ["identify", "water_parameters"]);
    assert_eq!(rig.session.stats().connects, 2);
}

#[test]
fn tick_before_the_session_sees_a_reconnect_sends_nothing() {
    let mut rig = Rig::connected_and_active();
    rig.send(Event::Disconnected);
    rig.link.clear();

    // The transport accepts frames again, but no Connected event yet.
    rig.send(Event::TimerTick);
    assert!(rig.link.sent.is_empty());
    assert!(rig.hw.shows("T:24.5 pH:2048.0", "S:1000.0 O2:3000"));

    rig.send(Event::Connected);
    rig.send(Event::TimerTick);
    assert_eq!(rig.link.actions(), ["identify", "water_parameters"]);
}

#[test]
fn disconnect_shows_status_even_while_active() {
    let mut rig = Rig::connected_and_active();
    rig.send(Event::TimerTick);
    rig.send(Event::Disconnected);
    assert!(rig.hw.shows("WS: Disconnected", "Device: Active"));
}

#[test]
fn telemetry_while_link_down_is_counted_not_fatal() {
    let mut rig = Rig::connected_and_active();
    rig.link.down = true;
    rig.send(Event::TimerTick);

    assert_eq!(rig.session.stats().send_failures, 1);
    assert_eq!(rig.session.stats().telemetry_sent, 0);
    assert!(rig.session.is_active());
}

#[test]
fn transport_error_and_keepalives_leave_state_alone() {
    let mut rig = Rig::connected_and_active();
    let before = rig.session.state();
    rig.send(Event::Error(LinkError::Transport(-1)));
    rig.send(Event::Ping);
    rig.send(Event::Pong);
    assert_eq!(rig.session.state(), before);
    assert_eq!(rig.link.actions(), ["identify"]);
}

#[test]
fn failed_temperature_goes_out_as_null() {
    let mut rig = Rig::connected_and_active();
    rig.hw.temperature = f32::NAN;
    rig.send(Event::TimerTick);

    let p = &rig.link.frames()[1]["parameters"];
    assert!(p["temperature"].is_null());
    assert_eq!(p["ph"], 2048.0);
    assert_eq!(rig.hw.rows[0], "T:NaN pH:2048.0");
}

// ── Idle view ─────────────────────────────────────────────────

#[test]
fn idle_refresh_only_redraws_while_inactive() {
    let mut rig = Rig::connected_and_active();
    rig.send(Event::TimerTick);
    rig.session.refresh_idle_view(&mut rig.hw);
    assert!(rig.hw.shows("T:24.5 pH:2048.0", "S:1000.0 O2:3000"));

    rig.text(DEACTIVATE);
    rig.hw.rows = [String::new(), String::new()];
    rig.session.refresh_idle_view(&mut rig.hw);
    assert!(rig.hw.shows("WS: Connected", "Device: Inactive"));
}
