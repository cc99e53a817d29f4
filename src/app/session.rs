//! Device session — the hexagonal core.
//!
//! [`DeviceSession`] owns the two session flags and reacts to every
//! [`Event`] the control loop hands it. All I/O flows through port traits
//! injected at call sites, so the whole session runs against mocks in tests.
//!
//! ```text
//!   LinkPort ◀──┐  ┌───────────────────────┐  ┌──▶ SensorPort
//!               └──│     DeviceSession     │──┼──▶ DisplayPort
//!   Event ────────▶│  connected · active   │──┼──▶ FeederPort
//!                  └───────────────────────┘  └──▶ ClockPort
//! ```
//!
//! `connected` follows the transport. `active` is only ever changed by the
//! server's `activate` / `deactivate` commands and survives reconnects.

use log::{debug, info, warn};

use crate::error::{Error, LinkError};
use crate::events::Event;

use super::commands::{FeedRequest, InboundCommand, parse_command};
use super::identity::DeviceIdentity;
use super::messages::{OutboundMessage, SensorReading};
use super::ports::{ClockPort, DisplayPort, FeederPort, LinkPort, SensorPort};
use super::screens;

// ───────────────────────────────────────────────────────────────
// State
// ───────────────────────────────────────────────────────────────

/// The two independent session flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Transport link currently up.
    pub connected: bool,
    /// Server has authorised telemetry and feeding.
    pub active: bool,
}

/// Running counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub connects: u32,
    pub identifies_sent: u32,
    pub telemetry_sent: u32,
    pub feeds: u32,
    pub failed_feeds: u32,
    pub rejected_frames: u32,
    pub send_failures: u32,
}

// ───────────────────────────────────────────────────────────────
// DeviceSession
// ───────────────────────────────────────────────────────────────

pub struct DeviceSession {
    identity: DeviceIdentity,
    state: SessionState,
    /// Banner hold after a dispense (ms).
    feed_settle_ms: u32,
    last_telemetry_ms: Option<u64>,
    last_error: Option<Error>,
    stats: SessionStats,
}

impl DeviceSession {
    /// Fresh session: disconnected and inactive.
    pub fn new(identity: DeviceIdentity, feed_settle_ms: u32) -> Self {
        Self {
            identity,
            state: SessionState::default(),
            feed_settle_ms,
            last_telemetry_ms: None,
            last_error: None,
            stats: SessionStats::default(),
        }
    }

    /// Show the initial status view before the first event arrives.
    pub fn start(&mut self, hw: &mut impl DisplayPort) {
        info!("Session for {} started", self.identity);
        self.show_status(hw);
    }

    // ── Event dispatch ────────────────────────────────────────

    /// React to one event. Runs to completion; a feed blocks for the
    /// whole sweep and settle hold.
    ///
    /// `hw` satisfies every hardware port at once, which avoids a double
    /// mutable borrow while keeping the port boundary explicit.
    pub fn handle(
        &mut self,
        event: Event,
        link: &mut impl LinkPort,
        hw: &mut (impl SensorPort + DisplayPort + FeederPort + ClockPort),
    ) {
        match event {
            Event::Connected => self.on_connected(link, hw),
            Event::Disconnected => {
                info!("Link down");
                self.state.connected = false;
                self.show_status(hw);
            }
            Event::Text(frame) => self.on_text(&frame, link, hw),
            Event::Error(e) => {
                warn!("Link error: {}", e);
                self.last_error = Some(e.into());
            }
            Event::Ping => debug!("Ping"),
            Event::Pong => debug!("Pong"),
            Event::TimerTick => self.telemetry_cycle(link, hw),
        }
    }

    /// Telemetry Cycle: sample, report, and show the values.
    /// Does nothing unless active. While the session is not connected the
    /// values are still sampled and shown but nothing is sent, so the
    /// first frame on a new connection is always the identify.
    pub fn telemetry_cycle(
        &mut self,
        link: &mut impl LinkPort,
        hw: &mut (impl SensorPort + DisplayPort + ClockPort),
    ) {
        if !self.state.active {
            return;
        }

        let now = hw.uptime_ms();
        let reading = SensorReading {
            ph: hw.read_ph(),
            temperature: hw.read_temperature(),
            salinity: hw.read_salinity(),
            oxygen: hw.read_oxygen(),
            measured_at_ms: now,
        };

        info!(
            "Telemetry: T={:.1} pH={:.1} S={:.1} O2={:.1}",
            reading.temperature, reading.ph, reading.salinity, reading.oxygen
        );
        let msg = OutboundMessage::Telemetry {
            unique_address: self.identity.as_str(),
            parameters: reading,
        };
        let (action, encoded) = (msg.action(), msg.encode());
        if self.state.connected && self.deliver(link, action, encoded) {
            self.stats.telemetry_sent += 1;
        }
        self.show(hw, &screens::values_screen(&reading));
        self.last_telemetry_ms = Some(now);
    }

    /// Redraw the status view while inactive. The display skips
    /// unchanged rows, so calling this every loop pass is fine.
    pub fn refresh_idle_view(&mut self, hw: &mut impl DisplayPort) {
        if !self.state.active {
            self.show_status(hw);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Uptime of the most recent telemetry cycle.
    pub fn last_telemetry_ms(&self) -> Option<u64> {
        self.last_telemetry_ms
    }

    /// Most recent non-fatal error, if any.
    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    // ── Internals ─────────────────────────────────────────────

    fn on_connected(&mut self, link: &mut impl LinkPort, hw: &mut impl DisplayPort) {
        info!("Link up, identifying as {}", self.identity);
        self.state.connected = true;
        self.stats.connects += 1;
        let msg = OutboundMessage::Identify {
            unique_address: self.identity.as_str(),
        };
        let (action, encoded) = (msg.action(), msg.encode());
        if self.deliver(link, action, encoded) {
            self.stats.identifies_sent += 1;
        }
        self.show_status(hw);
    }

    fn on_text(
        &mut self,
        frame: &str,
        link: &mut impl LinkPort,
        hw: &mut (impl SensorPort + DisplayPort + FeederPort + ClockPort),
    ) {
        let cmd = match parse_command(frame) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => {
                debug!("Ignoring frame without a known action");
                return;
            }
            Err(e) => {
                warn!("Rejected inbound frame: {}", e);
                self.stats.rejected_frames += 1;
                self.last_error = Some(e.into());
                return;
            }
        };

        match cmd {
            InboundCommand::Activate => {
                if !self.state.active {
                    info!("Activated by server");
                }
                self.state.active = true;
            }
            InboundCommand::Deactivate => {
                if self.state.active {
                    info!("Deactivated by server");
                }
                self.state.active = false;
                self.show_status(hw);
            }
            InboundCommand::Feed(req) => self.on_feed(req, link, hw),
        }
    }

    fn on_feed(
        &mut self,
        req: FeedRequest,
        link: &mut impl LinkPort,
        hw: &mut (impl SensorPort + DisplayPort + FeederPort + ClockPort),
    ) {
        if !self.state.active {
            info!("Feed ignored: device inactive");
            return;
        }

        info!(
            "Feeding (food_type={}, quantity={})",
            req.food_type.as_deref().unwrap_or("-"),
            req.quantity.unwrap_or(1)
        );

        let success = match hw.dispense() {
            Ok(()) => {
                self.stats.feeds += 1;
                true
            }
            Err(e) => {
                warn!("Dispense failed: {}", e);
                self.stats.failed_feeds += 1;
                self.last_error = Some(e.into());
                false
            }
        };

        let msg = OutboundMessage::FeedResult {
            success,
            unique_address: self.identity.as_str(),
        };
        let (action, encoded) = (msg.action(), msg.encode());
        if self.state.connected {
            self.deliver(link, action, encoded);
        }

        self.show(hw, &screens::feeding_screen());
        hw.delay_ms(self.feed_settle_ms);

        self.telemetry_cycle(link, hw);
    }

    /// Send an encoded frame; failures are logged and recorded, never fatal.
    fn deliver(
        &mut self,
        link: &mut impl LinkPort,
        action: &'static str,
        encoded: serde_json::Result<String>,
    ) -> bool {
        let frame = match encoded {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode {}: {}", action, e);
                self.stats.send_failures += 1;
                return false;
            }
        };

        match link.send_text(&frame) {
            Ok(()) => {
                debug!("Sent {}", action);
                true
            }
            Err(e) => {
                warn!("Failed to send {}: {}", action, e);
                self.stats.send_failures += 1;
                self.last_error = Some(e.into());
                false
            }
        }
    }

    fn show_status(&mut self, hw: &mut impl DisplayPort) {
        let screen = screens::status_screen(self.state.connected, self.state.active);
        self.show(hw, &screen);
    }

    fn show(&mut self, hw: &mut impl DisplayPort, screen: &screens::Screen) {
        if let Err(e) = hw.show(screen) {
            warn!("Display write failed: {}", e);
            self.last_error = Some(e.into());
        }
    }
}
