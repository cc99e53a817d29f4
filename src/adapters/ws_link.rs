//! WebSocket transport link to the aquarium server.
//!
//! Implements [`LinkPort`] for outbound frames. Inbound traffic never
//! reaches the session directly: the client's callbacks translate every
//! transport event into an [`Event`] and push it onto the shared
//! [`EventQueue`], which the control loop drains.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::ws::client::EspWebSocketClient`,
//!   which runs its own task and reconnects on a fixed interval.
//! - **all other targets**: a loopback that plays the server. It reports
//!   a connection at start, answers `identify` with `activate`, and logs
//!   every outbound frame.

use log::{debug, info};

use crate::app::ports::LinkPort;
use crate::config::NodeConfig;
use crate::error::LinkError;
use crate::events::{Event, EventQueue};

#[cfg(target_os = "espidf")]
use core::time::Duration;
#[cfg(target_os = "espidf")]
use esp_idf_svc::io::EspIOError;
#[cfg(target_os = "espidf")]
use esp_idf_svc::ws::FrameType;
#[cfg(target_os = "espidf")]
use esp_idf_svc::ws::client::{
    EspWebSocketClient, EspWebSocketClientConfig, WebSocketEvent, WebSocketEventType,
};

/// How long `start` waits for the client task to come up.
#[cfg(target_os = "espidf")]
const CLIENT_START_TIMEOUT: Duration = Duration::from_secs(10);

/// Receive buffer of the ESP-IDF client; larger frames arrive fragmented.
#[cfg(target_os = "espidf")]
const RX_BUFFER_SIZE: usize = 1024;

pub struct WebSocketLink<'q> {
    #[cfg(target_os = "espidf")]
    client: EspWebSocketClient<'q>,
    #[cfg(not(target_os = "espidf"))]
    queue: &'q EventQueue,
    #[cfg(not(target_os = "espidf"))]
    connected: bool,
    frames_sent: u32,
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl<'q> WebSocketLink<'q> {
    /// Open the client; connection events start flowing into `queue`.
    pub fn start(cfg: &NodeConfig, queue: &'q EventQueue) -> Result<Self, LinkError> {
        let uri = cfg.server_uri();
        let ws_cfg = EspWebSocketClientConfig {
            reconnect_timeout_ms: Duration::from_millis(u64::from(cfg.reconnect_interval_ms)),
            buffer_size: RX_BUFFER_SIZE,
            ..Default::default()
        };

        let client = EspWebSocketClient::new(&uri, &ws_cfg, CLIENT_START_TIMEOUT, move |event| {
            on_client_event(queue, event)
        })
        .map_err(|e| LinkError::Transport(e.0.code()))?;

        info!(
            "Link: client started for {} (reconnect every {} ms)",
            uri, cfg.reconnect_interval_ms
        );
        Ok(Self {
            client,
            frames_sent: 0,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }
}

/// Runs in the client task: translate, enqueue, never block.
#[cfg(target_os = "espidf")]
fn on_client_event(queue: &EventQueue, event: &Result<WebSocketEvent<'_>, EspIOError>) {
    let mapped = match event {
        Ok(ev) => match ev.event_type {
            WebSocketEventType::Connected => Event::Connected,
            WebSocketEventType::Disconnected | WebSocketEventType::Closed => Event::Disconnected,
            WebSocketEventType::Text(text) => Event::text(text),
            WebSocketEventType::Ping => Event::Ping,
            WebSocketEventType::Pong => Event::Pong,
            _ => return,
        },
        Err(e) => Event::Error(LinkError::Transport(e.0.code())),
    };
    if !queue.push(mapped) {
        log::warn!("Link: event queue full, event dropped ({} total)", queue.dropped());
    }
}

#[cfg(target_os = "espidf")]
impl LinkPort for WebSocketLink<'_> {
    fn send_text(&mut self, frame: &str) -> Result<(), LinkError> {
        if !self.client.is_connected() {
            return Err(LinkError::Disconnected);
        }
        self.client
            .send(FrameType::Text(false), frame.as_bytes())
            .map_err(|e| LinkError::Transport(e.code()))?;
        self.frames_sent += 1;
        debug!("Link -> {}", frame);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Host loopback
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl<'q> WebSocketLink<'q> {
    /// "Connect" immediately.
    pub fn start(cfg: &NodeConfig, queue: &'q EventQueue) -> Result<Self, LinkError> {
        info!("Link(sim): loopback for {}", cfg.server_uri());
        queue.push(Event::Connected);
        Ok(Self {
            queue,
            connected: true,
            frames_sent: 0,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Drop the connection as a network failure would.
    pub fn simulate_disconnect(&mut self) {
        info!("Link(sim): connection lost");
        self.connected = false;
        self.queue.push(Event::Disconnected);
    }

    /// Come back after the reconnect interval.
    pub fn simulate_reconnect(&mut self) {
        info!("Link(sim): reconnected");
        self.connected = true;
        self.queue.push(Event::Connected);
    }

    /// Deliver a frame as if the server had sent it.
    pub fn inject(&mut self, frame: &str) {
        self.queue.push(Event::text(frame));
    }

    /// The simulated server authorises the node as soon as it identifies.
    fn answer(&mut self, frame: &str) {
        let is_identify = serde_json::from_str::<serde_json::Value>(frame)
            .is_ok_and(|v| v["action"] == "identify");
        if is_identify {
            self.inject(r#"{"action":"activate"}"#);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl LinkPort for WebSocketLink<'_> {
    fn send_text(&mut self, frame: &str) -> Result<(), LinkError> {
        if !self.connected {
            return Err(LinkError::Disconnected);
        }
        self.frames_sent += 1;
        debug!("Link(sim) -> {}", frame);
        self.answer(frame);
        Ok(())
    }
}

impl WebSocketLink<'_> {
    /// Frames accepted by the transport since boot.
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }
}
