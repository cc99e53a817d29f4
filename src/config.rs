//! Node configuration parameters
//!
//! Everything is fixed at boot: network credentials, server address and the
//! device identity come from the defaults below, optionally overridden by
//! build-time environment variables (`AQUANODE_*`). There is no runtime
//! reconfiguration and nothing is persisted.

use core::fmt::{self, Write};

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::identity::DeviceIdentity;

/// Capacity of the assembled `ws://host:port/prefix/id` URI.
pub const SERVER_URI_CAP: usize = 192;

/// Feeder servo sweep parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoConfig {
    /// Sweep from 0 to this many degrees, one pulse per degree.
    pub sweep_degrees: u16,
    /// High-pulse width at 0 degrees (µs)
    pub min_pulse_us: u32,
    /// Additional pulse width per degree (µs)
    pub pulse_us_per_degree: u32,
    /// Low gap after every pulse (ms)
    pub frame_gap_ms: u32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            sweep_degrees: 180,
            min_pulse_us: 600,
            pulse_us_per_degree: 10,
            frame_gap_ms: 20,
        }
    }
}

impl ServoConfig {
    /// Total wall time of one full sweep, rounded down to whole ms.
    pub fn sweep_duration_ms(&self) -> u32 {
        let steps = self.sweep_degrees as u32 + 1;
        let deg = self.sweep_degrees as u32;
        let pulses_us = steps * self.min_pulse_us + self.pulse_us_per_degree * deg * (deg + 1) / 2;
        pulses_us / 1000 + steps * self.frame_gap_ms
    }
}

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- WiFi ---
    pub wifi_ssid: String<32>,
    pub wifi_password: String<64>,
    /// Delay between station connect attempts at boot (ms)
    pub wifi_retry_interval_ms: u32,

    // --- Server link ---
    pub server_host: String<64>,
    pub server_port: u16,
    /// Path prefix; the device id is appended as the last segment
    pub ws_path_prefix: String<32>,
    /// Fixed reconnect interval owned by the link (ms)
    pub reconnect_interval_ms: u32,

    // --- Identity ---
    /// Token sent as `unique_address` in every outbound frame
    pub device_id: String<32>,

    // --- Timing ---
    /// Telemetry cadence while active (ms)
    pub telemetry_interval_ms: u32,
    /// "Feeding..." banner hold after a dispense (ms)
    pub feed_settle_ms: u32,
    /// Task watchdog timeout (ms)
    pub watchdog_timeout_ms: u32,

    // --- Feeder ---
    pub servo: ServoConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // WiFi (Wokwi simulator guest network, open)
            wifi_ssid: bounded("Wokwi-GUEST"),
            wifi_password: String::new(),
            wifi_retry_interval_ms: 1000,

            // Server link
            server_host: bounded("host.wokwi.internal"),
            server_port: 8000,
            ws_path_prefix: bounded("/ws"),
            reconnect_interval_ms: 5000,

            // Identity
            device_id: bounded("ESP32_001"),

            // Timing
            telemetry_interval_ms: 600,
            feed_settle_ms: 2000,
            watchdog_timeout_ms: 10_000,

            servo: ServoConfig::default(),
        }
    }
}

/// Errors from building or validating a [`NodeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A string override does not fit its field.
    TooLong(&'static str),
    /// A numeric override did not parse.
    InvalidNumber(&'static str),
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong(field) => write!(f, "{} too long", field),
            Self::InvalidNumber(field) => write!(f, "{} is not a number", field),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by `AQUANODE_*` variables captured at build time.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        override_text(&mut cfg.wifi_ssid, option_env!("AQUANODE_WIFI_SSID"), "wifi_ssid")?;
        override_text(
            &mut cfg.wifi_password,
            option_env!("AQUANODE_WIFI_PASSWORD"),
            "wifi_password",
        )?;
        override_text(&mut cfg.server_host, option_env!("AQUANODE_SERVER_HOST"), "server_host")?;
        override_text(&mut cfg.device_id, option_env!("AQUANODE_DEVICE_ID"), "device_id")?;
        if let Some(port) = option_env!("AQUANODE_SERVER_PORT") {
            cfg.server_port = port
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("server_port"))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if DeviceIdentity::new(&self.device_id).is_err() {
            return Err(ConfigError::ValidationFailed(
                "device_id must be 1-32 chars of [A-Za-z0-9_-]",
            ));
        }
        if self.server_host.is_empty() {
            return Err(ConfigError::ValidationFailed("server_host is empty"));
        }
        if self.server_port == 0 {
            return Err(ConfigError::ValidationFailed("server_port is zero"));
        }
        if !self.ws_path_prefix.is_empty() && !self.ws_path_prefix.starts_with('/') {
            return Err(ConfigError::ValidationFailed("ws_path_prefix must start with '/'"));
        }
        if self.telemetry_interval_ms == 0
            || self.reconnect_interval_ms == 0
            || self.wifi_retry_interval_ms == 0
        {
            return Err(ConfigError::ValidationFailed("intervals must be non-zero"));
        }
        if self.servo.sweep_degrees == 0 || self.servo.sweep_degrees > 180 {
            return Err(ConfigError::ValidationFailed("servo sweep must be 1-180 degrees"));
        }
        // dispense() blocks the loop; the watchdog must outlast a whole feed.
        let feed_ms = self.servo.sweep_duration_ms() + self.feed_settle_ms;
        if self.watchdog_timeout_ms <= feed_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog timeout shorter than a full feed",
            ));
        }
        Ok(())
    }

    /// `ws://{host}:{port}{prefix}/{device_id}`
    pub fn server_uri(&self) -> String<SERVER_URI_CAP> {
        let mut uri = String::new();
        let _ = write!(
            uri,
            "ws://{}:{}{}/{}",
            self.server_host, self.server_port, self.ws_path_prefix, self.device_id
        );
        uri
    }
}

/// Copy `s` into a fixed-capacity string, truncating at capacity.
fn bounded<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

fn override_text<const N: usize>(
    field: &mut String<N>,
    value: Option<&str>,
    name: &'static str,
) -> Result<(), ConfigError> {
    if let Some(v) = value {
        *field = String::try_from(v).map_err(|_| ConfigError::TooLong(name))?;
    }
    Ok(())
}
