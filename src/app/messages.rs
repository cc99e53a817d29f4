//! Outbound frames sent to the server.
//!
//! Each message serialises to one JSON text frame with an `action`
//! discriminator first and the device identity in `unique_address`:
//!
//! ```text
//! {"action":"identify","unique_address":"ESP32_001"}
//! {"action":"water_parameters","unique_address":"ESP32_001",
//!  "parameters":{"ph":..,"temperature":..,"salinity":..,"oxygen_level":..,"measured_at":"<ms>"}}
//! {"action":"feed_result","success":true,"unique_address":"ESP32_001"}
//! ```

use serde::{Serialize, Serializer};

/// One telemetry snapshot. Values are raw instrument units.
///
/// A reading that failed is NaN and goes out as JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorReading {
    pub ph: f32,
    pub temperature: f32,
    pub salinity: f32,
    #[serde(rename = "oxygen_level")]
    pub oxygen: f32,
    /// Monotonic ms since boot, sent as a decimal string.
    #[serde(rename = "measured_at", serialize_with = "decimal_string")]
    pub measured_at_ms: u64,
}

/// Everything the node ever sends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundMessage<'a> {
    /// Handshake, first frame on every connection.
    Identify { unique_address: &'a str },
    #[serde(rename = "water_parameters")]
    Telemetry {
        unique_address: &'a str,
        parameters: SensorReading,
    },
    /// Outcome of a completed dispense.
    FeedResult {
        success: bool,
        unique_address: &'a str,
    },
}

impl OutboundMessage<'_> {
    /// Serialise to the JSON text frame.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Wire name of this message, for logs.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Identify { .. } => "identify",
            Self::Telemetry { .. } => "water_parameters",
            Self::FeedResult { .. } => "feed_result",
        }
    }
}

fn decimal_string<S: Serializer>(ms: &u64, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(ms)
}
