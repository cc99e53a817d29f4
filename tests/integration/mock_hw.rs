//! Mock adapters for integration tests.
//!
//! Records every display write, dispense and outbound frame so tests can
//! assert on the full history without touching real peripherals.

use aquanode::app::ports::{ClockPort, DisplayPort, FeederPort, LinkPort, SensorPort};
use aquanode::error::{ActuatorError, DisplayError, LinkError};
use serde_json::Value;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub temperature: f32,
    pub ph: f32,
    pub salinity: f32,
    pub oxygen: f32,
    /// Current contents of both rows.
    pub rows: [String; 2],
    /// Every `(row, text)` write, oldest first.
    pub writes: Vec<(u8, String)>,
    pub dispenses: u32,
    pub fail_dispense: bool,
    /// Simulated uptime; `delay_ms` advances it.
    pub now_ms: u64,
    pub delays: Vec<u32>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            temperature: 24.5,
            ph: 2048.0,
            salinity: 1000.0,
            oxygen: 3000.0,
            rows: [String::new(), String::new()],
            writes: Vec::new(),
            dispenses: 0,
            fail_dispense: false,
            now_ms: 0,
            delays: Vec::new(),
        }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    pub fn shows(&self, top: &str, bottom: &str) -> bool {
        self.rows[0] == top && self.rows[1] == bottom
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_temperature(&mut self) -> f32 {
        self.temperature
    }

    fn read_ph(&mut self) -> f32 {
        self.ph
    }

    fn read_salinity(&mut self) -> f32 {
        self.salinity
    }

    fn read_oxygen(&mut self) -> f32 {
        self.oxygen
    }
}

impl DisplayPort for MockHardware {
    fn write_line(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        let slot = self
            .rows
            .get_mut(row as usize)
            .ok_or(DisplayError::RowOutOfRange(row))?;
        *slot = text.to_string();
        self.writes.push((row, text.to_string()));
        Ok(())
    }
}

impl FeederPort for MockHardware {
    fn dispense(&mut self) -> Result<(), ActuatorError> {
        self.dispenses += 1;
        if self.fail_dispense {
            Err(ActuatorError::GpioWriteFailed)
        } else {
            Ok(())
        }
    }
}

impl ClockPort for MockHardware {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.now_ms += u64::from(ms);
    }
}

// ── MockLink ──────────────────────────────────────────────────

/// Records outbound frames; can be taken down to make sends fail.
#[derive(Default)]
pub struct MockLink {
    pub sent: Vec<String>,
    pub down: bool,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed outbound frames.
    pub fn frames(&self) -> Vec<Value> {
        self.sent
            .iter()
            .map(|s| serde_json::from_str(s).expect("outbound frame is JSON"))
            .collect()
    }

    /// `action` of every outbound frame, in order.
    pub fn actions(&self) -> Vec<String> {
        self.frames()
            .iter()
            .map(|v| v["action"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn count(&self, action: &str) -> usize {
        self.actions().iter().filter(|a| *a == action).count()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl LinkPort for MockLink {
    fn send_text(&mut self, frame: &str) -> Result<(), LinkError> {
        if self.down {
            return Err(LinkError::Disconnected);
        }
        self.sent.push(frame.to_string());
        Ok(())
    }
}
