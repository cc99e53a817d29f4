//! Port traits — the hexagonal boundary between the session and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DeviceSession (domain)
//! ```
//!
//! Driven adapters (sensors, display, feeder, clock, server link) implement
//! these traits. The [`DeviceSession`](super::session::DeviceSession)
//! consumes them via generics, so the domain core never touches hardware
//! or sockets directly and can be driven entirely by mocks in tests.

use crate::error::{ActuatorError, DisplayError, LinkError};

use super::screens::Screen;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Four independent instantaneous reads, raw instrument units.
///
/// Reads never block for long and never fail: a sensor that could not be
/// read reports `f32::NAN`.
pub trait SensorPort {
    fn read_temperature(&mut self) -> f32;
    fn read_ph(&mut self) -> f32;
    fn read_salinity(&mut self) -> f32;
    fn read_oxygen(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → LCD)
// ───────────────────────────────────────────────────────────────

/// Two addressable text rows, each overwritable independently.
pub trait DisplayPort {
    /// Overwrite `row` with `text` (clipped / padded to the panel width).
    fn write_line(&mut self, row: u8, text: &str) -> Result<(), DisplayError>;

    /// Overwrite every row with the given screen.
    fn show(&mut self, screen: &Screen) -> Result<(), DisplayError> {
        for (row, line) in screen.lines.iter().enumerate() {
            self.write_line(row as u8, line)?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Feeder port (driven adapter: domain → servo)
// ───────────────────────────────────────────────────────────────

/// The feeder mechanism.
pub trait FeederPort {
    /// Perform one full dispensing sweep.
    ///
    /// **Blocking contract:** returns only after the physical motion has
    /// completed, so whatever the caller does next happens after the food
    /// is out.
    fn dispense(&mut self) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time since boot plus a blocking delay.
pub trait ClockPort {
    fn uptime_ms(&self) -> u64;

    /// Block the calling context for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: domain → server)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the Transport Link. Inbound traffic arrives as
/// [`Event`](crate::events::Event)s instead.
pub trait LinkPort {
    /// Send one text frame.
    fn send_text(&mut self, frame: &str) -> Result<(), LinkError>;
}
