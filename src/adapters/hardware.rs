//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the display, the feeder and the clock, and
//! exposes all of them through one value so the session can borrow the
//! whole board mutably at once. On non-espidf targets the sensors and
//! clock use their cfg-gated simulation paths.

use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::{ClockPort, DisplayPort, FeederPort, SensorPort};
use crate::error::{ActuatorError, DisplayError};
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D, F> {
    sensor_hub: SensorHub,
    display: D,
    feeder: F,
    clock: Esp32TimeAdapter,
}

impl<D: DisplayPort, F: FeederPort> HardwareAdapter<D, F> {
    pub fn new(sensor_hub: SensorHub, display: D, feeder: F, clock: Esp32TimeAdapter) -> Self {
        Self {
            sensor_hub,
            display,
            feeder,
            clock,
        }
    }

    pub fn feeder(&self) -> &F {
        &self.feeder
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<D, F> SensorPort for HardwareAdapter<D, F> {
    fn read_temperature(&mut self) -> f32 {
        self.sensor_hub.read_temperature()
    }

    fn read_ph(&mut self) -> f32 {
        self.sensor_hub.read_ph()
    }

    fn read_salinity(&mut self) -> f32 {
        self.sensor_hub.read_salinity()
    }

    fn read_oxygen(&mut self) -> f32 {
        self.sensor_hub.read_oxygen()
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<D: DisplayPort, F> DisplayPort for HardwareAdapter<D, F> {
    fn write_line(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        self.display.write_line(row, text)
    }
}

// ── FeederPort implementation ─────────────────────────────────

impl<D, F: FeederPort> FeederPort for HardwareAdapter<D, F> {
    fn dispense(&mut self) -> Result<(), ActuatorError> {
        self.feeder.dispense()
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl<D, F> ClockPort for HardwareAdapter<D, F> {
    fn uptime_ms(&self) -> u64 {
        self.clock.uptime_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.sleep_ms(ms);
    }
}
