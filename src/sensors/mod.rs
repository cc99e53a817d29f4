//! Sensor subsystem — individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and answers the four
//! [`SensorPort`] reads. A read that fails is logged and reported as NaN;
//! nothing here retries or filters.

pub mod analog;
pub mod dht22;

use log::warn;

use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::SensorPort;
use crate::error::SensorError;
use crate::pins;
use analog::AnalogProbe;
use dht22::{Dht22, Dht22Reading};

/// Aggregates all sensor drivers.
pub struct SensorHub {
    pub temperature: Dht22,
    pub ph: AnalogProbe,
    pub salinity: AnalogProbe,
    pub oxygen: AnalogProbe,
    clock: Esp32TimeAdapter,
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorHub {
    /// Build the hub on the board's standard wiring.
    pub fn new() -> Self {
        Self {
            temperature: Dht22::new(pins::DHT22_GPIO),
            ph: AnalogProbe::new("pH", pins::PH_ADC_CHANNEL),
            salinity: AnalogProbe::new("salinity", pins::SALINITY_ADC_CHANNEL),
            oxygen: AnalogProbe::new("oxygen", pins::OXYGEN_ADC_CHANNEL),
            clock: Esp32TimeAdapter::new(),
        }
    }
}

impl SensorPort for SensorHub {
    fn read_temperature(&mut self) -> f32 {
        celsius_or_nan(self.temperature.read(self.clock.uptime_ms()))
    }

    fn read_ph(&mut self) -> f32 {
        self.ph.read()
    }

    fn read_salinity(&mut self) -> f32 {
        self.salinity.read()
    }

    fn read_oxygen(&mut self) -> f32 {
        self.oxygen.read()
    }
}

fn celsius_or_nan(result: Result<Dht22Reading, SensorError>) -> f32 {
    match result {
        Ok(r) => r.temperature_c,
        Err(e) => {
            warn!("DHT22: {}", e);
            f32::NAN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_temperature_becomes_nan() {
        assert!(celsius_or_nan(Err(SensorError::Checksum)).is_nan());
        let ok = Dht22Reading {
            temperature_c: 22.0,
            humidity_pct: 40.0,
        };
        assert_eq!(celsius_or_nan(Ok(ok)), 22.0);
    }

    #[test]
    fn hub_reads_the_board_channels() {
        analog::sim_set_adc(pins::SALINITY_ADC_CHANNEL, 1000);
        analog::sim_set_adc(pins::OXYGEN_ADC_CHANNEL, 3000);
        let mut hub = SensorHub::new();
        assert_eq!(hub.read_salinity(), 1000.0);
        assert_eq!(hub.read_oxygen(), 3000.0);
        assert!(hub.read_ph() >= 0.0);
    }
}
