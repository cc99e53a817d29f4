//! Raw analog probes (pH, salinity, dissolved oxygen).
//!
//! Each probe is a voltage on one ADC1 channel. Values are reported as
//! raw 12-bit counts (0-4095) with no calibration applied; the server
//! owns the conversion to physical units.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a per-channel static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// ADC1 has channels 0-9.
#[cfg(not(target_os = "espidf"))]
const ADC1_CHANNELS: usize = 10;

#[cfg(not(target_os = "espidf"))]
static SIM_ADC: [AtomicU16; ADC1_CHANNELS] = [const { AtomicU16::new(2048) }; ADC1_CHANNELS];

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(channel: u32, raw: u16) {
    if let Some(slot) = SIM_ADC.get(channel as usize) {
        slot.store(raw, Ordering::Relaxed);
    }
}

/// Full-scale count of the 12-bit converter.
pub const ADC_MAX: u16 = 4095;

pub struct AnalogProbe {
    name: &'static str,
    channel: u32,
    failures: u32,
}

impl AnalogProbe {
    pub fn new(name: &'static str, channel: u32) -> Self {
        Self {
            name,
            channel,
            failures: 0,
        }
    }

    /// Raw counts as `f32`, or NaN if the converter did not answer.
    pub fn read(&mut self) -> f32 {
        match self.read_adc() {
            Some(raw) => f32::from(raw.min(ADC_MAX)),
            None => {
                self.failures = self.failures.saturating_add(1);
                log::warn!("{} probe: ADC1 CH{} read failed", self.name, self.channel);
                f32::NAN
            }
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Failed conversions since boot.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        SIM_ADC
            .get(self.channel as usize)
            .map(|slot| slot.load(Ordering::Relaxed))
    }
}
