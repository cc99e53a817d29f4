//! DHT22 (AM2302) temperature / humidity sensor on a single-wire bus.
//!
//! The host pulls the line low for ~3 ms, releases it, and the sensor
//! answers with an 80 µs low / 80 µs high preamble followed by 40 data
//! bits. Each bit is a ~50 µs low followed by a high whose length encodes
//! the value (~27 µs = 0, ~70 µs = 1).
//!
//! ```text
//!   byte 0..1  humidity ×10 (big endian)
//!   byte 2..3  temperature ×10, bit 15 = sign
//!   byte 4     checksum = low byte of sum(byte 0..3)
//! ```
//!
//! The sensor cannot be sampled faster than every two seconds; reads
//! inside that window return the previous result.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the line through raw GPIO calls (configured
//! open-drain by hw_init).
//! On host/test: reads from static atomics for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41C4_0000); // 24.5
#[cfg(not(target_os = "espidf"))]
static SIM_FAULT: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temperature(celsius: f32) {
    SIM_TEMP_BITS.store(celsius.to_bits(), Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_fault(fault: bool) {
    SIM_FAULT.store(fault, Ordering::Relaxed);
}

/// Minimum spacing between two bus transactions.
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dht22Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct Dht22 {
    pin: i32,
    last: Option<(u64, Result<Dht22Reading, SensorError>)>,
}

impl Dht22 {
    pub fn new(pin: i32) -> Self {
        Self { pin, last: None }
    }

    /// Sample the sensor, or repeat the previous result if it was taken
    /// less than [`MIN_SAMPLE_INTERVAL_MS`] ago.
    pub fn read(&mut self, now_ms: u64) -> Result<Dht22Reading, SensorError> {
        if let Some((at, result)) = self.last {
            if now_ms.saturating_sub(at) < MIN_SAMPLE_INTERVAL_MS {
                return result;
            }
        }
        let result = self.sample();
        self.last = Some((now_ms, result));
        result
    }

    #[cfg(target_os = "espidf")]
    fn sample(&self) -> Result<Dht22Reading, SensorError> {
        use esp_idf_svc::sys::*;

        let mut frame = [0u8; 5];

        // SAFETY: the line was configured open-drain by hw_init and is only
        // driven from the control loop.
        unsafe {
            // Wake: hold low for 3 ms, release for 25 µs.
            gpio_set_level(self.pin, 0);
            ets_delay_us(3000);
            gpio_set_level(self.pin, 1);
            ets_delay_us(25);

            // Preamble: 80 µs low, 80 µs high.
            self.wait_while(0, 85)?;
            self.wait_while(1, 85)?;

            for bit in 0..40 {
                self.wait_while(0, 56)?;
                let high_us = self.wait_while(1, 75)?;
                if high_us > 40 {
                    frame[bit / 8] |= 1 << (7 - bit % 8);
                }
            }
        }

        decode_frame(&frame)
    }

    /// Busy-wait while the line sits at `level`; returns the µs waited.
    #[cfg(target_os = "espidf")]
    unsafe fn wait_while(&self, level: i32, max_us: u32) -> Result<u32, SensorError> {
        use esp_idf_svc::sys::*;

        let mut waited = 0;
        while unsafe { gpio_get_level(self.pin) } == level {
            waited += 1;
            if waited > max_us {
                return Err(SensorError::Timeout);
            }
            unsafe { ets_delay_us(1) };
        }
        Ok(waited)
    }

    #[cfg(not(target_os = "espidf"))]
    fn sample(&self) -> Result<Dht22Reading, SensorError> {
        let _ = self.pin;
        if SIM_FAULT.load(Ordering::Relaxed) {
            return Err(SensorError::Timeout);
        }
        Ok(Dht22Reading {
            temperature_c: f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
            humidity_pct: 50.0,
        })
    }
}

/// Validate and decode one 5-byte frame.
pub fn decode_frame(frame: &[u8; 5]) -> Result<Dht22Reading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]);
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let mut temperature = f32::from(magnitude) / 10.0;
    if frame[2] & 0x80 != 0 {
        temperature = -temperature;
    }

    Ok(Dht22Reading {
        temperature_c: temperature,
        humidity_pct: f32::from(humidity) / 10.0,
    })
}
