//! Feeder servo, bit-banged on a plain output pin.
//!
//! One dispense is a single sweep from 0° to the configured end angle:
//! for every degree the pin goes high for `min_pulse + degree * step` µs,
//! then low for a fixed frame gap. With the default parameters the sweep
//! is 181 pulses of 600-2400 µs and takes roughly 3.9 s.
//!
//! The call blocks until the sweep is done; the pin is always left low.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info};

use crate::app::ports::FeederPort;
use crate::config::ServoConfig;
use crate::error::ActuatorError;

pub struct ServoFeeder<P, D> {
    pin: P,
    delay: D,
    cfg: ServoConfig,
    sweeps: u32,
}

impl<P: OutputPin, D: DelayNs> ServoFeeder<P, D> {
    pub fn new(mut pin: P, delay: D, cfg: ServoConfig) -> Self {
        // Park the signal line low; a failure here shows up on first dispense.
        let _ = pin.set_low();
        info!(
            "Feeder: servo ready (0-{}°, ~{} ms per sweep)",
            cfg.sweep_degrees,
            cfg.sweep_duration_ms()
        );
        Self {
            pin,
            delay,
            cfg,
            sweeps: 0,
        }
    }

    /// Completed sweeps since boot.
    pub fn sweeps(&self) -> u32 {
        self.sweeps
    }

    fn sweep(&mut self) -> Result<(), ActuatorError> {
        for degree in 0..=u32::from(self.cfg.sweep_degrees) {
            let pulse_us = self.cfg.min_pulse_us + degree * self.cfg.pulse_us_per_degree;
            self.pin.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
            self.delay.delay_us(pulse_us);
            self.pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
            self.delay.delay_ms(self.cfg.frame_gap_ms);
        }
        Ok(())
    }
}

impl<P: OutputPin, D: DelayNs> FeederPort for ServoFeeder<P, D> {
    fn dispense(&mut self) -> Result<(), ActuatorError> {
        debug!("Feeder: sweep start");
        let result = self.sweep();
        if result.is_err() {
            let _ = self.pin.set_low();
        } else {
            self.sweeps += 1;
            info!("Feeder: sweep #{} complete", self.sweeps);
        }
        result
    }
}
