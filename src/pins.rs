//! GPIO / peripheral pin assignments for the AquaNode board (ESP32 DevKit).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers. `main` picks the matching typed `gpioN` from
//! `Peripherals` for the drivers that go through esp-idf-hal.

// ---------------------------------------------------------------------------
// Feeder servo
// ---------------------------------------------------------------------------

/// Servo signal line, bit-banged (one pulse per sweep step).
pub const SERVO_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Sensors — DHT22 (water temperature)
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (open drain, external pull-up).
pub const DHT22_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Sensors — Analog probes (ADC1, raw 12-bit counts)
// ---------------------------------------------------------------------------

/// pH probe, GPIO34 = ADC1 channel 6.
pub const PH_ADC_GPIO: i32 = 34;
pub const PH_ADC_CHANNEL: u32 = 6;

/// Salinity (conductivity) probe, GPIO32 = ADC1 channel 4.
pub const SALINITY_ADC_GPIO: i32 = 32;
pub const SALINITY_ADC_CHANNEL: u32 = 4;

/// Dissolved-oxygen probe, GPIO35 = ADC1 channel 7.
pub const OXYGEN_ADC_GPIO: i32 = 35;
pub const OXYGEN_ADC_CHANNEL: u32 = 7;

// ---------------------------------------------------------------------------
// I²C bus — 16x2 character LCD behind a PCF8574 backpack
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// I²C bus clock (standard mode).
pub const I2C_BAUD_HZ: u32 = 100_000;
/// 7-bit address of the PCF8574 LCD backpack.
pub const LCD_I2C_ADDR: u8 = 0x27;
