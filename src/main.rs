//! AquaNode Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter                 WebSocketLink    WifiAdapter  │
//! │  (Sensor+Display+Feeder+Clock)   (LinkPort)       (STA up)     │
//! │                                       │                        │
//! │  ──────────────── Port Trait Boundary ┼──────────────────      │
//! │                                       ▼ EventQueue             │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            DeviceSession (pure logic)                  │    │
//! │  │  connected · active · telemetry · feed                 │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Ticker (telemetry cadence) · Watchdog                         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Result, anyhow};
use log::{error, info, warn};

use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use aquanode::adapters::hardware::HardwareAdapter;
use aquanode::adapters::time::Esp32TimeAdapter;
use aquanode::adapters::wifi::WifiAdapter;
use aquanode::adapters::ws_link::WebSocketLink;
use aquanode::app::identity::DeviceIdentity;
use aquanode::app::session::DeviceSession;
use aquanode::config::NodeConfig;
use aquanode::drivers::lcd::Lcd1602;
use aquanode::drivers::servo::ServoFeeder;
use aquanode::drivers::{hw_init, watchdog::Watchdog};
use aquanode::events::{Event, EventQueue};
use aquanode::pins;
use aquanode::scheduler::Ticker;
use aquanode::sensors::SensorHub;

/// Link callbacks → control loop.
static LINK_EVENTS: EventQueue = EventQueue::new();

/// Control loop pass period when idle (ms).
const LOOP_IDLE_MS: u32 = 10;

/// Session statistics log period (ms).
const STATS_LOG_INTERVAL_MS: u32 = 60_000;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AquaNode v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration + identity ───────────────────────────
    let config = match NodeConfig::from_build_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Build-time config rejected ({}), using defaults", e);
            NodeConfig::default()
        }
    };
    let identity = DeviceIdentity::new(&config.device_id)
        .map_err(|e| anyhow!("device identity: {e}"))?;
    info!("Device ID: {} → {}", identity, config.server_uri());

    // ── 3. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Readings from the affected sensors will be NaN; keep going.
        error!("HAL init failed: {} — continuing", e);
    }

    let p = Peripherals::take()?;

    let i2c_cfg = I2cConfig::new().baudrate(pins::I2C_BAUD_HZ.Hz());
    let i2c = I2cDriver::new(p.i2c0, p.pins.gpio21, p.pins.gpio22, &i2c_cfg)?;
    let lcd = Lcd1602::new(i2c, Ets, pins::LCD_I2C_ADDR).map_err(|e| anyhow!("LCD init: {e}"))?;

    let servo_pin = PinDriver::output(p.pins.gpio2)?;
    let feeder = ServoFeeder::new(servo_pin, Ets, config.servo);

    let clock = Esp32TimeAdapter::new();
    let mut hw = HardwareAdapter::new(SensorHub::new(), lcd, feeder, Esp32TimeAdapter::new());

    let mut session = DeviceSession::new(identity, config.feed_settle_ms);
    session.start(&mut hw);

    // ── 4. Network bring-up ───────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let driver = BlockingWifi::wrap(EspWifi::new(p.modem, sysloop.clone(), Some(nvs))?, sysloop)?;
    let mut wifi = WifiAdapter::new(
        &config.wifi_ssid,
        &config.wifi_password,
        config.wifi_retry_interval_ms,
        driver,
    )
    .map_err(|e| anyhow!("wifi: {e}"))?;
    wifi.connect_until_up().map_err(|e| anyhow!("wifi: {e}"))?;

    let mut link =
        WebSocketLink::start(&config, &LINK_EVENTS).map_err(|e| anyhow!("link: {e}"))?;

    // ── 5. Watchdog (after the blocking bring-up) ─────────────
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let mut telemetry = Ticker::new(config.telemetry_interval_ms);
    let mut stats_log = Ticker::new(STATS_LOG_INTERVAL_MS);
    stats_log.reset(clock.uptime_ms());

    loop {
        // Link events first; each runs to completion (a feed blocks here).
        LINK_EVENTS.drain(|event| session.handle(event, &mut link, &mut hw));

        if telemetry.poll(clock.uptime_ms()) {
            session.handle(Event::TimerTick, &mut link, &mut hw);
        }

        session.refresh_idle_view(&mut hw);

        watchdog.feed();

        if stats_log.poll(clock.uptime_ms()) {
            let s = session.stats();
            info!(
                "Stats: state={:?} connects={} identify={} telemetry={} feeds={} failed_feeds={} rejected={} send_failures={} dropped_events={} sweeps={}",
                session.state(),
                s.connects,
                s.identifies_sent,
                s.telemetry_sent,
                s.feeds,
                s.failed_feeds,
                s.rejected_frames,
                s.send_failures,
                LINK_EVENTS.dropped(),
                hw.feeder().sweeps(),
            );
            if let Some(e) = session.last_error() {
                info!("Stats: last error: {}", e);
            }
        }

        FreeRtos::delay_ms(LOOP_IDLE_MS);
    }
}
