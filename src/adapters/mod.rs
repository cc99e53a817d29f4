//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                   |
//! |------------|---------------------|-------------------------------|
//! | `hardware` | SensorPort          | DHT22, ADC1 probes            |
//! |            | DisplayPort         | 16x2 LCD (I²C)                |
//! |            | FeederPort          | Servo (GPIO)                  |
//! |            | ClockPort           | ESP32 system timer            |
//! | `time`     | ClockPort           | ESP32 system timer            |
//! | `wifi`     | —                   | ESP-IDF WiFi STA              |
//! | `ws_link`  | LinkPort            | WebSocket client → EventQueue |

pub mod hardware;
pub mod time;
pub mod wifi;
pub mod ws_link;
