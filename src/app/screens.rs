//! Screen layouts for the 16x2 character display.
//!
//! Three views exist: the idle status view, the live value view shown
//! while telemetry runs, and a transient banner during feeding. Lines are
//! clipped to the panel width; the display adapter pads them.

use core::fmt::{self, Write};

use super::messages::SensorReading;

/// Visible columns per row.
pub const LCD_COLS: usize = 16;
/// Visible rows.
pub const LCD_ROWS: usize = 2;

pub type Line = heapless::String<LCD_COLS>;

/// Full contents of the panel, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub lines: [Line; LCD_ROWS],
}

/// Idle view: link state on top, activation state below.
pub fn status_screen(connected: bool, active: bool) -> Screen {
    Screen {
        lines: [
            clip(format_args!(
                "WS: {}",
                if connected { "Connected" } else { "Disconnected" }
            )),
            clip(format_args!(
                "Device: {}",
                if active { "Active" } else { "Inactive" }
            )),
        ],
    }
}

/// Live readings, one decimal each.
pub fn values_screen(r: &SensorReading) -> Screen {
    Screen {
        lines: [
            clip(format_args!("T:{:.1} pH:{:.1}", r.temperature, r.ph)),
            clip(format_args!("S:{:.1} O2:{:.1}", r.salinity, r.oxygen)),
        ],
    }
}

/// Banner held while the feeder settles.
pub fn feeding_screen() -> Screen {
    Screen {
        lines: [clip(format_args!("Feeding...")), Line::new()],
    }
}

/// Render into a line, dropping whatever does not fit.
fn clip(args: fmt::Arguments<'_>) -> Line {
    struct Clip<'a>(&'a mut Line);

    impl Write for Clip<'_> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            for c in s.chars() {
                if self.0.push(c).is_err() {
                    break;
                }
            }
            Ok(())
        }
    }

    let mut line = Line::new();
    let _ = Clip(&mut line).write_fmt(args);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_texts() {
        let s = status_screen(true, false);
        assert_eq!(s.lines[0].as_str(), "WS: Connected");
        assert_eq!(s.lines[1].as_str(), "Device: Inactive");

        let s = status_screen(false, true);
        assert_eq!(s.lines[0].as_str(), "WS: Disconnected");
        assert_eq!(s.lines[1].as_str(), "Device: Active");
    }

    #[test]
    fn values_are_clipped_to_panel_width() {
        let r = SensorReading {
            ph: 2048.0,
            temperature: 24.5,
            salinity: 1000.0,
            oxygen: 3000.0,
            measured_at_ms: 0,
        };
        let s = values_screen(&r);
        assert_eq!(s.lines[0].as_str(), "T:24.5 pH:2048.0");
        assert_eq!(s.lines[1].as_str(), "S:1000.0 O2:3000");
    }

    #[test]
    fn failed_temperature_shows_nan() {
        let r = SensorReading {
            ph: 7.0,
            temperature: f32::NAN,
            salinity: 1.0,
            oxygen: 2.0,
            measured_at_ms: 0,
        };
        assert_eq!(values_screen(&r).lines[0].as_str(), "T:NaN pH:7.0");
    }

    #[test]
    fn feeding_banner_blanks_second_row() {
        let s = feeding_screen();
        assert_eq!(s.lines[0].as_str(), "Feeding...");
        assert!(s.lines[1].is_empty());
    }
}
