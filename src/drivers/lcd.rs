//! 16x2 character LCD (HD44780) behind a PCF8574 I²C backpack.
//!
//! The backpack exposes the controller's 4-bit bus on its eight port bits:
//!
//! ```text
//!   P7 P6 P5 P4 │ P3        │ P2 │ P1 │ P0
//!   D7 D6 D5 D4 │ backlight │ EN │ RW │ RS
//! ```
//!
//! Every controller byte goes out as two nibbles, each latched by an EN
//! high→low edge. RW is always low (write only).
//!
//! The driver remembers what each row currently shows and skips writes
//! that would not change it, so callers may redraw freely.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::app::ports::DisplayPort;
use crate::app::screens::{LCD_COLS, LCD_ROWS};
use crate::error::DisplayError;

// ── Backpack bits ─────────────────────────────────────────────
const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

// ── HD44780 commands ──────────────────────────────────────────
const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM address of the first column of each row.
const ROW_OFFSETS: [u8; LCD_ROWS] = [0x00, 0x40];

type RowBuf = [u8; LCD_COLS];

pub struct Lcd1602<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
    shown: [Option<RowBuf>; LCD_ROWS],
}

impl<I2C: I2c, D: DelayNs> Lcd1602<I2C, D> {
    /// Run the 4-bit power-on sequence and clear the panel.
    pub fn new(i2c: I2C, delay: D, addr: u8) -> Result<Self, DisplayError> {
        let mut lcd = Self {
            i2c,
            delay,
            addr,
            shown: [None; LCD_ROWS],
        };
        lcd.init()?;
        info!("LCD: 16x2 ready at I2C 0x{:02X}", addr);
        Ok(lcd)
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);

        // Force 8-bit mode three times, then switch to 4-bit.
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x20, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE_INC)
    }

    /// Blank the panel and forget what each row showed.
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        self.shown = [None; LCD_ROWS];
        Ok(())
    }

    /// Give the bus back (tests, re-init).
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    // ── Low-level bus ─────────────────────────────────────────

    fn command(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send(byte, 0)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), DisplayError> {
        self.write_nibble(byte & 0xF0, mode)?;
        self.write_nibble(byte << 4, mode)
    }

    /// Latch the upper four bits of `nibble` with an EN pulse.
    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), DisplayError> {
        let bits = (nibble & 0xF0) | BACKLIGHT | mode;
        self.expander_write(bits | EN)?;
        self.delay.delay_us(1);
        self.expander_write(bits & !EN)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn expander_write(&mut self, bits: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.addr, &[bits])
            .map_err(|_| DisplayError::BusWriteFailed)
    }
}

impl<I2C: I2c, D: DelayNs> DisplayPort for Lcd1602<I2C, D> {
    fn write_line(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        let idx = row as usize;
        if idx >= LCD_ROWS {
            return Err(DisplayError::RowOutOfRange(row));
        }

        let buf = render_row(text);
        if self.shown[idx] == Some(buf) {
            return Ok(());
        }

        // Unknown contents until the write below completes.
        self.shown[idx] = None;
        self.command(CMD_SET_DDRAM | ROW_OFFSETS[idx])?;
        for &b in &buf {
            self.send(b, RS)?;
        }
        self.shown[idx] = Some(buf);
        debug!("LCD[{}] <- {:?}", row, text);
        Ok(())
    }
}

/// Clip to the panel width, pad with spaces, replace non-ASCII with `?`.
fn render_row(text: &str) -> RowBuf {
    let mut buf = [b' '; LCD_COLS];
    for (slot, c) in buf.iter_mut().zip(text.chars()) {
        *slot = if c.is_ascii() && !c.is_ascii_control() {
            c as u8
        } else {
            b'?'
        };
    }
    buf
}
