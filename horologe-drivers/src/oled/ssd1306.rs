//! SSD1306 OLED display driver
//!
//! 128x64 paged display on the shared bus. The panel is addressed as
//! 8 pages of 128 columns; every transfer is prefixed with a control
//! byte selecting command mode (0x00) or data mode (0x40).
//!
//! The initialization sequence is a hardware contract and is
//! reproduced byte-for-byte; do not reorder it.

use super::font::{glyph, GLYPH_WIDTH};
use horologe_hal::{Bus, TransactionError};

/// SSD1306 I2C address (typically 0x3C or 0x3D)
pub const SSD1306_ADDR: u8 = 0x3C;

/// Display width in columns
pub const WIDTH: usize = 128;

/// Number of 8-pixel-high pages
pub const PAGES: usize = 8;

/// Control byte: following bytes are commands
const COMMAND_MODE: u8 = 0x00;

/// Control byte: following bytes are framebuffer data
const DATA_MODE: u8 = 0x40;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_ADDR_MODE: u8 = 0x20;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const RESUME_FROM_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
}

/// Two-byte initialization commands, in required order
const INIT_PAIRS: &[[u8; 2]] = &[
    [cmd::SET_MUX_RATIO, 0x3F],      // Multiplex ratio: 64
    [cmd::SET_DISPLAY_OFFSET, 0x00], // Display offset: 0
    [cmd::SET_COM_PINS, 0x12],       // COM pins configuration
    [cmd::SET_CONTRAST, 0x7F],       // Contrast control
    [cmd::SET_CLOCK_DIV, 0x80],      // Display clock divide
    [cmd::SET_CHARGE_PUMP, 0x14],    // Charge pump enable
    [cmd::SET_ADDR_MODE, 0x00],      // Memory addressing mode: horizontal
];

/// Single-byte initialization commands, in required order
const INIT_SINGLES: &[u8] = &[
    cmd::SET_START_LINE,
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::RESUME_FROM_RAM,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// Errors from display operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OledError {
    /// Bus transaction failed
    Transaction(TransactionError),
    /// Character outside printable ASCII (32-126)
    UnsupportedChar(char),
}

impl From<TransactionError> for OledError {
    fn from(e: TransactionError) -> Self {
        OledError::Transaction(e)
    }
}

/// SSD1306 driver borrowing the shared bus for one operation
pub struct Ssd1306<'a, B> {
    bus: &'a mut B,
    address: u8,
}

impl<'a, B> Ssd1306<'a, B>
where
    B: Bus,
{
    /// Create a driver view over the bus for the device at `address`
    pub fn new(bus: &'a mut B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Run the hardware initialization sequence
    pub fn init(&mut self) -> Result<(), OledError> {
        for pair in INIT_PAIRS {
            self.command_pair(pair)?;
        }
        for &c in INIT_SINGLES {
            self.command(c)?;
        }
        Ok(())
    }

    /// Zero every page of the panel
    pub fn blank(&mut self) -> Result<(), OledError> {
        for page in 0..PAGES as u8 {
            self.clear_page(page)?;
        }
        Ok(())
    }

    /// Zero one page of the panel
    ///
    /// An out-of-range page is a silent no-op, same contract as
    /// [`render_string`](Self::render_string).
    pub fn clear_page(&mut self, page: u8) -> Result<(), OledError> {
        if page >= PAGES as u8 {
            return Ok(());
        }

        self.set_position(page, 0)?;

        // One data-mode transfer carrying the whole zeroed row
        let mut row = [0u8; WIDTH + 1];
        row[0] = DATA_MODE;
        self.bus.write(self.address, &row)?;
        Ok(())
    }

    /// Render text starting at (page, column)
    ///
    /// Each character is blitted as its 5 glyph columns plus one blank
    /// spacing column. Characters that would overrun the row are
    /// dropped. An out-of-range page or column performs no bus traffic
    /// and returns `Ok`. Characters outside printable ASCII are
    /// rejected before anything is written.
    pub fn render_string(&mut self, page: u8, column: u8, text: &str) -> Result<(), OledError> {
        for ch in text.chars() {
            if glyph(ch).is_none() {
                return Err(OledError::UnsupportedChar(ch));
            }
        }
        if page >= PAGES as u8 || column as usize >= WIDTH {
            return Ok(());
        }

        self.set_position(page, column)?;

        let mut x = column as usize;
        for ch in text.chars() {
            if x + GLYPH_WIDTH + 1 > WIDTH {
                break;
            }
            // Checked above; missing glyphs cannot reach this point
            if let Some(columns) = glyph(ch) {
                for &col in columns {
                    self.data(col)?;
                }
                self.data(0x00)?; // inter-character spacing
            }
            x += GLYPH_WIDTH + 1;
        }
        Ok(())
    }

    /// Set display contrast (0-255)
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), OledError> {
        self.command_pair(&[cmd::SET_CONTRAST, contrast])
    }

    /// Turn the panel on or off
    pub fn set_display_on(&mut self, on: bool) -> Result<(), OledError> {
        if on {
            self.command(cmd::DISPLAY_ON)
        } else {
            self.command(cmd::DISPLAY_OFF)
        }
    }

    /// Point the write cursor at (page, column)
    ///
    /// Column low nibble, column high nibble, then page select.
    fn set_position(&mut self, page: u8, column: u8) -> Result<(), OledError> {
        self.command(cmd::SET_LOW_COLUMN | (column & 0x0F))?;
        self.command(cmd::SET_HIGH_COLUMN | ((column >> 4) & 0x0F))?;
        self.command(cmd::SET_PAGE_ADDR | page)?;
        Ok(())
    }

    fn command(&mut self, c: u8) -> Result<(), OledError> {
        self.bus.write(self.address, &[COMMAND_MODE, c])?;
        Ok(())
    }

    fn command_pair(&mut self, pair: &[u8; 2]) -> Result<(), OledError> {
        self.bus
            .write(self.address, &[COMMAND_MODE, pair[0], pair[1]])?;
        Ok(())
    }

    fn data(&mut self, d: u8) -> Result<(), OledError> {
        self.bus.write(self.address, &[DATA_MODE, d])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockBus;

    #[test]
    fn test_init_sequence_bytes() {
        let mut bus = MockBus::new();
        Ssd1306::new(&mut bus, SSD1306_ADDR).init().unwrap();

        let expected: &[&[u8]] = &[
            &[0x00, 0xA8, 0x3F],
            &[0x00, 0xD3, 0x00],
            &[0x00, 0xDA, 0x12],
            &[0x00, 0x81, 0x7F],
            &[0x00, 0xD5, 0x80],
            &[0x00, 0x8D, 0x14],
            &[0x00, 0x20, 0x00],
            &[0x00, 0x40],
            &[0x00, 0xA1],
            &[0x00, 0xC8],
            &[0x00, 0xA4],
            &[0x00, 0xA6],
            &[0x00, 0xAF],
        ];
        assert_eq!(bus.writes.len(), expected.len());
        for (transfer, want) in bus.writes.iter().zip(expected) {
            assert_eq!(transfer.address, SSD1306_ADDR);
            assert_eq!(transfer.bytes.as_slice(), *want);
        }
    }

    #[test]
    fn test_clear_page_addresses_then_zeroes() {
        let mut bus = MockBus::new();
        Ssd1306::new(&mut bus, SSD1306_ADDR).clear_page(3).unwrap();

        assert_eq!(bus.writes[0].bytes.as_slice(), &[0x00, 0x00]); // low column
        assert_eq!(bus.writes[1].bytes.as_slice(), &[0x00, 0x10]); // high column
        assert_eq!(bus.writes[2].bytes.as_slice(), &[0x00, 0xB3]); // page 3
        let row = &bus.writes[3].bytes;
        assert_eq!(row.len(), WIDTH + 1);
        assert_eq!(row[0], 0x40);
        assert!(row[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_blank_covers_all_pages() {
        let mut bus = MockBus::new();
        Ssd1306::new(&mut bus, SSD1306_ADDR).blank().unwrap();
        // 3 addressing commands + 1 row write per page
        assert_eq!(bus.writes.len(), PAGES * 4);
    }

    #[test]
    fn test_render_blits_glyph_columns() {
        let mut bus = MockBus::new();
        Ssd1306::new(&mut bus, SSD1306_ADDR)
            .render_string(2, 16, "1")
            .unwrap();

        assert_eq!(bus.writes[0].bytes.as_slice(), &[0x00, 0x00]); // low nibble of 16
        assert_eq!(bus.writes[1].bytes.as_slice(), &[0x00, 0x11]); // high nibble of 16
        assert_eq!(bus.writes[2].bytes.as_slice(), &[0x00, 0xB2]); // page 2

        let glyph_1 = [0x00, 0x42, 0x7F, 0x40, 0x00];
        for (i, &col) in glyph_1.iter().enumerate() {
            assert_eq!(bus.writes[3 + i].bytes.as_slice(), &[0x40, col]);
        }
        assert_eq!(bus.writes[8].bytes.as_slice(), &[0x40, 0x00]); // spacing
        assert_eq!(bus.writes.len(), 9);
    }

    #[test]
    fn test_render_out_of_range_is_silent_noop() {
        let mut bus = MockBus::new();
        let mut oled = Ssd1306::new(&mut bus, SSD1306_ADDR);
        oled.render_string(PAGES as u8, 0, "hi").unwrap();
        oled.render_string(0, WIDTH as u8, "hi").unwrap();
        assert!(bus.writes.is_empty());
    }

    #[test]
    fn test_render_rejects_unsupported_char() {
        let mut bus = MockBus::new();
        let result = Ssd1306::new(&mut bus, SSD1306_ADDR).render_string(0, 0, "ok\n");
        assert_eq!(result, Err(OledError::UnsupportedChar('\n')));
        assert!(bus.writes.is_empty()); // rejected before any traffic
    }

    #[test]
    fn test_render_drops_overrunning_chars() {
        let mut bus = MockBus::new();
        // Column 120 leaves room for one 6-column cell, not two
        Ssd1306::new(&mut bus, SSD1306_ADDR)
            .render_string(0, 120, "ab")
            .unwrap();
        // 3 addressing commands + 6 columns for 'a' only
        assert_eq!(bus.writes.len(), 3 + 6);
    }
}
