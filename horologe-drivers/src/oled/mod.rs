//! Paged OLED display drivers

mod font;
mod ssd1306;

pub use font::{glyph, FONT_5X8, GLYPH_WIDTH};
pub use ssd1306::{OledError, Ssd1306, PAGES, SSD1306_ADDR, WIDTH};
