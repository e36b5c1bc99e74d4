//! Simulated shared bus for coordinator integration tests
//!
//! Emulates both peripherals well enough to exercise the real byte
//! protocols: a register-block RTC and a paged OLED that interprets
//! addressing commands and accumulates a framebuffer.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use horologe_drivers::oled::{glyph, PAGES, SSD1306_ADDR, WIDTH};
use horologe_drivers::rtc::DS1307_ADDR;
use horologe_hal::{Bus, TransactionError};

/// Simulated RTC register file
#[derive(Default)]
pub struct RtcSim {
    pub regs: [u8; 8],
    /// Register pointer set by the last single-byte write
    pub pointer: u8,
    /// Force reads to fail with a short transfer
    pub fail_reads: bool,
}

/// Simulated OLED panel
pub struct PanelSim {
    pub framebuffer: [[u8; WIDTH]; PAGES],
    pub page: usize,
    pub column: usize,
    /// Every command-mode transfer, in order
    pub commands: Vec<Vec<u8>>,
    pub data_transfers: usize,
}

impl Default for PanelSim {
    fn default() -> Self {
        Self {
            framebuffer: [[0; WIDTH]; PAGES],
            page: 0,
            column: 0,
            commands: Vec::new(),
            data_transfers: 0,
        }
    }
}

impl PanelSim {
    pub fn is_blank(&self) -> bool {
        self.framebuffer.iter().flatten().all(|&b| b == 0)
    }
}

/// Shared-state bus the coordinator owns while tests keep handles to
/// the device state behind it
#[derive(Clone)]
pub struct SimBus {
    pub rtc: Arc<Mutex<RtcSim>>,
    pub panel: Arc<Mutex<PanelSim>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            rtc: Arc::new(Mutex::new(RtcSim::default())),
            panel: Arc::new(Mutex::new(PanelSim::default())),
        }
    }

    /// Load the RTC time block with a BCD-encoded wall-clock time
    pub fn preset_time(&self, hours: u8, minutes: u8, seconds: u8) {
        let to_bcd = |v: u8| (v / 10) << 4 | (v % 10);
        let mut rtc = self.rtc.lock().unwrap();
        rtc.regs[0] = to_bcd(seconds);
        rtc.regs[1] = to_bcd(minutes);
        rtc.regs[2] = to_bcd(hours);
    }
}

impl Bus for SimBus {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), TransactionError> {
        match address {
            DS1307_ADDR => {
                let mut rtc = self.rtc.lock().unwrap();
                match *data {
                    [register] => rtc.pointer = register,
                    [register, value] => rtc.regs[register as usize] = value,
                    _ => return Err(TransactionError::Bus),
                }
                Ok(())
            }
            SSD1306_ADDR => {
                let mut panel = self.panel.lock().unwrap();
                match data[0] {
                    0x00 => {
                        panel.commands.push(data.to_vec());
                        // Addressing commands are single-command transfers
                        if let [_, c] = *data {
                            match c {
                                0x00..=0x0F => {
                                    panel.column = (panel.column & !0x0F) | c as usize;
                                }
                                0x10..=0x1F => {
                                    panel.column =
                                        (panel.column & 0x0F) | (((c & 0x0F) as usize) << 4);
                                }
                                0xB0..=0xB7 => panel.page = (c & 0x07) as usize,
                                _ => {}
                            }
                        }
                        Ok(())
                    }
                    0x40 => {
                        panel.data_transfers += 1;
                        for &byte in &data[1..] {
                            if panel.page < PAGES && panel.column < WIDTH {
                                let (page, column) = (panel.page, panel.column);
                                panel.framebuffer[page][column] = byte;
                                panel.column += 1;
                            }
                        }
                        Ok(())
                    }
                    _ => Err(TransactionError::Bus),
                }
            }
            _ => Err(TransactionError::Bus),
        }
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), TransactionError> {
        if address != DS1307_ADDR {
            return Err(TransactionError::Bus);
        }
        let rtc = self.rtc.lock().unwrap();
        if rtc.fail_reads {
            return Err(TransactionError::ShortTransfer {
                expected: buf.len(),
                transferred: 0,
            });
        }
        let start = rtc.pointer as usize;
        buf.copy_from_slice(&rtc.regs[start..start + buf.len()]);
        Ok(())
    }
}

/// Render `text` into a page row the way the display driver would
pub fn expected_row(text: &str, start_column: usize) -> [u8; WIDTH] {
    let mut row = [0u8; WIDTH];
    let mut x = start_column;
    for ch in text.chars() {
        let columns = glyph(ch).expect("printable ascii");
        for &col in columns {
            row[x] = col;
            x += 1;
        }
        row[x] = 0;
        x += 1;
    }
    row
}
