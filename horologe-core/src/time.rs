//! Wall-clock time math
//!
//! BCD conversion for RTC registers, seconds-since-midnight arithmetic
//! and fixed-width `HH:MM:SS` formatting. Integer-only, no allocation.

use heapless::String;

/// Number of registers in the RTC time block
pub const TIME_BLOCK_LEN: usize = 7;

/// Bit 7 of the seconds register: oscillator halted when set
const CLOCK_HALT_BIT: u8 = 0x80;

/// Encode a binary value (0-99) as packed BCD
///
/// Out-of-range input is a caller error; the register contract only
/// covers two decimal digits.
pub fn bcd_encode(value: u8) -> u8 {
    debug_assert!(value < 100);
    (value / 10) << 4 | (value % 10)
}

/// Decode a packed BCD byte into its binary value
pub fn bcd_decode(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0x0F)
}

/// Seconds elapsed since midnight for the given wall-clock time
///
/// Range is 0..=86399 for valid inputs.
pub fn seconds_since_midnight(hours: u8, minutes: u8, seconds: u8) -> i32 {
    hours as i32 * 3600 + minutes as i32 * 60 + seconds as i32
}

/// A decoded reading of the RTC time block
///
/// Produced fresh on every successful poll; immutable once created.
/// Keeps the raw register block alongside the decoded fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockSnapshot {
    /// Hours, 0-23
    pub hours: u8,
    /// Minutes, 0-59
    pub minutes: u8,
    /// Seconds, 0-59
    pub seconds: u8,
    /// Raw register block the fields were decoded from
    pub raw: [u8; TIME_BLOCK_LEN],
}

impl ClockSnapshot {
    /// Decode a snapshot from the raw 7-byte register block
    ///
    /// Register 0 carries seconds with the clock-halt flag in bit 7,
    /// which is masked out. Registers 1 and 2 carry minutes and hours.
    /// Registers 3-6 are unused by this system and kept verbatim.
    pub fn from_registers(raw: [u8; TIME_BLOCK_LEN]) -> Self {
        Self {
            hours: bcd_decode(raw[2]),
            minutes: bcd_decode(raw[1]),
            seconds: bcd_decode(raw[0] & !CLOCK_HALT_BIT),
            raw,
        }
    }

    /// Seconds elapsed since midnight for this snapshot
    pub fn seconds_since_midnight(&self) -> i32 {
        seconds_since_midnight(self.hours, self.minutes, self.seconds)
    }

    /// Format as fixed-width `HH:MM:SS`
    pub fn format(&self) -> String<8> {
        let mut out = String::new();
        push_two_digits(&mut out, self.hours);
        let _ = out.push(':');
        push_two_digits(&mut out, self.minutes);
        let _ = out.push(':');
        push_two_digits(&mut out, self.seconds);
        out
    }
}

/// Push a zero-padded two-digit decimal value
///
/// Infallible for values below 100 into a buffer with room for two
/// more bytes, so push errors are discarded.
fn push_two_digits(out: &mut String<8>, value: u8) {
    let _ = out.push((b'0' + value / 10) as char);
    let _ = out.push((b'0' + value % 10) as char);
}
