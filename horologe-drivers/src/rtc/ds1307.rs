//! DS1307 RTC driver
//!
//! Battery-backed real-time clock with a 7-register BCD time block
//! starting at address 0x00. Only seconds/minutes/hours are used by
//! this system; the remaining registers are read and kept raw.

use horologe_core::time::{bcd_encode, ClockSnapshot, TIME_BLOCK_LEN};
use horologe_hal::{Bus, TransactionError};

/// DS1307 I2C address (fixed by the part)
pub const DS1307_ADDR: u8 = 0x68;

/// DS1307 register map
mod reg {
    pub const SECONDS: u8 = 0x00;
    pub const MINUTES: u8 = 0x01;
    pub const HOURS: u8 = 0x02;
}

/// Errors from RTC operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// Bus transaction failed
    Transaction(TransactionError),
    /// Time fields outside 23:59:59
    InvalidTime,
}

impl From<TransactionError> for RtcError {
    fn from(e: TransactionError) -> Self {
        RtcError::Transaction(e)
    }
}

/// DS1307 driver borrowing the shared bus for one operation
pub struct Ds1307<'a, B> {
    bus: &'a mut B,
    address: u8,
}

impl<'a, B> Ds1307<'a, B>
where
    B: Bus,
{
    /// Create a driver view over the bus for the device at `address`
    pub fn new(bus: &'a mut B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Read the current time
    ///
    /// Writes the base register address, reads the full 7-byte block
    /// and decodes seconds (clock-halt bit masked), minutes and hours.
    pub fn read_time(&mut self) -> Result<ClockSnapshot, RtcError> {
        let mut raw = [0u8; TIME_BLOCK_LEN];
        self.bus
            .write_read(self.address, &[reg::SECONDS], &mut raw)?;
        Ok(ClockSnapshot::from_registers(raw))
    }

    /// Set the time as three independent register writes
    ///
    /// Seconds, minutes and hours are written in that order. The
    /// operation is not atomic: every sub-write is attempted
    /// regardless of earlier failures and nothing is rolled back. The
    /// first failure (in write order) is reported once all three have
    /// run.
    pub fn set_time(&mut self, hours: u8, minutes: u8, seconds: u8) -> Result<(), RtcError> {
        if hours > 23 || minutes > 59 || seconds > 59 {
            return Err(RtcError::InvalidTime);
        }

        let sec = self.write_register(reg::SECONDS, bcd_encode(seconds));
        let min = self.write_register(reg::MINUTES, bcd_encode(minutes));
        let hr = self.write_register(reg::HOURS, bcd_encode(hours));

        sec.and(min).and(hr)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), RtcError> {
        self.bus.write(self.address, &[register, value])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockBus;

    #[test]
    fn test_read_time_decodes_block() {
        // 12:34:56 in BCD, halt bit set on seconds
        let mut bus = MockBus::with_registers(&[0x80 | 0x56, 0x34, 0x12, 0, 0, 0, 0]);
        let snap = Ds1307::new(&mut bus, DS1307_ADDR).read_time().unwrap();
        assert_eq!((snap.hours, snap.minutes, snap.seconds), (12, 34, 56));
        // Register address write preceded the read
        assert_eq!(bus.writes[0].bytes.as_slice(), &[0x00]);
        assert_eq!(bus.writes[0].address, DS1307_ADDR);
    }

    #[test]
    fn test_set_time_writes_three_registers() {
        let mut bus = MockBus::new();
        Ds1307::new(&mut bus, DS1307_ADDR)
            .set_time(10, 30, 0)
            .unwrap();
        assert_eq!(bus.writes.len(), 3);
        assert_eq!(bus.writes[0].bytes.as_slice(), &[0x00, 0x00]); // seconds
        assert_eq!(bus.writes[1].bytes.as_slice(), &[0x01, 0x30]); // minutes
        assert_eq!(bus.writes[2].bytes.as_slice(), &[0x02, 0x10]); // hours
    }

    #[test]
    fn test_set_time_not_atomic() {
        // First write fails; the other two must still be attempted
        let mut bus = MockBus::new();
        bus.fail_write_at = Some(0);
        let result = Ds1307::new(&mut bus, DS1307_ADDR).set_time(10, 30, 0);
        assert_eq!(result, Err(RtcError::Transaction(TransactionError::Bus)));
        assert_eq!(bus.writes.len(), 2); // minutes and hours landed anyway
        assert_eq!(bus.writes[0].bytes.as_slice(), &[0x01, 0x30]);
        assert_eq!(bus.writes[1].bytes.as_slice(), &[0x02, 0x10]);
    }

    #[test]
    fn test_set_time_rejects_out_of_range() {
        let mut bus = MockBus::new();
        let result = Ds1307::new(&mut bus, DS1307_ADDR).set_time(24, 0, 0);
        assert_eq!(result, Err(RtcError::InvalidTime));
        assert!(bus.writes.is_empty()); // rejected before any bus traffic
    }
}
