//! Shared-bus transaction primitives
//!
//! Provides the trait for raw byte transactions that chip-specific HALs
//! implement. Every higher-level peripheral operation is built from
//! these. No retry policy lives at this layer - retries belong to
//! callers.

/// Error from a single bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionError {
    /// The transfer moved fewer bytes than requested
    ShortTransfer {
        /// Bytes the caller asked for
        expected: usize,
        /// Bytes actually transferred
        transferred: usize,
    },
    /// Lower-level bus fault (NACK, arbitration loss, timeout, ...)
    Bus,
}

/// Shared bus master
///
/// Provides synchronous read/write transactions against addressed
/// devices. Implementations block the calling context for the duration
/// of the transfer.
pub trait Bus {
    /// Write data to the device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit device address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), TransactionError>;

    /// Read data from the device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit device address
    /// * `buf` - Buffer to fill; its length is the requested count
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), TransactionError>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// Commonly used to write a register address then read data.
    fn write_read(
        &mut self,
        address: u8,
        data: &[u8],
        buf: &mut [u8],
    ) -> Result<(), TransactionError> {
        self.write(address, data)?;
        self.read(address, buf)
    }
}

/// Bus configuration
#[derive(Debug, Clone, Copy)]
pub struct BusConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100kHz standard mode
        }
    }
}

impl BusConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };
}
