//! Test doubles for driver unit tests

use heapless::Vec;
use horologe_hal::{Bus, TransactionError};

/// One recorded bus transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub address: u8,
    pub bytes: Vec<u8, 136>,
}

/// Scripted in-memory bus
///
/// Records every write and serves reads from a preloaded register
/// block. Individual writes can be made to fail by index to exercise
/// partial-failure paths.
pub struct MockBus {
    pub writes: Vec<Transfer, 128>,
    /// Data returned by the next read, starting at the written register
    pub read_block: [u8; 16],
    /// Fail the nth write (0-based) with a bus fault
    pub fail_write_at: Option<usize>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            read_block: [0; 16],
            fail_write_at: None,
        }
    }

    pub fn with_registers(block: &[u8]) -> Self {
        let mut bus = Self::new();
        bus.read_block[..block.len()].copy_from_slice(block);
        bus
    }
}

impl Bus for MockBus {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), TransactionError> {
        if self.fail_write_at == Some(self.writes.len()) {
            // Still consume the slot so later writes are observed
            self.fail_write_at = None;
            return Err(TransactionError::Bus);
        }
        let mut bytes = Vec::new();
        bytes.extend_from_slice(data).unwrap();
        self.writes.push(Transfer { address, bytes }).unwrap();
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), TransactionError> {
        let _ = address;
        // Base register is the last byte written before the read
        let base = self
            .writes
            .last()
            .and_then(|t| t.bytes.last().copied())
            .unwrap_or(0) as usize;
        buf.copy_from_slice(&self.read_block[base..base + buf.len()]);
        Ok(())
    }
}
