//! Codec parameters shared by the encoder and decoder.
//!
//! Both sides of a session must agree on these values: the decoder rebuilds
//! the same tables from the same `(frequencies, table_log)` pair and reads a
//! length field of the same width.

use crate::error::{Error, Result};

/// Smallest supported `table_log`.
pub const MIN_TABLE_LOG: u32 = 1;

/// Largest supported `table_log`.
///
/// Encoder states live in `[table_size, 2 * table_size)` and are stored as `u16`.
pub const MAX_TABLE_LOG: u32 = 15;

/// Most symbol ids a table can hold; ids are `u16`.
pub const MAX_ALPHABET_SIZE: usize = u16::MAX as usize + 1;

/// Default `table_log` (4096 states).
pub const DEFAULT_TABLE_LOG: u32 = 12;

/// Default width of the block-length field.
pub const DEFAULT_BLOCK_SIZE_BITS: u32 = 32;

/// Parameters for one FSE coding session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FseParams {
    /// Log2 of the number of states.
    pub table_log: u32,
    /// Width in bits of the symbol-count prefix of each block.
    pub block_size_bits: u32,
}

impl Default for FseParams {
    fn default() -> Self {
        Self {
            table_log: DEFAULT_TABLE_LOG,
            block_size_bits: DEFAULT_BLOCK_SIZE_BITS,
        }
    }
}

impl FseParams {
    /// Parameters with the given `table_log` and the default length field.
    pub fn new(table_log: u32) -> Self {
        Self {
            table_log,
            ..Self::default()
        }
    }

    /// Set `table_log`.
    pub fn with_table_log(mut self, table_log: u32) -> Self {
        self.table_log = table_log;
        self
    }

    /// Set the width of the block-length field.
    pub fn with_block_size_bits(mut self, bits: u32) -> Self {
        self.block_size_bits = bits;
        self
    }

    /// Number of states, `2^table_log`.
    pub fn table_size(&self) -> u32 {
        1 << self.table_log
    }

    /// Largest block length the length field can hold.
    pub fn max_block_len(&self) -> u64 {
        (1u64 << self.block_size_bits) - 1
    }

    /// Check both fields are in range.
    ///
    /// # Errors
    /// `InvalidTableLog` or `InvalidBlockSizeBits`.
    pub fn validate(&self) -> Result<()> {
        validate_table_log(self.table_log)?;
        if self.block_size_bits == 0 || self.block_size_bits > 32 {
            return Err(Error::InvalidBlockSizeBits(self.block_size_bits));
        }
        Ok(())
    }
}

pub(crate) fn validate_table_log(table_log: u32) -> Result<()> {
    if !(MIN_TABLE_LOG..=MAX_TABLE_LOG).contains(&table_log) {
        return Err(Error::InvalidTableLog {
            table_log,
            max: MAX_TABLE_LOG,
        });
    }
    Ok(())
}
