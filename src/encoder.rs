//! FSE block encoder.
//!
//! Symbols are encoded last-to-first so that the decoder, reading the stream
//! front to back, emits them in their original order. Each step flushes the
//! low `nb_bits` of the state; the final state is written ahead of all the
//! per-symbol payloads, right after the block length.

use std::sync::Arc;

use crate::bits::{BitWriter, Bits, BitsRef};
use crate::error::{Error, Result};
use crate::table::FseTables;

/// One encoded block: `block_len | final_state | payload...`, MSB-first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedBlock {
    bits: Bits,
}

impl EncodedBlock {
    /// Wrap an existing bit sequence.
    pub fn from_bits(bits: Bits) -> Self {
        Self { bits }
    }

    /// Rebuild from bytes produced by [`EncodedBlock::into_bytes`].
    ///
    /// # Errors
    /// `CorruptStream` if `bit_len` exceeds the bytes given.
    pub fn from_bytes(bytes: Vec<u8>, bit_len: usize) -> Result<Self> {
        let mut bits = Bits::from_vec(bytes);
        if bit_len > bits.len() {
            return Err(Error::CorruptStream(format!(
                "bit length {bit_len} exceeds {} available bits",
                bits.len()
            )));
        }
        bits.truncate(bit_len);
        Ok(Self { bits })
    }

    /// The encoded bits.
    pub fn as_bits(&self) -> &BitsRef {
        &self.bits
    }

    /// Number of meaningful bits.
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Zero-padded bytes and the number of meaningful bits.
    pub fn into_bytes(self) -> (Vec<u8>, usize) {
        let len = self.bits.len();
        let mut bits = self.bits;
        bits.set_uninitialized(false);
        (bits.into_vec(), len)
    }

    /// Take the bit sequence.
    pub fn into_bits(self) -> Bits {
        self.bits
    }

    /// Average cost of `symbols` symbols in this block, header included.
    pub fn bits_per_symbol(&self, symbols: usize) -> f64 {
        if symbols == 0 {
            return 0.0;
        }
        self.bits.len() as f64 / symbols as f64
    }
}

/// FSE encoder over a shared table set.
#[derive(Clone, Debug)]
pub struct FseEncoder {
    tables: Arc<FseTables>,
}

impl FseEncoder {
    /// Create an encoder over `tables`.
    pub fn new(tables: Arc<FseTables>) -> Self {
        Self { tables }
    }

    /// The shared tables.
    pub fn tables(&self) -> &Arc<FseTables> {
        &self.tables
    }

    /// Encode one symbol from state `state` (in `[table_size, 2 * table_size)`).
    ///
    /// Returns `(new_state, nb_bits_out, bits_value)`.
    ///
    /// # Errors
    /// - `StateOutOfRange` if `state` is not in `[table_size, 2 * table_size)`.
    /// - `AlphabetMismatch` if the symbol cannot be encoded with these tables.
    #[inline]
    pub fn encode_symbol(&self, state: u32, symbol: usize) -> Result<(u32, u32, u32)> {
        let table_size = self.tables.table_size();
        if !(table_size..2 * table_size).contains(&state) {
            return Err(Error::StateOutOfRange {
                state,
                min: table_size,
                max: 2 * table_size,
            });
        }
        let tt = self.tables.transform(symbol)?;
        let nb_bits_out = state.wrapping_add(tt.delta_nb_bits) >> 16;
        let bits_value = state & ((1u32 << nb_bits_out) - 1);
        let subrange_id = state >> nb_bits_out;
        // In range for any state in [T, 2T): subrange_id lands in [w, 2w).
        let idx = (subrange_id as i32 + tt.delta_find_state) as usize;
        let new_state = self.tables.next_state_table()[idx] as u32;
        Ok((new_state, nb_bits_out, bits_value))
    }

    /// Encode a block of symbol ids.
    ///
    /// # Errors
    /// - `BlockTooLarge` if the length does not fit the length field.
    /// - `AlphabetMismatch` if any symbol is not in the tables' alphabet;
    ///   nothing is returned for the block in that case.
    pub fn encode_block<S: Copy + Into<usize>>(&self, symbols: &[S]) -> Result<EncodedBlock> {
        let params = self.tables.params();
        let table_log = params.table_log;
        let table_size = params.table_size();

        if symbols.len() as u64 > params.max_block_len() {
            return Err(Error::BlockTooLarge {
                len: symbols.len(),
                max: params.max_block_len(),
            });
        }

        // Emission order is reversed; payloads are written back to front.
        let mut chunks: Vec<(u32, u32)> = Vec::with_capacity(symbols.len());
        let mut state = table_size;
        for &s in symbols.iter().rev() {
            let (next, nb_bits, value) = self.encode_symbol(state, s.into())?;
            chunks.push((value, nb_bits));
            state = next;
        }
        debug_assert!((table_size..2 * table_size).contains(&state));

        let payload_bits: usize = chunks.iter().map(|&(_, nb)| nb as usize).sum();
        let mut writer = BitWriter::with_capacity(
            params.block_size_bits as usize + table_log as usize + payload_bits,
        );
        writer.write_bits(symbols.len() as u32, params.block_size_bits);
        if symbols.is_empty() {
            return Ok(EncodedBlock::from_bits(writer.finish()));
        }

        writer.write_bits(state - table_size, table_log);
        for &(value, nb_bits) in chunks.iter().rev() {
            writer.write_bits(value, nb_bits);
        }

        tracing::trace!(
            symbols = symbols.len(),
            bits = writer.len(),
            "encoded FSE block"
        );
        Ok(EncodedBlock::from_bits(writer.finish()))
    }
}
