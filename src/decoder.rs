//! FSE block decoder.

use std::sync::Arc;

use crate::bits::{BitReader, BitsRef};
use crate::error::{Error, Result};
use crate::table::FseTables;

/// Symbols recovered from one block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedBlock {
    /// Decoded symbol ids, in original order.
    pub symbols: Vec<u16>,
    /// Bits consumed from the start of the block, header included.
    pub bits_consumed: usize,
}

/// FSE decoder over a shared table set.
#[derive(Clone, Debug)]
pub struct FseDecoder {
    tables: Arc<FseTables>,
}

impl FseDecoder {
    /// Create a decoder over `tables`.
    pub fn new(tables: Arc<FseTables>) -> Self {
        Self { tables }
    }

    /// The shared tables.
    pub fn tables(&self) -> &Arc<FseTables> {
        &self.tables
    }

    /// Decode one symbol from state `state` (in `[0, table_size)`).
    ///
    /// Returns `(symbol, new_state)`.
    ///
    /// # Errors
    /// - `StateOutOfRange` if `state` is not a decoder state of these tables.
    /// - `CorruptStream` if the reader runs out of bits.
    #[inline]
    pub fn decode_symbol(&self, state: u32, bits: &mut BitReader<'_>) -> Result<(u16, u32)> {
        let entry = *self
            .tables
            .decode_table()
            .get(state as usize)
            .ok_or(Error::StateOutOfRange {
                state,
                min: 0,
                max: self.tables.table_size(),
            })?;
        let read = bits.read_bits(entry.nb_bits as u32)?;
        Ok((entry.symbol, entry.new_state_base as u32 + read))
    }

    /// Decode a block starting at the first bit of `bits`.
    ///
    /// # Errors
    /// `CorruptStream` if the stream is truncated or decoding does not end in state 0.
    pub fn decode_block(&self, bits: &BitsRef) -> Result<DecodedBlock> {
        self.decode_block_at(bits, 0)
    }

    /// Decode a block starting at bit `offset` of `bits`.
    ///
    /// # Errors
    /// Same as [`FseDecoder::decode_block`].
    pub fn decode_block_at(&self, bits: &BitsRef, offset: usize) -> Result<DecodedBlock> {
        let params = self.tables.params();
        if offset > bits.len() {
            return Err(Error::CorruptStream(format!(
                "offset {offset} past end of {} bits",
                bits.len()
            )));
        }
        let mut reader = BitReader::with_offset(bits, offset);

        let block_len = reader.read_bits(params.block_size_bits)? as usize;
        if block_len == 0 {
            return Ok(DecodedBlock {
                symbols: Vec::new(),
                bits_consumed: reader.position() - offset,
            });
        }

        let mut state = reader.read_bits(params.table_log)?;
        // A lying length field must not drive a huge up-front allocation.
        let mut symbols = Vec::with_capacity(block_len.min(reader.remaining() + 1));
        for _ in 0..block_len {
            let (symbol, next) = self.decode_symbol(state, &mut reader)?;
            symbols.push(symbol);
            state = next;
        }

        if state != 0 {
            tracing::debug!(state, block_len, "FSE block ended in nonzero state");
            return Err(Error::CorruptStream(format!(
                "final decoder state {state}, expected 0"
            )));
        }

        tracing::trace!(
            symbols = block_len,
            bits = reader.position() - offset,
            "decoded FSE block"
        );
        Ok(DecodedBlock {
            symbols,
            bits_consumed: reader.position() - offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{BitWriter, Bits};
    use bitvec::field::BitField;
    use crate::encoder::FseEncoder;
    use crate::histogram::Frequencies;
    use crate::params::FseParams;
    use proptest::prelude::*;

    fn codec(counts: &[u32], table_log: u32) -> (FseEncoder, FseDecoder) {
        let tables = Arc::new(
            FseTables::new(&Frequencies::new(counts.to_vec()), FseParams::new(table_log))
                .unwrap(),
        );
        (FseEncoder::new(tables.clone()), FseDecoder::new(tables))
    }

    #[test]
    fn test_fse_roundtrip_small() {
        let (enc, dec) = codec(&[3, 3, 2], 4);
        let input = vec![0u16, 2, 1];
        let block = enc.encode_block(&input).unwrap();
        let out = dec.decode_block(block.as_bits()).unwrap();
        assert_eq!(out.symbols, input);
        assert_eq!(out.bits_consumed, block.bit_len());
    }

    #[test]
    fn test_empty_block() {
        let (_, dec) = codec(&[3, 3, 2], 4);
        let zeros = Bits::repeat(false, 32);
        let out = dec.decode_block(&zeros).unwrap();
        assert!(out.symbols.is_empty());
        assert_eq!(out.bits_consumed, 32);
    }

    #[test]
    fn test_decode_symbol_rejects_foreign_state() {
        let (_, dec) = codec(&[3, 3, 2], 4);
        let bits = Bits::repeat(false, 16);
        let mut reader = BitReader::new(&bits);
        assert_eq!(
            dec.decode_symbol(16, &mut reader),
            Err(Error::StateOutOfRange {
                state: 16,
                min: 0,
                max: 16
            })
        );
        assert_eq!(reader.position(), 0);
        assert!(dec.decode_symbol(15, &mut reader).is_ok());
    }

    #[test]
    fn test_block_size_bits_roundtrip() {
        let tables = Arc::new(
            FseTables::new(
                &Frequencies::new(vec![5, 2, 1]),
                FseParams::new(6).with_block_size_bits(8),
            )
            .unwrap(),
        );
        let enc = FseEncoder::new(tables.clone());
        let dec = FseDecoder::new(tables);

        let empty = enc.encode_block::<u16>(&[]).unwrap();
        assert_eq!(empty.bit_len(), 8);
        assert!(empty.as_bits().not_any());
        let out = dec.decode_block(empty.as_bits()).unwrap();
        assert!(out.symbols.is_empty());
        assert_eq!(out.bits_consumed, 8);

        for len in [1usize, 3, 255] {
            let input: Vec<u16> = (0..len).map(|i| [0, 0, 1, 0, 2][i % 5]).collect();
            let block = enc.encode_block(&input).unwrap();
            assert_eq!(block.as_bits()[..8].load_be::<u32>(), len as u32);
            let out = dec.decode_block(block.as_bits()).unwrap();
            assert_eq!(out.symbols, input);
            assert_eq!(out.bits_consumed, block.bit_len());
        }
    }

    #[test]
    fn test_truncated_stream() {
        let (enc, dec) = codec(&[1, 1, 1, 1], 6);
        let block = enc.encode_block(&[0u16, 1, 2, 3, 0, 1]).unwrap();
        let bits = block.as_bits();
        let cut = &bits[..bits.len() - 1];
        assert!(matches!(dec.decode_block(cut), Err(Error::CorruptStream(_))));
        assert!(dec.decode_block(&bits[..10]).is_err());
    }

    #[test]
    fn test_nonzero_final_state_is_reported() {
        // Single-symbol tables read no payload bits, so a nonzero start state
        // walks to itself and the terminal check must catch it.
        let (_, dec) = codec(&[4], 4);
        let mut w = BitWriter::new();
        w.write_bits(3, 32);
        w.write_bits(5, 4);
        let bits = w.finish();
        assert!(matches!(dec.decode_block(&bits), Err(Error::CorruptStream(_))));
    }

    #[test]
    fn test_concatenated_blocks() {
        let (enc, dec) = codec(&[5, 1, 2], 5);
        let a = enc.encode_block(&[0u16, 0, 1, 2]).unwrap();
        let b = enc.encode_block(&[2u16, 2, 0]).unwrap();
        let mut joined = a.as_bits().to_bitvec();
        joined.extend_from_bitslice(b.as_bits());

        let first = dec.decode_block(&joined).unwrap();
        assert_eq!(first.symbols, vec![0, 0, 1, 2]);
        let second = dec.decode_block_at(&joined, first.bits_consumed).unwrap();
        assert_eq!(second.symbols, vec![2, 2, 0]);
        assert_eq!(first.bits_consumed + second.bits_consumed, joined.len());
        assert!(dec.decode_block_at(&joined, joined.len() + 1).is_err());
    }

    proptest! {
        #[test]
        fn prop_fse_roundtrip(
            counts in prop::collection::vec(1u32..100, 2..16),
            table_log in 4u32..=12,
            picks in prop::collection::vec(any::<prop::sample::Index>(), 0..300),
        ) {
            prop_assume!(counts.len() <= 1 << table_log);
            let (enc, dec) = codec(&counts, table_log);
            let input: Vec<u16> = picks.iter().map(|i| i.index(counts.len()) as u16).collect();

            let block = enc.encode_block(&input).unwrap();
            let out = dec.decode_block(block.as_bits()).unwrap();
            prop_assert_eq!(out.symbols, input);
            prop_assert_eq!(out.bits_consumed, block.bit_len());
        }
    }
}
