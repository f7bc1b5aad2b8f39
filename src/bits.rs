//! MSB-first bit sequences.
//!
//! Blocks are plain `BitVec<u8, Msb0>`: the first bit of the stream is the
//! most significant bit of the first byte, and multi-bit fields are stored
//! big-endian, so a block serialized with [`BitVec::into_vec`] reads left to
//! right exactly as the wire format table describes.

use bitvec::field::BitField;
use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;

use crate::error::{Error, Result};

/// Owned MSB-first bit sequence.
pub type Bits = BitVec<u8, Msb0>;

/// Borrowed MSB-first bit sequence.
pub type BitsRef = BitSlice<u8, Msb0>;

/// Appends fixed-width unsigned fields to a [`Bits`] buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    bits: Bits,
}

impl BitWriter {
    /// Empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty writer with room for `nbits`.
    pub fn with_capacity(nbits: usize) -> Self {
        Self {
            bits: Bits::with_capacity(nbits),
        }
    }

    /// Append the low `nbits` of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, nbits: u32) {
        debug_assert!(nbits <= 32);
        if nbits == 0 {
            return;
        }
        let start = self.bits.len();
        self.bits.resize(start + nbits as usize, false);
        let value = if nbits == 32 {
            value
        } else {
            value & ((1u32 << nbits) - 1)
        };
        self.bits[start..].store_be::<u32>(value);
    }

    /// Bits written so far.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Take the buffer.
    pub fn finish(self) -> Bits {
        self.bits
    }
}

/// Reads fixed-width unsigned fields from a bit slice, front to back.
#[derive(Debug)]
pub struct BitReader<'a> {
    bits: &'a BitsRef,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Reader starting at the first bit.
    pub fn new(bits: &'a BitsRef) -> Self {
        Self { bits, pos: 0 }
    }

    /// Reader starting at bit `offset`.
    pub fn with_offset(bits: &'a BitsRef, offset: usize) -> Self {
        Self { bits, pos: offset }
    }

    /// Read `nbits` (at most 32) as a big-endian unsigned integer.
    ///
    /// # Errors
    /// `CorruptStream` if fewer than `nbits` bits remain.
    pub fn read_bits(&mut self, nbits: u32) -> Result<u32> {
        debug_assert!(nbits <= 32);
        if nbits == 0 {
            return Ok(0);
        }
        let end = self.pos + nbits as usize;
        if end > self.bits.len() {
            return Err(Error::CorruptStream(format!(
                "needed {nbits} bits at position {}, only {} available",
                self.pos,
                self.bits.len().saturating_sub(self.pos)
            )));
        }
        let value = self.bits[self.pos..end].load_be::<u32>();
        self.pos = end;
        Ok(value)
    }

    /// Current bit position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bits left to read.
    pub fn remaining(&self) -> usize {
        self.bits.len().saturating_sub(self.pos)
    }
}
