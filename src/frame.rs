//! Framed byte streams: a bounded input split into independently coded blocks.
//!
//! Each block carries its own histogram, so the decoder can rebuild the
//! exact tables the encoder used. Header fields are little-endian:
//!
//! ```text
//! block_len     u32   bytes in this block
//! bit_count     u32   bits in the FSE payload
//! table_log     u8
//! alphabet_len  u16
//! counts        u32 x alphabet_len   raw histogram
//! payload       ceil(bit_count / 8) bytes, MSB-first
//! ```

use std::sync::Arc;

use crate::bits::Bits;
use crate::decoder::FseDecoder;
use crate::encoder::FseEncoder;
use crate::error::{Error, Result};
use crate::histogram::Frequencies;
use crate::params::{FseParams, DEFAULT_TABLE_LOG};
use crate::table::FseTables;

/// Default block size in bytes.
pub const DEFAULT_FRAME_BLOCK_SIZE: usize = 32 * 1024;

/// Framing options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameOptions {
    /// Bytes per block; 0 puts the whole input in one block.
    pub block_size: usize,
    /// `table_log` used for every block.
    pub table_log: u32,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_FRAME_BLOCK_SIZE,
            table_log: DEFAULT_TABLE_LOG,
        }
    }
}

/// A framed stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedFrame {
    /// Serialized blocks.
    pub bytes: Vec<u8>,
    /// Length of the input that was framed.
    pub original_size: usize,
}

impl EncodedFrame {
    /// Compressed size over input size.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.bytes.len() as f64 / self.original_size as f64
    }
}

/// Encode `input` into framed blocks.
///
/// # Errors
/// Parameter errors from `opts`, or `BlockTooLarge` if a block's length or
/// payload bit count does not fit its `u32` header field.
pub fn encode_stream(input: &[u8], opts: &FrameOptions) -> Result<EncodedFrame> {
    let params = FseParams::new(opts.table_log);
    params.validate()?;
    let block_size = match opts.block_size {
        0 => input.len().max(1),
        n => n,
    };

    let mut out = Vec::new();
    for chunk in input.chunks(block_size) {
        let block_len = header_field(chunk.len())?;
        let freqs = trimmed_histogram(chunk);
        let tables = Arc::new(FseTables::new(&freqs, params)?);
        let block = FseEncoder::new(tables).encode_block(chunk)?;
        let (payload, bit_count) = block.into_bytes();
        let bit_count = header_field(bit_count)?;

        out.extend_from_slice(&block_len.to_le_bytes());
        out.extend_from_slice(&bit_count.to_le_bytes());
        out.push(opts.table_log as u8);
        out.extend_from_slice(&(freqs.alphabet_size() as u16).to_le_bytes());
        for &c in freqs.counts() {
            out.extend_from_slice(&c.to_le_bytes());
        }
        out.extend_from_slice(&payload);

        tracing::debug!(block_len, bit_count, "framed FSE block");
    }

    Ok(EncodedFrame {
        bytes: out,
        original_size: input.len(),
    })
}

/// Decode a framed stream produced by [`encode_stream`].
///
/// Output size is bounded only by the headers. A tiny frame can declare a
/// multi-gigabyte run of one symbol; use [`decode_stream_with_limit`] for
/// untrusted input.
///
/// # Errors
/// `CorruptStream` on truncation or any header/payload inconsistency.
pub fn decode_stream(data: &[u8]) -> Result<Vec<u8>> {
    decode_stream_with_limit(data, usize::MAX)
}

/// Decode a framed stream, refusing to produce more than `limit` bytes.
///
/// # Errors
/// `OutputLimitExceeded` before decoding any block that would cross
/// `limit`; otherwise as [`decode_stream`].
pub fn decode_stream_with_limit(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut cursor = Cursor { data, pos: 0 };
    let mut output = Vec::new();

    while !cursor.is_done() {
        let block_len = cursor.read_u32()? as usize;
        if block_len > limit - output.len() {
            return Err(Error::OutputLimitExceeded { limit });
        }
        let bit_count = cursor.read_u32()? as usize;
        let table_log = cursor.read_u8()? as u32;
        let alphabet_len = cursor.read_u16()? as usize;
        if alphabet_len > 256 {
            return Err(Error::CorruptStream(format!(
                "byte alphabet of {alphabet_len} symbols"
            )));
        }
        let counts = (0..alphabet_len)
            .map(|_| cursor.read_u32())
            .collect::<Result<Vec<_>>>()?;
        let payload = cursor.take(bit_count.div_ceil(8))?;

        let freqs = Frequencies::new(counts);
        if freqs.total() != block_len as u64 {
            return Err(Error::CorruptStream(format!(
                "histogram totals {} but block declares {block_len} bytes",
                freqs.total()
            )));
        }
        let tables = FseTables::new(&freqs, FseParams::new(table_log))
            .map_err(|e| Error::CorruptStream(format!("block header: {e}")))?;
        let mut bits = Bits::from_slice(payload);
        bits.truncate(bit_count);
        let decoded = FseDecoder::new(Arc::new(tables)).decode_block(&bits)?;
        if decoded.symbols.len() != block_len {
            return Err(Error::CorruptStream(format!(
                "block declared {block_len} bytes, decoded {}",
                decoded.symbols.len()
            )));
        }
        // ids are < alphabet_len <= 256
        output.extend(decoded.symbols.iter().map(|&s| s as u8));
    }

    Ok(output)
}

fn header_field(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::BlockTooLarge {
        len,
        max: u32::MAX as u64,
    })
}

/// Byte histogram truncated after the largest byte value present.
fn trimmed_histogram(chunk: &[u8]) -> Frequencies {
    let full = Frequencies::from_bytes(chunk);
    let len = full.present().last().map_or(0, |s| s + 1);
    Frequencies::new(full.counts()[..len].to_vec())
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn is_done(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.data.len());
        match end {
            Some(end) => {
                let out = &self.data[self.pos..end];
                self.pos = end;
                Ok(out)
            }
            None => Err(Error::CorruptStream(format!(
                "frame truncated: needed {n} bytes at offset {}",
                self.pos
            ))),
        }
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}
