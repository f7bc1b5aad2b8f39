//! # Finite State Entropy (FSE)
//!
//! *Table-driven ANS: arithmetic-coding rates at Huffman-like speed.*
//!
//! ## Intuition First
//!
//! A Huffman code must spend a whole number of bits on every symbol. A
//! symbol with probability 0.9 still costs one bit, even though its
//! information content is about 0.15 bits.
//!
//! FSE carries a small integer *state* from symbol to symbol. Frequent
//! symbols nudge the state a little and usually flush zero bits; rare symbols
//! push it a lot and flush several. Averaged over a block, each symbol costs
//! close to its Shannon information `-log2(p)`, and every step is a couple of
//! table lookups.
//!
//! ## The Pipeline
//!
//! ```text
//! histogram ──normalize──▶ weights (sum = 2^table_log)
//!                             │
//!                         spread table
//!                        ┌────┴────┐
//!                 decode table   encode table + symbol transforms
//!                        │              │
//!                   FseDecoder      FseEncoder
//! ```
//!
//! Both tables come from one [`FseTables`] value, built once and shared
//! through an `Arc`. An encoder and decoder built from the same frequencies
//! and parameters always agree.
//!
//! ## Mathematical Formulation
//!
//! With `L = 2^table_log` states and a symbol `s` of weight `f_s`, the encoder
//! keeps a state `x ∈ [L, 2L)`. To encode `s` it flushes low bits until
//! `x ∈ [f_s, 2 f_s)` and then jumps to the `(x - f_s)`-th state assigned to
//! `s` in the spread table. The number of bits flushed is always `k` or
//! `k + 1` for `k = table_log - floor(log2(f_s))`, which is how the codec
//! spends fractional bits on average.
//!
//! ## Block Format
//!
//! ```text
//! block_size (32 bits) | final_state - L (table_log bits) | payload runs...
//! ```
//!
//! All fields are MSB-first. Symbols are encoded last-to-first, so the
//! decoder reads forward and produces them in original order; a correctly
//! decoded block always ends in decoder state 0.
//!
//! ## Failure Modes
//!
//! 1. **Mismatched tables**: decoding with tables from different frequencies
//!    yields garbage; the terminal-state check usually reports it as
//!    [`Error::CorruptStream`].
//! 2. **Table size**: large `table_log` values cost memory and cache; small
//!    ones quantize probabilities coarsely.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use fse::{FseDecoder, FseEncoder, FseParams, FseTables, SymbolMap};
//!
//! let (map, freqs) = SymbolMap::from_counts([("A", 3), ("B", 3), ("C", 2)]).unwrap();
//! let tables = Arc::new(FseTables::new(&freqs, FseParams::new(4)).unwrap());
//!
//! let ids = map.ids(&["A", "C", "B"]).unwrap();
//! let block = FseEncoder::new(tables.clone()).encode_block(&ids).unwrap();
//! let decoded = FseDecoder::new(tables).decode_block(block.as_bits()).unwrap();
//!
//! assert_eq!(map.symbols(&decoded.symbols).unwrap(), vec!["A", "C", "B"]);
//! ```
//!
//! ## References
//!
//! - Duda, J. (2013). "Asymmetric numeral systems: entropy coding combining speed of Huffman coding with compression rate of arithmetic coding."
//! - Collet, Y. (2013). "Finite State Entropy - A new breed of entropy coder."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bits;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod histogram;
pub mod normalize;
pub mod params;
pub mod spread;
pub mod table;

pub use decoder::{DecodedBlock, FseDecoder};
pub use encoder::{EncodedBlock, FseEncoder};
pub use error::{Error, Result};
pub use frame::{
    decode_stream, decode_stream_with_limit, encode_stream, EncodedFrame, FrameOptions,
};
pub use histogram::{Frequencies, SymbolMap};
pub use normalize::{normalize, NormalizedCounts};
pub use params::FseParams;
pub use spread::{build_spread_table, SpreadTable};
pub use table::{DecodeEntry, FseTables, SymbolTransform};
