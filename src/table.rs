//! Encode and decode tables.
//!
//! Both tables are derived from one spread table and are inverses of each
//! other. They are built once per `(frequencies, table_log)` pair and shared
//! read-only by encoders and decoders (usually behind an `Arc`).
//!
//! ## State ranges
//!
//! ```text
//! decoder state  u  in [0, L)          L = 2^table_log
//! encoder state  x  in [L, 2L)         x = L + u
//! symbol s, weight f: sub-states in [f, 2f)
//! ```
//!
//! Decoding state `u` yields `spread[u]` and the sub-state `x_s` (the k-th
//! occurrence of `s` maps to `f + k`). Reading `nb_bits = table_log -
//! floor(log2(x_s))` bits scales `x_s` back into `[L, 2L)`, so each symbol
//! costs either `k` or `k + 1` bits depending on the state.

use std::fmt;

use crate::error::{Error, Result};
use crate::histogram::Frequencies;
use crate::normalize::{normalize, NormalizedCounts};
use crate::params::FseParams;
use crate::spread::{build_spread_table, SpreadTable};

/// Decoder entry for one state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeEntry {
    /// Base value for the next state; the bits read are added to it.
    pub new_state_base: u16,
    /// Number of bits to read from the stream.
    pub nb_bits: u8,
    /// The decoded symbol.
    pub symbol: u16,
}

/// Per-symbol encoder transform.
///
/// `(x + delta_nb_bits) >> 16` is the number of bits to flush from encoder
/// state `x`; `(x >> nb_bits) + delta_find_state` indexes the next-state table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SymbolTransform {
    /// `(max_bits_out << 16) - (freq << max_bits_out)`, wrapping.
    pub delta_nb_bits: u32,
    /// `cumul[s] - freq`.
    pub delta_find_state: i32,
}

/// Immutable table set for one coding session.
#[derive(Clone, PartialEq, Eq)]
pub struct FseTables {
    params: FseParams,
    normalized: NormalizedCounts,
    spread: SpreadTable,
    decode: Vec<DecodeEntry>,
    next_state: Vec<u16>,
    transforms: Vec<SymbolTransform>,
}

impl FseTables {
    /// Normalize `freqs` and build every table.
    ///
    /// # Errors
    /// Any parameter, normalization, or construction error. No partially
    /// built tables are ever returned.
    pub fn new(freqs: &Frequencies, params: FseParams) -> Result<Self> {
        params.validate()?;
        let normalized = normalize(freqs, params.table_log)?;
        Self::from_normalized(normalized, params)
    }

    /// Build from weights that are already normalized.
    ///
    /// # Errors
    /// `InvalidTableLog` if `params.table_log` differs from the weights' table log,
    /// plus any construction error.
    pub fn from_normalized(normalized: NormalizedCounts, params: FseParams) -> Result<Self> {
        params.validate()?;
        if normalized.table_log() != params.table_log {
            return Err(Error::InvalidTableLog {
                table_log: normalized.table_log(),
                max: params.table_log,
            });
        }

        let spread = build_spread_table(&normalized)?;
        let decode = build_decode_table(&spread, &normalized);
        let (next_state, transforms) = build_encode_table(&spread, &normalized);

        tracing::debug!(
            table_log = params.table_log,
            alphabet = normalized.alphabet_size(),
            "built FSE tables"
        );

        Ok(Self {
            params,
            normalized,
            spread,
            decode,
            next_state,
            transforms,
        })
    }

    /// Codec parameters.
    pub fn params(&self) -> FseParams {
        self.params
    }

    /// Log2 of the number of states.
    pub fn table_log(&self) -> u32 {
        self.params.table_log
    }

    /// Number of states.
    pub fn table_size(&self) -> u32 {
        self.params.table_size()
    }

    /// Number of symbol ids.
    pub fn alphabet_size(&self) -> usize {
        self.normalized.alphabet_size()
    }

    /// Normalized weights the tables were built from.
    pub fn normalized(&self) -> &NormalizedCounts {
        &self.normalized
    }

    /// Spread table.
    pub fn spread(&self) -> &SpreadTable {
        &self.spread
    }

    /// Decode table, indexed by decoder state.
    pub fn decode_table(&self) -> &[DecodeEntry] {
        &self.decode
    }

    /// Next-state table, indexed by `cumul[s] + occurrence`.
    pub fn next_state_table(&self) -> &[u16] {
        &self.next_state
    }

    /// Per-symbol transforms.
    pub fn transforms(&self) -> &[SymbolTransform] {
        &self.transforms
    }

    /// Transform for a symbol that can actually be encoded.
    ///
    /// # Errors
    /// `AlphabetMismatch` if the id is outside the alphabet or has weight 0.
    #[inline]
    pub(crate) fn transform(&self, symbol: usize) -> Result<SymbolTransform> {
        match self.transforms.get(symbol) {
            Some(&tt) if self.normalized.weight(symbol) > 0 => Ok(tt),
            _ => Err(Error::AlphabetMismatch {
                symbol,
                alphabet_size: self.alphabet_size(),
            }),
        }
    }
}

impl fmt::Debug for FseTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FseTables")
            .field("table_log", &self.params.table_log)
            .field("block_size_bits", &self.params.block_size_bits)
            .field("alphabet_size", &self.alphabet_size())
            .finish_non_exhaustive()
    }
}

#[inline]
pub(crate) fn floor_log2(x: u32) -> u32 {
    debug_assert!(x > 0);
    31 - x.leading_zeros()
}

fn build_decode_table(spread: &SpreadTable, norm: &NormalizedCounts) -> Vec<DecodeEntry> {
    let table_log = norm.table_log();
    let table_size = norm.table_size();
    // sub-state counters start at each symbol's weight
    let mut symbol_next: Vec<u32> = norm.weights().to_vec();

    spread
        .symbols()
        .iter()
        .map(|&s| {
            let next_state_enc = symbol_next[s as usize];
            symbol_next[s as usize] += 1;

            let nb_bits = table_log - floor_log2(next_state_enc);
            let new_state_base = (next_state_enc << nb_bits) - table_size;
            debug_assert!(new_state_base + ((1 << nb_bits) - 1) < table_size);

            DecodeEntry {
                new_state_base: new_state_base as u16,
                nb_bits: nb_bits as u8,
                symbol: s,
            }
        })
        .collect()
}

fn build_encode_table(
    spread: &SpreadTable,
    norm: &NormalizedCounts,
) -> (Vec<u16>, Vec<SymbolTransform>) {
    let table_log = norm.table_log();
    let table_size = norm.table_size();
    let weights = norm.weights();

    let mut cumul = Vec::with_capacity(weights.len());
    let mut acc = 0u32;
    for &w in weights {
        cumul.push(acc);
        acc += w;
    }

    let mut next_state = vec![0u16; table_size as usize];
    let mut slot = cumul.clone();
    for (u, &s) in spread.symbols().iter().enumerate() {
        let idx = &mut slot[s as usize];
        next_state[*idx as usize] = (table_size + u as u32) as u16;
        *idx += 1;
    }

    let transforms = weights
        .iter()
        .zip(&cumul)
        .map(|(&freq, &start)| match freq {
            // never used: the encoder rejects zero-weight symbols
            0 => SymbolTransform {
                delta_nb_bits: ((table_log + 1) << 16).wrapping_sub(table_size),
                delta_find_state: 0,
            },
            _ => {
                let max_bits_out = if freq == 1 {
                    table_log
                } else {
                    table_log - floor_log2(freq - 1)
                };
                let min_state_plus = freq << max_bits_out;
                SymbolTransform {
                    delta_nb_bits: (max_bits_out << 16).wrapping_sub(min_state_plus),
                    delta_find_state: start as i32 - freq as i32,
                }
            }
        })
        .collect();

    (next_state, transforms)
}
