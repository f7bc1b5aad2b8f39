//! Frequency normalization.
//!
//! Rescales an arbitrary histogram so that its weights sum to exactly
//! `table_size = 2^table_log`, keeping every present symbol at weight >= 1.
//!
//! ## Algorithm
//!
//! 1. Each present symbol gets `round(c * table_size / total)` (ties to even),
//!    floored at 1. The rounding is done in integer arithmetic so results do
//!    not depend on float behaviour.
//! 2. The signed deficit against `table_size` is distributed one unit at a
//!    time, walking symbols by descending original count (stable on ties).
//!    Surplus goes to the most frequent symbol; a shortfall is taken from the
//!    most frequent symbol until it reaches 1, then from the next one.

use crate::error::{Error, Result};
use crate::histogram::Frequencies;
use crate::params::{validate_table_log, MAX_ALPHABET_SIZE};

/// Normalized weights summing to `2^table_log`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedCounts {
    weights: Vec<u32>,
    table_log: u32,
}

impl NormalizedCounts {
    /// Wrap weights that are already normalized.
    ///
    /// # Errors
    /// `InvalidTableLog`, or `InvalidDistribution` if the weights do not sum to
    /// `2^table_log` or there are more than [`MAX_ALPHABET_SIZE`] of them.
    pub fn from_weights(weights: Vec<u32>, table_log: u32) -> Result<Self> {
        validate_table_log(table_log)?;
        check_alphabet_size(weights.len())?;
        let sum: u64 = weights.iter().map(|&w| w as u64).sum();
        if sum != 1u64 << table_log {
            return Err(Error::InvalidDistribution(format!(
                "weights sum to {sum}, expected {}",
                1u64 << table_log
            )));
        }
        Ok(Self { weights, table_log })
    }

    /// Per-symbol weights, indexed by symbol id.
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    /// Weight of one symbol (0 if outside the alphabet).
    pub fn weight(&self, symbol: usize) -> u32 {
        self.weights.get(symbol).copied().unwrap_or(0)
    }

    /// Log2 of the table size.
    pub fn table_log(&self) -> u32 {
        self.table_log
    }

    /// `2^table_log`.
    pub fn table_size(&self) -> u32 {
        1 << self.table_log
    }

    /// Number of symbol ids, including zero-weight ones.
    pub fn alphabet_size(&self) -> usize {
        self.weights.len()
    }
}

/// Normalize a histogram to `2^table_log`.
///
/// # Errors
/// - `InvalidTableLog` if `table_log` is out of range.
/// - `InvalidDistribution` if the total count is zero, there are more
///   present symbols than table slots, or the alphabet exceeds [`MAX_ALPHABET_SIZE`].
pub fn normalize(freqs: &Frequencies, table_log: u32) -> Result<NormalizedCounts> {
    validate_table_log(table_log)?;
    check_alphabet_size(freqs.alphabet_size())?;
    let table_size = 1u64 << table_log;
    let counts = freqs.counts();

    let total = freqs.total();
    if total == 0 {
        return Err(Error::InvalidDistribution(
            "total frequency is zero".to_string(),
        ));
    }
    let present = freqs.present().count() as u64;
    if present > table_size {
        return Err(Error::InvalidDistribution(format!(
            "{present} symbols cannot fit in a table of {table_size} states"
        )));
    }

    let mut weights = vec![0u32; counts.len()];
    let mut allocated = 0u64;
    for (w, &c) in weights.iter_mut().zip(counts) {
        if c == 0 {
            continue;
        }
        let n = round_ratio(c as u64 * table_size, total).max(1);
        *w = n as u32;
        allocated += n;
    }

    let mut diff = table_size as i64 - allocated as i64;
    if diff != 0 {
        let mut order: Vec<usize> = (0..counts.len()).collect();
        // stable: ties keep alphabet order
        order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));

        let step: i64 = if diff > 0 { 1 } else { -1 };
        let mut idx = 0;
        while diff != 0 && idx < order.len() {
            let s = order[idx];
            let candidate = weights[s] as i64 + step;
            if candidate > 0 {
                weights[s] = candidate as u32;
                diff -= step;
            } else {
                idx += 1;
            }
        }
    }

    // Unreachable with `present <= table_size`: every present symbol can give up
    // units down to 1, and sum(1) <= table_size.
    if diff != 0 {
        return Err(Error::InvalidDistribution(format!(
            "could not reconcile weights, {diff} units left over"
        )));
    }

    tracing::trace!(table_log, present, "normalized histogram");
    Ok(NormalizedCounts { weights, table_log })
}

fn check_alphabet_size(len: usize) -> Result<()> {
    if len > MAX_ALPHABET_SIZE {
        return Err(Error::InvalidDistribution(format!(
            "alphabet of {len} symbols exceeds {MAX_ALPHABET_SIZE} ids"
        )));
    }
    Ok(())
}

/// `round(num / den)` with ties to even.
fn round_ratio(num: u64, den: u64) -> u64 {
    let q = num / den;
    let r = num % den;
    match (2 * r).cmp(&den) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q & 1),
    }
}
