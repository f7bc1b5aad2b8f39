//! Spread table: assigns every state to exactly one symbol.
//!
//! Symbols are laid down in alphabet order, each repeated by its weight, at
//! positions advancing by a fixed odd step. Because the step is coprime with
//! the power-of-two table size, `table_size` consecutive steps visit every
//! slot exactly once, so a symbol's occurrences end up scattered across the
//! state range instead of clustered.

use crate::error::{Error, Result};
use crate::normalize::NormalizedCounts;

/// Symbol per state, length `table_size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpreadTable {
    symbols: Vec<u16>,
}

impl SpreadTable {
    /// Symbols by state.
    pub fn symbols(&self) -> &[u16] {
        &self.symbols
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a built table.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of slots holding `symbol`.
    pub fn occurrences(&self, symbol: u16) -> usize {
        self.symbols.iter().filter(|&&s| s == symbol).count()
    }
}

/// Step between consecutive placements: odd, hence coprime with `table_size`.
///
/// The `| 1` only changes 2- and 8-state tables, where the base formula is a
/// multiple of the table size.
pub fn spread_step(table_size: u32) -> u32 {
    ((table_size >> 1) + (table_size >> 3) + 3) | 1
}

/// Build the spread table for a normalized histogram.
///
/// # Errors
/// `TableConstructionFailure` if a symbol cannot be placed within
/// `table_size` probes, which only happens when the weights overfill the table.
pub fn build_spread_table(norm: &NormalizedCounts) -> Result<SpreadTable> {
    let table_size = norm.table_size();
    let mask = table_size - 1;
    let step = spread_step(table_size);

    let mut slots: Vec<Option<u16>> = vec![None; table_size as usize];
    let mut pos = 0u32;
    let mut placed = 0u32;

    for (s, &weight) in norm.weights().iter().enumerate() {
        if weight == 0 {
            continue;
        }
        let id = u16::try_from(s).map_err(|_| {
            Error::TableConstructionFailure(format!("symbol {s} does not fit a u16 id"))
        })?;
        for _ in 0..weight {
            let mut probes = 0u32;
            while slots[pos as usize].is_some() {
                pos = (pos + step) & mask;
                probes += 1;
                if probes >= table_size {
                    return Err(Error::TableConstructionFailure(format!(
                        "no free slot for symbol {s} after {placed} placements"
                    )));
                }
            }
            slots[pos as usize] = Some(id);
            pos = (pos + step) & mask;
            placed += 1;
        }
    }

    let symbols = slots
        .into_iter()
        .enumerate()
        .map(|(u, slot)| {
            slot.ok_or_else(|| {
                Error::TableConstructionFailure(format!("state {u} left unassigned"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SpreadTable { symbols })
}
