//! Symbol histograms and the dense-id mapping used at the codec boundary.
//!
//! The tables index everything by symbol id, so the core only ever sees
//! `u16` ids in `[0, alphabet_size)`. Callers with richer symbol types
//! (strings, tokens, tuples) go through [`SymbolMap`].

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::params::MAX_ALPHABET_SIZE;

/// Symbol counts indexed by dense symbol id.
///
/// The alphabet is `0..len()`, in index order. Ids with count 0 are part of
/// the alphabet but cannot be encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frequencies {
    counts: Vec<u32>,
}

impl Frequencies {
    /// Wrap raw counts.
    pub fn new(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    /// Count occurrences of each id in `symbols`. The alphabet extends to the largest id seen.
    pub fn from_symbols<S: Copy + Into<usize>>(symbols: &[S]) -> Self {
        let mut counts: Vec<u32> = Vec::new();
        for &s in symbols {
            let s = s.into();
            if s >= counts.len() {
                counts.resize(s + 1, 0);
            }
            counts[s] += 1;
        }
        Self { counts }
    }

    /// Byte histogram over the full 256-symbol alphabet.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = vec![0u32; 256];
        for &b in data {
            counts[b as usize] += 1;
        }
        Self { counts }
    }

    /// Raw counts.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Count for one id (0 if outside the alphabet).
    pub fn frequency(&self, symbol: usize) -> u32 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    /// Number of ids in the alphabet.
    pub fn alphabet_size(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Ids with a nonzero count, in alphabet order.
    pub fn present(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(s, _)| s)
    }

    /// Empirical Shannon entropy in bits per symbol.
    pub fn entropy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;
        self.counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total;
                -p * p.log2()
            })
            .sum()
    }
}

/// Bijection between arbitrary symbols and dense `u16` ids.
///
/// Ids are assigned in first-seen order, so building the map twice from the
/// same sequence yields the same ids.
#[derive(Clone, Debug)]
pub struct SymbolMap<T> {
    to_id: HashMap<T, u16>,
    symbols: Vec<T>,
}

impl<T: Eq + Hash + Clone> SymbolMap<T> {
    /// Build a map and histogram from `(symbol, count)` pairs.
    ///
    /// # Errors
    /// `InvalidDistribution` if there are more than `u16::MAX + 1` distinct symbols.
    pub fn from_counts<I>(pairs: I) -> Result<(Self, Frequencies)>
    where
        I: IntoIterator<Item = (T, u32)>,
    {
        let mut map = Self {
            to_id: HashMap::new(),
            symbols: Vec::new(),
        };
        let mut counts: Vec<u32> = Vec::new();
        for (symbol, count) in pairs {
            let id = map.insert(symbol)? as usize;
            if id >= counts.len() {
                counts.resize(id + 1, 0);
            }
            counts[id] = counts[id].saturating_add(count);
        }
        Ok((map, Frequencies::new(counts)))
    }

    /// Build a map and histogram by counting a symbol sequence.
    ///
    /// # Errors
    /// Same as [`SymbolMap::from_counts`].
    pub fn from_symbols(data: &[T]) -> Result<(Self, Frequencies)> {
        Self::from_counts(data.iter().cloned().map(|s| (s, 1)))
    }

    fn insert(&mut self, symbol: T) -> Result<u16> {
        if let Some(&id) = self.to_id.get(&symbol) {
            return Ok(id);
        }
        let id = u16::try_from(self.symbols.len()).map_err(|_| {
            Error::InvalidDistribution(format!(
                "more than {MAX_ALPHABET_SIZE} distinct symbols"
            ))
        })?;
        self.to_id.insert(symbol.clone(), id);
        self.symbols.push(symbol);
        Ok(id)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Id of one symbol.
    pub fn id(&self, symbol: &T) -> Option<u16> {
        self.to_id.get(symbol).copied()
    }

    /// Symbol for one id.
    pub fn symbol(&self, id: u16) -> Option<&T> {
        self.symbols.get(id as usize)
    }

    /// Translate a symbol sequence to ids.
    ///
    /// # Errors
    /// `UnknownSymbol` with the position of the first symbol the map does not know.
    pub fn ids(&self, data: &[T]) -> Result<Vec<u16>> {
        data.iter()
            .enumerate()
            .map(|(position, s)| self.id(s).ok_or(Error::UnknownSymbol { position }))
            .collect()
    }

    /// Translate ids back to symbols.
    ///
    /// # Errors
    /// `CorruptStream` if an id has no symbol.
    pub fn symbols(&self, ids: &[u16]) -> Result<Vec<T>> {
        ids.iter()
            .map(|&id| {
                self.symbol(id).cloned().ok_or_else(|| {
                    Error::CorruptStream(format!("decoded id {id} has no symbol"))
                })
            })
            .collect()
    }
}
