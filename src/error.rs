//! Error types for Finite State Entropy coding.

use thiserror::Error;

/// Error variants for FSE table construction and block coding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The histogram cannot be normalized (zero total, or more symbols than table slots).
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// `table_log` is outside the supported range.
    #[error("invalid table_log {table_log}: must be in [1, {max}]")]
    InvalidTableLog {
        /// Requested log2 of the table size.
        table_log: u32,
        /// Largest supported value.
        max: u32,
    },

    /// The block-length field width is outside `[1, 32]`.
    #[error("invalid block size field width: {0} bits")]
    InvalidBlockSizeBits(u32),

    /// The spread table could not be filled. Indicates normalized weights that
    /// do not sum to the table size.
    #[error("table construction failed: {0}")]
    TableConstructionFailure(String),

    /// The encoded stream is truncated, malformed, or was built against different tables.
    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    /// A symbol outside the table's alphabet (or with zero weight) was passed to the encoder.
    #[error("symbol {symbol} not in alphabet of size {alphabet_size}")]
    AlphabetMismatch {
        /// Offending dense symbol id.
        symbol: usize,
        /// Alphabet size of the tables.
        alphabet_size: usize,
    },

    /// A block, or its encoded payload, is larger than its length field can express.
    #[error("block of {len} exceeds length field maximum {max}")]
    BlockTooLarge {
        /// Symbols in the block, or payload bits for a frame header.
        len: usize,
        /// Largest length the field can hold.
        max: u64,
    },

    /// A coder state outside the range its step function accepts.
    #[error("state {state} outside [{min}, {max})")]
    StateOutOfRange {
        /// The rejected state.
        state: u32,
        /// Smallest valid state.
        min: u32,
        /// One past the largest valid state.
        max: u32,
    },

    /// [`SymbolMap`](crate::SymbolMap) was asked for a symbol it never saw.
    #[error("unknown symbol at input position {position}")]
    UnknownSymbol {
        /// Index of the first unknown symbol in the input.
        position: usize,
    },

    /// Decoding would produce more output than the caller allowed.
    #[error("decoded output would exceed limit of {limit} bytes")]
    OutputLimitExceeded {
        /// The configured limit.
        limit: usize,
    },
}

/// A specialized Result type for FSE operations.
pub type Result<T> = std::result::Result<T, Error>;
