use thiserror::Error;

/// Errors reported by the range coder. Every one of them is fatal to the
/// coding session it occurred in: the caller must discard the session and
/// its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoderError {
    #[error("decoder bound to an empty buffer")]
    EmptyBuffer,

    #[error("decoder ran out of data at byte {pos}")]
    BufferUnderrun { pos: usize },

    #[error("symbol {symbol} out of range for alphabet of {n_symbols}")]
    SymbolOutOfRange { symbol: u32, n_symbols: u32 },

    #[error("alphabet of {n_symbols} symbols is not supported (must be 2..=16)")]
    InvalidAlphabetSize { n_symbols: u32 },

    #[error("cdf has {len} entries, alphabet of {n_symbols} needs {n_symbols}")]
    CdfLengthMismatch { len: usize, n_symbols: u32 },

    #[error("cdf entry {index} is out of range or breaks monotonicity")]
    InvalidCdf { index: usize },

    #[error("boolean probability must be in 1..=255")]
    InvalidProbability,

    #[error("literal width {bits} is not supported (must be 1..=32)")]
    InvalidBitCount { bits: u32 },
}
