#![forbid(unsafe_code)]

//! Multi-symbol adaptive arithmetic (range) coder for AV1-class bitstreams.
//!
//! [`MsacEncoder`] serializes binary decisions and small-alphabet symbols
//! into a dense byte stream; [`MsacDecoder`] reproduces the exact sequence
//! from that stream. Both halves share one CDF adaptation rule
//! ([`cdf::update_cdf`]), so adaptive sessions stay bit-exact as long as
//! encoder and decoder are driven with the same operations and the same
//! initial CDF tables.

pub mod cdf;
pub mod decoder;
pub mod encoder;
pub mod error;

pub use decoder::MsacDecoder;
pub use encoder::MsacEncoder;
pub use error::CoderError;

/// Probability precision in bits. CDF entries are Q15.
pub const PROB_BITS: u32 = 15;
/// One in Q15: the total probability mass.
pub const PROB_TOP: u32 = 1 << PROB_BITS;
/// CDF entries are shifted down by this much before interval splitting.
pub const EC_PROB_SHIFT: u32 = 6;
/// Minimum interval width reserved per remaining symbol.
pub const EC_MIN_PROB: u32 = 4;
/// Largest supported alphabet.
pub const MAX_SYMBOLS: u32 = 16;
/// Saturation point of the per-CDF adaptation counter.
pub const CDF_COUNT_MAX: u16 = 32;
