//! CDF tables and the shared adaptation rule.
//!
//! A CDF slice for an alphabet of `n_symbols` symbols holds exactly
//! `n_symbols` entries: `n_symbols - 1` inverse cumulative probabilities
//! (entry `i` is `32768 - cum(i + 1)`, Q15, non-increasing) followed by one
//! adaptation counter. The counter saturates at [`CDF_COUNT_MAX`] and so
//! always scales to zero under [`crate::EC_PROB_SHIFT`], which lets it
//! double as the terminal zero of the distribution during decoding.

use crate::error::CoderError;
use crate::{CDF_COUNT_MAX, MAX_SYMBOLS, PROB_TOP};

/// Nudges `cdf` toward the observed `symbol`.
///
/// This is the one adaptation routine in the crate: both the encoder and
/// the decoder call it after coding a symbol, which is what keeps adaptive
/// sessions in lockstep. The step size shrinks as the counter grows, so the
/// table behaves like a frequency estimator without storing raw counts.
/// Boolean CDFs are the `n_symbols == 2` case of the same rule.
pub fn update_cdf(cdf: &mut [u16], symbol: u32, n_symbols: u32) {
    let count = cdf[(n_symbols - 1) as usize];
    let rate = 4 + (count >> 4) + if n_symbols > 3 { 1 } else { 0 };
    for i in 0..(n_symbols - 1) {
        if i < symbol {
            cdf[i as usize] += (32768 - cdf[i as usize]) >> rate;
        } else {
            cdf[i as usize] -= cdf[i as usize] >> rate;
        }
    }
    cdf[(n_symbols - 1) as usize] = count + if count < CDF_COUNT_MAX { 1 } else { 0 };
}

/// A fresh uniform CDF over `n_symbols` symbols, counter at zero.
pub fn flat_cdf(n_symbols: u32) -> Vec<u16> {
    let mut cdf = Vec::with_capacity(n_symbols as usize);
    for i in 0..(n_symbols - 1) {
        cdf.push((PROB_TOP * (n_symbols - 1 - i) / n_symbols) as u16);
    }
    cdf.push(0);
    cdf
}

/// A boolean CDF with Q15 probability `f` that the bit is one.
pub fn bool_cdf(f: u16) -> [u16; 2] {
    [f, 0]
}

/// Maps an 8-bit probability that a bit is zero (`1..=255`) to the Q15
/// probability that it is one. Fixed-point; applied identically on both
/// sides of the coder.
pub fn prob8_to_q15(prob: u8) -> u16 {
    ((0x7F_FFFF - ((prob as u32) << 15) + prob as u32) >> 8) as u16
}

/// Checks that `cdf` is a well-formed table for an alphabet of `n_symbols`.
pub fn validate(cdf: &[u16], n_symbols: u32) -> Result<(), CoderError> {
    if !(2..=MAX_SYMBOLS).contains(&n_symbols) {
        return Err(CoderError::InvalidAlphabetSize { n_symbols });
    }
    if cdf.len() != n_symbols as usize {
        return Err(CoderError::CdfLengthMismatch { len: cdf.len(), n_symbols });
    }
    let data = &cdf[..(n_symbols - 1) as usize];
    for (i, &entry) in data.iter().enumerate() {
        if entry as u32 >= PROB_TOP {
            return Err(CoderError::InvalidCdf { index: i });
        }
        if i > 0 && entry > data[i - 1] {
            return Err(CoderError::InvalidCdf { index: i });
        }
    }
    if cdf[(n_symbols - 1) as usize] > CDF_COUNT_MAX {
        return Err(CoderError::InvalidCdf { index: (n_symbols - 1) as usize });
    }
    Ok(())
}
