//! Range decoder: reproduces the symbol sequence from an encoded stream.

use crate::cdf::{prob8_to_q15, update_cdf, validate};
use crate::error::CoderError;
use crate::{EC_MIN_PROB, EC_PROB_SHIFT};

/// Virtual trailing bytes the decoder may serve past the real input. A
/// well-formed stream never needs more than the encoder's outstanding
/// 48-bit window; reads beyond that budget report [`CoderError::BufferUnderrun`]
/// instead of inventing data forever.
const PADDING_LIMIT: usize = 16;

/// One decoding session over a borrowed byte stream. Driven with the same
/// operation sequence, probabilities, and initial CDF tables as the encoder
/// that produced the stream, it yields the same values and leaves every
/// adaptive CDF in the same final state.
pub struct MsacDecoder<'a> {
    dif: u64,
    rng: u32,
    cnt: i32,
    buf: &'a [u8],
    pos: usize,
    padding: usize,
    /// Must match the encoder's setting for the session.
    pub allow_update_cdf: bool,
}

impl<'a> MsacDecoder<'a> {
    /// Binds `data` for the session. The slice must hold at least one byte.
    pub fn new(data: &'a [u8]) -> Result<Self, CoderError> {
        if data.is_empty() {
            return Err(CoderError::EmptyBuffer);
        }
        let mut dec = Self {
            dif: 0,
            rng: 0x8000,
            cnt: -15,
            buf: data,
            pos: 0,
            padding: 0,
            allow_update_cdf: true,
        };
        dec.refill()?;
        Ok(dec)
    }

    /// Tops the window up to 48 bits. Input bytes are complemented on the
    /// way in; past the end of the buffer, padding bytes are served from a
    /// bounded budget.
    fn refill(&mut self) -> Result<(), CoderError> {
        let mut c = 48 - self.cnt - 24;
        let mut dif = self.dif;
        while c >= 0 {
            let byte = if self.pos < self.buf.len() {
                let b = self.buf[self.pos];
                self.pos += 1;
                b ^ 0xFF
            } else {
                if self.padding == PADDING_LIMIT {
                    return Err(CoderError::BufferUnderrun { pos: self.pos });
                }
                self.padding += 1;
                0xFF
            };
            dif |= (byte as u64) << c;
            c -= 8;
        }
        self.dif = dif;
        self.cnt = 48 - c - 24;
        Ok(())
    }

    fn norm(&mut self, dif: u64, rng: u32) -> Result<(), CoderError> {
        let d = rng.leading_zeros() as i32 - 16;
        let cnt = self.cnt;
        self.dif = dif << d;
        self.rng = rng << d;
        self.cnt = cnt - d;
        if (cnt as u32) < (d as u32) {
            self.refill()?;
        }
        Ok(())
    }

    /// Decodes one symbol in `[0, n_symbols)` against `cdf`: an ascending
    /// search for the bucket holding the current window position, then the
    /// same adaptation the encoder applied.
    pub fn decode_symbol(
        &mut self,
        cdf: &mut [u16],
        n_symbols: u32,
    ) -> Result<u32, CoderError> {
        validate(cdf, n_symbols)?;

        let ns = n_symbols - 1;
        let c = (self.dif >> 32) as u32;
        let r = self.rng >> 8;
        let mut u;
        let mut v = self.rng;
        let mut val: u32 = u32::MAX;

        // The counter entry scales to zero, so the scan always terminates
        // by `val == ns`.
        loop {
            val = val.wrapping_add(1);
            u = v;
            v = r * ((cdf[val as usize] >> EC_PROB_SHIFT) as u32);
            v >>= 7 - EC_PROB_SHIFT;
            v += EC_MIN_PROB * (ns - val);
            if c >= v {
                break;
            }
        }

        self.norm(self.dif - ((v as u64) << 32), u - v)?;

        if self.allow_update_cdf {
            update_cdf(cdf, val, n_symbols);
        }
        Ok(val)
    }

    /// Decodes one bit against an adaptive boolean CDF.
    pub fn decode_bool(&mut self, cdf: &mut [u16]) -> Result<bool, CoderError> {
        validate(cdf, 2)?;
        let bit = self.decode_bool_q15(cdf[0] as u32)?;
        if self.allow_update_cdf {
            update_cdf(cdf, bit as u32, 2);
        }
        Ok(bit)
    }

    /// Decodes one bit coded with a fixed 8-bit probability in `1..=255`
    /// that the bit is zero.
    pub fn decode_bool_prob(&mut self, prob: u8) -> Result<bool, CoderError> {
        if prob == 0 {
            return Err(CoderError::InvalidProbability);
        }
        self.decode_bool_q15(prob8_to_q15(prob) as u32)
    }

    fn decode_bool_q15(&mut self, f: u32) -> Result<bool, CoderError> {
        let r = self.rng;
        let dif = self.dif;
        let mut v = (((r >> 8) * (f >> EC_PROB_SHIFT)) >> (7 - EC_PROB_SHIFT)) + EC_MIN_PROB;
        let vw = (v as u64) << 32;
        let ret = dif >= vw;
        let new_dif = if ret { dif - vw } else { dif };
        if ret {
            v = v.wrapping_add(r.wrapping_sub(2u32.wrapping_mul(v)));
        }
        self.norm(new_dif, v)?;
        Ok(!ret)
    }

    /// Decodes one equiprobable bit.
    pub fn decode_bool_equi(&mut self) -> Result<bool, CoderError> {
        let r = self.rng;
        let dif = self.dif;
        let mut v = ((r >> 8) << 7) + EC_MIN_PROB;
        let vw = (v as u64) << 32;
        let ret = dif >= vw;
        let new_dif = if ret { dif - vw } else { dif };
        if ret {
            v = v.wrapping_add(r.wrapping_sub(2u32.wrapping_mul(v)));
        }
        self.norm(new_dif, v)?;
        Ok(!ret)
    }

    /// Reads `bits` raw bits, MSB first.
    pub fn decode_literal(&mut self, bits: u32) -> Result<u32, CoderError> {
        if bits == 0 || bits > 32 {
            return Err(CoderError::InvalidBitCount { bits });
        }
        let mut value = 0u32;
        for _ in 0..bits {
            value = (value << 1) | self.decode_bool_equi()? as u32;
        }
        Ok(value)
    }

    /// Inverse of [`crate::MsacEncoder::encode_golomb`].
    pub fn decode_golomb(&mut self) -> Result<u32, CoderError> {
        let mut len = 0u32;
        while len < 32 && !self.decode_bool_equi()? {
            len += 1;
        }
        let mut val = 1u32 << len;
        for i in (0..len).rev() {
            if self.decode_bool_equi()? {
                val += 1 << i;
            }
        }
        Ok(val - 1)
    }
}
