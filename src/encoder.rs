//! Range encoder: serializes symbols and binary decisions into bytes.

use crate::cdf::{prob8_to_q15, update_cdf, validate};
use crate::error::CoderError;
use crate::{EC_MIN_PROB, EC_PROB_SHIFT};

pub(crate) type EcWindow = u32;

/// One encoding session. Create, feed operations, then [`finalize`] to
/// obtain the byte stream. Each session owns its state exclusively; a
/// multi-threaded caller uses one encoder (and one set of CDF tables) per
/// stream.
///
/// [`finalize`]: MsacEncoder::finalize
pub struct MsacEncoder {
    low: EcWindow,
    rng: u16,
    cnt: i16,
    precarry: Vec<u16>,
    /// When set, symbol and boolean CDFs adapt after every coded value.
    /// Must match the decoder's setting for the session.
    pub allow_update_cdf: bool,
}

impl MsacEncoder {
    pub fn new() -> Self {
        Self {
            low: 0,
            rng: 0x8000,
            cnt: -9,
            precarry: Vec::new(),
            allow_update_cdf: true,
        }
    }

    fn compute_bounds(&self, fl: u16, fh: u16, nms: u16) -> (EcWindow, u16) {
        let r = self.rng as u32;
        let mut u = (((r >> 8) * ((fl as u32) >> EC_PROB_SHIFT)) >> (7 - EC_PROB_SHIFT))
            + EC_MIN_PROB * nms as u32;
        if fl >= 32768 {
            u = r;
        }
        let v = (((r >> 8) * ((fh as u32) >> EC_PROB_SHIFT)) >> (7 - EC_PROB_SHIFT))
            + EC_MIN_PROB * (nms as u32 - 1);
        ((r - u) as EcWindow, (u - v) as u16)
    }

    /// Commits the new sub-interval and shifts finished bytes into the
    /// pre-carry buffer once the range drops below half precision.
    fn renorm(&mut self, low_delta: EcWindow, new_rng: u16) {
        let mut low = low_delta + self.low;
        let mut c = self.cnt;
        let d = new_rng.leading_zeros() as i16;
        let mut s = c + d;

        if s >= 0 {
            c += 16;
            let mut m = ((1u32 << c) - 1) as EcWindow;
            if s >= 8 {
                self.precarry.push((low >> c) as u16);
                low &= m;
                c -= 8;
                m >>= 8;
            }
            self.precarry.push((low >> c) as u16);
            s = c + d - 24;
            low &= m;
        }
        self.low = low << d;
        self.rng = new_rng << d;
        self.cnt = s;
    }

    fn store(&mut self, fl: u16, fh: u16, nms: u16) {
        let (l, r) = self.compute_bounds(fl, fh, nms);
        self.renorm(l, r);
    }

    /// Codes `symbol` in `[0, n_symbols)` against `cdf`, then adapts the
    /// table if the session allows it.
    pub fn encode_symbol(
        &mut self,
        symbol: u32,
        cdf: &mut [u16],
        n_symbols: u32,
    ) -> Result<(), CoderError> {
        validate(cdf, n_symbols)?;
        if symbol >= n_symbols {
            return Err(CoderError::SymbolOutOfRange { symbol, n_symbols });
        }

        let ns = (n_symbols - 1) as usize;
        let s = symbol as usize;
        let nms = (n_symbols - symbol) as u16;
        let fl = if s > 0 { cdf[s - 1] } else { 32768 };
        let fh = if s < ns { cdf[s] } else { 0 };
        self.store(fl, fh, nms);

        if self.allow_update_cdf {
            update_cdf(cdf, symbol, n_symbols);
        }
        Ok(())
    }

    /// Codes one bit against an adaptive boolean CDF (`[f, counter]`, with
    /// `f` the Q15 probability of one).
    pub fn encode_bool(&mut self, val: bool, cdf: &mut [u16]) -> Result<(), CoderError> {
        validate(cdf, 2)?;
        let f = cdf[0];
        let nms = if val { 1u16 } else { 2u16 };
        let fl = if val { f } else { 32768 };
        let fh = if val { 0 } else { f };
        self.store(fl, fh, nms);

        if self.allow_update_cdf {
            update_cdf(cdf, val as u32, 2);
        }
        Ok(())
    }

    /// Codes one bit with a fixed 8-bit probability in `1..=255` that the
    /// bit is zero. No model, no adaptation.
    pub fn encode_bool_prob(&mut self, val: bool, prob: u8) -> Result<(), CoderError> {
        if prob == 0 {
            return Err(CoderError::InvalidProbability);
        }
        let f = prob8_to_q15(prob);
        let nms = if val { 1u16 } else { 2u16 };
        let fl = if val { f } else { 32768 };
        let fh = if val { 0 } else { f };
        self.store(fl, fh, nms);
        Ok(())
    }

    /// Codes one equiprobable bit.
    pub fn encode_bool_equi(&mut self, val: bool) {
        let r = self.rng as u32;
        let v = (((r >> 8) << 7) + EC_MIN_PROB) as u16;

        let (l, new_rng): (EcWindow, u16) = if val {
            ((r - v as u32) as EcWindow, v)
        } else {
            (0, r as u16 - v)
        };
        self.renorm(l, new_rng);
    }

    /// Writes `bits` raw bits of `value`, MSB first, each equiprobable.
    /// Bits of `value` above `bits` are ignored.
    pub fn encode_literal(&mut self, value: u32, bits: u32) -> Result<(), CoderError> {
        if bits == 0 || bits > 32 {
            return Err(CoderError::InvalidBitCount { bits });
        }
        for i in (0..bits).rev() {
            self.encode_bool_equi((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Exp-Golomb code on top of equiprobable bits.
    pub fn encode_golomb(&mut self, val: u32) {
        let x = val + 1;
        let num_bits = 31 - x.leading_zeros();

        for _ in 0..num_bits {
            self.encode_bool_equi(false);
        }
        self.encode_bool_equi(true);

        for i in (0..num_bits).rev() {
            self.encode_bool_equi((x >> i) & 1 == 1);
        }
    }

    /// Flushes the remaining window, resolves carries, and returns the
    /// finished byte stream. The stream carries no framing of its own.
    pub fn finalize(mut self) -> Vec<u8> {
        let l = self.low;
        let mut c = self.cnt;
        let mut s: i16 = 10;
        let m: EcWindow = 0x3FFF;
        let mut e = ((l + m) & !m) | (m + 1);

        s += c;

        if s > 0 {
            let mut n = ((1u32 << (c + 16)) - 1) as EcWindow;

            loop {
                self.precarry.push((e >> (c + 16)) as u16);
                e &= n;
                s -= 8;
                c -= 8;
                n >>= 8;

                if s <= 0 {
                    break;
                }
            }
        }

        let mut carry: u32 = 0;
        let mut offs = self.precarry.len();
        let mut out = vec![0u8; offs];
        while offs > 0 {
            offs -= 1;
            carry += self.precarry[offs] as u32;
            out[offs] = carry as u8;
            carry >>= 8;
        }

        out
    }
}

impl Default for MsacEncoder {
    fn default() -> Self {
        Self::new()
    }
}
