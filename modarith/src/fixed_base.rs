//! Fixed-base exponentiation with a precomputed product table.
//!
//! For a base `b` used in many exponentiations, the exponent range of
//! `bits` bits is cut into `k` blocks of `s = ceil(bits / k)` bits. With
//! `b_i = b^(2^(i * s))`, an exponent with blocks `e_0, ..., e_(k-1)` gives
//! `b^e = prod_i b_i^(e_i)`, which [`modpowprod`] evaluates with `s`
//! squarings over the subset-product table of the `b_i`.

use log::debug;

use crate::error::{ArithError, Result};
use crate::integer::LargeInteger;
use crate::limbs::{MAX_PROD_WIDTH, ProdTable, Word, modpowprod};

/// Fixed-base exponentiator for one base and modulus.
#[derive(Clone, Debug)]
pub struct FixModPow {
    modulus: LargeInteger,
    width: usize,
    block_bits: usize,
    table: ProdTable,
}

impl FixModPow {
    /// Prepares for about `count` exponentiations with exponents of up to
    /// `bits` bits, choosing the width with [`optimal_width`].
    pub fn new(base: &LargeInteger, modulus: &LargeInteger, bits: usize, count: usize) -> Result<Self> {
        let width = optimal_width(bits, count);
        debug!(
            "fixed-base width {width} for {count} x {bits}-bit exponents, ~{:.1} mulmods each",
            fixed_base_cost(width, bits, count)
        );
        Self::with_width(base, modulus, bits, width)
    }

    /// Prepares with a forced table width in `[1, 16]`.
    ///
    /// Fails with [`ArithError::InvalidWidth`] for other widths and with the
    /// modulus errors of [`LargeInteger::modulo`].
    pub fn with_width(
        base: &LargeInteger,
        modulus: &LargeInteger,
        bits: usize,
        width: usize,
    ) -> Result<Self> {
        if width == 0 || width > MAX_PROD_WIDTH {
            return Err(ArithError::InvalidWidth(width));
        }
        let block_bits = bits.div_ceil(width).max(1);

        let mut bases = Vec::with_capacity(width);
        let mut b = base.modulo(modulus)?;
        for i in 0..width {
            if i > 0 {
                for _ in 0..block_bits {
                    b = b.square().modulo(modulus)?;
                }
            }
            bases.push(b.words().to_vec());
        }
        let table = ProdTable::new(&bases, modulus.words())?;

        debug!(
            "fixed-base table: width {width}, block {block_bits} bits, modulus {} bits",
            modulus.bit_len()
        );
        Ok(Self {
            modulus: modulus.clone(),
            width,
            block_bits,
            table,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bits per exponent block.
    #[inline]
    pub fn block_bits(&self) -> usize {
        self.block_bits
    }

    #[inline]
    pub fn modulus(&self) -> &LargeInteger {
        &self.modulus
    }

    /// `b^e mod m`.
    ///
    /// The last block takes every bit above the others, so exponents
    /// longer than the declared bound are still exact (only slower).
    pub fn modpow(&self, e: &LargeInteger) -> Result<LargeInteger> {
        if e.is_negative() {
            return Err(ArithError::NegativeExponent);
        }
        let s = self.block_bits;
        let mut exps: Vec<Vec<Word>> = Vec::with_capacity(self.width);
        for i in 0..self.width - 1 {
            exps.push(e.slice(i * s, (i + 1) * s)?.words().to_vec());
        }
        exps.push(e.shr_bits((self.width - 1) * s).words().to_vec());

        let mut w = vec![0; self.modulus.words().len()];
        modpowprod(&mut w, &self.table, &exps)?;
        Ok(LargeInteger::from_words(1, &w))
    }
}

/// Estimated modular multiplications per exponentiation for width `k`:
/// table construction `2^k + bits` amortized over `count` uses, plus
/// `2 * ceil(bits / k)` for the squarings and multiplications.
pub fn fixed_base_cost(k: usize, bits: usize, count: usize) -> f64 {
    let count = count.max(1) as f64;
    ((1u64 << k) as f64 + bits as f64) / count + 2.0 * bits.div_ceil(k) as f64
}

/// Width in `[1, 16]` minimizing [`fixed_base_cost`].
pub fn optimal_width(bits: usize, count: usize) -> usize {
    let mut best = 1;
    let mut best_cost = fixed_base_cost(1, bits, count);
    for k in 2..=MAX_PROD_WIDTH {
        let cost = fixed_base_cost(k, bits, count);
        if cost < best_cost {
            best = k;
            best_cost = cost;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> LargeInteger {
        LargeInteger::from_hex(s).unwrap()
    }

    #[test]
    fn test_optimal_width() {
        // a single use never pays for a wide table
        assert!(optimal_width(256, 1) <= 6);
        // many uses do
        assert!(optimal_width(256, 1_000_000) >= 10);
        assert!(optimal_width(2048, 1 << 30) <= MAX_PROD_WIDTH);
        assert_eq!(optimal_width(0, 10), 1);
        let w = optimal_width(256, 100);
        for k in 1..=MAX_PROD_WIDTH {
            assert!(fixed_base_cost(w, 256, 100) <= fixed_base_cost(k, 256, 100));
        }
    }

    #[test]
    fn test_matches_modpow() {
        let p = hex("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff");
        let g = LargeInteger::from(5u64);
        let f = FixModPow::new(&g, &p, 256, 50).unwrap();
        for e in [
            LargeInteger::zero(),
            LargeInteger::one(),
            hex("deadbeef"),
            hex("ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
        ] {
            assert_eq!(f.modpow(&e).unwrap(), g.modpow(&e, &p).unwrap(), "e = {e:x}");
        }
    }

    #[test]
    fn test_exponent_longer_than_bound() {
        let m = LargeInteger::from(1_000_003u64);
        let g = LargeInteger::from(7u64);
        let f = FixModPow::with_width(&g, &m, 16, 4).unwrap();
        assert_eq!(f.block_bits(), 4);
        let e = hex("123456789abcdef");
        assert_eq!(f.modpow(&e).unwrap(), g.modpow(&e, &m).unwrap());
    }

    #[test]
    fn test_forced_widths() {
        let m = LargeInteger::from(1_000_003u64);
        let g = LargeInteger::from(3u64);
        let e = LargeInteger::from(987_654u64);
        for k in [1, 2, 7, 16] {
            let f = FixModPow::with_width(&g, &m, 20, k).unwrap();
            assert_eq!(f.width(), k);
            assert_eq!(f.modpow(&e).unwrap(), g.modpow(&e, &m).unwrap(), "width {k}");
        }
        assert_eq!(
            FixModPow::with_width(&g, &m, 20, 17).unwrap_err(),
            ArithError::InvalidWidth(17)
        );
        assert_eq!(
            FixModPow::with_width(&g, &m, 20, 0).unwrap_err(),
            ArithError::InvalidWidth(0)
        );
    }

    #[test]
    fn test_zero_base() {
        let m = LargeInteger::from(7u64);
        for base in [LargeInteger::zero(), LargeInteger::from(7u64), LargeInteger::from(-14i64)] {
            for k in [1, 3, 8] {
                let f = FixModPow::with_width(&base, &m, 16, k).unwrap();
                assert!(f.modpow(&LargeInteger::from(5u64)).unwrap().is_zero(), "width {k}");
                assert!(f.modpow(&hex("123456789")).unwrap().is_zero(), "width {k}");
                assert!(f.modpow(&LargeInteger::zero()).unwrap().is_one(), "width {k}");
            }
        }
    }

    #[test]
    fn test_errors() {
        let g = LargeInteger::from(3u64);
        assert_eq!(
            FixModPow::new(&g, &LargeInteger::zero(), 8, 1).unwrap_err(),
            ArithError::DivisionByZero
        );
        let f = FixModPow::new(&g, &LargeInteger::from(11u64), 8, 1).unwrap();
        assert_eq!(
            f.modpow(&LargeInteger::from(-1i64)),
            Err(ArithError::NegativeExponent)
        );
    }
}
