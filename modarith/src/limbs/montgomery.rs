//! Montgomery arithmetic for odd moduli.

use std::cmp::Ordering;

use log::debug;

use super::{Divisor, Word, adc, bit, bit_len, cmp, copy, mac, set_zero, sub_from};
use crate::error::{ArithError, Result, require};

/// An odd modulus prepared for Montgomery multiplication.
///
/// With `n = word_len(m)` and `R = 2^(64 * n)`, holds `-m^{-1} mod 2^64`,
/// `R mod m` and `R^2 mod m`.
#[derive(Clone, Debug)]
pub struct MontModulus {
    divisor: Divisor,
    n0: Word,
    r1: Vec<Word>,
    r2: Vec<Word>,
}

impl MontModulus {
    /// Fails with [`ArithError::DivisionByZero`] for zero and
    /// [`ArithError::EvenModulus`] for an even modulus.
    pub fn new(m: &[Word]) -> Result<Self> {
        let divisor = Divisor::new(m)?;
        let words = divisor.words();
        if words[0] & 1 == 0 {
            return Err(ArithError::EvenModulus);
        }
        let n = words.len();
        let n0 = mont_n0(words[0]);

        let mut r = vec![0; 2 * n + 2];
        r[n] = 1;
        let r1 = divisor.residue(&r)?;
        r[n] = 0;
        r[2 * n] = 1;
        let r2 = divisor.residue(&r)?;

        debug!("prepared Montgomery modulus of {} bits", bit_len(words));
        Ok(Self {
            divisor,
            n0,
            r1,
            r2,
        })
    }

    #[inline]
    pub fn modulus(&self) -> &[Word] {
        self.divisor.words()
    }

    /// Limbs of the modulus, which is also the limb count of every residue.
    #[inline]
    pub fn size(&self) -> usize {
        self.divisor.size()
    }

    /// `x * R mod m` for any `x`.
    pub fn to_mont(&self, x: &[Word]) -> Result<Vec<Word>> {
        let x = self.divisor.residue(x)?;
        let mut out = vec![0; self.size()];
        let mut t = self.scratch();
        self.mul_into(&mut out, &x, &self.r2, &mut t);
        Ok(out)
    }

    /// `x * R^{-1} mod m`. Inputs at or above `m` are reduced first.
    pub fn from_mont(&self, x: &[Word]) -> Result<Vec<Word>> {
        let n = self.size();
        let a = self.divisor.residue(x)?;
        let mut one = vec![0; n];
        one[0] = 1;
        let mut out = vec![0; n];
        let mut t = self.scratch();
        self.mul_into(&mut out, &a, &one, &mut t);
        Ok(out)
    }

    /// `w := a * b * R^{-1} mod m`. Inputs at or above `m` are reduced
    /// first, so the result is always in `[0, m)`.
    pub fn mont_mul(&self, w: &mut [Word], a: &[Word], b: &[Word]) -> Result<()> {
        let n = self.size();
        require("mont_mul", w.len(), n)?;
        let x = self.divisor.residue(a)?;
        let y = self.divisor.residue(b)?;
        let mut t = self.scratch();
        set_zero(w);
        self.mul_into(&mut w[..n], &x, &y, &mut t);
        Ok(())
    }

    fn scratch(&self) -> Vec<Word> {
        vec![0; self.size() + 2]
    }

    /// CIOS Montgomery product. `out`, `a` and `b` have exactly `n` limbs,
    /// `t` has `n + 2`.
    fn mul_into(&self, out: &mut [Word], a: &[Word], b: &[Word], t: &mut [Word]) {
        let m = self.modulus();
        let n = m.len();
        debug_assert!(out.len() == n && a.len() == n && b.len() == n && t.len() == n + 2);
        t.fill(0);

        for &bi in b {
            // t += a * b[i]
            let mut carry = 0;
            for j in 0..n {
                (t[j], carry) = mac(t[j], a[j], bi, carry);
            }
            let (s, c) = adc(t[n], carry, 0);
            t[n] = s;
            t[n + 1] = c;

            // t = (t + mi * m) / 2^64
            let mi = t[0].wrapping_mul(self.n0);
            let (_, mut carry) = mac(t[0], mi, m[0], 0);
            for j in 1..n {
                (t[j - 1], carry) = mac(t[j], mi, m[j], carry);
            }
            let (s, c) = adc(t[n], carry, 0);
            t[n - 1] = s;
            t[n] = t[n + 1] + c;
        }

        if t[n] != 0 || cmp(&t[..n], m) != Ordering::Less {
            sub_from(&mut t[..n + 1], m);
        }
        out.copy_from_slice(&t[..n]);
    }
}

/// A base in Montgomery form, bound to the modulus it was prepared for.
#[derive(Clone, Debug)]
pub struct MontBase<'m> {
    modulus: &'m MontModulus,
    value: Vec<Word>,
}

impl<'m> MontBase<'m> {
    pub fn new(modulus: &'m MontModulus, b: &[Word]) -> Result<Self> {
        let value = modulus.to_mont(b)?;
        Ok(Self { modulus, value })
    }

    pub fn modulus(&self) -> &MontModulus {
        self.modulus
    }

    /// `w := b^e mod m`.
    ///
    /// The accumulator alternates between two buffers so a product never
    /// writes over one of its inputs.
    pub fn pow(&self, w: &mut [Word], e: &[Word]) -> Result<()> {
        let m = self.modulus;
        let n = m.size();
        require("modpow_mont", w.len(), n)?;

        let mut acc = m.r1.clone();
        let mut tmp = vec![0; n];
        let mut t = m.scratch();
        for i in (0..bit_len(e)).rev() {
            m.mul_into(&mut tmp, &acc, &acc, &mut t);
            std::mem::swap(&mut acc, &mut tmp);
            if bit(e, i) {
                m.mul_into(&mut tmp, &acc, &self.value, &mut t);
                std::mem::swap(&mut acc, &mut tmp);
            }
        }

        let mut one = vec![0; n];
        one[0] = 1;
        m.mul_into(&mut tmp, &acc, &one, &mut t);
        copy(w, &tmp)
    }
}

/// `w := b^e mod m` by Montgomery exponentiation.
///
/// Fails with [`ArithError::EvenModulus`] unless `m` is odd.
pub fn modpow_mont(w: &mut [Word], b: &[Word], e: &[Word], m: &[Word]) -> Result<()> {
    let modulus = MontModulus::new(m)?;
    MontBase::new(&modulus, b)?.pow(w, e)
}

/// `-m^{-1} mod 2^64` for odd `m0`.
fn mont_n0(m0: Word) -> Word {
    inv_mod_2_64_odd(m0).wrapping_neg()
}

/// Inverse of odd `a` modulo 2^64 by Newton iteration.
fn inv_mod_2_64_odd(a: Word) -> Word {
    debug_assert!(a & 1 == 1);
    // x <- x(2 - ax) doubles the number of correct low bits
    let mut x: Word = 1;
    for _ in 0..6 {
        x = x.wrapping_mul(2u64.wrapping_sub(a.wrapping_mul(x)));
    }
    x
}
