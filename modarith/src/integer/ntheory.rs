//! Number-theoretic operations: gcd, inverses, quadratic residues.

use std::mem;

use super::LargeInteger;
use crate::error::{ArithError, Result};

impl LargeInteger {
    /// Greatest common divisor of the magnitudes; never negative.
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.abs();
        let mut b = other.abs();
        while let Some((_, r)) = a.checked_div_rem(&b) {
            a = mem::replace(&mut b, r);
        }
        a
    }

    /// Extended gcd: returns `(v, a, b)` with `self * a + other * b = v`
    /// and `v = gcd(self, other) >= 0`.
    pub fn egcd(&self, other: &Self) -> (Self, Self, Self) {
        let (mut r0, mut r1) = (self.abs(), other.abs());
        let (mut s0, mut s1) = (Self::one(), Self::zero());
        let (mut t0, mut t1) = (Self::zero(), Self::one());
        while let Some((q, r)) = r0.checked_div_rem(&r1) {
            r0 = mem::replace(&mut r1, r);
            let s = &s0 - &(&q * &s1);
            s0 = mem::replace(&mut s1, s);
            let t = &t0 - &(&q * &t1);
            t0 = mem::replace(&mut t1, t);
        }
        if self.is_negative() {
            s0 = -s0;
        }
        if other.is_negative() {
            t0 = -t0;
        }
        (r0, s0, t0)
    }

    /// `self^{-1} mod m` in `[0, m)`.
    ///
    /// Fails with [`ArithError::NotInvertible`] when `gcd(self, m) != 1`.
    pub fn modinv(&self, m: &Self) -> Result<Self> {
        let a = self.modulo(m)?;
        if m.is_one() {
            return Ok(Self::zero());
        }
        let (v, s, _) = a.egcd(m);
        if !v.is_one() {
            return Err(ArithError::NotInvertible);
        }
        s.modulo(m)
    }

    /// Legendre symbol `(self / p)` for an odd prime `p`: 1 for a non-zero
    /// quadratic residue, -1 for a non-residue, 0 when `p` divides `self`.
    ///
    /// Computed as the Jacobi symbol, so an odd composite `p` yields the
    /// Jacobi symbol. Fails with [`ArithError::EvenModulus`] for even `p`.
    pub fn legendre(&self, p: &Self) -> Result<i8> {
        let mut a = self.modulo(p)?;
        if p.is_even() {
            return Err(ArithError::EvenModulus);
        }
        let mut n = p.clone();
        let mut result = 1i8;
        while !a.is_zero() {
            let twos = a.trailing_zeros();
            a = a.shr_bits(twos);
            if twos % 2 == 1 && matches!(n.low_word() & 7, 3 | 5) {
                result = -result;
            }
            mem::swap(&mut a, &mut n);
            if a.low_word() & 3 == 3 && n.low_word() & 3 == 3 {
                result = -result;
            }
            a = a.modulo(&n)?;
        }
        Ok(if n.is_one() { result } else { 0 })
    }

    /// A square root of `self` modulo an odd prime `p`.
    ///
    /// Uses `self^((p + 1) / 4)` when `p = 3 mod 4` and Tonelli–Shanks
    /// otherwise. Fails with [`ArithError::NonResidue`] when no root exists.
    pub fn modsqrt(&self, p: &Self) -> Result<Self> {
        let a = self.modulo(p)?;
        if a.is_zero() {
            return Ok(a);
        }
        if a.legendre(p)? != 1 {
            return Err(ArithError::NonResidue);
        }
        let one = Self::one();
        if p.low_word() & 3 == 3 {
            let e = (p + &one).shr_bits(2);
            return a.modpow(&e, p);
        }

        // p - 1 = q * 2^s with q odd
        let pm1 = p - &one;
        let s = pm1.trailing_zeros();
        let q = pm1.shr_bits(s);

        let mut z = Self::from_u64(2);
        while z.legendre(p)? != -1 {
            z = &z + &one;
            if z >= *p {
                return Err(ArithError::NonResidue);
            }
        }

        let mut m = s;
        let mut c = z.modpow(&q, p)?;
        let mut t = a.modpow(&q, p)?;
        let mut r = a.modpow(&(&q + &one).shr_bits(1), p)?;
        while !t.is_one() {
            // least i with t^(2^i) = 1
            let mut i = 0;
            let mut tt = t.clone();
            while !tt.is_one() {
                tt = tt.square().modulo(p)?;
                i += 1;
                if i == m {
                    return Err(ArithError::NonResidue);
                }
            }
            let mut b = c;
            for _ in 0..m - i - 1 {
                b = b.square().modulo(p)?;
            }
            m = i;
            c = b.square().modulo(p)?;
            t = t.mod_mul(&c, p)?;
            r = r.mod_mul(&b, p)?;
        }
        Ok(r)
    }

    /// Number of trailing zero bits of the magnitude; zero for zero.
    pub fn trailing_zeros(&self) -> usize {
        self.words()
            .iter()
            .position(|&w| w != 0)
            .map_or(0, |i| i * 64 + self.words()[i].trailing_zeros() as usize)
    }

    fn low_word(&self) -> u64 {
        self.words().first().copied().unwrap_or(0)
    }
}
