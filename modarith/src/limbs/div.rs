//! Reciprocal-based long division.
//!
//! Quotient digits are estimated with the Möller–Granlund reciprocals:
//! a 2-by-1 step for one-limb divisors and a 3-by-2 step otherwise, followed
//! by one multiply-subtract and at most one add-back per digit.

use super::{
    DoubleWord, Word, add_to, copy, sbb, set_zero, shl_assign, shr_assign, submul_1,
    word_len,
};
use crate::error::{ArithError, Result, require};

/// A divisor prepared for repeated division.
///
/// Holds the divisor shifted so that its top bit is set and the reciprocal
/// of its top one or two limbs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Divisor {
    words: Vec<Word>,
    norm: Vec<Word>,
    shift: u32,
    inv: Word,
}

impl Divisor {
    /// Fails with [`ArithError::DivisionByZero`] when `y` is zero.
    pub fn new(y: &[Word]) -> Result<Self> {
        let n = word_len(y);
        if n == 0 {
            return Err(ArithError::DivisionByZero);
        }
        let words = y[..n].to_vec();
        let shift = words[n - 1].leading_zeros();
        let mut norm = words.clone();
        shl_assign(&mut norm, shift as usize);
        let inv = if n == 1 {
            reciprocal_word(norm[0])
        } else {
            reciprocal_3by2(norm[n - 1], norm[n - 2])
        };
        Ok(Self {
            words,
            norm,
            shift,
            inv,
        })
    }

    /// Significant limbs of the divisor.
    #[inline]
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// The divisor itself, without zero high limbs.
    #[inline]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.words == [1]
    }

    /// `q := x / d`, `x := x mod d`.
    ///
    /// `x` needs one zero limb above its significant limbs and `q` needs
    /// `word_len(x) - size() + 1` limbs.
    pub fn divide(&self, q: &mut [Word], x: &mut [Word]) -> Result<()> {
        let xn = word_len(x);
        require("div_qr", x.len(), xn + 1)?;
        let qn = (xn + 1).saturating_sub(self.size());
        require("div_qr", q.len(), qn)?;
        set_zero(q);
        self.divide_core(x, xn, |j, d| q[j] = d);
        Ok(())
    }

    /// `x := x mod d`. `x` needs one zero limb above its significant limbs.
    pub fn reduce(&self, x: &mut [Word]) -> Result<()> {
        let xn = word_len(x);
        require("reduce", x.len(), xn + 1)?;
        self.divide_core(x, xn, |_, _| {});
        Ok(())
    }

    /// `x mod d` as exactly `size()` limbs.
    pub fn residue(&self, x: &[Word]) -> Result<Vec<Word>> {
        let n = self.size();
        let mut t = vec![0; word_len(x).max(n) + 1];
        copy(&mut t, x)?;
        self.reduce(&mut t)?;
        t.truncate(n);
        Ok(t)
    }

    fn divide_core(&self, x: &mut [Word], xn: usize, mut emit: impl FnMut(usize, Word)) {
        let n = self.size();
        if xn < n {
            return;
        }
        let shift = self.shift as usize;
        let x = &mut x[..xn + 1];
        shl_assign(x, shift);

        if n == 1 {
            let d = self.norm[0];
            let mut r = x[xn];
            x[xn] = 0;
            for j in (0..xn).rev() {
                let (q, rem) = div_2by1(r, x[j], d, self.inv);
                emit(j, q);
                r = rem;
                x[j] = 0;
            }
            x[0] = r >> shift;
            return;
        }

        let d1 = self.norm[n - 1];
        let d0 = self.norm[n - 2];
        for j in (0..=xn - n).rev() {
            let u2 = x[j + n];
            let u1 = x[j + n - 1];
            let u0 = x[j + n - 2];
            let mut qhat = if u2 == d1 && u1 == d0 {
                Word::MAX
            } else {
                div_3by2(u2, u1, u0, d1, d0, self.inv).0
            };

            let window = &mut x[j..j + n + 1];
            let carry = submul_1(&mut window[..n], &self.norm, qhat);
            let (top, borrow) = sbb(window[n], carry, 0);
            window[n] = top;
            if borrow != 0 {
                qhat -= 1;
                add_to(window, &self.norm);
            }
            emit(j, qhat);
        }
        shr_assign(x, shift);
    }
}

/// `q := x / y`, `x := x mod y` with a freshly prepared divisor.
///
/// Fails with [`ArithError::DivisionByZero`] for `y = 0`. `x` needs one zero
/// limb above its significant limbs (the normalization spill limb) and `q`
/// needs `word_len(x) - word_len(y) + 1` limbs.
pub fn div_qr(q: &mut [Word], x: &mut [Word], y: &[Word]) -> Result<()> {
    Divisor::new(y)?.divide(q, x)
}

/// [`div_qr`] with a prepared divisor.
pub fn div_qr_prepared(q: &mut [Word], x: &mut [Word], d: &Divisor) -> Result<()> {
    d.divide(q, x)
}

/// `floor((β² - 1) / d) - β` for a normalized word `d`.
#[inline]
fn reciprocal_word(d: Word) -> Word {
    debug_assert!(d >> 63 == 1);
    ((!0 as DoubleWord) / (d as DoubleWord)) as Word
}

/// `floor((β³ - 1) / (d1·β + d0)) - β` for a normalized `d1`.
fn reciprocal_3by2(d1: Word, d0: Word) -> Word {
    let mut v = reciprocal_word(d1);
    let mut p = d1.wrapping_mul(v).wrapping_add(d0);
    if p < d0 {
        v = v.wrapping_sub(1);
        if p >= d1 {
            v = v.wrapping_sub(1);
            p = p.wrapping_sub(d1);
        }
        p = p.wrapping_sub(d1);
    }
    let t = (v as DoubleWord) * (d0 as DoubleWord);
    let (t1, t0) = ((t >> 64) as Word, t as Word);
    p = p.wrapping_add(t1);
    if p < t1 {
        v = v.wrapping_sub(1);
        if (p, t0) >= (d1, d0) {
            v = v.wrapping_sub(1);
        }
    }
    v
}

/// Divides `u1·β + u0` by normalized `d`, given `u1 < d`.
#[inline]
fn div_2by1(u1: Word, u0: Word, d: Word, v: Word) -> (Word, Word) {
    let q = ((v as DoubleWord) * (u1 as DoubleWord))
        .wrapping_add(((u1 as DoubleWord) << 64) | u0 as DoubleWord);
    let mut q1 = ((q >> 64) as Word).wrapping_add(1);
    let q0 = q as Word;
    let mut r = u0.wrapping_sub(q1.wrapping_mul(d));
    if r > q0 {
        q1 = q1.wrapping_sub(1);
        r = r.wrapping_add(d);
    }
    if r >= d {
        q1 += 1;
        r -= d;
    }
    (q1, r)
}

/// Divides `u2·β² + u1·β + u0` by normalized `d1·β + d0`, given
/// `(u2, u1) < (d1, d0)`. Returns the quotient word and the remainder.
#[inline]
fn div_3by2(u2: Word, u1: Word, u0: Word, d1: Word, d0: Word, v: Word) -> (Word, DoubleWord) {
    let d = ((d1 as DoubleWord) << 64) | d0 as DoubleWord;
    let q = ((v as DoubleWord) * (u2 as DoubleWord))
        .wrapping_add(((u2 as DoubleWord) << 64) | u1 as DoubleWord);
    let mut q1 = (q >> 64) as Word;
    let q0 = q as Word;
    let r1 = u1.wrapping_sub(q1.wrapping_mul(d1));
    let mut r = (((r1 as DoubleWord) << 64) | u0 as DoubleWord)
        .wrapping_sub((d0 as DoubleWord) * (q1 as DoubleWord))
        .wrapping_sub(d);
    q1 = q1.wrapping_add(1);
    if (r >> 64) as Word >= q0 {
        q1 = q1.wrapping_sub(1);
        r = r.wrapping_add(d);
    }
    if r >= d {
        q1 += 1;
        r -= d;
    }
    (q1, r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limbs::{cmp, mul_naive};

    fn pseudo_random(n: usize, seed: u64) -> Vec<Word> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                state ^ (state >> 31)
            })
            .collect()
    }

    /// Checks x = q*y + r and r < y.
    fn check_division(x: &[Word], y: &[Word]) {
        let mut rem = x.to_vec();
        rem.push(0);
        let mut q = vec![0; x.len() + 1];
        div_qr(&mut q, &mut rem, y).unwrap();
        assert!(cmp(&rem, y).is_lt(), "remainder not reduced");

        let mut back = vec![0; q.len() + y.len() + 1];
        mul_naive(&mut back, &q, y).unwrap();
        add_to(&mut back, &rem[..word_len(&rem)]);
        assert_eq!(cmp(&back, x), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_reciprocals() {
        assert_eq!(reciprocal_word(1 << 63), Word::MAX);
        assert_eq!(reciprocal_word(Word::MAX), 1);
        // floor((2^192 - 1) / (2^128 - 1)) = 2^64
        assert_eq!(reciprocal_3by2(Word::MAX, Word::MAX), 0);
        assert_eq!(reciprocal_3by2(1 << 63, 0), Word::MAX);
    }

    #[test]
    fn test_single_word_scenario() {
        // 0x100000000 / 3 = 0x55555555 remainder 1
        let mut x = [0x1_0000_0000, 0];
        let mut q = [0; 1];
        div_qr(&mut q, &mut x, &[3]).unwrap();
        assert_eq!(q, [0x5555_5555]);
        assert_eq!(x, [1, 0]);
    }

    #[test]
    fn test_division_by_zero() {
        let mut x = [5, 0];
        let mut q = [0; 2];
        assert_eq!(div_qr(&mut q, &mut x, &[0, 0]), Err(ArithError::DivisionByZero));
        assert_eq!(Divisor::new(&[]), Err(ArithError::DivisionByZero));
    }

    #[test]
    fn test_spill_limb_required() {
        let mut x = [5, 7];
        let mut q = [0; 2];
        assert!(matches!(
            div_qr(&mut q, &mut x, &[3]),
            Err(ArithError::Length(_))
        ));
        let mut x = [5, 7, 0];
        assert!(div_qr(&mut q[..1], &mut x, &[3]).is_err());
    }

    #[test]
    fn test_dividend_smaller_than_divisor() {
        let mut x = [5, 0];
        let mut q = [9; 1];
        div_qr(&mut q, &mut x, &[0, 1]).unwrap();
        assert_eq!(q, [0]);
        assert_eq!(x, [5, 0]);
    }

    #[test]
    fn test_one_word_divisors() {
        let x = pseudo_random(9, 1);
        for d in [1, 3, 10, 0xFFFF_FFFF, Word::MAX, 1 << 63] {
            check_division(&x, &[d]);
        }
    }

    #[test]
    fn test_multi_word_divisors() {
        for (xn, yn) in [(2, 2), (4, 2), (8, 3), (12, 5), (20, 19), (33, 7)] {
            let x = pseudo_random(xn, xn as u64 * 31);
            let y = pseudo_random(yn, yn as u64 * 17 + 5);
            check_division(&x, &y);
        }
    }

    #[test]
    fn test_add_back_paths() {
        // Dividends whose top limbs equal the divisor's force the
        // saturated quotient estimate and its correction.
        let y = [Word::MAX, 0, Word::MAX, 0x8000_0000_0000_0000];
        let x = [0, 0, 0, Word::MAX, 0, Word::MAX, 0x8000_0000_0000_0000 - 1];
        check_division(&x, &y);
        let x = [Word::MAX; 7];
        check_division(&x, &[1, 0, 0, 1 << 63]);
        check_division(&x, &[Word::MAX, Word::MAX]);
    }

    #[test]
    fn test_prepared_reuse() {
        let d = Divisor::new(&[7, 0, 0]).unwrap();
        assert_eq!(d.size(), 1);
        assert_eq!(d.words(), &[7]);
        let mut x = [50, 0];
        d.reduce(&mut x).unwrap();
        assert_eq!(x, [1, 0]);
        assert_eq!(d.residue(&[Word::MAX, Word::MAX]).unwrap(), vec![(u128::MAX % 7) as Word]);
        assert!(Divisor::new(&[1]).unwrap().is_one());
    }
}
