//! Square-and-multiply and sliding-window modular exponentiation.

use super::{Divisor, Word, bit, bit_len, copy, mul_into, square_into};
use crate::error::{Result, require};

/// Exponent bit lengths at which the sliding window widens by one bit.
///
/// Exponents shorter than `WINDOW_THRESHOLDS[0]` bits use width 1, those
/// of at least `WINDOW_THRESHOLDS[i]` bits use width `i + 2`.
pub const WINDOW_THRESHOLDS: [usize; 6] = [8, 24, 80, 240, 672, 1792];

/// Sliding-window width for an exponent of `bits` bits.
pub fn window_width(bits: usize) -> usize {
    1 + WINDOW_THRESHOLDS.iter().take_while(|&&t| bits >= t).count()
}

/// Multiplication modulo a prepared divisor with a reusable product buffer.
pub(crate) struct Reducer<'a> {
    divisor: &'a Divisor,
    prod: Vec<Word>,
}

impl<'a> Reducer<'a> {
    pub(crate) fn new(divisor: &'a Divisor) -> Self {
        Self {
            divisor,
            prod: vec![0; 2 * divisor.size() + 1],
        }
    }

    /// `acc := acc * y mod m`, for `acc` and `y` of at most `m.size()` limbs.
    pub(crate) fn mul_assign(&mut self, acc: &mut [Word], y: &[Word]) -> Result<()> {
        mul_into(&mut self.prod, acc, y);
        self.divisor.reduce(&mut self.prod)?;
        copy(acc, &self.prod)
    }

    /// `acc := acc^2 mod m`.
    pub(crate) fn square_assign(&mut self, acc: &mut [Word]) -> Result<()> {
        square_into(&mut self.prod, acc);
        self.divisor.reduce(&mut self.prod)?;
        copy(acc, &self.prod)
    }

    /// `1 mod m` as `m.size()` limbs.
    pub(crate) fn one(&self) -> Vec<Word> {
        let mut one = vec![0; self.divisor.size()];
        if !self.divisor.is_one() {
            one[0] = 1;
        }
        one
    }
}

/// Shared entry checks: `m != 0` and room for the result.
fn prepare(op: &'static str, w: &[Word], m: &[Word]) -> Result<Divisor> {
    let d = Divisor::new(m)?;
    require(op, w.len(), d.size())?;
    Ok(d)
}

/// `w := b^e mod m` by left-to-right square-and-multiply, reducing after
/// every squaring and every multiplication.
///
/// Requires `m != 0` and `w.len() >= word_len(m)`.
pub fn modpow_naive(w: &mut [Word], b: &[Word], e: &[Word], m: &[Word]) -> Result<()> {
    let d = prepare("modpow_naive", w, m)?;
    let base = d.residue(b)?;
    let mut r = Reducer::new(&d);
    let mut acc = r.one();
    for i in (0..bit_len(e)).rev() {
        r.square_assign(&mut acc)?;
        if bit(e, i) {
            r.mul_assign(&mut acc, &base)?;
        }
    }
    copy(w, &acc)
}

/// `w := b^e mod m` by sliding-window exponentiation.
///
/// The window width comes from [`window_width`] on the bit length of `e`.
/// Odd powers `b, b^3, ..., b^(2^k - 1)` are precomputed; runs of zero bits
/// cost one squaring each and every window ends on a set bit.
///
/// Requires `m != 0` and `w.len() >= word_len(m)`.
pub fn modpow(w: &mut [Word], b: &[Word], e: &[Word], m: &[Word]) -> Result<()> {
    let d = prepare("modpow", w, m)?;
    let base = d.residue(b)?;
    let mut r = Reducer::new(&d);
    let ebits = bit_len(e);
    let k = window_width(ebits);

    let powers = odd_powers(&mut r, &base, k)?;
    let mut acc = r.one();
    let mut i = ebits;
    while i > 0 {
        let top = i - 1;
        if !bit(e, top) {
            r.square_assign(&mut acc)?;
            i = top;
            continue;
        }
        let mut low = (top + 1).saturating_sub(k);
        while !bit(e, low) {
            low += 1;
        }
        let mut window = 0usize;
        for j in (low..=top).rev() {
            window = (window << 1) | bit(e, j) as usize;
            r.square_assign(&mut acc)?;
        }
        r.mul_assign(&mut acc, &powers[window >> 1])?;
        i = low;
    }
    copy(w, &acc)
}

/// `[b, b^3, b^5, ..., b^(2^k - 1)] mod m`.
fn odd_powers(r: &mut Reducer<'_>, base: &[Word], k: usize) -> Result<Vec<Vec<Word>>> {
    let count = 1 << (k - 1);
    let mut powers = Vec::with_capacity(count);
    powers.push(base.to_vec());
    if count > 1 {
        let mut b2 = base.to_vec();
        r.square_assign(&mut b2)?;
        for i in 1..count {
            let mut next = powers[i - 1].clone();
            r.mul_assign(&mut next, &b2)?;
            powers.push(next);
        }
    }
    Ok(powers)
}
