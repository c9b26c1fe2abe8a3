//! Word-vector engine.
//!
//! Unsigned fixed-radix arithmetic on caller-allocated limb slices. A limb
//! slice is little-endian (`x[0]` is least significant) and may carry any
//! number of zero high limbs; routines look at the significant length
//! ([`word_len`]) when they check their length contracts.
//!
//! Every public routine validates its buffer lengths at entry and fails with
//! [`LengthError`](crate::error::LengthError). Results clear the unused high
//! limbs of their output buffer. Nothing here allocates except the prepared
//! values ([`Divisor`], [`MontModulus`], [`ProdTable`]) and the Karatsuba
//! scratch.

mod div;
mod modpow;
mod montgomery;
mod mul;
mod prodtab;

use std::cmp::Ordering;

use crate::error::{Result, require};

pub use div::{Divisor, div_qr, div_qr_prepared};
pub use modpow::{WINDOW_THRESHOLDS, modpow, modpow_naive, window_width};
pub use montgomery::{MontBase, MontModulus, modpow_mont};
pub use mul::{
    KARATSUBA_BALANCE, KARATSUBA_MAX_DEPTH, KARATSUBA_MUL_THRESHOLD, KARATSUBA_SQR_THRESHOLD,
    KaratsubaScratch, mul, mul_naive, mul_with, square, square_naive, square_with,
};
pub use prodtab::{MAX_PROD_WIDTH, ProdTable, modpowprod};

pub(crate) use modpow::Reducer;
pub(crate) use mul::{mul_into, square_into};

/// A single limb.
pub type Word = u64;
/// Accumulator wide enough for `a * b + c + carry` of any four words.
pub type DoubleWord = u128;

/// Bits per limb.
pub const WORD_BITS: usize = Word::BITS as usize;

// ---------------------------------------------------------------------------
// Word primitives
// ---------------------------------------------------------------------------

/// `a + b + carry`, returning (sum, carry out).
#[inline(always)]
pub(crate) fn adc(a: Word, b: Word, carry: Word) -> (Word, Word) {
    let t = (a as DoubleWord) + (b as DoubleWord) + (carry as DoubleWord);
    (t as Word, (t >> WORD_BITS) as Word)
}

/// `a - b - borrow`, returning (difference, borrow out in {0, 1}).
#[inline(always)]
pub(crate) fn sbb(a: Word, b: Word, borrow: Word) -> (Word, Word) {
    let t = (a as DoubleWord).wrapping_sub((b as DoubleWord) + (borrow as DoubleWord));
    (t as Word, ((t >> WORD_BITS) as Word) & 1)
}

/// `acc + x * y + carry`, returning (low word, high word).
#[inline(always)]
pub(crate) fn mac(acc: Word, x: Word, y: Word, carry: Word) -> (Word, Word) {
    let t = (acc as DoubleWord) + (x as DoubleWord) * (y as DoubleWord) + (carry as DoubleWord);
    (t as Word, (t >> WORD_BITS) as Word)
}

// ---------------------------------------------------------------------------
// Scanning and buffer helpers
// ---------------------------------------------------------------------------

/// Number of significant limbs (index of the top non-zero limb plus one).
#[inline]
pub fn word_len(x: &[Word]) -> usize {
    x.iter().rposition(|&w| w != 0).map_or(0, |i| i + 1)
}

/// Number of significant bits; zero for the value zero.
#[inline]
pub fn bit_len(x: &[Word]) -> usize {
    match word_len(x) {
        0 => 0,
        n => n * WORD_BITS - x[n - 1].leading_zeros() as usize,
    }
}

/// Bit `i` of `x`; bits beyond the buffer read as zero.
#[inline]
pub fn bit(x: &[Word], i: usize) -> bool {
    x.get(i / WORD_BITS)
        .is_some_and(|w| (w >> (i % WORD_BITS)) & 1 == 1)
}

#[inline]
pub fn is_zero(x: &[Word]) -> bool {
    x.iter().all(|&w| w == 0)
}

#[inline]
pub fn set_zero(x: &mut [Word]) {
    x.fill(0);
}

/// `x := v`. Needs one limb even for zero.
pub fn set_word(x: &mut [Word], v: Word) -> Result<()> {
    require("set_word", x.len(), 1)?;
    set_zero(x);
    x[0] = v;
    Ok(())
}

/// `w := x`, clearing the high limbs of `w`.
pub fn copy(w: &mut [Word], x: &[Word]) -> Result<()> {
    let n = word_len(x);
    require("copy", w.len(), n)?;
    w[..n].copy_from_slice(&x[..n]);
    set_zero(&mut w[n..]);
    Ok(())
}

/// Magnitude order, ignoring trailing zero limbs.
pub fn cmp(x: &[Word], y: &[Word]) -> Ordering {
    let xn = word_len(x);
    let yn = word_len(y);
    if xn != yn {
        return xn.cmp(&yn);
    }
    for i in (0..xn).rev() {
        match x[i].cmp(&y[i]) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

// ---------------------------------------------------------------------------
// Addition and subtraction
// ---------------------------------------------------------------------------

/// `w := x + y`. Requires `w.len() > max(word_len(x), word_len(y))`.
pub fn add(w: &mut [Word], x: &[Word], y: &[Word]) -> Result<()> {
    let n = word_len(x).max(word_len(y));
    require("add", w.len(), n + 1)?;
    add_into(w, x, y);
    Ok(())
}

/// Kernel of [`add`]; the caller guarantees the length contract.
pub(crate) fn add_into(w: &mut [Word], x: &[Word], y: &[Word]) {
    let n = word_len(x).max(word_len(y));
    debug_assert!(w.len() > n);
    let mut carry = 0;
    for (i, wi) in w[..n].iter_mut().enumerate() {
        let a = x.get(i).copied().unwrap_or(0);
        let b = y.get(i).copied().unwrap_or(0);
        (*wi, carry) = adc(a, b, carry);
    }
    w[n] = carry;
    set_zero(&mut w[n + 1..]);
}

/// `w := x - y` over all of `w`, returning the borrow.
///
/// When `x < y` the buffer holds the two's-complement continuation
/// `2^(64 * w.len()) + x - y` and the borrow is 1. Requires
/// `w.len() >= max(word_len(x), word_len(y))`.
pub fn sub(w: &mut [Word], x: &[Word], y: &[Word]) -> Result<Word> {
    let n = word_len(x).max(word_len(y));
    require("sub", w.len(), n)?;
    Ok(sub_into(w, x, y))
}

pub(crate) fn sub_into(w: &mut [Word], x: &[Word], y: &[Word]) -> Word {
    let mut borrow = 0;
    for (i, wi) in w.iter_mut().enumerate() {
        let a = x.get(i).copied().unwrap_or(0);
        let b = y.get(i).copied().unwrap_or(0);
        (*wi, borrow) = sbb(a, b, borrow);
    }
    borrow
}

/// `x += y`, carrying through the whole of `x`; returns the carry out.
/// Requires `x.len() >= word_len(y)`.
pub fn add_assign(x: &mut [Word], y: &[Word]) -> Result<Word> {
    let yn = word_len(y);
    require("add_assign", x.len(), yn)?;
    Ok(add_to(x, &y[..yn]))
}

/// `x -= y` over the whole of `x`; returns the borrow.
/// Requires `x.len() >= word_len(y)`.
pub fn sub_assign(x: &mut [Word], y: &[Word]) -> Result<Word> {
    let yn = word_len(y);
    require("sub_assign", x.len(), yn)?;
    Ok(sub_from(x, &y[..yn]))
}

/// `x += y` with `y.len() <= x.len()`.
pub(crate) fn add_to(x: &mut [Word], y: &[Word]) -> Word {
    debug_assert!(y.len() <= x.len());
    let mut carry = 0;
    for (xi, &yi) in x.iter_mut().zip(y) {
        (*xi, carry) = adc(*xi, yi, carry);
    }
    for xi in x[y.len()..].iter_mut() {
        if carry == 0 {
            break;
        }
        (*xi, carry) = adc(*xi, 0, carry);
    }
    carry
}

/// `x -= y` with `y.len() <= x.len()`.
pub(crate) fn sub_from(x: &mut [Word], y: &[Word]) -> Word {
    debug_assert!(y.len() <= x.len());
    let mut borrow = 0;
    for (xi, &yi) in x.iter_mut().zip(y) {
        (*xi, borrow) = sbb(*xi, yi, borrow);
    }
    for xi in x[y.len()..].iter_mut() {
        if borrow == 0 {
            break;
        }
        (*xi, borrow) = sbb(*xi, 0, borrow);
    }
    borrow
}

/// `x := y - x` over the whole of `x`; returns the borrow.
pub(crate) fn rsub_from(x: &mut [Word], y: &[Word]) -> Word {
    let mut borrow = 0;
    for (i, xi) in x.iter_mut().enumerate() {
        let a = y.get(i).copied().unwrap_or(0);
        (*xi, borrow) = sbb(a, *xi, borrow);
    }
    borrow
}

// ---------------------------------------------------------------------------
// Single-word products
// ---------------------------------------------------------------------------

/// `w := x * c`. Requires `w.len() > word_len(x)`.
pub fn mul_word(w: &mut [Word], x: &[Word], c: Word) -> Result<()> {
    let n = word_len(x);
    require("mul_word", w.len(), n + 1)?;
    w[n] = mul_1(&mut w[..n], &x[..n], c);
    set_zero(&mut w[n + 1..]);
    Ok(())
}

/// `w[..x.len()] := x * c`, returning the high word.
pub(crate) fn mul_1(w: &mut [Word], x: &[Word], c: Word) -> Word {
    let mut carry = 0;
    for (wi, &xi) in w.iter_mut().zip(x) {
        (*wi, carry) = mac(0, xi, c, carry);
    }
    carry
}

/// `w[..x.len()] += x * c`, returning the high word.
pub(crate) fn addmul_1(w: &mut [Word], x: &[Word], c: Word) -> Word {
    let mut carry = 0;
    for (wi, &xi) in w.iter_mut().zip(x) {
        (*wi, carry) = mac(*wi, xi, c, carry);
    }
    carry
}

/// `w[..x.len()] -= x * c`, returning the word still to subtract above.
pub(crate) fn submul_1(w: &mut [Word], x: &[Word], c: Word) -> Word {
    let mut carry = 0;
    for (wi, &xi) in w.iter_mut().zip(x) {
        let (lo, hi) = mac(0, xi, c, carry);
        let (d, b) = sbb(*wi, lo, 0);
        *wi = d;
        carry = hi + b;
    }
    carry
}

// ---------------------------------------------------------------------------
// Shifts
// ---------------------------------------------------------------------------

/// `x <<= bits` within the allocated length; bits shifted out are dropped.
pub fn shl_assign(x: &mut [Word], bits: usize) {
    let n = x.len();
    let limbs = bits / WORD_BITS;
    if limbs >= n {
        set_zero(x);
        return;
    }
    let s = (bits % WORD_BITS) as u32;
    if s == 0 {
        x.copy_within(..n - limbs, limbs);
    } else {
        for i in (limbs + 1..n).rev() {
            x[i] = (x[i - limbs] << s) | (x[i - limbs - 1] >> (WORD_BITS as u32 - s));
        }
        x[limbs] = x[0] << s;
    }
    set_zero(&mut x[..limbs]);
}

/// `x >>= bits`; shifting by the full width or more zeroes `x`.
pub fn shr_assign(x: &mut [Word], bits: usize) {
    let n = x.len();
    let limbs = bits / WORD_BITS;
    if limbs >= n {
        set_zero(x);
        return;
    }
    let s = (bits % WORD_BITS) as u32;
    if s == 0 {
        x.copy_within(limbs.., 0);
    } else {
        for i in 0..n - limbs - 1 {
            x[i] = (x[i + limbs] >> s) | (x[i + limbs + 1] << (WORD_BITS as u32 - s));
        }
        x[n - limbs - 1] = x[n - 1] >> s;
    }
    set_zero(&mut x[n - limbs..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_primitives() {
        assert_eq!(adc(Word::MAX, 1, 0), (0, 1));
        assert_eq!(adc(Word::MAX, Word::MAX, 1), (Word::MAX, 1));
        assert_eq!(sbb(0, 1, 0), (Word::MAX, 1));
        assert_eq!(sbb(5, 3, 1), (1, 0));
        // (2^64 - 1)^2 + 2 * (2^64 - 1) = 2^128 - 1
        assert_eq!(
            mac(Word::MAX, Word::MAX, Word::MAX, Word::MAX),
            (Word::MAX, Word::MAX)
        );
    }

    #[test]
    fn test_lengths() {
        assert_eq!(word_len(&[]), 0);
        assert_eq!(word_len(&[0, 0]), 0);
        assert_eq!(word_len(&[1, 0, 7, 0]), 3);
        assert_eq!(bit_len(&[0, 0]), 0);
        assert_eq!(bit_len(&[1]), 1);
        assert_eq!(bit_len(&[0, 0x80, 0]), 72);
        assert!(bit(&[0, 1], 64));
        assert!(!bit(&[0, 1], 63));
        assert!(!bit(&[0, 1], 1000));
    }

    #[test]
    fn test_add_sub() {
        let x = [Word::MAX, Word::MAX, 0, 0];
        let y = [1];
        let mut w = [9; 3];
        add(&mut w, &x, &y).unwrap();
        assert_eq!(w, [0, 0, 1]);

        let mut back = [0; 3];
        assert_eq!(sub(&mut back, &w, &y).unwrap(), 0);
        assert_eq!(back, [Word::MAX, Word::MAX, 0]);

        // result must have a limb above the longer operand
        let mut short = [0; 2];
        assert!(add(&mut short, &x, &y).is_err());
    }

    #[test]
    fn test_sub_twos_complement() {
        let mut w = [0; 2];
        let borrow = sub(&mut w, &[1], &[3]).unwrap();
        assert_eq!(borrow, 1);
        assert_eq!(w, [Word::MAX - 1, Word::MAX]);
    }

    #[test]
    fn test_assign_forms() {
        let mut x = [Word::MAX, 0];
        assert_eq!(add_assign(&mut x, &[1, 0, 0]).unwrap(), 0);
        assert_eq!(x, [0, 1]);
        assert_eq!(sub_assign(&mut x, &[1]).unwrap(), 0);
        assert_eq!(x, [Word::MAX, 0]);
        assert!(add_assign(&mut x, &[1, 2, 3]).is_err());
    }

    #[test]
    fn test_cmp_ignores_padding() {
        assert_eq!(cmp(&[5, 0, 0], &[5]), Ordering::Equal);
        assert_eq!(cmp(&[0, 1], &[Word::MAX]), Ordering::Greater);
        assert_eq!(cmp(&[3], &[2, 1]), Ordering::Less);
        assert_eq!(cmp(&[], &[0]), Ordering::Equal);
    }

    #[test]
    fn test_shifts() {
        let mut x = [0x8000_0000_0000_0001, 0, 0];
        shl_assign(&mut x, 1);
        assert_eq!(x, [2, 1, 0]);
        shl_assign(&mut x, 64);
        assert_eq!(x, [0, 2, 1]);
        shr_assign(&mut x, 65);
        assert_eq!(x, [0x8000_0000_0000_0001, 0, 0]);

        // bits pushed past the buffer are lost
        let mut y = [0, Word::MAX];
        shl_assign(&mut y, 4);
        assert_eq!(y, [0, Word::MAX << 4]);
        shl_assign(&mut y, 128);
        assert_eq!(y, [0, 0]);
    }

    #[test]
    fn test_mul_word() {
        let mut w = [0; 3];
        mul_word(&mut w, &[Word::MAX, Word::MAX], 2).unwrap();
        assert_eq!(w, [Word::MAX - 1, Word::MAX, 1]);
        assert!(mul_word(&mut w[..2], &[Word::MAX, Word::MAX], 2).is_err());
    }

    #[test]
    fn test_copy_and_set() {
        let mut w = [7; 4];
        copy(&mut w, &[1, 2, 0, 0, 0]).unwrap();
        assert_eq!(w, [1, 2, 0, 0]);
        set_word(&mut w, 9).unwrap();
        assert_eq!(w, [9, 0, 0, 0]);
        assert!(set_word(&mut [], 1).is_err());
    }
}
