//! Immutable arbitrary-precision signed integers.
//!
//! [`LargeInteger`] is the public face of the signed layer: every operation
//! returns a freshly sized value and the stored magnitude never carries zero
//! high limbs (zero has an empty magnitude).
//!
//! # Examples
//! ```
//! use modarith::LargeInteger;
//!
//! let p = LargeInteger::from_hex("fb").unwrap();
//! let b = LargeInteger::from(3u64);
//! let e = &p - &LargeInteger::one();
//! assert!(b.modpow(&e, &p).unwrap().is_one());
//! ```

mod ntheory;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Shl, Shr, Sub};

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ArithError, Result};
use crate::limbs::{
    self, Divisor, MontBase, MontModulus, WORD_BITS, Word, add_into, mul_into, shl_assign,
    shr_assign, square_into, sub_into,
};
use crate::signed::Sli;

/// Exponentiation algorithm for [`LargeInteger::modpow_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModPowAlgorithm {
    /// Square-and-multiply with a reduction after every product.
    Naive,
    /// Sliding-window exponentiation.
    Windowed,
    /// Montgomery exponentiation; odd moduli only.
    Montgomery,
}

impl ModPowAlgorithm {
    /// Montgomery for odd moduli, sliding window otherwise.
    pub fn for_modulus(m: &LargeInteger) -> Self {
        if m.is_odd() {
            ModPowAlgorithm::Montgomery
        } else {
            ModPowAlgorithm::Windowed
        }
    }
}

#[derive(Clone)]
pub struct LargeInteger {
    value: Sli,
}

impl LargeInteger {
    pub fn zero() -> Self {
        Self {
            value: Sli::from_vec(0, Vec::new()),
        }
    }

    pub fn one() -> Self {
        Self::from_u64(1)
    }

    pub fn from_u64(v: u64) -> Self {
        Self::from_parts(1, vec![v])
    }

    pub fn from_i64(v: i64) -> Self {
        Self::from_parts(v.signum() as i8, vec![v.unsigned_abs()])
    }

    /// `sign * |words|` from little-endian limbs.
    pub fn from_words(sign: i8, words: &[Word]) -> Self {
        Self::from_parts(sign, words.to_vec())
    }

    pub(crate) fn from_parts(sign: i8, words: Vec<Word>) -> Self {
        Self {
            value: Sli::from_vec(sign, words),
        }
    }

    pub(crate) fn from_sli(value: Sli) -> Self {
        Self {
            value: value.normalized(),
        }
    }

    /// The underlying signed value.
    pub fn as_sli(&self) -> &Sli {
        &self.value
    }

    /// Little-endian magnitude limbs without zero high limbs.
    #[inline]
    pub fn words(&self) -> &[Word] {
        self.value.magnitude()
    }

    /// -1, 0 or 1.
    #[inline]
    pub fn signum(&self) -> i8 {
        self.value.signum()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.value.is_one()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.signum() < 0
    }

    #[inline]
    pub fn is_odd(&self) -> bool {
        self.words().first().is_some_and(|w| w & 1 == 1)
    }

    #[inline]
    pub fn is_even(&self) -> bool {
        !self.is_odd()
    }

    /// Bit length of the magnitude.
    #[inline]
    pub fn bit_len(&self) -> usize {
        limbs::bit_len(self.words())
    }

    /// Bit `i` of the magnitude.
    #[inline]
    pub fn bit(&self, i: usize) -> bool {
        limbs::bit(self.words(), i)
    }

    pub fn abs(&self) -> Self {
        Self::from_parts(1, self.words().to_vec())
    }

    // -----------------------------------------------------------------------
    // Arithmetic
    // -----------------------------------------------------------------------

    fn add_signed(&self, other: &Self, osign: i8) -> Self {
        let (x, y) = (self.words(), other.words());
        if osign == 0 {
            return self.clone();
        }
        if self.is_zero() {
            return Self::from_parts(osign, y.to_vec());
        }
        if self.signum() == osign {
            let mut w = vec![0; x.len().max(y.len()) + 1];
            add_into(&mut w, x, y);
            return Self::from_parts(osign, w);
        }
        let mut w = vec![0; x.len().max(y.len())];
        match limbs::cmp(x, y) {
            Ordering::Less => {
                sub_into(&mut w, y, x);
                Self::from_parts(osign, w)
            }
            _ => {
                sub_into(&mut w, x, y);
                Self::from_parts(self.signum(), w)
            }
        }
    }

    fn mul_impl(&self, other: &Self) -> Self {
        let (x, y) = (self.words(), other.words());
        let mut w = vec![0; x.len() + y.len()];
        mul_into(&mut w, x, y);
        Self::from_parts(self.signum() * other.signum(), w)
    }

    pub fn square(&self) -> Self {
        let x = self.words();
        let mut w = vec![0; 2 * x.len()];
        square_into(&mut w, x);
        Self::from_parts(1, w)
    }

    /// Truncated division: `self = q * d + r` with `|r| < |d|` and `r`
    /// carrying the sign of `self`. `None` when `d` is zero.
    pub fn checked_div_rem(&self, d: &Self) -> Option<(Self, Self)> {
        let divisor = Divisor::new(d.words()).ok()?;
        let mut x = self.words().to_vec();
        x.push(0);
        let mut q = vec![0; x.len()];
        divisor.divide(&mut q, &mut x).ok()?;
        Some((
            Self::from_parts(self.signum() * d.signum(), q),
            Self::from_parts(self.signum(), x),
        ))
    }

    /// [`checked_div_rem`](Self::checked_div_rem) failing with
    /// [`ArithError::DivisionByZero`].
    pub fn div_rem(&self, d: &Self) -> Result<(Self, Self)> {
        self.checked_div_rem(d).ok_or(ArithError::DivisionByZero)
    }

    pub fn div(&self, d: &Self) -> Result<Self> {
        Ok(self.div_rem(d)?.0)
    }

    pub fn rem(&self, d: &Self) -> Result<Self> {
        Ok(self.div_rem(d)?.1)
    }

    /// Prepared divisor for a modulus, which must be positive.
    pub(crate) fn modulus_divisor(m: &Self) -> Result<Divisor> {
        if m.is_negative() {
            return Err(ArithError::NonPositiveModulus);
        }
        Divisor::new(m.words())
    }

    /// Residue in `[0, m)` for a prepared modulus.
    pub(crate) fn reduce_by(&self, d: &Divisor) -> Result<Self> {
        let mut s = self.value.widened(self.words().len().max(d.size()) + 1)?;
        s.reduce(d)?;
        Ok(Self::from_sli(s))
    }

    /// Non-negative residue `self mod m` in `[0, m)`.
    ///
    /// Fails with [`ArithError::DivisionByZero`] for `m = 0` and
    /// [`ArithError::NonPositiveModulus`] for `m < 0`.
    pub fn modulo(&self, m: &Self) -> Result<Self> {
        self.reduce_by(&Self::modulus_divisor(m)?)
    }

    pub fn mod_add(&self, other: &Self, m: &Self) -> Result<Self> {
        (self + other).modulo(m)
    }

    pub fn mod_sub(&self, other: &Self, m: &Self) -> Result<Self> {
        (self - other).modulo(m)
    }

    pub fn mod_mul(&self, other: &Self, m: &Self) -> Result<Self> {
        (self * other).modulo(m)
    }

    /// `self^e mod m` with the algorithm chosen by
    /// [`ModPowAlgorithm::for_modulus`].
    pub fn modpow(&self, e: &Self, m: &Self) -> Result<Self> {
        self.modpow_with(e, m, ModPowAlgorithm::for_modulus(m))
    }

    /// `self^e mod m` with an explicit algorithm.
    ///
    /// Fails with [`ArithError::NegativeExponent`] for `e < 0`, the modulus
    /// errors of [`modulo`](Self::modulo), and [`ArithError::EvenModulus`]
    /// when Montgomery is asked for an even modulus.
    pub fn modpow_with(&self, e: &Self, m: &Self, algorithm: ModPowAlgorithm) -> Result<Self> {
        if e.is_negative() {
            return Err(ArithError::NegativeExponent);
        }
        let base = self.modulo(m)?;
        let mut w = vec![0; m.words().len()];
        match algorithm {
            ModPowAlgorithm::Naive => limbs::modpow_naive(&mut w, base.words(), e.words(), m.words())?,
            ModPowAlgorithm::Windowed => limbs::modpow(&mut w, base.words(), e.words(), m.words())?,
            ModPowAlgorithm::Montgomery => {
                return base.modpow_prepared(e, &Self::mont_modulus(m)?);
            }
        }
        Ok(Self::from_parts(1, w))
    }

    /// Montgomery context for an odd positive modulus, to be reused across
    /// [`modpow_prepared`](Self::modpow_prepared) calls.
    pub fn mont_modulus(m: &Self) -> Result<MontModulus> {
        if m.is_negative() {
            return Err(ArithError::NonPositiveModulus);
        }
        MontModulus::new(m.words())
    }

    /// `self^e mod m` for a prepared Montgomery modulus.
    pub fn modpow_prepared(&self, e: &Self, m: &MontModulus) -> Result<Self> {
        Self::modpow_base(&self.mont_base(m)?, e)
    }

    /// `self mod m` in Montgomery form, for a base raised to many exponents
    /// with [`modpow_base`](Self::modpow_base).
    pub fn mont_base<'m>(&self, m: &'m MontModulus) -> Result<MontBase<'m>> {
        let d = Self::from_words(1, m.modulus());
        MontBase::new(m, self.modulo(&d)?.words())
    }

    /// `b^e mod m` for a prepared base.
    pub fn modpow_base(base: &MontBase<'_>, e: &Self) -> Result<Self> {
        if e.is_negative() {
            return Err(ArithError::NegativeExponent);
        }
        let mut w = vec![0; base.modulus().size()];
        base.pow(&mut w, e.words())?;
        Ok(Self::from_parts(1, w))
    }

    /// Magnitude shifted left; the sign is kept.
    pub fn shl_bits(&self, bits: usize) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let mut w = vec![0; self.words().len() + bits.div_ceil(WORD_BITS) + 1];
        w[..self.words().len()].copy_from_slice(self.words());
        shl_assign(&mut w, bits);
        Self::from_parts(self.signum(), w)
    }

    /// Magnitude shifted right (truncating toward zero); the sign is kept.
    pub fn shr_bits(&self, bits: usize) -> Self {
        let mut w = self.words().to_vec();
        shr_assign(&mut w, bits);
        Self::from_parts(self.signum(), w)
    }

    /// Bits `[from, to)` of the magnitude: `(|self| >> from) mod 2^(to - from)`.
    pub fn slice(&self, from: usize, to: usize) -> Result<Self> {
        if from > to {
            return Err(ArithError::InvalidBitRange { from, to });
        }
        let width = to - from;
        let mut w = self.words().to_vec();
        shr_assign(&mut w, from);
        let keep = width.div_ceil(WORD_BITS);
        if keep < w.len() {
            w.truncate(keep);
        }
        let rem = width % WORD_BITS;
        if rem != 0 && keep == w.len() && keep > 0 {
            w[keep - 1] &= (1 << rem) - 1;
        }
        Ok(Self::from_parts(1, w))
    }

    // -----------------------------------------------------------------------
    // Codecs
    // -----------------------------------------------------------------------

    /// Non-negative value of big-endian bytes.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        let mut words = vec![0; bytes.len().div_ceil(8)];
        for (i, &byte) in bytes.iter().rev().enumerate() {
            words[i / 8] |= (byte as Word) << ((i % 8) * 8);
        }
        Self::from_parts(1, words)
    }

    /// Big-endian bytes of the magnitude in exactly `len` bytes: shorter
    /// values are padded with leading zeros, longer ones keep their
    /// low-order `len` bytes.
    pub fn to_bytes_be(&self, len: usize) -> Vec<u8> {
        let words = self.words();
        (0..len)
            .rev()
            .map(|i| {
                words
                    .get(i / 8)
                    .map_or(0, |w| (w >> ((i % 8) * 8)) as u8)
            })
            .collect()
    }

    /// Number of bytes of the magnitude.
    pub fn byte_len(&self) -> usize {
        self.bit_len().div_ceil(8)
    }

    /// Parses hex digits with an optional leading `-`. Odd-length input is
    /// read as if left-padded with a zero digit; the empty string is zero.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let trimmed = hex.trim();
        let (sign, digits) = match trimmed.strip_prefix('-') {
            Some(rest) if rest.is_empty() => return Err(ArithError::InvalidHex(hex.to_string())),
            Some(rest) => (-1, rest),
            None => (1, trimmed),
        };
        let mut words = vec![0; digits.len().div_ceil(16)];
        for (i, c) in digits.bytes().rev().enumerate() {
            let nibble = (c as char)
                .to_digit(16)
                .ok_or_else(|| ArithError::InvalidHex(hex.to_string()))?;
            words[i / 16] |= (nibble as Word) << ((i % 16) * 4);
        }
        Ok(Self::from_parts(sign, words))
    }

    /// Lowercase hex of whole bytes with a leading `-` for negative values;
    /// zero is `"00"`.
    pub fn to_hex(&self) -> String {
        let bytes = self.to_bytes_be(self.byte_len().max(1));
        let mut hex = String::with_capacity(2 * bytes.len() + 1);
        if self.is_negative() {
            hex.push('-');
        }
        for b in bytes {
            hex.push_str(&format!("{b:02x}"));
        }
        hex
    }

    // -----------------------------------------------------------------------
    // Randomness
    // -----------------------------------------------------------------------

    /// Uniformly random non-negative integer below `2^bits`.
    pub fn random_bits<R: RngCore + ?Sized>(bits: usize, rng: &mut R) -> Self {
        let mut words: Vec<Word> = (0..bits.div_ceil(WORD_BITS))
            .map(|_| rng.next_u64())
            .collect();
        let rem = bits % WORD_BITS;
        if let Some(top) = words.last_mut()
            && rem != 0
        {
            *top &= (1 << rem) - 1;
        }
        Self::from_parts(1, words)
    }

    /// Uniformly random integer in `[0, bound)` by rejection sampling.
    pub fn random_below<R: RngCore + ?Sized>(bound: &Self, rng: &mut R) -> Result<Self> {
        if bound.is_zero() {
            return Err(ArithError::DivisionByZero);
        }
        if bound.is_negative() {
            return Err(ArithError::NonPositiveModulus);
        }
        let bits = bound.bit_len();
        loop {
            let candidate = Self::random_bits(bits, rng);
            if candidate < *bound {
                return Ok(candidate);
            }
        }
    }
}

impl Default for LargeInteger {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u64> for LargeInteger {
    fn from(v: u64) -> Self {
        Self::from_u64(v)
    }
}

impl From<u32> for LargeInteger {
    fn from(v: u32) -> Self {
        Self::from_u64(v as u64)
    }
}

impl From<i64> for LargeInteger {
    fn from(v: i64) -> Self {
        Self::from_i64(v)
    }
}

impl From<i32> for LargeInteger {
    fn from(v: i32) -> Self {
        Self::from_i64(v as i64)
    }
}

impl PartialEq for LargeInteger {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for LargeInteger {}

impl Hash for LargeInteger {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signum().hash(state);
        self.words().hash(state);
    }
}

impl PartialOrd for LargeInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LargeInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.compare(&other.value)
    }
}

// Addition
impl Add for &LargeInteger {
    type Output = LargeInteger;

    fn add(self, other: &LargeInteger) -> LargeInteger {
        self.add_signed(other, other.signum())
    }
}

impl Add for LargeInteger {
    type Output = LargeInteger;

    fn add(self, other: LargeInteger) -> LargeInteger {
        &self + &other
    }
}

// Subtraction
impl Sub for &LargeInteger {
    type Output = LargeInteger;

    fn sub(self, other: &LargeInteger) -> LargeInteger {
        self.add_signed(other, -other.signum())
    }
}

impl Sub for LargeInteger {
    type Output = LargeInteger;

    fn sub(self, other: LargeInteger) -> LargeInteger {
        &self - &other
    }
}

// Multiplication
impl Mul for &LargeInteger {
    type Output = LargeInteger;

    fn mul(self, other: &LargeInteger) -> LargeInteger {
        self.mul_impl(other)
    }
}

impl Mul for LargeInteger {
    type Output = LargeInteger;

    fn mul(self, other: LargeInteger) -> LargeInteger {
        &self * &other
    }
}

impl Neg for &LargeInteger {
    type Output = LargeInteger;

    fn neg(self) -> LargeInteger {
        LargeInteger::from_parts(-self.signum(), self.words().to_vec())
    }
}

impl Neg for LargeInteger {
    type Output = LargeInteger;

    fn neg(mut self) -> LargeInteger {
        self.value.neg();
        self
    }
}

impl Shl<usize> for &LargeInteger {
    type Output = LargeInteger;

    fn shl(self, bits: usize) -> LargeInteger {
        self.shl_bits(bits)
    }
}

impl Shl<usize> for LargeInteger {
    type Output = LargeInteger;

    fn shl(self, bits: usize) -> LargeInteger {
        self.shl_bits(bits)
    }
}

impl Shr<usize> for &LargeInteger {
    type Output = LargeInteger;

    fn shr(self, bits: usize) -> LargeInteger {
        self.shr_bits(bits)
    }
}

impl Shr<usize> for LargeInteger {
    type Output = LargeInteger;

    fn shr(self, bits: usize) -> LargeInteger {
        self.shr_bits(bits)
    }
}

impl fmt::Debug for LargeInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LargeInteger({})", self.to_hex())
    }
}

impl fmt::LowerHex for LargeInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Decimal digits.
impl fmt::Display for LargeInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const CHUNK: Word = 10_000_000_000_000_000_000;
        if self.is_zero() {
            return write!(f, "0");
        }

        // Peel off 19 decimal digits at a time
        let ten19 = Self::from_u64(CHUNK);
        let mut num = self.abs();
        let mut chunks = Vec::new();
        while !num.is_zero() {
            let Some((q, r)) = num.checked_div_rem(&ten19) else {
                return Err(fmt::Error);
            };
            chunks.push(r.words().first().copied().unwrap_or(0));
            num = q;
        }

        if self.is_negative() {
            write!(f, "-")?;
        }
        let mut iter = chunks.iter().rev();
        if let Some(top) = iter.next() {
            write!(f, "{top}")?;
        }
        for c in iter {
            write!(f, "{c:019}")?;
        }
        Ok(())
    }
}

impl Serialize for LargeInteger {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for LargeInteger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        LargeInteger::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
