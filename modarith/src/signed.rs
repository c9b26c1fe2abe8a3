//! Signed integers over fixed-capacity limb buffers.
//!
//! An [`Sli`] is a sign in `{-1, 0, 1}` and a magnitude buffer whose length
//! is its capacity. Operations write into `self`, check that the result fits
//! the capacity, and keep the invariant that the sign is zero exactly when
//! the magnitude is zero.

use std::cmp::Ordering;

use crate::error::{Result, require};
use crate::limbs::{self, Divisor, Word, add_to, rsub_from, sub_from, word_len};

#[derive(Clone, Debug)]
pub struct Sli {
    sign: i8,
    mag: Vec<Word>,
}

impl Sli {
    /// Zero with room for `capacity` limbs.
    pub fn new(capacity: usize) -> Self {
        Self {
            sign: 0,
            mag: vec![0; capacity],
        }
    }

    /// `sign * |words|` with room for `capacity` limbs.
    pub fn from_words(sign: i8, words: &[Word], capacity: usize) -> Result<Self> {
        let mut s = Self::new(capacity);
        s.set_words(sign, words)?;
        Ok(s)
    }

    /// The single word `v` with room for `capacity` limbs (at least one).
    pub(crate) fn with_word(v: Word, capacity: usize) -> Self {
        let mut mag = vec![0; capacity.max(1)];
        mag[0] = v;
        Self {
            sign: (v != 0) as i8,
            mag,
        }
    }

    /// Builds from an owned magnitude, trimming zero high limbs.
    pub(crate) fn from_vec(sign: i8, mut mag: Vec<Word>) -> Self {
        mag.truncate(word_len(&mag));
        let sign = if mag.is_empty() { 0 } else { sign.signum() };
        Self { sign, mag }
    }

    /// Drops zero high limbs so capacity equals the significant length.
    pub(crate) fn normalized(mut self) -> Self {
        self.mag.truncate(word_len(&self.mag));
        self
    }

    /// Copy of `self` with room for `capacity` limbs.
    pub(crate) fn widened(&self, capacity: usize) -> Result<Self> {
        Self::from_words(self.sign, &self.mag, capacity)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.mag.len()
    }

    #[inline]
    pub fn signum(&self) -> i8 {
        self.sign
    }

    #[inline]
    pub fn magnitude(&self) -> &[Word] {
        &self.mag
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.sign == 0
    }

    /// Whether the value is exactly 1.
    pub fn is_one(&self) -> bool {
        self.sign == 1 && word_len(&self.mag) == 1 && self.mag[0] == 1
    }

    pub fn set_zero(&mut self) {
        self.sign = 0;
        limbs::set_zero(&mut self.mag);
    }

    pub fn set_word(&mut self, v: Word) -> Result<()> {
        limbs::set_word(&mut self.mag, v)?;
        self.sign = (v != 0) as i8;
        Ok(())
    }

    /// `self := sign * |words|`.
    pub fn set_words(&mut self, sign: i8, words: &[Word]) -> Result<()> {
        limbs::copy(&mut self.mag, words)?;
        self.fix_sign(sign);
        Ok(())
    }

    /// `self := x`.
    pub fn set(&mut self, x: &Sli) -> Result<()> {
        self.set_words(x.sign, &x.mag)
    }

    pub fn neg(&mut self) {
        self.sign = -self.sign;
    }

    /// `self := x + y`.
    pub fn add(&mut self, x: &Sli, y: &Sli) -> Result<()> {
        self.add_signed(x, y, y.sign)
    }

    /// `self := x - y`.
    pub fn sub(&mut self, x: &Sli, y: &Sli) -> Result<()> {
        self.add_signed(x, y, -y.sign)
    }

    /// `self += y`.
    pub fn add_assign(&mut self, y: &Sli) -> Result<()> {
        self.add_assign_signed(y, y.sign)
    }

    /// `self -= y`.
    pub fn sub_assign(&mut self, y: &Sli) -> Result<()> {
        self.add_assign_signed(y, -y.sign)
    }

    /// `self := x * y`. Needs `word_len(x) + word_len(y)` limbs.
    pub fn mul(&mut self, x: &Sli, y: &Sli) -> Result<()> {
        limbs::mul(&mut self.mag, &x.mag, &y.mag)?;
        self.fix_sign(x.sign * y.sign);
        Ok(())
    }

    /// `self := x^2`.
    pub fn square(&mut self, x: &Sli) -> Result<()> {
        limbs::square(&mut self.mag, &x.mag)?;
        self.fix_sign(1);
        Ok(())
    }

    /// `self := x * c` for a single word `c`.
    pub fn mul_word(&mut self, x: &Sli, c: Word) -> Result<()> {
        limbs::mul_word(&mut self.mag, &x.mag, c)?;
        self.fix_sign(x.sign);
        Ok(())
    }

    /// `self := self mod d`, the non-negative residue in `[0, d)`.
    ///
    /// Needs one spare limb above the significant length of `self`.
    pub fn reduce(&mut self, d: &Divisor) -> Result<()> {
        d.reduce(&mut self.mag)?;
        if self.sign < 0 && !limbs::is_zero(&self.mag) {
            rsub_from(&mut self.mag, d.words());
        }
        self.fix_sign(1);
        Ok(())
    }

    /// Signed comparison.
    pub fn compare(&self, other: &Sli) -> Ordering {
        match self.sign.cmp(&other.sign) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.sign {
            0 => Ordering::Equal,
            1 => limbs::cmp(&self.mag, &other.mag),
            _ => limbs::cmp(&other.mag, &self.mag),
        }
    }

    /// Magnitude comparison.
    pub fn compare_abs(&self, other: &Sli) -> Ordering {
        limbs::cmp(&self.mag, &other.mag)
    }

    fn fix_sign(&mut self, sign: i8) {
        self.sign = if limbs::is_zero(&self.mag) {
            0
        } else {
            sign.signum()
        };
    }

    /// `self := x + sign(ysign) * |y|`.
    fn add_signed(&mut self, x: &Sli, y: &Sli, ysign: i8) -> Result<()> {
        if ysign == 0 {
            return self.set(x);
        }
        if x.sign == 0 {
            self.set(y)?;
            self.sign = ysign;
            return Ok(());
        }
        if x.sign == ysign {
            limbs::add(&mut self.mag, &x.mag, &y.mag)?;
            self.fix_sign(ysign);
            return Ok(());
        }
        match limbs::cmp(&x.mag, &y.mag) {
            Ordering::Less => {
                limbs::sub(&mut self.mag, &y.mag, &x.mag)?;
                self.fix_sign(ysign);
            }
            _ => {
                limbs::sub(&mut self.mag, &x.mag, &y.mag)?;
                self.fix_sign(x.sign);
            }
        }
        Ok(())
    }

    fn add_assign_signed(&mut self, y: &Sli, ysign: i8) -> Result<()> {
        if ysign == 0 {
            return Ok(());
        }
        let xn = word_len(&self.mag);
        let yn = word_len(&y.mag);
        if self.sign == 0 || self.sign == ysign {
            let sign = ysign;
            require("add", self.mag.len(), xn.max(yn) + 1)?;
            add_to(&mut self.mag, &y.mag[..yn]);
            self.fix_sign(sign);
            return Ok(());
        }
        match limbs::cmp(&self.mag, &y.mag) {
            Ordering::Less => {
                require("sub", self.mag.len(), yn)?;
                rsub_from(&mut self.mag, &y.mag[..yn]);
                self.fix_sign(ysign);
            }
            _ => {
                sub_from(&mut self.mag, &y.mag[..yn]);
                let sign = self.sign;
                self.fix_sign(sign);
            }
        }
        Ok(())
    }
}

/// Value equality; capacities may differ.
impl PartialEq for Sli {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Sli {}
