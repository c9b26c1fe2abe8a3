//! Schoolbook and Karatsuba multiplication and squaring.

use std::cell::RefCell;

use log::trace;

use super::{Word, add_to, addmul_1, adc, set_zero, shl_assign, sub_from, word_len};
use crate::error::{Result, require};

/// Operand length (in limbs) from which multiplication switches to Karatsuba.
pub const KARATSUBA_MUL_THRESHOLD: usize = 32;
/// Operand length from which squaring switches to Karatsuba.
pub const KARATSUBA_SQR_THRESHOLD: usize = 40;
/// Minimum ratio of the shorter to the longer operand for a Karatsuba split.
pub const KARATSUBA_BALANCE: f64 = 0.8;
/// Maximal number of nested Karatsuba splits.
pub const KARATSUBA_MAX_DEPTH: usize = 3;

#[derive(Debug, Default)]
struct Level {
    sx: Vec<Word>,
    sy: Vec<Word>,
    z: Vec<Word>,
}

impl Level {
    fn reserve(&mut self, half: usize, depth: usize) {
        if self.sx.len() < half + 1 {
            trace!("karatsuba scratch level {depth} grows to half length {half}");
            self.sx.resize(half + 1, 0);
            self.sy.resize(half + 1, 0);
            self.z.resize(2 * half + 2, 0);
        }
    }
}

/// Scratch space for Karatsuba, one level per recursion depth.
///
/// Levels are grown lazily to the largest operands seen and kept until
/// [`clear`](Self::clear) is called.
#[derive(Debug, Default)]
pub struct KaratsubaScratch {
    levels: Vec<Level>,
}

impl KaratsubaScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases all scratch memory.
    pub fn clear(&mut self) {
        self.levels = Vec::new();
    }

    /// Number of limbs currently held.
    pub fn capacity(&self) -> usize {
        self.levels
            .iter()
            .map(|l| l.sx.len() + l.sy.len() + l.z.len())
            .sum()
    }

    fn levels(&mut self) -> &mut [Level] {
        if self.levels.len() < KARATSUBA_MAX_DEPTH {
            self.levels.resize_with(KARATSUBA_MAX_DEPTH, Level::default);
        }
        &mut self.levels
    }
}

thread_local! {
    static SCRATCH: RefCell<KaratsubaScratch> = RefCell::new(KaratsubaScratch::new());
}

/// `w := x * y` by schoolbook multiplication.
/// Requires `w.len() >= word_len(x) + word_len(y)`.
pub fn mul_naive(w: &mut [Word], x: &[Word], y: &[Word]) -> Result<()> {
    let xn = word_len(x);
    let yn = word_len(y);
    require("mul_naive", w.len(), xn + yn)?;
    set_zero(&mut w[xn + yn..]);
    mul_school(&mut w[..xn + yn], &x[..xn], &y[..yn]);
    Ok(())
}

/// `w := x^2` by schoolbook squaring. Requires `w.len() >= 2 * word_len(x)`.
pub fn square_naive(w: &mut [Word], x: &[Word]) -> Result<()> {
    let n = word_len(x);
    require("square_naive", w.len(), 2 * n)?;
    set_zero(&mut w[2 * n..]);
    square_school(&mut w[..2 * n], &x[..n]);
    Ok(())
}

/// `w := x * y`, using Karatsuba for large balanced operands and the
/// thread-local scratch.
pub fn mul(w: &mut [Word], x: &[Word], y: &[Word]) -> Result<()> {
    SCRATCH.with(|s| mul_with(w, x, y, &mut s.borrow_mut()))
}

/// `w := x^2` with the thread-local scratch.
pub fn square(w: &mut [Word], x: &[Word]) -> Result<()> {
    SCRATCH.with(|s| square_with(w, x, &mut s.borrow_mut()))
}

/// [`mul`] with an explicit scratch.
pub fn mul_with(
    w: &mut [Word],
    x: &[Word],
    y: &[Word],
    scratch: &mut KaratsubaScratch,
) -> Result<()> {
    let xn = word_len(x);
    let yn = word_len(y);
    require("mul", w.len(), xn + yn)?;
    set_zero(&mut w[xn + yn..]);
    let (x, y) = if xn >= yn {
        (&x[..xn], &y[..yn])
    } else {
        (&y[..yn], &x[..xn])
    };
    if y.is_empty() {
        set_zero(w);
        return Ok(());
    }
    mul_core(&mut w[..xn + yn], x, y, scratch.levels(), 0);
    Ok(())
}

/// [`square`] with an explicit scratch.
pub fn square_with(w: &mut [Word], x: &[Word], scratch: &mut KaratsubaScratch) -> Result<()> {
    let n = word_len(x);
    require("square", w.len(), 2 * n)?;
    set_zero(&mut w[2 * n..]);
    if n == 0 {
        return Ok(());
    }
    square_core(&mut w[..2 * n], &x[..n], scratch.levels(), 0);
    Ok(())
}

/// Multiplication for callers that sized `w` themselves.
pub(crate) fn mul_into(w: &mut [Word], x: &[Word], y: &[Word]) {
    let xn = word_len(x);
    let yn = word_len(y);
    debug_assert!(w.len() >= xn + yn);
    SCRATCH.with(|s| {
        let mut s = s.borrow_mut();
        if xn == 0 || yn == 0 {
            set_zero(w);
            return;
        }
        set_zero(&mut w[xn + yn..]);
        let (x, y) = if xn >= yn {
            (&x[..xn], &y[..yn])
        } else {
            (&y[..yn], &x[..xn])
        };
        mul_core(&mut w[..xn + yn], x, y, s.levels(), 0);
    })
}

pub(crate) fn square_into(w: &mut [Word], x: &[Word]) {
    let n = word_len(x);
    debug_assert!(w.len() >= 2 * n);
    SCRATCH.with(|s| {
        set_zero(&mut w[2 * n..]);
        if n > 0 {
            square_core(&mut w[..2 * n], &x[..n], s.borrow_mut().levels(), 0);
        }
    })
}

/// `w := x * y` with `w.len() == x.len() + y.len()` and `x.len() >= y.len()`.
fn mul_core(w: &mut [Word], x: &[Word], y: &[Word], levels: &mut [Level], depth: usize) {
    let n = x.len();
    let h = n.div_ceil(2);
    let balanced = (y.len() as f64) >= KARATSUBA_BALANCE * (n as f64);
    let Some((level, rest)) = levels.split_first_mut() else {
        return mul_school(w, x, y);
    };
    if y.len() < KARATSUBA_MUL_THRESHOLD || !balanced || y.len() <= h {
        return mul_school(w, x, y);
    }

    let (x0, x1) = x.split_at(h);
    let (y0, y1) = y.split_at(h);
    {
        let (lo, hi) = w.split_at_mut(2 * h);
        mul_core(lo, x0, y0, rest, depth + 1);
        mul_core(hi, x1, y1, rest, depth + 1);
    }

    level.reserve(h, depth);
    let Level { sx, sy, z } = level;
    let (sx, sy, z) = (&mut sx[..h + 1], &mut sy[..h + 1], &mut z[..2 * h + 2]);
    half_sum(sx, x0, x1);
    half_sum(sy, y0, y1);
    mul_core(z, sx, sy, rest, depth + 1);

    // z1 = (x0 + x1)(y0 + y1) - z0 - z2
    sub_from(z, &w[..2 * h]);
    sub_from(z, &w[2 * h..]);
    let zn = word_len(z);
    add_to(&mut w[h..], &z[..zn]);
}

/// `w := x^2` with `w.len() == 2 * x.len()`.
fn square_core(w: &mut [Word], x: &[Word], levels: &mut [Level], depth: usize) {
    let n = x.len();
    let Some((level, rest)) = levels.split_first_mut() else {
        return square_school(w, x);
    };
    if n < KARATSUBA_SQR_THRESHOLD {
        return square_school(w, x);
    }

    let h = n.div_ceil(2);
    let (x0, x1) = x.split_at(h);
    {
        let (lo, hi) = w.split_at_mut(2 * h);
        square_core(lo, x0, rest, depth + 1);
        square_core(hi, x1, rest, depth + 1);
    }

    level.reserve(h, depth);
    let Level { sx, z, .. } = level;
    let (sx, z) = (&mut sx[..h + 1], &mut z[..2 * h + 2]);
    half_sum(sx, x0, x1);
    square_core(z, sx, rest, depth + 1);

    sub_from(z, &w[..2 * h]);
    sub_from(z, &w[2 * h..]);
    let zn = word_len(z);
    add_to(&mut w[h..], &z[..zn]);
}

/// `s := lo + hi` where `s.len() == lo.len() + 1 >= hi.len() + 1`.
fn half_sum(s: &mut [Word], lo: &[Word], hi: &[Word]) {
    let h = lo.len();
    s[..h].copy_from_slice(lo);
    s[h] = 0;
    add_to(s, hi);
}

/// `w := x * y` with `w.len() == x.len() + y.len()`.
fn mul_school(w: &mut [Word], x: &[Word], y: &[Word]) {
    set_zero(w);
    let xn = x.len();
    for (i, &yi) in y.iter().enumerate() {
        w[i + xn] = addmul_1(&mut w[i..i + xn], x, yi);
    }
}

/// `w := x^2` with `w.len() == 2 * x.len()`.
///
/// Cross products are summed once, doubled by a shift, then the diagonal
/// squares are added.
fn square_school(w: &mut [Word], x: &[Word]) {
    set_zero(w);
    let n = x.len();
    if n == 0 {
        return;
    }
    for i in 0..n {
        w[i + n] = addmul_1(&mut w[2 * i + 1..i + n], &x[i + 1..], x[i]);
    }
    shl_assign(w, 1);
    let mut carry = 0;
    for (i, &xi) in x.iter().enumerate() {
        let p = (xi as u128) * (xi as u128);
        let (lo, c) = adc(w[2 * i], p as Word, carry);
        w[2 * i] = lo;
        let (hi, c) = adc(w[2 * i + 1], (p >> 64) as Word, c);
        w[2 * i + 1] = hi;
        carry = c;
    }
    debug_assert_eq!(carry, 0);
}
