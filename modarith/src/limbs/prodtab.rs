//! Simultaneous multi-exponentiation over a table of subset products.

use log::debug;

use super::{Divisor, Reducer, Word, bit, bit_len, copy};
use crate::error::{ArithError, Result, require};

/// Largest number of bases a [`ProdTable`] accepts.
pub const MAX_PROD_WIDTH: usize = 16;

/// All `2^k` products of subsets of `k` bases modulo `m`.
///
/// Entry `mask` holds the product of the bases whose index bit is set in
/// `mask`; entry 0 is `1 mod m`.
#[derive(Clone, Debug)]
pub struct ProdTable {
    divisor: Divisor,
    width: usize,
    entries: Vec<Word>,
}

impl ProdTable {
    /// Fails with [`ArithError::InvalidWidth`] unless `1 <= bases.len() <= 16`
    /// and with [`ArithError::DivisionByZero`] for `m = 0`.
    pub fn new<B: AsRef<[Word]>>(bases: &[B], m: &[Word]) -> Result<Self> {
        let width = bases.len();
        if width == 0 || width > MAX_PROD_WIDTH {
            return Err(ArithError::InvalidWidth(width));
        }
        let divisor = Divisor::new(m)?;
        let n = divisor.size();
        let reduced = bases
            .iter()
            .map(|b| divisor.residue(b.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut r = Reducer::new(&divisor);
        let mut entries = vec![0; n << width];
        entries[..n].copy_from_slice(&r.one());
        for mask in 1usize..1 << width {
            let low = mask.trailing_zeros() as usize;
            let prev = (mask & (mask - 1)) * n;
            let mut entry = entries[prev..prev + n].to_vec();
            r.mul_assign(&mut entry, &reduced[low])?;
            entries[mask * n..(mask + 1) * n].copy_from_slice(&entry);
        }

        debug!(
            "built product table of {} entries for a {}-bit modulus",
            1usize << width,
            bit_len(divisor.words())
        );
        Ok(Self {
            divisor,
            width,
            entries,
        })
    }

    /// Number of bases.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn modulus(&self) -> &[Word] {
        self.divisor.words()
    }

    /// Product of the bases selected by `mask`.
    #[inline]
    pub fn entry(&self, mask: usize) -> &[Word] {
        let n = self.divisor.size();
        &self.entries[mask * n..(mask + 1) * n]
    }
}

/// `w := prod_i b_i^(e_i) mod m` over the bases of `table`.
///
/// One left-to-right pass squares once per bit position and multiplies by
/// the table entry selected by that bit of every exponent. Fails with
/// [`ArithError::InvalidWidth`] when the number of exponents differs from
/// the table width; `w` needs `word_len(m)` limbs.
pub fn modpowprod<E: AsRef<[Word]>>(w: &mut [Word], table: &ProdTable, exps: &[E]) -> Result<()> {
    if exps.len() != table.width {
        return Err(ArithError::InvalidWidth(exps.len()));
    }
    require("modpowprod", w.len(), table.divisor.size())?;

    let bits = exps.iter().map(|e| bit_len(e.as_ref())).max().unwrap_or(0);
    let mut r = Reducer::new(&table.divisor);
    let mut acc = table.entry(0).to_vec();
    for i in (0..bits).rev() {
        r.square_assign(&mut acc)?;
        let mask = exps
            .iter()
            .enumerate()
            .filter(|(_, e)| bit(e.as_ref(), i))
            .fold(0usize, |m, (j, _)| m | 1 << j);
        if mask != 0 {
            r.mul_assign(&mut acc, table.entry(mask))?;
        }
    }
    copy(w, &acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limbs::modpow;

    #[test]
    fn test_entries() {
        let table = ProdTable::new(&[[2u64], [3], [5]], &[1000]).unwrap();
        assert_eq!(table.width(), 3);
        assert_eq!(table.entry(0), &[1]);
        assert_eq!(table.entry(0b001), &[2]);
        assert_eq!(table.entry(0b110), &[15]);
        assert_eq!(table.entry(0b111), &[30]);
    }

    #[test]
    fn test_matches_product_of_powers() {
        let m = [0xFFFF_FFFF_FFFF_FFC5, 0x1234];
        let bases: Vec<Vec<Word>> = vec![vec![7, 1], vec![11], vec![0xABCDEF, 0x99], vec![3]];
        let exps: Vec<Vec<Word>> = vec![vec![1000], vec![0], vec![Word::MAX, 5], vec![77]];
        let table = ProdTable::new(&bases, &m).unwrap();
        let mut got = [0; 2];
        modpowprod(&mut got, &table, &exps).unwrap();

        let mut expected = vec![1, 0];
        let d = Divisor::new(&m).unwrap();
        let mut r = Reducer::new(&d);
        for (b, e) in bases.iter().zip(&exps) {
            let mut p = [0; 2];
            modpow(&mut p, b, e, &m).unwrap();
            r.mul_assign(&mut expected, &p).unwrap();
        }
        assert_eq!(got.to_vec(), expected);
    }

    #[test]
    fn test_invalid_widths() {
        let none: [[Word; 1]; 0] = [];
        assert_eq!(ProdTable::new(&none, &[7]).unwrap_err(), ArithError::InvalidWidth(0));
        let many = vec![[2u64]; 17];
        assert_eq!(ProdTable::new(&many, &[7]).unwrap_err(), ArithError::InvalidWidth(17));

        let table = ProdTable::new(&[[2u64], [3]], &[7]).unwrap();
        let mut w = [0; 1];
        assert_eq!(
            modpowprod(&mut w, &table, &[[1u64]]),
            Err(ArithError::InvalidWidth(1))
        );
    }

    #[test]
    fn test_zero_base() {
        // 14 = 0 mod 7
        let table = ProdTable::new(&[vec![0u64], vec![3], vec![14]], &[7]).unwrap();
        assert_eq!(table.entry(0b001), &[0]);
        assert_eq!(table.entry(0b010), &[3]);
        assert_eq!(table.entry(0b011), &[0]);
        assert_eq!(table.entry(0b110), &[0]);

        let mut w = [5; 1];
        modpowprod(&mut w, &table, &[vec![1u64], vec![1], vec![0]]).unwrap();
        assert_eq!(w, [0]);
        modpowprod(&mut w, &table, &[vec![0u64], vec![2], vec![0]]).unwrap();
        assert_eq!(w, [2]);
        modpowprod(&mut w, &table, &[vec![0u64], vec![1], vec![3]]).unwrap();
        assert_eq!(w, [0]);
    }

    #[test]
    fn test_zero_exponents_and_unit_modulus() {
        let table = ProdTable::new(&[[2u64], [3]], &[7]).unwrap();
        let mut w = [5; 1];
        modpowprod(&mut w, &table, &[[0u64], [0]]).unwrap();
        assert_eq!(w, [1]);

        let table = ProdTable::new(&[[2u64], [3]], &[1]).unwrap();
        modpowprod(&mut w, &table, &[[4u64], [9]]).unwrap();
        assert_eq!(w, [0]);
    }
}
