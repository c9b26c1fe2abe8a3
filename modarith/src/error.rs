//! Error types shared by every layer of the crate.

use thiserror::Error;

/// A word buffer shorter than the operation's contract requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{op}: buffer has {actual} limbs, needs at least {required}")]
pub struct LengthError {
    pub op: &'static str,
    pub required: usize,
    pub actual: usize,
}

/// Errors from integer and curve arithmetic.
///
/// All of these are precondition failures: the inputs are outside the
/// domain of the operation. Numeric edge cases with a defined value
/// (for example `b^0 mod m`) are never reported as errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArithError {
    #[error(transparent)]
    Length(#[from] LengthError),
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulus must be positive")]
    NonPositiveModulus,
    #[error("Montgomery arithmetic requires an odd modulus")]
    EvenModulus,
    #[error("exponent must be non-negative")]
    NegativeExponent,
    #[error("value is not invertible modulo the modulus")]
    NotInvertible,
    #[error("value is a quadratic non-residue")]
    NonResidue,
    #[error("invalid hex string: {0:?}")]
    InvalidHex(String),
    #[error("invalid bit range [{from}, {to})")]
    InvalidBitRange { from: usize, to: usize },
    #[error("invalid table width {0}")]
    InvalidWidth(usize),
    #[error("curve is singular (discriminant is zero)")]
    SingularCurve,
    #[error("invalid curve parameters: {0}")]
    InvalidCurve(&'static str),
    #[error("point is not on the curve")]
    PointNotOnCurve,
    #[error("unknown curve {0:?}")]
    UnknownCurve(String),
    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, ArithError>;

/// Fails with a [`LengthError`] unless `actual >= required`.
#[inline]
pub(crate) fn require(op: &'static str, actual: usize, required: usize) -> Result<()> {
    if actual < required {
        return Err(LengthError {
            op,
            required,
            actual,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(require("add", 3, 3).is_ok());
        let err = require("add", 2, 3).unwrap_err();
        assert_eq!(
            err,
            ArithError::Length(LengthError {
                op: "add",
                required: 3,
                actual: 2
            })
        );
        assert_eq!(err.to_string(), "add: buffer has 2 limbs, needs at least 3");
    }
}
