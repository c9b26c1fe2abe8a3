//! Modular Arithmetic Core
//!
//! Multi-precision modular arithmetic and elliptic-curve point arithmetic
//! over prime fields, as needed by El Gamal style cryptosystems.
//!
//! The crate is layered bottom-up: [`limbs`] works on raw little-endian
//! word slices, [`signed`] and [`integer`] add signs and owned values, and
//! [`curve`] builds Jacobian point arithmetic on top.

/// Error taxonomy and the crate `Result` alias
pub mod error;
/// Word-vector engine: unsigned arithmetic on limb slices
pub mod limbs;
/// Signed integers over fixed-capacity buffers
pub mod signed;
/// Owned signed big integers and number theory
pub mod integer;
/// Fixed-base exponentiation
pub mod fixed_base;
/// Elliptic curves over prime fields in Jacobian coordinates
pub mod curve;

pub use curve::named::{named_curve, names, params};
pub use curve::{CurveParams, Doubling, EcCurve, JPoint, NamedCurve};
pub use error::{ArithError, LengthError, Result};
pub use fixed_base::{FixModPow, fixed_base_cost, optimal_width};
pub use integer::{LargeInteger, ModPowAlgorithm};
pub use signed::Sli;
