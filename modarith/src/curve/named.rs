//! Standard curves and serializable curve parameters.

use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{EcCurve, JPoint};
use crate::error::{ArithError, Result};
use crate::integer::LargeInteger;

/// Domain parameters of a prime-field curve with a base point.
///
/// Every number is serialized as a hex string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveParams {
    pub name: String,
    pub p: LargeInteger,
    pub a: LargeInteger,
    pub b: LargeInteger,
    pub gx: LargeInteger,
    pub gy: LargeInteger,
    /// Order of the base point.
    pub n: LargeInteger,
}

impl CurveParams {
    /// Builds the curve and its base point, checking both.
    pub fn build(&self) -> Result<NamedCurve> {
        let curve = EcCurve::new(&self.p, &self.a, &self.b)?;
        let generator = curve.point(&self.gx, &self.gy)?;
        Ok(NamedCurve {
            curve,
            generator,
            params: self.clone(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ArithError::Json(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ArithError::Json(e.to_string()))
    }
}

/// A ready-to-use curve with its base point.
#[derive(Clone, Debug)]
pub struct NamedCurve {
    pub curve: EcCurve,
    pub generator: JPoint,
    pub params: CurveParams,
}

impl NamedCurve {
    #[inline]
    pub fn order(&self) -> &LargeInteger {
        &self.params.n
    }
}

struct RawParams {
    name: &'static str,
    p: &'static str,
    a: &'static str,
    b: &'static str,
    gx: &'static str,
    gy: &'static str,
    n: &'static str,
}

static CURVES: [RawParams; 3] = [
    RawParams {
        name: "secp192r1",
        p: "fffffffffffffffffffffffffffffffeffffffffffffffff",
        a: "fffffffffffffffffffffffffffffffefffffffffffffffc",
        b: "64210519e59c80e70fa7e9ab72243049feb8deecc146b9b1",
        gx: "188da80eb03090f67cbf20eb43a18800f4ff0afd82ff1012",
        gy: "07192b95ffc8da78631011ed6b24cdd573f977a11e794811",
        n: "ffffffffffffffffffffffff99def836146bc9b1b4d22831",
    },
    RawParams {
        name: "secp256r1",
        p: "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
        a: "ffffffff00000001000000000000000000000000fffffffffffffffffffffffc",
        b: "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
        gx: "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296",
        gy: "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5",
        n: "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
    },
    RawParams {
        name: "secp256k1",
        p: "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f",
        a: "00",
        b: "07",
        gx: "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        gy: "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
        n: "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
    },
];

/// Lookup key (lowercase) to index into `CURVES`.
static ALIASES: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    HashMap::from([
        ("secp192r1", 0),
        ("p192", 0),
        ("p-192", 0),
        ("prime192v1", 0),
        ("secp256r1", 1),
        ("p256", 1),
        ("p-256", 1),
        ("prime256v1", 1),
        ("secp256k1", 2),
    ])
});

/// Canonical names of the built-in curves.
pub fn names() -> impl Iterator<Item = &'static str> {
    CURVES.iter().map(|c| c.name)
}

/// Parameters of a built-in curve, looked up case-insensitively by
/// canonical name or alias (`"P-256"`, `"prime256v1"`, ...).
pub fn params(name: &str) -> Result<CurveParams> {
    let key = name.trim().to_ascii_lowercase();
    let raw = ALIASES
        .get(key.as_str())
        .map(|&i| &CURVES[i])
        .ok_or_else(|| ArithError::UnknownCurve(name.to_string()))?;
    debug!("curve {name:?} resolved to {}", raw.name);
    Ok(CurveParams {
        name: raw.name.to_string(),
        p: LargeInteger::from_hex(raw.p)?,
        a: LargeInteger::from_hex(raw.a)?,
        b: LargeInteger::from_hex(raw.b)?,
        gx: LargeInteger::from_hex(raw.gx)?,
        gy: LargeInteger::from_hex(raw.gy)?,
        n: LargeInteger::from_hex(raw.n)?,
    })
}

/// Built-in curve with its base point.
pub fn named_curve(name: &str) -> Result<NamedCurve> {
    params(name)?.build()
}
