//! Unsigned integer used for every id, time and amount
//!
//! Values are arbitrary precision: nothing wraps the way 64-bit arithmetic
//! would at the unbounded sentinel, and amounts far beyond it still parse.
//! Only subtraction can fail.

use crate::errors::{BadgesError, Result};
use num_bigint::BigUint;
use num_traits::{CheckedSub, One, Zero};
use once_cell::sync::Lazy;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unsigned integer shared by ranges, timelines and balances.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uint(BigUint);

/// The unbounded sentinel, identical to the chain's `math.MaxUint64`.
pub static MAX_UINT_64: Lazy<Uint> = Lazy::new(|| Uint::from(u64::MAX));

impl Uint {
    /// Zero
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// One, the first valid id or time
    pub fn one() -> Self {
        Self(BigUint::one())
    }

    /// Underlying big integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Checked subtraction.
    pub fn checked_sub(&self, rhs: &Uint) -> Option<Uint> {
        self.0.checked_sub(&rhs.0).map(Uint)
    }

    /// Checked subtraction reported as an input error.
    pub fn try_sub(&self, rhs: &Uint) -> Result<Uint> {
        self.checked_sub(rhs)
            .ok_or_else(|| BadgesError::invalid(format!("underflow subtracting {rhs} from {self}")))
    }

    /// Next value.
    pub fn successor(&self) -> Uint {
        Self(&self.0 + BigUint::one())
    }

    /// Previous value, `None` at zero.
    pub fn predecessor(&self) -> Option<Uint> {
        self.checked_sub(&Uint::one())
    }

    /// True for zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl std::ops::Add<&Uint> for &Uint {
    type Output = Uint;

    fn add(self, rhs: &Uint) -> Uint {
        Uint(&self.0 + &rhs.0)
    }
}

impl From<BigUint> for Uint {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Uint {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u32> for Uint {
    fn from(value: u32) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Uint {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for Uint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uint {
    type Err = BadgesError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BadgesError::invalid(format!("not an unsigned integer: {s:?}")));
        }
        BigUint::parse_bytes(trimmed.as_bytes(), 10)
            .map(Uint)
            .ok_or_else(|| BadgesError::invalid(format!("not an unsigned integer: {s:?}")))
    }
}

impl Serialize for Uint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

struct UintVisitor;

impl<'de> Visitor<'de> for UintVisitor {
    type Value = Uint;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Uint, E> {
        Ok(Uint::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<Uint, E> {
        Ok(Uint::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Uint, E> {
        u64::try_from(v)
            .map(Uint::from)
            .map_err(|_| E::custom(format!("negative value {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Uint, E> {
        v.parse::<Uint>().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Uint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(UintVisitor)
    }
}
