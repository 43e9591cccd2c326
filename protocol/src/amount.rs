//! # Fixed-Point Amounts
//!
//! Every quantity the engine touches (token balances, fees, penalties,
//! rewards, bonuses) is a [`FixedPoint`]: an unsigned integer count of
//! base units, where one whole token is 10^18 base units. There is no
//! floating point anywhere in the arithmetic path. Fractions like 0.5%
//! or 90% are applied as exact integer ratios and floored.
//!
//! Overflow and negative results fail fast with an [`ArithmeticError`].
//! Nothing wraps, nothing saturates silently, nothing is truncated.
//!
//! ## Serialization
//!
//! Human-readable formats (JSON) carry the decimal string (`"1000.5"`)
//! so that values survive JavaScript's `Number` without losing digits.
//! Binary formats (bincode) carry the raw `u128`. Both round-trip exactly.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::config::{BASE_UNITS_PER_TOKEN, BPS_DENOMINATOR, DECIMALS};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of fixed-point parsing and arithmetic.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    /// The input string was empty or whitespace.
    #[error("empty amount")]
    Empty,

    /// A leading minus sign. Balances are never negative.
    #[error("negative amount not representable: {0}")]
    Negative(String),

    /// Anything that isn't `digits[.digits]`.
    #[error("malformed amount: {0:?}")]
    Malformed(String),

    /// More fractional digits than the representation holds.
    #[error("amount {input:?} has more than {max} fractional digits")]
    TooPrecise {
        /// The offending input.
        input: String,
        /// Maximum fractional digits (18).
        max: u32,
    },

    /// The result does not fit in 128 bits of base units.
    #[error("amount overflow")]
    Overflow,

    /// A subtraction would go below zero.
    #[error("underflow: {minuend} - {subtrahend} is negative")]
    Underflow {
        /// Left-hand operand.
        minuend: FixedPoint,
        /// Right-hand operand.
        subtrahend: FixedPoint,
    },

    /// A ratio with a zero denominator.
    #[error("division by zero")]
    DivisionByZero,
}

// ---------------------------------------------------------------------------
// FixedPoint
// ---------------------------------------------------------------------------

/// An immutable, non-negative quantity in base units (18 implied decimals).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedPoint(u128);

impl FixedPoint {
    /// Zero base units.
    pub const ZERO: FixedPoint = FixedPoint(0);

    /// Wraps a raw base-unit count.
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Creates an amount of `whole` tokens.
    pub fn from_whole(whole: u128) -> Result<Self, ArithmeticError> {
        whole
            .checked_mul(BASE_UNITS_PER_TOKEN)
            .map(Self)
            .ok_or(ArithmeticError::Overflow)
    }

    /// Raw base units.
    pub const fn base_units(self) -> u128 {
        self.0
    }

    /// Whole tokens, fractional part discarded.
    pub const fn whole_units(self) -> u128 {
        self.0 / BASE_UNITS_PER_TOKEN
    }

    /// `true` for exactly zero base units.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parses a decimal string such as `"1000"`, `"0.5"` or `"12.000000000000000001"`.
    ///
    /// Rejects signs, exponents, separators, and more than 18 fractional
    /// digits rather than rounding them away.
    pub fn parse(input: &str) -> Result<Self, ArithmeticError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ArithmeticError::Empty);
        }
        if s.starts_with('-') {
            return Err(ArithmeticError::Negative(s.to_string()));
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ArithmeticError::Malformed(s.to_string()));
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(ArithmeticError::Malformed(s.to_string()));
        }
        if frac_part.len() > DECIMALS as usize {
            return Err(ArithmeticError::TooPrecise {
                input: s.to_string(),
                max: DECIMALS,
            });
        }

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| ArithmeticError::Overflow)?
        };

        let mut frac: u128 = 0;
        if !frac_part.is_empty() {
            // Digits are validated and at most 18 long, so this fits.
            frac = frac_part
                .parse()
                .map_err(|_| ArithmeticError::Malformed(s.to_string()))?;
            frac *= 10u128.pow(DECIMALS - frac_part.len() as u32);
        }

        Self::from_whole(whole)?.checked_add(Self(frac))
    }

    /// Sum, or `Overflow` past `u128::MAX` base units.
    pub fn checked_add(self, rhs: Self) -> Result<Self, ArithmeticError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(ArithmeticError::Overflow)
    }

    /// Difference, or `Underflow` when `rhs` is larger.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, ArithmeticError> {
        self.0.checked_sub(rhs.0).map(Self).ok_or(ArithmeticError::Underflow {
            minuend: self,
            subtrahend: rhs,
        })
    }

    /// Multiplies by an integer.
    pub fn checked_mul_int(self, factor: u128) -> Result<Self, ArithmeticError> {
        self.0
            .checked_mul(factor)
            .map(Self)
            .ok_or(ArithmeticError::Overflow)
    }

    /// Computes `floor(self × numerator / denominator)` without a 256-bit
    /// intermediate.
    ///
    /// Splits `self` into quotient and remainder by `denominator` so that
    /// only `quotient × numerator` and `remainder × numerator` are formed.
    /// The result is exact (floored), not approximate.
    pub fn mul_ratio(self, numerator: u128, denominator: u128) -> Result<Self, ArithmeticError> {
        if denominator == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }
        let q = self.0 / denominator;
        let r = self.0 % denominator;

        let high = q.checked_mul(numerator).ok_or(ArithmeticError::Overflow)?;
        let low = r.checked_mul(numerator).ok_or(ArithmeticError::Overflow)? / denominator;

        high.checked_add(low).map(Self).ok_or(ArithmeticError::Overflow)
    }

    /// Applies a basis-point rate: `floor(self × bps / 10_000)`.
    pub fn percentage_bps(self, bps: u32) -> Result<Self, ArithmeticError> {
        self.mul_ratio(bps as u128, BPS_DENOMINATOR)
    }

    /// Smaller of two amounts.
    pub fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / BASE_UNITS_PER_TOKEN;
        let frac = self.0 % BASE_UNITS_PER_TOKEN;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0width$}", frac, width = DECIMALS as usize);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint({})", self)
    }
}

impl FromStr for FixedPoint {
    type Err = ArithmeticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FixedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_u128(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for FixedPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FixedPointVisitor;

        impl<'de> Visitor<'de> for FixedPointVisitor {
            type Value = FixedPoint;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal amount string or base-unit integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FixedPoint, E> {
                FixedPoint::parse(v).map_err(E::custom)
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<FixedPoint, E> {
                Ok(FixedPoint(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FixedPoint, E> {
                Ok(FixedPoint(v as u128))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(FixedPointVisitor)
        } else {
            deserializer.deserialize_u128(FixedPointVisitor)
        }
    }
}

/// Shorthand for whole-token amounts in tests and fixtures.
///
/// Panics on overflow, so keep it out of engine paths.
#[cfg(test)]
pub(crate) fn tokens(whole: u128) -> FixedPoint {
    FixedPoint::from_whole(whole).expect("test amount fits")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
