//! # Supported Tokens
//!
//! A vault holds exactly five assets. Each one converts to VET-equivalent
//! units at a fixed, compiled-in rate:
//!
//! | Token | Rate to VET | Notes                                     |
//! |-------|-------------|-------------------------------------------|
//! | VET   | 1           | Base asset                                |
//! | VTHO  | 0.0001      | Gas token                                 |
//! | B3TR  | 0.001       | Carbon/legacy bonus token                 |
//! | OBOL  | 0.01        | Reward token, only locked OBOL is counted |
//! | GLO   | 1           | Stable unit, pegged 1:1 for aggregation   |
//!
//! Rates are exact rationals so VET-equivalent sums never round through
//! a decimal approximation. A live price feed would be a policy change
//! and belongs in a separate, explicitly named rate source.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::amount::{ArithmeticError, FixedPoint};
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// ConversionRate
// ---------------------------------------------------------------------------

/// An exact `numerator / denominator` conversion factor to VET.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConversionRate {
    pub numerator: u128,
    pub denominator: u128,
}

impl ConversionRate {
    pub const fn new(numerator: u128, denominator: u128) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Converts a token amount into VET-equivalent base units (floored).
    pub fn to_vet(self, amount: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
        amount.mul_ratio(self.numerator, self.denominator)
    }
}

// ---------------------------------------------------------------------------
// TokenSymbol
// ---------------------------------------------------------------------------

/// One of the five assets a vault can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenSymbol {
    Vet,
    Vtho,
    B3tr,
    Obol,
    Glo,
}

impl TokenSymbol {
    /// Every supported token, in canonical order.
    pub const ALL: [TokenSymbol; 5] = [
        TokenSymbol::Vet,
        TokenSymbol::Vtho,
        TokenSymbol::B3tr,
        TokenSymbol::Obol,
        TokenSymbol::Glo,
    ];

    /// Fixed conversion rate to VET-equivalent units.
    pub const fn vet_rate(self) -> ConversionRate {
        match self {
            TokenSymbol::Vet => ConversionRate::new(1, 1),
            TokenSymbol::Vtho => ConversionRate::new(1, 10_000),
            TokenSymbol::B3tr => ConversionRate::new(1, 1_000),
            TokenSymbol::Obol => ConversionRate::new(1, 100),
            TokenSymbol::Glo => ConversionRate::new(1, 1),
        }
    }

    /// Ticker as shown to users.
    pub const fn as_str(self) -> &'static str {
        match self {
            TokenSymbol::Vet => "VET",
            TokenSymbol::Vtho => "VTHO",
            TokenSymbol::B3tr => "B3TR",
            TokenSymbol::Obol => "OBOL",
            TokenSymbol::Glo => "GLO",
        }
    }

    /// Whether owners may deposit this token straight into the basket.
    ///
    /// OBOL only enters through `lock_for_inheritance`.
    pub const fn is_depositable(self) -> bool {
        !matches!(self, TokenSymbol::Obol)
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenSymbol {
    type Err = ValidationError;

    /// Case-insensitive ticker lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        TokenSymbol::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| ValidationError::UnknownToken(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
