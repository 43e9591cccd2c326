//! # Token Basket
//!
//! The five balances a vault holds, always all present (zero-initialized)
//! so that iteration order and serialized shape never depend on which
//! tokens happen to have been touched. Backed by a `BTreeMap` for a
//! deterministic encoding: the state digest hashes this map byte for byte.
//!
//! The basket enforces the one invariant that matters at this level:
//! balances never go negative. Everything else (who may debit, when, at
//! what penalty) is decided by the lifecycle modules above it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::token::TokenSymbol;
use crate::amount::{ArithmeticError, FixedPoint};
use crate::error::{EngineResult, ValidationError};

/// Per-token balances of one vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<TokenSymbol, FixedPoint>", into = "BTreeMap<TokenSymbol, FixedPoint>")]
pub struct TokenBasket {
    balances: BTreeMap<TokenSymbol, FixedPoint>,
}

impl TokenBasket {
    /// An all-zero basket.
    pub fn new() -> Self {
        Self {
            balances: TokenSymbol::ALL
                .into_iter()
                .map(|t| (t, FixedPoint::ZERO))
                .collect(),
        }
    }

    /// Current balance of `token`.
    pub fn balance(&self, token: TokenSymbol) -> FixedPoint {
        self.balances.get(&token).copied().unwrap_or_default()
    }

    /// Adds `amount` to `token`, returning the new balance.
    pub fn credit(
        &mut self,
        token: TokenSymbol,
        amount: FixedPoint,
    ) -> Result<FixedPoint, ArithmeticError> {
        let updated = self.balance(token).checked_add(amount)?;
        self.balances.insert(token, updated);
        Ok(updated)
    }

    /// Subtracts `amount` from `token`, returning the new balance.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InsufficientBalance`] if the balance is too small.
    /// The basket is left untouched.
    pub fn debit(&mut self, token: TokenSymbol, amount: FixedPoint) -> EngineResult<FixedPoint> {
        let available = self.balance(token);
        if available < amount {
            return Err(ValidationError::InsufficientBalance {
                token,
                available,
                requested: amount,
            }
            .into());
        }
        let updated = available.checked_sub(amount)?;
        self.balances.insert(token, updated);
        Ok(updated)
    }

    /// Σ balance(token) × rate(token), each term floored separately.
    pub fn vet_equivalent(&self) -> Result<FixedPoint, ArithmeticError> {
        self.balances
            .iter()
            .try_fold(FixedPoint::ZERO, |acc, (token, amount)| {
                acc.checked_add(token.vet_rate().to_vet(*amount)?)
            })
    }

    /// All balances in canonical token order, zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (TokenSymbol, FixedPoint)> + '_ {
        self.balances.iter().map(|(t, a)| (*t, *a))
    }

    /// Only the tokens with a positive balance.
    pub fn non_zero(&self) -> Vec<(TokenSymbol, FixedPoint)> {
        self.iter().filter(|(_, a)| !a.is_zero()).collect()
    }

    /// `true` when every balance is zero.
    pub fn is_empty(&self) -> bool {
        self.balances.values().all(|a| a.is_zero())
    }
}

impl Default for TokenBasket {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<TokenSymbol, FixedPoint>> for TokenBasket {
    /// Missing tokens are filled with zero so the five-key invariant holds
    /// for snapshots written by older or sparser encoders.
    fn from(map: BTreeMap<TokenSymbol, FixedPoint>) -> Self {
        let mut basket = Self::new();
        basket.balances.extend(map);
        basket
    }
}

impl From<TokenBasket> for BTreeMap<TokenSymbol, FixedPoint> {
    fn from(basket: TokenBasket) -> Self {
        basket.balances
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::tokens;
    use crate::error::EngineError;

    #[test]
    fn new_basket_has_all_tokens_at_zero() {
        let basket = TokenBasket::new();
        assert_eq!(basket.iter().count(), 5);
        assert!(basket.is_empty());
        assert_eq!(basket.vet_equivalent().unwrap(), FixedPoint::ZERO);
    }

    #[test]
    fn credit_accumulates() {
        let mut basket = TokenBasket::new();
        basket.credit(TokenSymbol::Vet, tokens(500)).unwrap();
        let after = basket.credit(TokenSymbol::Vet, tokens(300)).unwrap();
        assert_eq!(after, tokens(800));
        assert_eq!(basket.balance(TokenSymbol::Vet), tokens(800));
    }

    #[test]
    fn debit_insufficient_leaves_balance() {
        let mut basket = TokenBasket::new();
        basket.credit(TokenSymbol::Glo, tokens(100)).unwrap();
        let err = basket.debit(TokenSymbol::Glo, tokens(200)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::InsufficientBalance { .. })
        ));
        assert_eq!(basket.balance(TokenSymbol::Glo), tokens(100));
    }

    #[test]
    fn vet_equivalent_mixes_rates() {
        let mut basket = TokenBasket::new();
        basket.credit(TokenSymbol::Vet, tokens(1_000)).unwrap();
        basket.credit(TokenSymbol::Vtho, tokens(20_000)).unwrap(); // 2
        basket.credit(TokenSymbol::B3tr, tokens(3_000)).unwrap(); // 3
        basket.credit(TokenSymbol::Obol, tokens(400)).unwrap(); // 4
        basket.credit(TokenSymbol::Glo, tokens(5)).unwrap(); // 5
        assert_eq!(basket.vet_equivalent().unwrap(), tokens(1_014));
    }

    #[test]
    fn non_zero_filters() {
        let mut basket = TokenBasket::new();
        basket.credit(TokenSymbol::B3tr, tokens(1)).unwrap();
        assert_eq!(basket.non_zero(), vec![(TokenSymbol::B3tr, tokens(1))]);
    }

    #[test]
    fn sparse_json_is_completed() {
        let basket: TokenBasket = serde_json::from_str(r#"{"VET":"12.5"}"#).unwrap();
        assert_eq!(basket.iter().count(), 5);
        assert_eq!(basket.balance(TokenSymbol::Vet).to_string(), "12.5");
        assert_eq!(basket.balance(TokenSymbol::Obol), FixedPoint::ZERO);
    }
}
