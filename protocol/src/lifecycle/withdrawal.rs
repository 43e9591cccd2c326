//! Owner withdrawals from the basket, gated by the time lock.
//!
//! Emergency and full withdrawals empty the basket. A partial withdrawal
//! takes the same fraction (at most 30%) of every token. Penalties are
//! taken per token and floored, and the receipt reports each token as well
//! as the VET-equivalent totals.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::timelock::{evaluate, WithdrawalTier};
use crate::amount::FixedPoint;
use crate::config::PARTIAL_WITHDRAWAL_MAX_BPS;
use crate::error::{EngineResult, PolicyViolation, ValidationError};
use crate::vault::{TokenSymbol, VaultAccount};

/// What the owner asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WithdrawalKind {
    Emergency,
    Partial { fraction_bps: u32 },
    Full,
}

impl WithdrawalKind {
    pub fn tier(self) -> WithdrawalTier {
        match self {
            WithdrawalKind::Emergency => WithdrawalTier::Emergency,
            WithdrawalKind::Partial { .. } => WithdrawalTier::Partial,
            WithdrawalKind::Full => WithdrawalTier::Full,
        }
    }

    fn validate(self) -> EngineResult<()> {
        if let WithdrawalKind::Partial { fraction_bps } = self {
            if fraction_bps == 0 {
                return Err(ValidationError::ZeroAmount.into());
            }
            if fraction_bps > PARTIAL_WITHDRAWAL_MAX_BPS {
                return Err(ValidationError::PartialLimitExceeded {
                    requested_bps: fraction_bps,
                    max_bps: PARTIAL_WITHDRAWAL_MAX_BPS,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// One token's share of a withdrawal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayout {
    pub token: TokenSymbol,
    pub gross: FixedPoint,
    pub penalty: FixedPoint,
    pub net: FixedPoint,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    pub kind: WithdrawalKind,
    pub tier: WithdrawalTier,
    pub penalty_bps: u32,
    pub executed_at: u64,
    pub payouts: Vec<TokenPayout>,
    pub gross_vet: FixedPoint,
    pub penalty_vet: FixedPoint,
    pub net_vet: FixedPoint,
}

impl VaultAccount {
    /// Withdraws from the basket under the given tier.
    ///
    /// # Errors
    ///
    /// - `AlreadyDeceased` once the vault is settled.
    /// - `NotYetEligible` before the tier's unlock age.
    /// - `PartialLimitExceeded` for a partial fraction above 30%.
    /// - `ZeroAmount` when nothing would be withdrawn.
    pub fn request_withdrawal(
        &self,
        kind: WithdrawalKind,
        now: u64,
    ) -> EngineResult<(VaultAccount, WithdrawalReceipt)> {
        self.ensure_alive()?;
        kind.validate()?;

        let tier = kind.tier();
        let status = evaluate(now, self.created_at);
        if !status.allows(tier) {
            return Err(PolicyViolation::NotYetEligible {
                tier,
                seconds_remaining: status.seconds_until(tier),
            }
            .into());
        }
        if self.basket.is_empty() {
            return Err(ValidationError::ZeroAmount.into());
        }

        let penalty_bps = status.penalty_bps(tier);
        let mut next = self.clone();
        next.checkpoint(now)?;

        let mut payouts = Vec::new();
        let mut gross_vet = FixedPoint::ZERO;
        let mut penalty_vet = FixedPoint::ZERO;
        let mut net_vet = FixedPoint::ZERO;

        for (token, balance) in self.basket.non_zero() {
            let gross = match kind {
                WithdrawalKind::Partial { fraction_bps } => balance.percentage_bps(fraction_bps)?,
                WithdrawalKind::Emergency | WithdrawalKind::Full => balance,
            };
            if gross.is_zero() {
                continue;
            }
            let penalty = gross.percentage_bps(penalty_bps)?;
            let net = gross.checked_sub(penalty)?;
            next.basket.debit(token, gross)?;

            let rate = token.vet_rate();
            gross_vet = gross_vet.checked_add(rate.to_vet(gross)?)?;
            penalty_vet = penalty_vet.checked_add(rate.to_vet(penalty)?)?;
            net_vet = net_vet.checked_add(rate.to_vet(net)?)?;

            payouts.push(TokenPayout {
                token,
                gross,
                penalty,
                net,
            });
        }

        if payouts.is_empty() {
            return Err(ValidationError::ZeroAmount.into());
        }
        next.refresh_locked_value()?;

        info!(
            owner = %self.owner,
            %tier,
            penalty_bps,
            %gross_vet,
            %net_vet,
            "withdrawal executed"
        );

        let receipt = WithdrawalReceipt {
            kind,
            tier,
            penalty_bps,
            executed_at: now,
            payouts,
            gross_vet,
            penalty_vet,
            net_vet,
        };
        Ok((next, receipt))
    }
}
