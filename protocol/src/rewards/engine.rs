//! # Reward Accrual Engine
//!
//! OBOL accrues continuously, pro-rata per second, on the VET-equivalent
//! value locked in a vault's basket. Accrual is checkpointed: every
//! operation that changes the basket first settles the elapsed period on
//! the value that was locked, then applies its change. Participation
//! weight grows on each anniversary of the stake's start, and a period
//! that crosses one is paid piecewise.
//!
//! ```text
//!   last_accrual_time      anniversary        now
//!          │◄──── year n ────►│◄─ year n+1 ─►│
//!          │ daily(w_n) × Δ / 86400          │ daily(w_n+1) × Δ / 86400
//!          ▼                                 ▼
//!   gross   = Σ pieces
//!   pending += min(gross, cap − pending)      (excess is reported, not kept)
//! ```
//!
//! Earned OBOL is first `pending`. A claim moves it to the free balance,
//! where the owner can either withdraw it (0.5% fee) or lock it into the
//! basket, after which it counts toward the inheritance.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::weight::{compute_weight, years_in_system, RewardRate};
use crate::amount::{ArithmeticError, FixedPoint};
use crate::config::{
    GRANDFATHER_WINDOW_SECS, MAX_WEIGHT, OBOL_WITHDRAWAL_FEE_BPS, SECONDS_PER_DAY,
    SECONDS_PER_YEAR, UNCLAIMED_CAP_OBOL,
};
use crate::error::{EngineResult, ValidationError};
use crate::vault::{TokenSymbol, VaultAccount};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of one accrual checkpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualReport {
    pub from: u64,
    pub to: u64,
    /// Rate in force at `to`.
    pub rate: RewardRate,
    /// Credited to `pending_rewards`.
    pub accrued: FixedPoint,
    /// Dropped because the unclaimed cap was reached.
    pub not_accrued: FixedPoint,
}

impl AccrualReport {
    fn idle(at: u64, rate: RewardRate) -> Self {
        Self {
            from: at,
            to: at,
            rate,
            accrued: FixedPoint::ZERO,
            not_accrued: FixedPoint::ZERO,
        }
    }

    /// `true` if the unclaimed cap clipped this period.
    pub fn capped(&self) -> bool {
        !self.not_accrued.is_zero()
    }
}

/// Result of [`VaultAccount::claim`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub claimed: FixedPoint,
    pub accrual: AccrualReport,
    pub free_obol: FixedPoint,
}

/// Fee and net of an OBOL withdrawal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub gross: FixedPoint,
    pub fee: FixedPoint,
    pub net: FixedPoint,
}

/// 0.5% fee on moving free OBOL out of the vault. Independent of vault
/// age.
pub fn withdrawal_fee(amount: FixedPoint) -> Result<FeeSplit, ArithmeticError> {
    let fee = amount.percentage_bps(OBOL_WITHDRAWAL_FEE_BPS)?;
    Ok(FeeSplit {
        gross: amount,
        fee,
        net: amount.checked_sub(fee)?,
    })
}

fn unclaimed_cap() -> Result<FixedPoint, ArithmeticError> {
    FixedPoint::from_whole(UNCLAIMED_CAP_OBOL)
}

// ---------------------------------------------------------------------------
// Engine operations
// ---------------------------------------------------------------------------

impl VaultAccount {
    /// Whether this vault earns at the grandfathered rate: it was opened
    /// within the window after its owner became eligible under an
    /// inherited claim.
    pub fn is_grandfathered(&self) -> bool {
        self.grandfather_claim.as_ref().is_some_and(|claim| {
            self.created_at
                .checked_sub(claim.eligible_at)
                .is_some_and(|gap| gap <= GRANDFATHER_WINDOW_SECS)
        })
    }

    /// The rate in force at `at` for the currently locked value.
    pub fn reward_rate_at(&self, at: u64) -> RewardRate {
        let years = years_in_system(self.obol_stake.start_time, at);
        let weight = compute_weight(self.obol_stake.locked_value, years);
        RewardRate::for_weight(weight, self.is_grandfathered())
    }

    /// Reward earned on the locked value over `[from, to)` before the cap,
    /// and the rate in force at the end of that span.
    ///
    /// The span is cut at every anniversary of the stake's start so each
    /// piece is paid at the participation weight of its own year. Cutting
    /// at fixed anniversaries makes the total independent of how often
    /// the vault is checkpointed.
    fn gross_accrual(&self, from: u64, to: u64) -> EngineResult<(FixedPoint, RewardRate)> {
        let start = self.obol_stake.start_time;
        let locked = self.obol_stake.locked_value;

        let mut gross = FixedPoint::ZERO;
        let mut rate = self.reward_rate_at(from);
        let mut cursor = from;
        while cursor < to {
            rate = self.reward_rate_at(cursor);
            // The weight cannot grow past the cap, so the rest is one piece.
            let end = if rate.weight >= MAX_WEIGHT {
                to
            } else {
                let next_year = years_in_system(start, cursor).saturating_add(1);
                start
                    .saturating_add(next_year.saturating_mul(SECONDS_PER_YEAR))
                    .min(to)
            };

            let piece = rate
                .daily_amount(locked)?
                .mul_ratio((end - cursor) as u128, SECONDS_PER_DAY as u128)?;
            gross = gross.checked_add(piece)?;
            cursor = end;
        }
        Ok((gross, rate))
    }

    /// Settles accrual up to `now`.
    ///
    /// The period is split at stake anniversaries, and each piece is paid
    /// on the value locked at the period's start. Deceased vaults no
    /// longer accrue.
    pub(crate) fn checkpoint(&mut self, now: u64) -> EngineResult<AccrualReport> {
        let from = self.obol_stake.last_accrual_time;
        if now < from {
            return Err(ValidationError::ClockRegression {
                now,
                earliest: from,
            }
            .into());
        }

        if self.is_deceased || now == from {
            return Ok(AccrualReport::idle(now, self.reward_rate_at(now)));
        }

        let elapsed = now - from;
        let (gross, rate) = self.gross_accrual(from, now)?;

        let cap = unclaimed_cap()?;
        let pending = self.obol_stake.pending_rewards;
        let headroom = if pending >= cap {
            FixedPoint::ZERO
        } else {
            cap.checked_sub(pending)?
        };
        let accrued = gross.min(headroom);
        let not_accrued = gross.checked_sub(accrued)?;

        let stake = &mut self.obol_stake;
        stake.pending_rewards = pending.checked_add(accrued)?;
        stake.total_earned = stake.total_earned.checked_add(accrued)?;
        stake.last_accrual_time = now;

        if !not_accrued.is_zero() {
            warn!(
                owner = %self.owner,
                %accrued,
                %not_accrued,
                "unclaimed reward cap reached; excess accrual dropped"
            );
        } else {
            debug!(owner = %self.owner, elapsed, %accrued, weight = rate.weight, "accrual checkpoint");
        }

        Ok(AccrualReport {
            from,
            to: now,
            rate,
            accrued,
            not_accrued,
        })
    }

    /// What a checkpoint at `now` would produce, without committing it.
    pub fn preview_accrual(&self, now: u64) -> EngineResult<AccrualReport> {
        self.clone().checkpoint(now)
    }

    /// Moves all pending reward to the free OBOL balance.
    pub fn claim(&self, now: u64) -> EngineResult<(VaultAccount, ClaimReceipt)> {
        self.ensure_alive()?;

        let mut next = self.clone();
        let accrual = next.checkpoint(now)?;

        let stake = &mut next.obol_stake;
        let claimed = stake.pending_rewards;
        stake.total_claimed = stake.total_claimed.checked_add(claimed)?;
        stake.pending_rewards = FixedPoint::ZERO;
        stake.last_claim_time = now;
        next.free_obol = next.free_obol.checked_add(claimed)?;

        info!(owner = %self.owner, %claimed, free_obol = %next.free_obol, "rewards claimed");

        let receipt = ClaimReceipt {
            claimed,
            accrual,
            free_obol: next.free_obol,
        };
        Ok((next, receipt))
    }

    /// Locks free OBOL into the basket so it becomes inheritable.
    pub fn lock_for_inheritance(&self, amount: FixedPoint, now: u64) -> EngineResult<VaultAccount> {
        self.ensure_alive()?;
        if amount.is_zero() {
            return Err(ValidationError::ZeroAmount.into());
        }
        if amount > self.free_obol {
            return Err(ValidationError::InsufficientBalance {
                token: TokenSymbol::Obol,
                available: self.free_obol,
                requested: amount,
            }
            .into());
        }

        let mut next = self.clone();
        next.checkpoint(now)?;
        next.free_obol = next.free_obol.checked_sub(amount)?;
        next.basket.credit(TokenSymbol::Obol, amount)?;
        next.refresh_locked_value()?;

        info!(owner = %self.owner, %amount, "OBOL locked for inheritance");
        Ok(next)
    }

    /// Withdraws free OBOL to the owner's wallet, net of the fee.
    pub fn withdraw_obol(&self, amount: FixedPoint) -> EngineResult<(VaultAccount, FeeSplit)> {
        self.ensure_alive()?;
        if amount.is_zero() {
            return Err(ValidationError::ZeroAmount.into());
        }
        if amount > self.free_obol {
            return Err(ValidationError::InsufficientBalance {
                token: TokenSymbol::Obol,
                available: self.free_obol,
                requested: amount,
            }
            .into());
        }

        let split = withdrawal_fee(amount)?;
        let mut next = self.clone();
        next.free_obol = next.free_obol.checked_sub(amount)?;

        info!(owner = %self.owner, gross = %split.gross, fee = %split.fee, "free OBOL withdrawn");
        Ok((next, split))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
