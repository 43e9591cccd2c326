//! # Vault Account
//!
//! The canonical state of one user's vault. A `VaultAccount` is an
//! immutable snapshot from the caller's point of view: every operation
//! borrows the current snapshot and returns a fresh one (plus a receipt),
//! or an error with the original left exactly as it was. That is what
//! lets a client and a contract replay the same operation log and land
//! on byte-identical state. See [`VaultAccount::state_digest`].
//!
//! The operations are spread across the crate by concern:
//!
//! ```text
//! vault/account.rs          create, deposit, beneficiary edits, digest
//! rewards/engine.rs         accrual checkpoint, claim, lock, OBOL withdrawal
//! lifecycle/withdrawal.rs   emergency / partial / full withdrawal
//! lifecycle/settlement.rs   inheritance settlement (terminal)
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//!   create (verified identity, ≥1 beneficiary)
//!      │
//!      ▼
//!   ┌────────┐  deposit / lock / claim / withdraw / edit beneficiaries
//!   │  Live  │◄────────────────────────────────────────────────┐
//!   └───┬────┘─────────────────────────────────────────────────┘
//!       │ settle (verified death, allocation == 100%)
//!       ▼
//!   ┌──────────┐
//!   │ Deceased │  read-only; every mutation returns AlreadyDeceased
//!   └──────────┘
//! ```
//!
//! Timestamps are logical seconds supplied by the caller. The engine
//! never reads a clock.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::basket::TokenBasket;
use super::beneficiary::{Beneficiary, BeneficiaryAllocation};
use super::token::TokenSymbol;
use crate::amount::FixedPoint;
use crate::error::{EngineResult, PolicyViolation, ValidationError};

// ---------------------------------------------------------------------------
// ObolStake
// ---------------------------------------------------------------------------

/// OBOL reward bookkeeping. Only the reward engine writes these fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObolStake {
    /// VET-equivalent basket value the current rate is computed from.
    /// Refreshed after every basket change.
    pub locked_value: FixedPoint,

    /// When participation started (the vault's creation time).
    pub start_time: u64,

    /// Last time rewards were claimed.
    pub last_claim_time: u64,

    /// Last time accrual was checkpointed. Accrual for the next period
    /// starts here.
    pub last_accrual_time: u64,

    /// Lifetime rewards credited to `pending_rewards`.
    pub total_earned: FixedPoint,

    /// Lifetime rewards moved out to the free OBOL balance.
    pub total_claimed: FixedPoint,

    /// Earned but not yet claimed. Always `total_earned - total_claimed`
    /// and never above the unclaimed cap.
    pub pending_rewards: FixedPoint,
}

impl ObolStake {
    fn starting_at(t: u64) -> Self {
        Self {
            locked_value: FixedPoint::ZERO,
            start_time: t,
            last_claim_time: t,
            last_accrual_time: t,
            total_earned: FixedPoint::ZERO,
            total_claimed: FixedPoint::ZERO,
            pending_rewards: FixedPoint::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// GrandfatherClaim
// ---------------------------------------------------------------------------

/// Proof that the holder inherited from `deceased_owner` and became
/// eligible at `eligible_at`. Issued by settlement; presented when the
/// beneficiary opens their own vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrandfatherClaim {
    pub deceased_owner: String,
    pub eligible_at: u64,
}

// ---------------------------------------------------------------------------
// VaultAccount
// ---------------------------------------------------------------------------

/// One user's vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAccount {
    pub(crate) owner: String,
    pub(crate) basket: TokenBasket,
    /// Claimed OBOL not locked for inheritance. Withdrawable, not inherited.
    pub(crate) free_obol: FixedPoint,
    pub(crate) created_at: u64,
    pub(crate) is_verified_identity: bool,
    pub(crate) is_deceased: bool,
    pub(crate) death_timestamp: Option<u64>,
    pub(crate) beneficiaries: BeneficiaryAllocation,
    pub(crate) obol_stake: ObolStake,
    pub(crate) grandfather_claim: Option<GrandfatherClaim>,
}

impl VaultAccount {
    /// Opens a vault.
    ///
    /// # Errors
    ///
    /// - [`PolicyViolation::IdentityNotVerified`] unless the identity
    ///   check has passed.
    /// - [`ValidationError::NoBeneficiaries`] for an empty list, or any
    ///   beneficiary rule violation.
    pub fn create(
        owner: &str,
        is_verified_identity: bool,
        beneficiaries: Vec<Beneficiary>,
        created_at: u64,
    ) -> EngineResult<Self> {
        if !is_verified_identity {
            return Err(PolicyViolation::IdentityNotVerified(owner.to_string()).into());
        }
        if beneficiaries.is_empty() {
            return Err(ValidationError::NoBeneficiaries.into());
        }
        let beneficiaries = BeneficiaryAllocation::from_entries(owner, beneficiaries)?;

        info!(
            owner,
            created_at,
            beneficiaries = beneficiaries.len(),
            allocated_bps = beneficiaries.total_bps(),
            "vault created"
        );

        Ok(Self {
            owner: owner.to_string(),
            basket: TokenBasket::new(),
            free_obol: FixedPoint::ZERO,
            created_at,
            is_verified_identity,
            is_deceased: false,
            death_timestamp: None,
            beneficiaries,
            obol_stake: ObolStake::starting_at(created_at),
            grandfather_claim: None,
        })
    }

    /// Attaches an inherited grandfathering claim. Meant to be called
    /// right after [`create`](Self::create) by the settlement context.
    pub fn with_grandfather_claim(mut self, claim: GrandfatherClaim) -> Self {
        self.grandfather_claim = Some(claim);
        self
    }

    // -- Accessors ----------------------------------------------------------

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn basket(&self) -> &TokenBasket {
        &self.basket
    }

    pub fn free_obol(&self) -> FixedPoint {
        self.free_obol
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn is_verified_identity(&self) -> bool {
        self.is_verified_identity
    }

    pub fn is_deceased(&self) -> bool {
        self.is_deceased
    }

    pub fn death_timestamp(&self) -> Option<u64> {
        self.death_timestamp
    }

    pub fn beneficiaries(&self) -> &BeneficiaryAllocation {
        &self.beneficiaries
    }

    pub fn obol_stake(&self) -> &ObolStake {
        &self.obol_stake
    }

    pub fn grandfather_claim(&self) -> Option<&GrandfatherClaim> {
        self.grandfather_claim.as_ref()
    }

    /// Seconds since creation, or 0 if `now` is earlier.
    pub fn age_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    // -- Operations ---------------------------------------------------------

    /// Adds `amount` of `token` to the basket.
    ///
    /// Rewards are checkpointed first so the elapsed period is paid at the
    /// rate in force before the deposit.
    pub fn deposit(&self, token: TokenSymbol, amount: FixedPoint, now: u64) -> EngineResult<Self> {
        self.ensure_alive()?;
        if amount.is_zero() {
            return Err(ValidationError::ZeroAmount.into());
        }
        if !token.is_depositable() {
            return Err(ValidationError::UnsupportedDeposit(token).into());
        }

        let mut next = self.clone();
        next.checkpoint(now)?;
        let balance = next.basket.credit(token, amount)?;
        next.refresh_locked_value()?;

        debug!(owner = %self.owner, %token, %amount, %balance, "deposit applied");
        Ok(next)
    }

    /// Adds a beneficiary while the owner is alive.
    pub fn add_beneficiary(&self, candidate: Beneficiary) -> EngineResult<Self> {
        self.ensure_alive()?;
        let mut next = self.clone();
        next.beneficiaries = self.beneficiaries.add(candidate)?;
        Ok(next)
    }

    /// Removes a beneficiary while the owner is alive.
    pub fn remove_beneficiary(&self, address: &str) -> EngineResult<Self> {
        self.ensure_alive()?;
        let mut next = self.clone();
        next.beneficiaries = self.beneficiaries.remove(address);
        Ok(next)
    }

    /// BLAKE3 digest of the canonical bincode encoding, hex-encoded.
    ///
    /// Two implementations that applied the same operations to the same
    /// starting snapshot must report the same digest.
    pub fn state_digest(&self) -> String {
        // Encoding into a Vec cannot fail: no size limit is set, and every
        // field is an integer, bool, string, option, vec or a map of known
        // length.
        let bytes = bincode::serialize(self).unwrap_or_default();
        hex::encode(blake3::hash(&bytes).as_bytes())
    }

    // -- Guards -------------------------------------------------------------

    pub(crate) fn ensure_alive(&self) -> EngineResult<()> {
        if self.is_deceased {
            return Err(PolicyViolation::AlreadyDeceased(self.owner.clone()).into());
        }
        Ok(())
    }

    pub(crate) fn refresh_locked_value(&mut self) -> EngineResult<()> {
        self.obol_stake.locked_value = self.basket.vet_equivalent()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
