//! Error types for the vault engine.
//!
//! Every public engine operation returns [`EngineResult`]. The variants
//! fall into three caller-facing kinds (see [`ErrorKind`]):
//!
//! - **Validation**: malformed or out-of-range input. The caller fixes
//!   the input and tries again.
//! - **Policy**: the input is fine but the vault's current state forbids
//!   the operation (time lock not expired, owner deceased, ...).
//! - **Arithmetic**: a magnitude overflowed or would go negative.
//!
//! Reward accrual hitting the unclaimed cap is deliberately absent: that
//! is a clamp reported through `AccrualReport`, not a failure.

use thiserror::Error;

use crate::amount::{ArithmeticError, FixedPoint};
use crate::lifecycle::timelock::WithdrawalTier;
use crate::vault::token::TokenSymbol;

/// Malformed or out-of-range input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("beneficiary {0} is already in the list")]
    DuplicateAddress(String),

    #[error("the vault owner {0} cannot be their own beneficiary")]
    SelfBeneficiary(String),

    #[error("percentage {bps} bps for {address} is outside 1..=10000")]
    PercentageOutOfRange {
        /// Beneficiary the percentage was given for.
        address: String,
        /// The rejected value.
        bps: u32,
    },

    #[error("allocation would total {total_bps} bps, above 10000")]
    AllocationExceeded {
        /// Sum including the rejected candidate.
        total_bps: u32,
    },

    #[error("beneficiary {0} is a minor and needs a guardian")]
    MissingGuardian(String),

    #[error("guardian {guardian} is not valid for beneficiary {address}")]
    InvalidGuardian {
        /// The beneficiary.
        address: String,
        /// The rejected guardian.
        guardian: String,
    },

    #[error("at most {max} beneficiaries are allowed")]
    TooManyBeneficiaries {
        /// Configured limit.
        max: usize,
    },

    #[error("allocation totals {total_bps} bps; settlement needs exactly 10000")]
    AllocationIncomplete {
        /// Current allocation sum.
        total_bps: u32,
    },

    #[error("a vault needs at least one beneficiary")]
    NoBeneficiaries,

    #[error("zero-amount operations are not permitted")]
    ZeroAmount,

    #[error("{0} cannot be deposited directly; lock it for inheritance instead")]
    UnsupportedDeposit(TokenSymbol),

    #[error("unknown token symbol {0:?}")]
    UnknownToken(String),

    #[error("insufficient {token} balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Token being debited.
        token: TokenSymbol,
        /// Balance before the failed debit.
        available: FixedPoint,
        /// Amount requested.
        requested: FixedPoint,
    },

    #[error("partial withdrawal of {requested_bps} bps exceeds the {max_bps} bps limit")]
    PartialLimitExceeded {
        /// Requested fraction.
        requested_bps: u32,
        /// Allowed maximum.
        max_bps: u32,
    },

    #[error("timestamp {now} is earlier than {earliest}")]
    ClockRegression {
        /// The caller-supplied clock value.
        now: u64,
        /// The earliest acceptable value.
        earliest: u64,
    },

    #[error("death timestamp {death_timestamp} precedes vault creation at {created_at}")]
    InvalidDeathTimestamp {
        /// Reported time of death.
        death_timestamp: u64,
        /// Vault creation time.
        created_at: u64,
    },
}

/// The operation is well-formed but the vault's state forbids it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("{tier} withdrawal not yet eligible; {seconds_remaining}s remaining")]
    NotYetEligible {
        /// The tier that was requested.
        tier: WithdrawalTier,
        /// Seconds until the tier unlocks.
        seconds_remaining: u64,
    },

    #[error("vault owner {0} is deceased; the vault is read-only")]
    AlreadyDeceased(String),

    #[error("identity of {0} has not been verified")]
    IdentityNotVerified(String),

    #[error("death of {0} has not been verified")]
    NotVerifiedDeath(String),
}

/// Caller-facing error category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Policy,
    Arithmetic,
}

/// Any failure of an engine operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("policy violation: {0}")]
    Policy(#[from] PolicyViolation),

    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

impl EngineError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::Policy(_) => ErrorKind::Policy,
            EngineError::Arithmetic(_) => ErrorKind::Arithmetic,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variant() {
        let v: EngineError = ValidationError::ZeroAmount.into();
        let p: EngineError = PolicyViolation::AlreadyDeceased("alice".into()).into();
        let a: EngineError = ArithmeticError::Overflow.into();
        assert_eq!(v.kind(), ErrorKind::Validation);
        assert_eq!(p.kind(), ErrorKind::Policy);
        assert_eq!(a.kind(), ErrorKind::Arithmetic);
    }

    #[test]
    fn messages_name_the_condition() {
        let e: EngineError = PolicyViolation::NotYetEligible {
            tier: WithdrawalTier::Emergency,
            seconds_remaining: 42,
        }
        .into();
        let msg = e.to_string();
        assert!(msg.contains("emergency"));
        assert!(msg.contains("42s"));
    }
}
