//! # Lifecycle Module
//!
//! Everything that moves value out of a vault.
//!
//! ```text
//! timelock.rs    Tier eligibility, penalties, countdowns (pure)
//! withdrawal.rs  Owner withdrawals under a tier
//! settlement.rs  Inheritance settlement after a verified death
//! ```

pub mod settlement;
pub mod timelock;
pub mod withdrawal;

pub use settlement::{compute_bonus, BeneficiaryPayout, DeathCertificate, Distribution, InheritanceBonus};
pub use timelock::{evaluate, format_countdown, TimeLockStatus, WithdrawalTier};
pub use withdrawal::{TokenPayout, WithdrawalKind, WithdrawalReceipt};
