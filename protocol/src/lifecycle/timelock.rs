//! # Time-Lock Policy
//!
//! Withdrawals unlock by vault age, measured from `created_at` in Julian
//! years:
//!
//! ```text
//!  age:   0 ──────────── 7y ─────────────────────── 15y ──────────►
//!         │   locked     │  emergency only (90%)    │ partial (35%)
//!         │              │                          │ full    (20%)
//! ```
//!
//! Thresholds are inclusive: a vault exactly seven years old may take the
//! emergency exit. Evaluation is a pure function of `(now, created_at)`
//! and never fails. A clock earlier than creation reads as age zero, and
//! the operations that mutate state reject it separately.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{
    EMERGENCY_PENALTY_BPS, EMERGENCY_UNLOCK_SECS, FULL_PENALTY_BPS, FULL_UNLOCK_SECS,
    PARTIAL_PENALTY_BPS, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
};

/// The three withdrawal tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalTier {
    Emergency,
    Partial,
    Full,
}

impl WithdrawalTier {
    pub const ALL: [WithdrawalTier; 3] = [
        WithdrawalTier::Emergency,
        WithdrawalTier::Partial,
        WithdrawalTier::Full,
    ];

    /// Vault age at which this tier unlocks.
    pub const fn unlock_age_secs(self) -> u64 {
        match self {
            WithdrawalTier::Emergency => EMERGENCY_UNLOCK_SECS,
            WithdrawalTier::Partial | WithdrawalTier::Full => FULL_UNLOCK_SECS,
        }
    }

    /// Penalty charged on the withdrawn amount.
    pub const fn penalty_bps(self) -> u32 {
        match self {
            WithdrawalTier::Emergency => EMERGENCY_PENALTY_BPS,
            WithdrawalTier::Partial => PARTIAL_PENALTY_BPS,
            WithdrawalTier::Full => FULL_PENALTY_BPS,
        }
    }
}

impl fmt::Display for WithdrawalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WithdrawalTier::Emergency => "emergency",
            WithdrawalTier::Partial => "partial",
            WithdrawalTier::Full => "full",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// TimeLockStatus
// ---------------------------------------------------------------------------

/// Which tiers are open at a given moment, at what cost, and how long
/// until the closed ones open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLockStatus {
    pub vault_age_secs: u64,

    pub can_emergency: bool,
    pub can_partial: bool,
    pub can_full: bool,

    pub emergency_penalty_bps: u32,
    pub partial_penalty_bps: u32,
    pub full_penalty_bps: u32,

    pub seconds_until_emergency: u64,
    pub seconds_until_partial: u64,
    pub seconds_until_full: u64,
}

impl TimeLockStatus {
    pub fn allows(&self, tier: WithdrawalTier) -> bool {
        match tier {
            WithdrawalTier::Emergency => self.can_emergency,
            WithdrawalTier::Partial => self.can_partial,
            WithdrawalTier::Full => self.can_full,
        }
    }

    pub fn penalty_bps(&self, tier: WithdrawalTier) -> u32 {
        match tier {
            WithdrawalTier::Emergency => self.emergency_penalty_bps,
            WithdrawalTier::Partial => self.partial_penalty_bps,
            WithdrawalTier::Full => self.full_penalty_bps,
        }
    }

    pub fn seconds_until(&self, tier: WithdrawalTier) -> u64 {
        match tier {
            WithdrawalTier::Emergency => self.seconds_until_emergency,
            WithdrawalTier::Partial => self.seconds_until_partial,
            WithdrawalTier::Full => self.seconds_until_full,
        }
    }
}

/// Evaluates the time lock of a vault created at `created_at`.
pub fn evaluate(now: u64, created_at: u64) -> TimeLockStatus {
    let age = now.saturating_sub(created_at);
    let until = |tier: WithdrawalTier| tier.unlock_age_secs().saturating_sub(age);

    TimeLockStatus {
        vault_age_secs: age,
        can_emergency: age >= WithdrawalTier::Emergency.unlock_age_secs(),
        can_partial: age >= WithdrawalTier::Partial.unlock_age_secs(),
        can_full: age >= WithdrawalTier::Full.unlock_age_secs(),
        emergency_penalty_bps: WithdrawalTier::Emergency.penalty_bps(),
        partial_penalty_bps: WithdrawalTier::Partial.penalty_bps(),
        full_penalty_bps: WithdrawalTier::Full.penalty_bps(),
        seconds_until_emergency: until(WithdrawalTier::Emergency),
        seconds_until_partial: until(WithdrawalTier::Partial),
        seconds_until_full: until(WithdrawalTier::Full),
    }
}

/// Renders a countdown as `"{d}d {h}h {m}m"`.
///
/// Minutes round up, so any non-zero remainder never shows as `0d 0h 0m`.
pub fn format_countdown(secs: u64) -> String {
    let total_minutes = secs.div_ceil(SECONDS_PER_MINUTE);
    let minutes_per_day = SECONDS_PER_DAY / SECONDS_PER_MINUTE;
    let minutes_per_hour = SECONDS_PER_HOUR / SECONDS_PER_MINUTE;

    let days = total_minutes / minutes_per_day;
    let hours = (total_minutes % minutes_per_day) / minutes_per_hour;
    let minutes = total_minutes % minutes_per_hour;
    format!("{days}d {hours}h {minutes}m")
}
