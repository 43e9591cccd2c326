//! # Protocol Configuration & Constants
//!
//! Every number that shapes a vault's life lives here: decimals, tier
//! thresholds, penalty and fee rates, reward weights, the unclaimed cap,
//! and the inheritance bonus sizes. Client and contract implementations
//! must agree on every one of these bit-for-bit, so none of them is ever
//! read from a file or mutated at runtime.
//!
//! Rates are in **basis points** (1 bp = 0.01%) unless the name says
//! otherwise. Reward rates use parts-per-million because a daily rate in
//! whole basis points is too coarse.

// ---------------------------------------------------------------------------
// Fixed-Point Representation
// ---------------------------------------------------------------------------

/// Implied decimals of every on-chain amount (wei-style).
pub const DECIMALS: u32 = 18;

/// Base units per whole token: 10^18.
pub const BASE_UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Denominator for every basis-point rate.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Denominator for parts-per-million rates.
pub const PPM_DENOMINATOR: u128 = 1_000_000;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_HOUR: u64 = 3_600;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// A Julian year (365.25 days). Tier thresholds and participation years
/// are measured in these so leap days don't shift eligibility.
pub const SECONDS_PER_YEAR: u64 = 31_557_600;

// ---------------------------------------------------------------------------
// Time-Lock Tiers
// ---------------------------------------------------------------------------

/// Vault age (years) at which emergency withdrawal unlocks.
pub const EMERGENCY_UNLOCK_YEARS: u64 = 7;

/// Vault age (years) at which partial and full withdrawal unlock.
pub const FULL_UNLOCK_YEARS: u64 = 15;

pub const EMERGENCY_UNLOCK_SECS: u64 = EMERGENCY_UNLOCK_YEARS * SECONDS_PER_YEAR;
pub const FULL_UNLOCK_SECS: u64 = FULL_UNLOCK_YEARS * SECONDS_PER_YEAR;

/// Emergency withdrawal penalty: 90%.
pub const EMERGENCY_PENALTY_BPS: u32 = 9_000;

/// Partial withdrawal penalty: 35%.
pub const PARTIAL_PENALTY_BPS: u32 = 3_500;

/// Full withdrawal penalty: 20%.
pub const FULL_PENALTY_BPS: u32 = 2_000;

/// A partial withdrawal may take at most 30% of each token balance.
pub const PARTIAL_WITHDRAWAL_MAX_BPS: u32 = 3_000;

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

/// Fee on moving free OBOL out to the owner's wallet: 0.5%.
/// Applies regardless of vault age.
pub const OBOL_WITHDRAWAL_FEE_BPS: u32 = 50;

/// Protocol fee taken from every inheritance payout: 1%.
pub const INHERITANCE_FEE_BPS: u32 = 100;

// ---------------------------------------------------------------------------
// Reward Weighting
// ---------------------------------------------------------------------------

/// Weight every vault starts with.
pub const BASE_WEIGHT: u64 = 100;

/// Weight ceiling. The interpolated rate reaches its maximum here.
pub const MAX_WEIGHT: u64 = 250;

/// VET-equivalent units per value-weight step.
pub const VALUE_WEIGHT_STEP_UNITS: u128 = 1_000;

/// Weight added per full value step.
pub const VALUE_WEIGHT_PER_STEP: u64 = 20;

/// Weight added per full year in the system.
pub const PARTICIPATION_WEIGHT_PER_YEAR: u64 = 30;

/// Daily reward rate at `BASE_WEIGHT`, in ppm of locked VET-equivalent value.
pub const BASE_DAILY_RATE_PPM: u64 = 100;

/// Daily reward rate at `MAX_WEIGHT`: twice the base.
pub const MAX_DAILY_RATE_PPM: u64 = 2 * BASE_DAILY_RATE_PPM;

/// Maximum unclaimed (earned but not yet claimed) OBOL per account, whole tokens.
pub const UNCLAIMED_CAP_OBOL: u128 = 1_500;

// ---------------------------------------------------------------------------
// Grandfathering
// ---------------------------------------------------------------------------

/// Window after inheritance eligibility in which a re-locking beneficiary
/// keeps the boosted rate.
pub const GRANDFATHER_WINDOW_SECS: u64 = 90 * SECONDS_PER_DAY;

/// Grandfathering multiplier (1.5×) in basis points.
pub const GRANDFATHER_MULTIPLIER_BPS: u32 = 15_000;

// ---------------------------------------------------------------------------
// Beneficiaries & Inheritance
// ---------------------------------------------------------------------------

/// Maximum beneficiaries per vault.
pub const MAX_BENEFICIARIES: usize = 5;

/// Below this age a beneficiary must have a guardian.
pub const AGE_OF_MAJORITY: u32 = 18;

/// Flat B3TR legacy bonus for outliving life expectancy, whole tokens.
pub const LEGACY_BONUS_B3TR: u128 = 100;

/// Additional B3TR per whole year beyond life expectancy, whole tokens.
pub const LEGACY_BONUS_PER_YEAR_B3TR: u128 = 100;
