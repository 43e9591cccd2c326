//! # Vault Module
//!
//! The state a vault carries: what it holds, who inherits it, and the
//! OBOL reward bookkeeping attached to it.
//!
//! ## Architecture
//!
//! ```text
//! token.rs        Supported tokens and their fixed VET conversion rates
//! basket.rs       Per-token balances, never negative
//! beneficiary.rs  Validated beneficiary allocation
//! account.rs      The VaultAccount aggregate and its basic operations
//! ```
//!
//! All amounts are [`FixedPoint`](crate::amount::FixedPoint) base units
//! with 18 implied decimals. Everything here derives `Serialize` and
//! `Deserialize`: JSON for callers, bincode for storage and the state
//! digest.

pub mod account;
pub mod basket;
pub mod beneficiary;
pub mod token;

pub use account::{GrandfatherClaim, ObolStake, VaultAccount};
pub use basket::TokenBasket;
pub use beneficiary::{Beneficiary, BeneficiaryAllocation};
pub use token::{ConversionRate, TokenSymbol};
