//! # Rewards Module
//!
//! OBOL reward accrual: the weight and rate model in `weight.rs`, the
//! checkpointed accrual and claim flow in `engine.rs`.

pub mod engine;
pub mod weight;

pub use engine::{withdrawal_fee, AccrualReport, ClaimReceipt, FeeSplit};
pub use weight::{compute_weight, years_in_system, RewardRate};
