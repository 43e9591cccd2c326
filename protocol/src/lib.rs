// Copyright (c) 2026 Sarcophagus Contributors. MIT License.
// See LICENSE for details.

//! # Sarcophagus Protocol: Vault Engine
//!
//! The deterministic core of a digital-inheritance protocol. A user locks
//! a basket of tokens in a vault, names beneficiaries, and earns OBOL
//! rewards while alive. Withdrawals are gated by a time lock with steep
//! early penalties. On a verified death the basket is distributed to the
//! beneficiaries.
//!
//! ## Architecture
//!
//! - **amount**: fixed-point token amounts (18 decimals, `u128`).
//! - **vault**: tokens, basket, beneficiary allocation, the account aggregate.
//! - **rewards**: weight model and checkpointed OBOL accrual.
//! - **lifecycle**: time lock, withdrawals, inheritance settlement.
//! - **storage**: sled-backed vault snapshots with single-writer updates.
//! - **config**: every protocol constant.
//! - **error**: the validation / policy / arithmetic error taxonomy.
//!
//! ## Determinism
//!
//! Every operation is a pure function of `(snapshot, inputs, now)`. Time
//! is always passed in, never read. All arithmetic is integer with
//! floor rounding at documented points. Two implementations that replay
//! the same operations agree on [`VaultAccount::state_digest`].
//!
//! ```
//! use sarcophagus_protocol::{Beneficiary, FixedPoint, TokenSymbol, VaultAccount};
//!
//! let vault = VaultAccount::create("0xowner", true, vec![Beneficiary::new("0xheir", 10_000)], 0)?
//!     .deposit(TokenSymbol::Vet, FixedPoint::parse("1000")?, 0)?;
//! assert_eq!(vault.basket().balance(TokenSymbol::Vet).to_string(), "1000");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod amount;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod rewards;
pub mod storage;
pub mod vault;

pub use amount::{ArithmeticError, FixedPoint};
pub use error::{EngineError, EngineResult, ErrorKind, PolicyViolation, ValidationError};
pub use lifecycle::{DeathCertificate, Distribution, WithdrawalKind, WithdrawalReceipt, WithdrawalTier};
pub use rewards::{AccrualReport, ClaimReceipt, FeeSplit};
pub use storage::{StoreError, VaultStore};
pub use vault::{Beneficiary, BeneficiaryAllocation, GrandfatherClaim, TokenBasket, TokenSymbol, VaultAccount};
