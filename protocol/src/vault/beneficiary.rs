//! # Beneficiary Allocation
//!
//! Who receives what when the owner dies. An allocation is an ordered
//! list of beneficiaries, each with a share in basis points. The list may
//! sit below 100% while the owner is still editing it, but settlement
//! refuses to run until it sums to exactly 10 000 bps.
//!
//! Rules enforced on every `add`, in this order:
//!
//! 1. No duplicate addresses.
//! 2. The owner is never their own beneficiary.
//! 3. At most [`MAX_BENEFICIARIES`] entries.
//! 4. Each share is in `1..=10000` bps.
//! 5. The running total never exceeds 10 000 bps.
//! 6. Minors (declared age below 18) come with a guardian, and that
//!    guardian is neither the minor nor the owner.
//!
//! Operations return a new allocation and leave `self` untouched, so a
//! rejected edit can never half-apply.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AGE_OF_MAJORITY, BPS_DENOMINATOR, MAX_BENEFICIARIES};
use crate::error::{EngineResult, ValidationError};

const FULL_ALLOCATION_BPS: u32 = BPS_DENOMINATOR as u32;

// ---------------------------------------------------------------------------
// Beneficiary
// ---------------------------------------------------------------------------

/// One entry in the allocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    /// Opaque account identifier. Format checks belong to the wallet layer.
    pub address: String,

    /// Share of the estate in basis points.
    pub percentage_bps: u32,

    /// Declared age in whole years, if the owner supplied one.
    #[serde(default)]
    pub age: Option<u32>,

    /// Guardian address; required for minors.
    #[serde(default)]
    pub guardian: Option<String>,
}

impl Beneficiary {
    /// An adult (or age-undeclared) beneficiary.
    pub fn new(address: &str, percentage_bps: u32) -> Self {
        Self {
            address: address.to_string(),
            percentage_bps,
            age: None,
            guardian: None,
        }
    }

    /// Attaches a declared age.
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Attaches a guardian address.
    pub fn with_guardian(mut self, guardian: &str) -> Self {
        self.guardian = Some(guardian.to_string());
        self
    }

    /// `true` when a declared age is below the age of majority.
    pub fn is_minor(&self) -> bool {
        self.age.is_some_and(|a| a < AGE_OF_MAJORITY)
    }
}

// ---------------------------------------------------------------------------
// BeneficiaryAllocation
// ---------------------------------------------------------------------------

/// The validated beneficiary list of one vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryAllocation {
    owner: String,
    entries: Vec<Beneficiary>,
}

impl BeneficiaryAllocation {
    /// An empty allocation for `owner`.
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            entries: Vec::new(),
        }
    }

    /// Builds an allocation by adding each candidate in order.
    pub fn from_entries(owner: &str, candidates: Vec<Beneficiary>) -> EngineResult<Self> {
        candidates
            .into_iter()
            .try_fold(Self::new(owner), |list, candidate| list.add(candidate))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn entries(&self) -> &[Beneficiary] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<&Beneficiary> {
        self.entries.iter().find(|b| b.address == address)
    }

    /// Sum of all shares.
    pub fn total_bps(&self) -> u32 {
        self.entries.iter().map(|b| b.percentage_bps).sum()
    }

    /// Returns a new allocation with `candidate` appended.
    pub fn add(&self, candidate: Beneficiary) -> EngineResult<Self> {
        if self.get(&candidate.address).is_some() {
            return Err(ValidationError::DuplicateAddress(candidate.address).into());
        }
        if candidate.address == self.owner {
            return Err(ValidationError::SelfBeneficiary(candidate.address).into());
        }
        if self.entries.len() >= MAX_BENEFICIARIES {
            return Err(ValidationError::TooManyBeneficiaries {
                max: MAX_BENEFICIARIES,
            }
            .into());
        }
        if candidate.percentage_bps == 0 || candidate.percentage_bps > FULL_ALLOCATION_BPS {
            return Err(ValidationError::PercentageOutOfRange {
                address: candidate.address,
                bps: candidate.percentage_bps,
            }
            .into());
        }

        let total_bps = self.total_bps() + candidate.percentage_bps;
        if total_bps > FULL_ALLOCATION_BPS {
            return Err(ValidationError::AllocationExceeded { total_bps }.into());
        }

        if candidate.is_minor() {
            match candidate.guardian.as_deref() {
                None => {
                    return Err(ValidationError::MissingGuardian(candidate.address).into());
                }
                Some(g) if g == candidate.address || g == self.owner => {
                    return Err(ValidationError::InvalidGuardian {
                        guardian: g.to_string(),
                        address: candidate.address,
                    }
                    .into());
                }
                Some(_) => {}
            }
        }

        debug!(
            owner = %self.owner,
            beneficiary = %candidate.address,
            bps = candidate.percentage_bps,
            total_bps,
            "beneficiary added"
        );

        let mut next = self.clone();
        next.entries.push(candidate);
        Ok(next)
    }

    /// Returns a new allocation without `address`. Unknown addresses leave
    /// the list as it was.
    pub fn remove(&self, address: &str) -> Self {
        let mut next = self.clone();
        next.entries.retain(|b| b.address != address);
        next
    }

    /// `true` iff the shares sum to exactly 10 000 bps.
    pub fn validate_complete(&self) -> bool {
        self.total_bps() == FULL_ALLOCATION_BPS
    }

    /// Like [`validate_complete`](Self::validate_complete), as an error.
    pub fn require_complete(&self) -> EngineResult<()> {
        if self.validate_complete() {
            Ok(())
        } else {
            Err(ValidationError::AllocationIncomplete {
                total_bps: self.total_bps(),
            }
            .into())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
