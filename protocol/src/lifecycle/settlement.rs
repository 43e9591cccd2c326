//! # Inheritance Settlement
//!
//! The terminal transition of a vault. Given a verified death certificate
//! and an allocation that sums to exactly 100%, the basket is split among
//! the beneficiaries and the vault becomes read-only.
//!
//! ## Distribution, per token
//!
//! ```text
//!   balance ──► fee = ⌊balance × 1%⌋
//!           └─► net = balance − fee
//!                 ├─► share_i = ⌊net × bps_i / 10000⌋      for every beneficiary
//!                 └─► dust    = net − Σ share_i            → first beneficiary
//! ```
//!
//! Nothing is lost to rounding: for every token, fee plus all shares equal
//! the balance exactly.
//!
//! ## Bonuses
//!
//! The estate also earns B3TR, minted on top of the basket rather than
//! taken from it:
//!
//! - **Legacy**: outliving life expectancy pays 100 B3TR plus 100 B3TR per
//!   whole year beyond it.
//! - **Carbon offset**: dying before life expectancy pays the annual
//!   carbon footprint for every year of life not lived.
//!
//! The whole bonus goes to the first beneficiary.
//!
//! Free OBOL and unclaimed rewards are not part of the estate.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::amount::{ArithmeticError, FixedPoint};
use crate::config::{INHERITANCE_FEE_BPS, LEGACY_BONUS_B3TR, LEGACY_BONUS_PER_YEAR_B3TR};
use crate::error::{EngineResult, PolicyViolation, ValidationError};
use crate::vault::{GrandfatherClaim, TokenBasket, VaultAccount};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Oracle-verified record of the owner's death.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathCertificate {
    pub verified: bool,
    pub death_timestamp: u64,
    pub actual_age_at_death: u32,
    /// Life expectancy in whole years for the owner's cohort.
    pub life_expectancy: u32,
    /// Annual carbon footprint, in B3TR per year.
    pub annual_footprint: FixedPoint,
}

// ---------------------------------------------------------------------------
// Bonus
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceBonus {
    pub years_beyond_expectancy: u32,
    pub years_of_life_lost: u32,
    pub legacy_b3tr: FixedPoint,
    pub carbon_offset_b3tr: FixedPoint,
}

impl InheritanceBonus {
    pub fn total(&self) -> Result<FixedPoint, ArithmeticError> {
        self.legacy_b3tr.checked_add(self.carbon_offset_b3tr)
    }
}

/// Legacy and carbon-offset bonuses for a death at `actual_age` against
/// `life_expectancy`.
///
/// Dying exactly at life expectancy pays the flat legacy bonus and no
/// carbon offset.
pub fn compute_bonus(
    actual_age: u32,
    life_expectancy: u32,
    annual_footprint: FixedPoint,
) -> Result<InheritanceBonus, ArithmeticError> {
    let years_of_life_lost = life_expectancy.saturating_sub(actual_age);

    let (years_beyond_expectancy, legacy_b3tr) = if actual_age >= life_expectancy {
        let beyond = actual_age - life_expectancy;
        let whole = LEGACY_BONUS_PER_YEAR_B3TR
            .checked_mul(beyond as u128)
            .and_then(|b| b.checked_add(LEGACY_BONUS_B3TR))
            .ok_or(ArithmeticError::Overflow)?;
        (beyond, FixedPoint::from_whole(whole)?)
    } else {
        (0, FixedPoint::ZERO)
    };

    let carbon_offset_b3tr = annual_footprint.checked_mul_int(years_of_life_lost as u128)?;

    Ok(InheritanceBonus {
        years_beyond_expectancy,
        years_of_life_lost,
        legacy_b3tr,
        carbon_offset_b3tr,
    })
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// What one beneficiary receives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryPayout {
    pub address: String,
    pub percentage_bps: u32,
    #[serde(default)]
    pub guardian: Option<String>,
    pub tokens: TokenBasket,
    pub vet_equivalent: FixedPoint,
    pub bonus_b3tr: FixedPoint,
    /// Presented when this beneficiary opens their own vault.
    pub grandfather_claim: GrandfatherClaim,
}

/// The full settlement record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub owner: String,
    pub death_timestamp: u64,
    /// VET-equivalent value of the basket before fees.
    pub total_value: FixedPoint,
    /// 1% of `total_value`.
    pub inheritance_fee: FixedPoint,
    pub net_value: FixedPoint,
    pub fees: TokenBasket,
    pub payouts: Vec<BeneficiaryPayout>,
    pub bonus: InheritanceBonus,
}

impl VaultAccount {
    /// Settles the estate. Can succeed at most once per vault.
    ///
    /// Checks run in this order: not already deceased, death verified,
    /// death not before creation, allocation complete.
    pub fn settle(&self, certificate: &DeathCertificate) -> EngineResult<(VaultAccount, Distribution)> {
        self.ensure_alive()?;
        if !certificate.verified {
            return Err(PolicyViolation::NotVerifiedDeath(self.owner.clone()).into());
        }
        if certificate.death_timestamp < self.created_at {
            return Err(ValidationError::InvalidDeathTimestamp {
                death_timestamp: certificate.death_timestamp,
                created_at: self.created_at,
            }
            .into());
        }
        self.beneficiaries.require_complete()?;

        let entries = self.beneficiaries.entries();
        let claim = GrandfatherClaim {
            deceased_owner: self.owner.clone(),
            eligible_at: certificate.death_timestamp,
        };

        let mut fees = TokenBasket::new();
        let mut shares: Vec<TokenBasket> = vec![TokenBasket::new(); entries.len()];

        for (token, balance) in self.basket.non_zero() {
            let fee = balance.percentage_bps(INHERITANCE_FEE_BPS)?;
            let net = balance.checked_sub(fee)?;
            fees.credit(token, fee)?;

            let mut distributed = FixedPoint::ZERO;
            for (basket, beneficiary) in shares.iter_mut().zip(entries) {
                let share = net.percentage_bps(beneficiary.percentage_bps)?;
                basket.credit(token, share)?;
                distributed = distributed.checked_add(share)?;
            }

            let dust = net.checked_sub(distributed)?;
            if let Some(first) = shares.first_mut() {
                first.credit(token, dust)?;
            }
        }

        let bonus = compute_bonus(
            certificate.actual_age_at_death,
            certificate.life_expectancy,
            certificate.annual_footprint,
        )?;
        let bonus_total = bonus.total()?;

        let payouts = entries
            .iter()
            .zip(shares)
            .enumerate()
            .map(|(i, (beneficiary, tokens))| {
                Ok(BeneficiaryPayout {
                    address: beneficiary.address.clone(),
                    percentage_bps: beneficiary.percentage_bps,
                    guardian: beneficiary.guardian.clone(),
                    vet_equivalent: tokens.vet_equivalent()?,
                    tokens,
                    bonus_b3tr: if i == 0 { bonus_total } else { FixedPoint::ZERO },
                    grandfather_claim: claim.clone(),
                })
            })
            .collect::<Result<Vec<_>, ArithmeticError>>()?;

        let total_value = self.basket.vet_equivalent()?;
        let inheritance_fee = total_value.percentage_bps(INHERITANCE_FEE_BPS)?;
        let net_value = total_value.checked_sub(inheritance_fee)?;

        let mut next = self.clone();
        next.basket = TokenBasket::new();
        next.is_deceased = true;
        next.death_timestamp = Some(certificate.death_timestamp);
        next.refresh_locked_value()?;

        info!(
            owner = %self.owner,
            death_timestamp = certificate.death_timestamp,
            %total_value,
            %inheritance_fee,
            beneficiaries = payouts.len(),
            bonus_b3tr = %bonus_total,
            "inheritance settled"
        );

        let distribution = Distribution {
            owner: self.owner.clone(),
            death_timestamp: certificate.death_timestamp,
            total_value,
            inheritance_fee,
            net_value,
            fees,
            payouts,
            bonus,
        };
        Ok((next, distribution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::tokens;
    use crate::error::EngineError;
    use crate::vault::{Beneficiary, TokenSymbol};

    fn certificate(at: u64) -> DeathCertificate {
        DeathCertificate {
            verified: true,
            death_timestamp: at,
            actual_age_at_death: 80,
            life_expectancy: 80,
            annual_footprint: FixedPoint::ZERO,
        }
    }

    fn vault(split: &[(&str, u32)]) -> VaultAccount {
        let list = split.iter().map(|(a, bps)| Beneficiary::new(a, *bps)).collect();
        VaultAccount::create("0xowner", true, list, 100).unwrap()
    }

    #[test]
    fn sixty_forty_split_after_fee() {
        let v = vault(&[("0xa", 6_000), ("0xb", 4_000)])
            .deposit(TokenSymbol::Vet, tokens(10_000), 100)
            .unwrap();
        let (after, d) = v.settle(&certificate(1_000)).unwrap();

        assert_eq!(d.inheritance_fee, tokens(100));
        assert_eq!(d.net_value, tokens(9_900));
        assert_eq!(d.payouts[0].tokens.balance(TokenSymbol::Vet), tokens(5_940));
        assert_eq!(d.payouts[1].tokens.balance(TokenSymbol::Vet), tokens(3_960));

        assert!(after.is_deceased());
        assert_eq!(after.death_timestamp(), Some(1_000));
        assert!(after.basket().is_empty());
    }

    #[test]
    fn rounding_dust_goes_to_first_beneficiary() {
        let v = vault(&[("0xa", 3_333), ("0xb", 3_333), ("0xc", 3_334)])
            .deposit(TokenSymbol::Vet, FixedPoint::from_base_units(1_000), 100)
            .unwrap();
        let (_, d) = v.settle(&certificate(200)).unwrap();

        // fee 10, net 990: shares 329, 329, 330, dust 2.
        let got: Vec<_> = d
            .payouts
            .iter()
            .map(|p| p.tokens.balance(TokenSymbol::Vet).base_units())
            .collect();
        assert_eq!(got, vec![331, 329, 330]);
        assert_eq!(d.fees.balance(TokenSymbol::Vet).base_units(), 10);
    }

    #[test]
    fn conservation_across_tokens() {
        let v = vault(&[("0xa", 7_001), ("0xb", 2_999)])
            .deposit(TokenSymbol::Vet, FixedPoint::parse("123.456789").unwrap(), 100)
            .unwrap()
            .deposit(TokenSymbol::Vtho, FixedPoint::parse("98765.4321").unwrap(), 100)
            .unwrap();
        let (_, d) = v.settle(&certificate(500)).unwrap();

        for (token, balance) in v.basket().iter() {
            let paid = d
                .payouts
                .iter()
                .map(|p| p.tokens.balance(token))
                .try_fold(d.fees.balance(token), |acc, x| acc.checked_add(x))
                .unwrap();
            assert_eq!(paid, balance, "{token}");
        }
    }

    #[test]
    fn check_order() {
        let incomplete = vault(&[("0xa", 5_000)]);

        let mut unverified = certificate(50);
        unverified.verified = false;
        assert_eq!(
            incomplete.settle(&unverified).unwrap_err(),
            EngineError::Policy(PolicyViolation::NotVerifiedDeath("0xowner".into()))
        );

        assert_eq!(
            incomplete.settle(&certificate(50)).unwrap_err(),
            EngineError::Validation(ValidationError::InvalidDeathTimestamp {
                death_timestamp: 50,
                created_at: 100,
            })
        );

        assert_eq!(
            incomplete.settle(&certificate(150)).unwrap_err(),
            EngineError::Validation(ValidationError::AllocationIncomplete { total_bps: 5_000 })
        );
    }

    #[test]
    fn settles_only_once() {
        let v = vault(&[("0xa", 10_000)]);
        let (after, _) = v.settle(&certificate(100)).unwrap();
        assert_eq!(
            after.settle(&certificate(100)).unwrap_err(),
            EngineError::Policy(PolicyViolation::AlreadyDeceased("0xowner".into()))
        );
    }

    #[test]
    fn legacy_bonus_for_outliving_expectancy() {
        let bonus = compute_bonus(85, 80, tokens(10)).unwrap();
        assert_eq!(bonus.legacy_b3tr, tokens(600));
        assert_eq!(bonus.carbon_offset_b3tr, FixedPoint::ZERO);

        let at_expectancy = compute_bonus(80, 80, tokens(10)).unwrap();
        assert_eq!(at_expectancy.legacy_b3tr, tokens(100));
    }

    #[test]
    fn carbon_bonus_for_early_death() {
        let bonus = compute_bonus(60, 80, FixedPoint::parse("4.5").unwrap()).unwrap();
        assert_eq!(bonus.years_of_life_lost, 20);
        assert_eq!(bonus.carbon_offset_b3tr, tokens(90));
        assert_eq!(bonus.legacy_b3tr, FixedPoint::ZERO);
    }

    #[test]
    fn bonus_goes_to_first_beneficiary_and_claims_are_issued() {
        let v = vault(&[("0xa", 5_000), ("0xb", 5_000)]);
        let mut cert = certificate(400);
        cert.actual_age_at_death = 82;
        let (_, d) = v.settle(&cert).unwrap();

        assert_eq!(d.payouts[0].bonus_b3tr, tokens(300));
        assert_eq!(d.payouts[1].bonus_b3tr, FixedPoint::ZERO);
        for p in &d.payouts {
            assert_eq!(p.grandfather_claim.deceased_owner, "0xowner");
            assert_eq!(p.grandfather_claim.eligible_at, 400);
        }
    }

    #[test]
    fn free_obol_is_not_inherited() {
        let mut v = vault(&[("0xa", 10_000)]);
        v.free_obol = tokens(50);
        let (after, d) = v.settle(&certificate(100)).unwrap();
        assert_eq!(d.total_value, FixedPoint::ZERO);
        assert_eq!(after.free_obol(), tokens(50));
    }
}
