//! End-to-end tests of a vault's life: creation, deposits, reward accrual,
//! withdrawals, and inheritance settlement, through both the pure engine
//! API and the sled-backed store.
//!
//! Every test builds its own vault (and, where needed, its own temporary
//! store). No shared state.

use sarcophagus_protocol::config::{EMERGENCY_UNLOCK_SECS, SECONDS_PER_DAY, SECONDS_PER_YEAR};
use sarcophagus_protocol::lifecycle::timelock::{evaluate, format_countdown};
use sarcophagus_protocol::rewards::compute_weight;
use sarcophagus_protocol::{
    Beneficiary, DeathCertificate, EngineError, ErrorKind, FixedPoint, GrandfatherClaim,
    PolicyViolation, StoreError, TokenSymbol, VaultAccount, VaultStore, WithdrawalKind,
    WithdrawalTier,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const OWNER: &str = "0xowner";

fn amount(s: &str) -> FixedPoint {
    FixedPoint::parse(s).expect("valid amount")
}

fn new_vault(split: &[(&str, u32)]) -> VaultAccount {
    let beneficiaries = split.iter().map(|(a, bps)| Beneficiary::new(a, *bps)).collect();
    VaultAccount::create(OWNER, true, beneficiaries, 0).expect("vault creates")
}

fn certificate(at: u64) -> DeathCertificate {
    DeathCertificate {
        verified: true,
        death_timestamp: at,
        actual_age_at_death: 78,
        life_expectancy: 78,
        annual_footprint: FixedPoint::ZERO,
    }
}

/// `tenths` tenths of a Julian year, in seconds.
fn years_tenths(tenths: u64) -> u64 {
    SECONDS_PER_YEAR * tenths / 10
}

// ---------------------------------------------------------------------------
// Time lock
// ---------------------------------------------------------------------------

#[test]
fn emergency_withdrawal_at_six_point_nine_years_is_refused() {
    let vault = new_vault(&[("0xheir", 10_000)])
        .deposit(TokenSymbol::Vet, amount("1000"), 0)
        .unwrap();

    let err = vault
        .request_withdrawal(WithdrawalKind::Emergency, years_tenths(69))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Policy);
    match err {
        EngineError::Policy(PolicyViolation::NotYetEligible {
            tier,
            seconds_remaining,
        }) => {
            assert_eq!(tier, WithdrawalTier::Emergency);
            assert_eq!(seconds_remaining, EMERGENCY_UNLOCK_SECS - years_tenths(69));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn emergency_withdrawal_after_seven_years_returns_one_hundred_vet() {
    let vault = new_vault(&[("0xheir", 10_000)])
        .deposit(TokenSymbol::Vet, amount("1000"), 0)
        .unwrap();

    let now = SECONDS_PER_YEAR * 701 / 100;
    let (after, receipt) = vault
        .request_withdrawal(WithdrawalKind::Emergency, now)
        .unwrap();

    assert_eq!(receipt.tier, WithdrawalTier::Emergency);
    assert_eq!(receipt.penalty_bps, 9_000);
    assert_eq!(receipt.net_vet, amount("100"));
    assert!(after.basket().is_empty());
}

#[test]
fn status_reports_countdowns() {
    let status = evaluate(EMERGENCY_UNLOCK_SECS - 3 * SECONDS_PER_DAY, 0);
    assert!(!status.can_emergency);
    assert_eq!(format_countdown(status.seconds_until_emergency), "3d 0h 0m");
}

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

#[test]
fn weight_saturates_at_five_thousand_vet_and_three_years() {
    assert_eq!(compute_weight(amount("5000"), 3), 250);

    let vault = new_vault(&[("0xheir", 10_000)])
        .deposit(TokenSymbol::Vet, amount("5000"), 0)
        .unwrap();
    let rate = vault.reward_rate_at(3 * SECONDS_PER_YEAR);
    assert_eq!(rate.weight, 250);
    assert_eq!(rate.daily_rate_ppm().unwrap(), amount("200"));
}

#[test]
fn deposit_checkpoints_accrual_at_old_rate() {
    // 500 VET at 100 ppm/day: 0.05 OBOL/day.
    let vault = new_vault(&[("0xheir", 10_000)])
        .deposit(TokenSymbol::Vet, amount("500"), 0)
        .unwrap()
        .deposit(TokenSymbol::Vet, amount("4500"), 10 * SECONDS_PER_DAY)
        .unwrap();

    assert_eq!(vault.obol_stake().pending_rewards, amount("0.5"));
    assert_eq!(vault.obol_stake().last_accrual_time, 10 * SECONDS_PER_DAY);
    assert_eq!(vault.obol_stake().locked_value, amount("5000"));
}

#[test]
fn claimed_obol_can_be_locked_and_inherited() {
    let (vault, receipt) = new_vault(&[("0xheir", 10_000)])
        .deposit(TokenSymbol::Vet, amount("500"), 0)
        .unwrap()
        .claim(200 * SECONDS_PER_DAY)
        .unwrap();
    assert_eq!(receipt.claimed, amount("10"));

    let vault = vault
        .lock_for_inheritance(amount("10"), 200 * SECONDS_PER_DAY)
        .unwrap();
    let (_, distribution) = vault.settle(&certificate(201 * SECONDS_PER_DAY)).unwrap();

    let heir = &distribution.payouts[0];
    assert_eq!(heir.tokens.balance(TokenSymbol::Obol), amount("9.9"));
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

#[test]
fn sixty_forty_inheritance_of_ten_thousand_vet() {
    let vault = new_vault(&[("0xa", 6_000), ("0xb", 4_000)])
        .deposit(TokenSymbol::Vet, amount("10000"), 0)
        .unwrap();

    let (after, d) = vault.settle(&certificate(SECONDS_PER_YEAR)).unwrap();
    assert_eq!(d.inheritance_fee, amount("100"));
    assert_eq!(d.payouts[0].vet_equivalent, amount("5940"));
    assert_eq!(d.payouts[1].vet_equivalent, amount("3960"));
    assert!(after.is_deceased());

    let err = after.deposit(TokenSymbol::Vet, amount("1"), SECONDS_PER_YEAR).unwrap_err();
    assert_eq!(
        err,
        EngineError::Policy(PolicyViolation::AlreadyDeceased(OWNER.into()))
    );
}

#[test]
fn heir_reopening_within_window_is_grandfathered() {
    let (_, d) = new_vault(&[("0xheir", 10_000)])
        .deposit(TokenSymbol::Vet, amount("1000"), 0)
        .unwrap()
        .settle(&certificate(1_000))
        .unwrap();

    let claim: GrandfatherClaim = d.payouts[0].grandfather_claim.clone();
    let heir_vault = VaultAccount::create(
        "0xheir",
        true,
        vec![Beneficiary::new("0xgrandchild", 10_000)],
        1_000 + 30 * SECONDS_PER_DAY,
    )
    .unwrap()
    .with_grandfather_claim(claim.clone());
    assert!(heir_vault.is_grandfathered());

    let late = VaultAccount::create(
        "0xheir",
        true,
        vec![Beneficiary::new("0xgrandchild", 10_000)],
        1_000 + 91 * SECONDS_PER_DAY,
    )
    .unwrap()
    .with_grandfather_claim(claim);
    assert!(!late.is_grandfathered());
}

// ---------------------------------------------------------------------------
// Determinism and persistence
// ---------------------------------------------------------------------------

#[test]
fn identical_operation_logs_produce_identical_digests() {
    let run = || {
        let v = new_vault(&[("0xa", 5_000), ("0xb", 5_000)])
            .deposit(TokenSymbol::Vet, amount("1234.5"), 10)
            .unwrap()
            .deposit(TokenSymbol::Vtho, amount("99999"), 20)
            .unwrap();
        let (v, _) = v.claim(40 * SECONDS_PER_DAY).unwrap();
        v.state_digest()
    };
    assert_eq!(run(), run());
}

#[test]
fn store_drives_full_lifecycle() {
    let store = VaultStore::open_temporary().unwrap();
    store.insert_new(&new_vault(&[("0xheir", 10_000)])).unwrap();

    store
        .apply(OWNER, |v| {
            v.deposit(TokenSymbol::Glo, amount("300"), 5).map(|n| (n, ()))
        })
        .unwrap();
    let claimed = store
        .apply(OWNER, |v| v.claim(5 + 20 * SECONDS_PER_DAY))
        .unwrap();
    assert!(!claimed.claimed.is_zero());

    let distribution = store.apply(OWNER, |v| v.settle(&certificate(SECONDS_PER_YEAR))).unwrap();
    assert_eq!(distribution.total_value, amount("300"));

    let err = store.apply(OWNER, |v| v.settle(&certificate(SECONDS_PER_YEAR))).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Engine(EngineError::Policy(PolicyViolation::AlreadyDeceased(_)))
    ));
    assert!(store.load(OWNER).unwrap().is_deceased());
}
