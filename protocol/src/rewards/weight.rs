//! # Reward Weight
//!
//! A vault's reward weight grows with how much it locks and how long its
//! owner has participated:
//!
//! ```text
//! weight = min(250, 100 + 20 × ⌊vetEq / 1000⌋ + 30 × ⌊years⌋)
//! ```
//!
//! The daily rate is interpolated linearly between 100 ppm at weight 100
//! and 200 ppm at weight 250, then boosted 1.5× for grandfathered vaults.
//!
//! Rates are carried as an exact rational over [`RATE_DENOMINATOR`] so
//! the daily amount is a single floored `mul_ratio` with no intermediate
//! rounding.

use serde::{Deserialize, Serialize};

use crate::amount::{ArithmeticError, FixedPoint};
use crate::config::{
    BASE_DAILY_RATE_PPM, BASE_WEIGHT, BPS_DENOMINATOR, GRANDFATHER_MULTIPLIER_BPS,
    MAX_DAILY_RATE_PPM, MAX_WEIGHT, PARTICIPATION_WEIGHT_PER_YEAR, PPM_DENOMINATOR,
    SECONDS_PER_YEAR, VALUE_WEIGHT_PER_STEP, VALUE_WEIGHT_STEP_UNITS,
};

/// Width of the interpolation range.
const WEIGHT_SPAN: u128 = (MAX_WEIGHT - BASE_WEIGHT) as u128;

/// Denominator of [`RewardRate::numerator`]: ppm × weight span × bps.
pub const RATE_DENOMINATOR: u128 = PPM_DENOMINATOR * WEIGHT_SPAN * BPS_DENOMINATOR;

/// Whole Julian years between `start` and `now`.
pub fn years_in_system(start: u64, now: u64) -> u64 {
    now.saturating_sub(start) / SECONDS_PER_YEAR
}

/// Reward weight for a locked value and participation time. Saturates at
/// [`MAX_WEIGHT`].
pub fn compute_weight(vet_equivalent: FixedPoint, years: u64) -> u64 {
    let steps = vet_equivalent.whole_units() / VALUE_WEIGHT_STEP_UNITS;
    let value_weight = u64::try_from(steps)
        .unwrap_or(u64::MAX)
        .saturating_mul(VALUE_WEIGHT_PER_STEP);
    let participation_weight = years.saturating_mul(PARTICIPATION_WEIGHT_PER_YEAR);

    BASE_WEIGHT
        .saturating_add(value_weight)
        .saturating_add(participation_weight)
        .min(MAX_WEIGHT)
}

/// A daily reward rate, exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRate {
    pub weight: u64,
    pub grandfathered: bool,
    /// Daily rate as `numerator / RATE_DENOMINATOR` of locked value.
    pub numerator: u128,
}

impl RewardRate {
    /// Interpolates the rate for `weight`; weights outside `100..=250` are
    /// clamped into range first.
    pub fn for_weight(weight: u64, grandfathered: bool) -> Self {
        let w = weight.clamp(BASE_WEIGHT, MAX_WEIGHT);
        let base = BASE_DAILY_RATE_PPM as u128;
        let max = MAX_DAILY_RATE_PPM as u128;
        let above_base = (w - BASE_WEIGHT) as u128;

        // ppm × WEIGHT_SPAN
        let scaled_ppm = base * WEIGHT_SPAN + (max - base) * above_base;
        let multiplier_bps = if grandfathered {
            GRANDFATHER_MULTIPLIER_BPS as u128
        } else {
            BPS_DENOMINATOR
        };

        Self {
            weight: w,
            grandfathered,
            numerator: scaled_ppm * multiplier_bps,
        }
    }

    /// The rate in ppm, floored to 18 decimals.
    pub fn daily_rate_ppm(&self) -> Result<FixedPoint, ArithmeticError> {
        FixedPoint::from_whole(self.numerator)?.mul_ratio(1, WEIGHT_SPAN * BPS_DENOMINATOR)
    }

    /// OBOL earned per day on `locked_value`.
    pub fn daily_amount(&self, locked_value: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
        locked_value.mul_ratio(self.numerator, RATE_DENOMINATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::tokens;

    #[test]
    fn weight_starts_at_base() {
        assert_eq!(compute_weight(FixedPoint::ZERO, 0), 100);
        assert_eq!(compute_weight(tokens(999), 0), 100);
    }

    #[test]
    fn weight_counts_value_steps_and_years() {
        assert_eq!(compute_weight(tokens(1_000), 0), 120);
        assert_eq!(compute_weight(tokens(2_500), 1), 100 + 40 + 30);
    }

    #[test]
    fn weight_saturates() {
        // 100 + 100 + 90 = 290, capped.
        assert_eq!(compute_weight(tokens(5_000), 3), 250);
        assert_eq!(compute_weight(FixedPoint::from_base_units(u128::MAX), u64::MAX), 250);
    }

    #[test]
    fn years_are_whole_julian_years() {
        assert_eq!(years_in_system(0, SECONDS_PER_YEAR - 1), 0);
        assert_eq!(years_in_system(0, 3 * SECONDS_PER_YEAR), 3);
        assert_eq!(years_in_system(10, 5), 0);
    }

    #[test]
    fn rate_interpolates_between_bounds() {
        let low = RewardRate::for_weight(100, false).daily_rate_ppm().unwrap();
        let high = RewardRate::for_weight(250, false).daily_rate_ppm().unwrap();
        let mid = RewardRate::for_weight(175, false).daily_rate_ppm().unwrap();
        assert_eq!(low, tokens(100));
        assert_eq!(high, tokens(200));
        assert_eq!(mid, tokens(150));
    }

    #[test]
    fn grandfathering_boosts_by_half() {
        let rate = RewardRate::for_weight(250, true);
        assert_eq!(rate.daily_rate_ppm().unwrap(), tokens(300));
    }

    #[test]
    fn daily_amount_at_base_rate() {
        // 1000 VET × 100 ppm = 0.1 OBOL per day.
        let rate = RewardRate::for_weight(100, false);
        assert_eq!(
            rate.daily_amount(tokens(1_000)).unwrap(),
            FixedPoint::parse("0.1").unwrap()
        );
    }

    #[test]
    fn out_of_range_weights_clamp() {
        assert_eq!(RewardRate::for_weight(0, false), RewardRate::for_weight(100, false));
        assert_eq!(RewardRate::for_weight(999, false), RewardRate::for_weight(250, false));
    }
}
