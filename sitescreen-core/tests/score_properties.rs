//! Property-based tests for the suitability score.
//!
//! # Invariants tested
//!
//! - **Range:** every score of a valid indicator set lies in `[0, 1]`.
//! - **Monotonicity:** raising one indicator never lowers the score.
//! - **Determinism:** identical input yields an identical score.
//! - **Validation:** out-of-range input is rejected, never clamped.
#![expect(
    clippy::float_arithmetic,
    reason = "properties compare floating-point scores"
)]

use proptest::prelude::*;
use sitescreen_core::{Indicator, IndicatorRecord, IndicatorSet, ScoreError, compute_score};

fn unit() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(1.0), 0.0_f64..=1.0]
}

fn indicator_values() -> impl Strategy<Value = [f64; 5]> {
    [unit(), unit(), unit(), unit(), unit()]
}

fn build(values: [f64; 5]) -> IndicatorSet {
    let [bare, flat, flood, road, unprotected] = values;
    IndicatorSet::new(bare, flat, flood, road, unprotected).expect("values are in range")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn score_stays_in_unit_interval(values in indicator_values()) {
        let score = compute_score(&build(values)).value();
        prop_assert!((0.0..=1.0).contains(&score), "score {score} out of range");
    }

    #[test]
    fn raising_an_indicator_never_lowers_the_score(
        values in indicator_values(),
        position in 0_usize..5,
        bump in 0.0_f64..=1.0,
    ) {
        let before = compute_score(&build(values)).value();
        let mut raised = values;
        if let Some(slot) = raised.get_mut(position) {
            *slot = (*slot + bump).min(1.0);
        }
        let after = compute_score(&build(raised)).value();
        prop_assert!(after + 1e-12 >= before, "{after} < {before}");
    }

    #[test]
    fn scoring_is_deterministic(values in indicator_values()) {
        let set = build(values);
        prop_assert_eq!(compute_score(&set), compute_score(&set));
    }

    #[test]
    fn out_of_range_values_are_rejected(
        excess in prop_oneof![1.000_001_f64..1e6, -1e6_f64..-0.000_001],
        field in proptest::sample::select(Indicator::ALL.to_vec()),
    ) {
        let mut record = IndicatorRecord::from(build([0.5; 5]));
        match field {
            Indicator::BareAndDry => record.is_bare_and_dry = Some(excess),
            Indicator::Flat => record.is_flat = Some(excess),
            Indicator::FloodFree => record.is_flood_free = Some(excess),
            Indicator::NearRoad => record.is_near_road = Some(excess),
            Indicator::Unprotected => record.is_unprotected = Some(excess),
        }
        let err = IndicatorSet::try_from(record).expect_err("out of range");
        prop_assert_eq!(err, ScoreError::out_of_range(field, excess));
    }
}
