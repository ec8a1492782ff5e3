//! 지표/점수 계산 속성 테스트.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use ranker_analytics::indicators::momentum::rsi;
use ranker_analytics::indicators::risk::max_drawdown_pct;
use ranker_analytics::{normalize, score_instrument};
use ranker_core::{PriceBar, PriceSeries, ScoringWeights};

fn series_from(closes: &[f64]) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            PriceBar::flat(
                start + Duration::days(i as i64),
                Decimal::from_f64(c).unwrap(),
                dec!(1),
            )
        })
        .collect();
    PriceSeries::new(bars).unwrap()
}

fn compound(returns: &[f64]) -> Vec<f64> {
    let mut price = 100.0;
    let mut closes = vec![price];
    for r in returns {
        price *= 1.0 + r;
        closes.push(price);
    }
    closes
}

#[test]
fn test_default_weights_sum_to_one() {
    let weights = ScoringWeights::default();
    assert!((weights.sum() - 1.0).abs() <= 1e-9);
    assert!(weights.validate().is_ok());
}

proptest! {
    #[test]
    fn prop_normalize_in_range(
        v in any::<f64>(),
        min in -1.0e6f64..0.0,
        span in 1.0f64..1.0e6,
    ) {
        let n = normalize(v, min, min + span);
        prop_assert!((0.0..=100.0).contains(&n));
    }

    #[test]
    fn prop_rsi_in_range(prices in prop::collection::vec(1.0f64..1000.0, 15..200)) {
        for value in rsi(&prices, 14).into_iter().flatten() {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn prop_max_drawdown_non_positive(prices in prop::collection::vec(0.01f64..1000.0, 1..200)) {
        prop_assert!(max_drawdown_pct(&prices) <= 0.0);
    }

    #[test]
    fn prop_max_drawdown_zero_when_non_decreasing(
        steps in prop::collection::vec(0.0f64..5.0, 1..200),
    ) {
        let prices: Vec<f64> = steps
            .iter()
            .scan(10.0, |acc, s| {
                *acc += s;
                Some(*acc)
            })
            .collect();
        prop_assert_eq!(max_drawdown_pct(&prices), 0.0);
    }

    #[test]
    fn prop_score_is_deterministic(
        returns in prop::collection::vec(-0.05f64..0.05, 19..150),
    ) {
        let series = series_from(&compound(&returns));
        let a = score_instrument(&series, None).unwrap();
        let b = score_instrument(&series, None).unwrap();
        prop_assert_eq!(a.total.to_bits(), b.total.to_bits());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_total_in_range(
        returns in prop::collection::vec(-0.08f64..0.08, 19..150),
    ) {
        let breakdown = score_instrument(&series_from(&compound(&returns)), None).unwrap();
        prop_assert!((0.0..=100.0).contains(&breakdown.total));
    }

    #[test]
    fn prop_higher_volatility_never_scores_higher(
        returns in prop::collection::vec(-0.02f64..0.02, 30..120),
    ) {
        let amplified: Vec<f64> = returns.iter().map(|r| r * 2.0).collect();

        let calm = score_instrument(&series_from(&compound(&returns)), None).unwrap();
        let wild = score_instrument(&series_from(&compound(&amplified)), None).unwrap();

        prop_assert!(wild.raw.volatility_pct + 1e-9 >= calm.raw.volatility_pct);
        prop_assert!(wild.sub_scores.volatility <= calm.sub_scores.volatility + 1e-6);
    }
}
