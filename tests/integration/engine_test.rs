//! Integration tests for the volatility engine

use crate::{flat_bars, ranged_bars, wave};
use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use realized_vol::model::{HodgesTompkinsVol, VolatilityEngine, VolatilityKind};
use realized_vol::series::{FillPolicy, PriceSeries, RawBar};
use realized_vol::VolError;

const ALTERNATING: [f64; 21] = [
    100.0, 101.0, 99.0, 105.0, 95.0, 110.0, 90.0, 115.0, 85.0, 120.0, 80.0, 125.0, 75.0, 130.0,
    70.0, 135.0, 65.0, 140.0, 60.0, 145.0, 55.0,
];

/// Bars with low <= open, close <= high
fn ohlc_bars() -> impl Strategy<Value = Vec<RawBar>> {
    prop::collection::vec((1.0f64..1000.0, 0.0f64..0.2, 0.0f64..=1.0, 0.0f64..=1.0), 12..60)
        .prop_map(|specs| {
            let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (low, span, o, c))| {
                    let high = low * (1.0 + span);
                    let at = |f: f64| (low + f * (high - low)).clamp(low, high);
                    RawBar::new(start + Duration::days(i as i64), at(o), high, low, at(c))
                })
                .collect()
        })
}

fn series(bars: Vec<RawBar>) -> PriceSeries {
    PriceSeries::normalize(bars, FillPolicy::ForwardBackward).unwrap()
}

fn sample_std(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[test]
fn test_alternating_closes_window_ten() {
    let engine = VolatilityEngine::new(10).unwrap().annualized(false);
    let rv = engine.realized_vol(&series(flat_bars(&ALTERNATING))).unwrap();

    assert_eq!(rv.len(), ALTERNATING.len());
    assert!(rv[..9].iter().all(Option::is_none));
    assert!(rv[9..].iter().all(|v| v.is_some_and(|v| v > 0.0)));

    // returns[i] is the log return into bar i + 1
    let returns: Vec<f64> = ALTERNATING.windows(2).map(|w| (w[1] / w[0]).ln()).collect();

    // Bar 9 only has the nine returns after bar 0
    assert_relative_eq!(rv[9].unwrap(), sample_std(&returns[..9]), epsilon = 1e-9);
    // From bar 10 on the window holds ten returns
    assert_relative_eq!(rv[10].unwrap(), sample_std(&returns[..10]), epsilon = 1e-9);
    assert_relative_eq!(rv[10].unwrap(), 0.237_003_422_595_312_3, epsilon = 1e-9);
    assert_relative_eq!(rv[20].unwrap(), sample_std(&returns[10..20]), epsilon = 1e-9);
}

#[test]
fn test_window_of_two_is_defined_from_third_bar() {
    let engine = VolatilityEngine::new(2).unwrap();
    let rv = engine.realized_vol(&series(flat_bars(&ALTERNATING))).unwrap();

    assert_eq!(rv[0], None);
    assert_eq!(rv[1], None);
    assert!(rv[2..].iter().all(|v| v.is_some_and(|v| v > 0.0)));
}

#[test]
fn test_all_estimators_share_dates() {
    let engine = VolatilityEngine::new(21).unwrap();
    let prices = series(ranged_bars(&wave(120)));
    let result = engine.calculate_all(&prices).unwrap();

    assert_eq!(result.dates(), prices.dates());
    assert_eq!(result.kinds().collect::<Vec<_>>(), VolatilityKind::ALL.to_vec());
    for kind in VolatilityKind::ALL {
        let column = result.column(kind).unwrap();
        assert_eq!(column.len(), 120);
        let first = if kind == VolatilityKind::HodgesTompkins { 21 } else { 20 };
        assert!(column[..first].iter().all(Option::is_none), "{kind}");
        assert!(column[first..].iter().all(Option::is_some), "{kind}");
    }
}

#[test]
fn test_hodges_tompkins_ratio() {
    let engine = VolatilityEngine::new(21).unwrap();
    let prices = series(ranged_bars(&wave(252)));
    let rv = engine.realized_vol(&prices).unwrap();
    let ht = engine.hodges_tompkins_vol(&prices).unwrap();

    let n = 251.0 - 21.0 + 1.0;
    let expected = 1.0 / (1.0 - 21.0 / n + (21.0f64 * 21.0 - 1.0) / (3.0 * n * n));
    assert_relative_eq!(
        HodgesTompkinsVol::adjustment(21, 251).unwrap(),
        expected,
        epsilon = 1e-12
    );
    assert_relative_eq!(ht[251].unwrap() / rv[251].unwrap(), expected, epsilon = 1e-9);

    // Without gaps, t valid returns have been seen by bar t
    for (t, (r, h)) in rv.iter().zip(&ht).enumerate() {
        match (r, h, HodgesTompkinsVol::adjustment(21, t)) {
            (Some(r), Some(h), Some(adj)) => assert_relative_eq!(h / r, adj, epsilon = 1e-9),
            (_, None, None) | (None, None, _) => {}
            other => panic!("misaligned at {t}: {other:?}"),
        }
    }
    assert!(ht[20].is_none() && rv[20].is_some());
}

#[test]
fn test_select_subset() {
    let engine = VolatilityEngine::new(5).unwrap();
    let prices = series(ranged_bars(&wave(40)));
    let all = engine.calculate_all(&prices).unwrap();
    let chosen = [VolatilityKind::GarmanKlass, VolatilityKind::Realized];

    let subset = engine.calculate(&prices, &chosen).unwrap();
    assert_eq!(subset, all.select(&chosen));
    assert_eq!(
        subset.kinds().collect::<Vec<_>>(),
        vec![VolatilityKind::Realized, VolatilityKind::GarmanKlass]
    );
}

#[test]
fn test_unannualized_is_scaled_down() {
    let prices = series(ranged_bars(&wave(60)));
    let annual = VolatilityEngine::new(10).unwrap().parkinson_vol(&prices).unwrap();
    let daily = VolatilityEngine::new(10)
        .unwrap()
        .annualized(false)
        .parkinson_vol(&prices)
        .unwrap();

    for (a, d) in annual.iter().zip(&daily).skip(9) {
        assert_relative_eq!(a.unwrap(), d.unwrap() * 252f64.sqrt(), epsilon = 1e-12);
    }
}

#[test]
fn test_short_series_rejected() {
    let engine = VolatilityEngine::new(30).unwrap();
    let err = engine.calculate_all(&series(flat_bars(&wave(29)))).unwrap_err();
    assert_eq!(
        err,
        VolError::InsufficientData {
            required: 30,
            available: 29
        }
    );
}

#[test]
fn test_gap_with_no_fill_propagates() {
    let mut bars = ranged_bars(&wave(30));
    bars[15].close = None;
    let prices = PriceSeries::normalize(bars, FillPolicy::None).unwrap();
    let rv = VolatilityEngine::new(5).unwrap().realized_vol(&prices).unwrap();

    // Returns into and out of bar 15 are missing, poisoning t = 15..=20
    assert!(rv[15..21].iter().all(Option::is_none));
    assert!(rv[14].is_some());
    assert!(rv[21].is_some());
}

proptest! {
    #[test]
    fn prop_realized_vol_is_scale_invariant(
        closes in prop::collection::vec(1.0f64..1000.0, 12..40),
        factor in 0.01f64..100.0,
        window in 3usize..10,
    ) {
        let engine = VolatilityEngine::new(window).unwrap();
        let scaled: Vec<f64> = closes.iter().map(|c| c * factor).collect();

        let base = engine.realized_vol(&series(flat_bars(&closes))).unwrap();
        let moved = engine.realized_vol(&series(flat_bars(&scaled))).unwrap();

        for (a, b) in base.iter().zip(&moved) {
            match (a, b) {
                (Some(a), Some(b)) => prop_assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0)),
                (None, None) => {}
                _ => prop_assert!(false, "definedness changed under scaling"),
            }
        }
    }

    #[test]
    fn prop_estimators_defined_after_warmup(
        bars in ohlc_bars(),
        window in 2usize..=12,
    ) {
        let n = bars.len();
        let engine = VolatilityEngine::new(window).unwrap();
        let result = engine.calculate_all(&series(bars)).unwrap();

        for kind in VolatilityKind::ALL {
            let column = result.column(kind).unwrap();
            prop_assert_eq!(column.len(), n);

            // Return-based estimators lose bar 0; at window 2 a lone return has no deviation
            // and the first Hodges-Tompkins overlap has a zero denominator
            let first = match kind {
                VolatilityKind::Parkinson | VolatilityKind::GarmanKlass => window - 1,
                VolatilityKind::Realized if window == 2 => 2,
                VolatilityKind::Realized => window - 1,
                VolatilityKind::HodgesTompkins if window == 2 => 3,
                VolatilityKind::HodgesTompkins => window,
            };
            prop_assert!(column[..window - 1].iter().all(Option::is_none), "{} prefix", kind);
            prop_assert!(column[..first].iter().all(Option::is_none), "{} warmup", kind);
            for (t, v) in column.iter().enumerate().skip(first) {
                prop_assert!(
                    v.is_some_and(|v| v.is_finite() && v >= 0.0),
                    "{} at {}: {:?}", kind, t, v
                );
            }
        }
    }
}
