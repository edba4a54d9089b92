//! Simulation bounds and degenerate baskets

use jiff::civil::date;

use super::{daily_dates, series, three_asset_history};
use crate::analysis::{analyze, analyze_with_progress};
use crate::config::AnalysisConfig;
use crate::error::{FrontierError, InsufficientDataCause};
use crate::model::{AlignedReturns, Basket, CovarianceMatrix, Symbol};
use crate::simulation::{SimulationProgress, simulate_portfolios};

fn basket() -> Basket {
    Basket::parse(["AAA", "BBB", "CCC"]).unwrap()
}

#[test]
fn test_bounds_edges_succeed() {
    for n in [500, 50_000] {
        let config = AnalysisConfig::default().with_simulations(n);
        let result = analyze(&basket(), &three_asset_history(), &config).unwrap();
        assert_eq!(result.population.len(), n);
    }
}

#[test]
fn test_out_of_bounds_rejected_not_clamped() {
    for n in [0, 499, 50_001] {
        let config = AnalysisConfig::default().with_simulations(n);
        let err = analyze(&basket(), &three_asset_history(), &config).unwrap_err();
        assert_eq!(
            err,
            FrontierError::SimulationBoundsExceeded {
                requested: n,
                min: 500,
                max: 50_000,
            }
        );
    }
}

#[test]
fn test_custom_bounds() {
    let config = AnalysisConfig::default()
        .with_bounds(10, 100)
        .with_simulations(50);
    let result = analyze(&basket(), &three_asset_history(), &config).unwrap();
    assert_eq!(result.population.len(), 50);
}

#[test]
fn test_empty_returns_rejected_before_sampling() {
    let returns = AlignedReturns::new(vec![], date(2024, 1, 1), vec![], vec![]).unwrap();
    let covariance = CovarianceMatrix {
        symbols: vec![],
        rows: vec![],
    };
    let err = simulate_portfolios(&returns, &covariance, &AnalysisConfig::default(), None)
        .unwrap_err();
    assert_eq!(err, FrontierError::EmptyBasket);
}

#[test]
fn test_single_ticker_gets_full_weight() {
    let prices = three_asset_history();
    let basket = Basket::parse(["BBB"]).unwrap();
    let result = analyze(&basket, &prices, &AnalysisConfig::default()).unwrap();

    let b = Symbol::parse("BBB").unwrap();
    assert_eq!(result.optimal.weights.get(&b), Some(1.0));
    assert_eq!(result.correlation.to_nested_map()[&b][&b], 1.0);
    assert_eq!(result.correlation.len(), 1);
    assert!(result.correlation_summary.most_correlated.is_none());
    assert!(result.correlation_summary.diversification_score.is_none());

    // Every draw is the same portfolio
    let first = result.population.points[0];
    assert!(result.population.points.iter().all(|p| *p == first));
}

#[test]
fn test_insufficient_history() {
    let dates = daily_dates(date(2024, 1, 1), 3);
    let prices = [
        series("AAA", &dates[..1], &[10.0]),
        series("BBB", &dates, &[1.0, 2.0, 3.0]),
    ];
    let basket = Basket::parse(["AAA", "BBB"]).unwrap();
    let err = analyze(&basket, &prices, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        FrontierError::InsufficientData {
            cause: InsufficientDataCause::SinglePointSeries { points: 1, .. }
        }
    ));
}

#[test]
fn test_constant_prices_never_crash() {
    let dates = daily_dates(date(2024, 1, 1), 30);
    let prices = [
        series("FLAT", &dates, &[42.0; 30]),
        series("ALSO", &dates, &[7.0; 30]),
    ];
    let basket = Basket::parse(["FLAT", "ALSO"]).unwrap();
    let result = analyze(&basket, &prices, &AnalysisConfig::default()).unwrap();

    for stats in &result.asset_stats {
        assert_eq!(stats.annualized_volatility, 0.0);
        assert_eq!(stats.sharpe, 0.0);
    }
    assert_eq!(result.correlation.get(0, 1), 0.0);
    assert_eq!(result.optimal.volatility, 0.0);
    assert_eq!(result.optimal.sharpe, 0.0);
    // All Sharpe ratios tie at 0, so the first sample wins
    assert_eq!(result.optimal.sample_index, 0);
}

#[test]
fn test_cancelled_run_fails() {
    let progress = SimulationProgress::new(0);
    progress.cancel();
    let err = analyze_with_progress(
        &basket(),
        &three_asset_history(),
        &AnalysisConfig::default(),
        &progress,
    )
    .unwrap_err();
    assert_eq!(err, FrontierError::Cancelled);
}

#[test]
fn test_progress_reaches_total() {
    let progress = SimulationProgress::new(0);
    let config = AnalysisConfig::default().with_simulations(1_234);
    analyze_with_progress(&basket(), &three_asset_history(), &config, &progress).unwrap();
    assert_eq!(progress.total(), 1_234);
    assert_eq!(progress.completed(), 1_234);
    assert_eq!(progress.fraction(), 1.0);
}
