//! Per-asset annualized statistics
//!
//! Every annualization in a run uses the same `periods_per_year`, taken from
//! the run's `Periodicity`.

use tracing::debug;

use crate::config::Periodicity;
use crate::model::{AlignedReturns, AssetStats, Symbol};

/// Annualized volatilities below this are treated as exactly zero.
///
/// A constant return stream can come out of the variance sum with a
/// round-off residue around 1e-17; dividing an excess return by that would
/// report an absurd Sharpe ratio.
pub const ZERO_VOLATILITY_EPSILON: f64 = 1e-10;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); 0 for fewer than two values
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Population standard deviation (n); 0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / values.len() as f64).sqrt()
}

/// Snap round-off volatility to zero
pub fn clean_volatility(volatility: f64) -> f64 {
    if volatility.is_finite() && volatility >= ZERO_VOLATILITY_EPSILON {
        volatility
    } else {
        0.0
    }
}

/// `(annual_return - risk_free) / volatility`, 0 when volatility is 0
pub fn sharpe_ratio(annual_return: f64, volatility: f64, risk_free_rate: f64) -> f64 {
    if volatility > 0.0 {
        (annual_return - risk_free_rate) / volatility
    } else {
        0.0
    }
}

pub fn asset_stats(
    symbol: &Symbol,
    returns: &[f64],
    risk_free_rate: f64,
    periodicity: Periodicity,
) -> AssetStats {
    let ppy = periodicity.periods_per_year();
    let annualized_return = mean(returns) * ppy;
    let annualized_volatility = clean_volatility(sample_std_dev(returns) * ppy.sqrt());
    AssetStats {
        symbol: symbol.clone(),
        annualized_return,
        annualized_volatility,
        sharpe: sharpe_ratio(annualized_return, annualized_volatility, risk_free_rate),
    }
}

/// Stats for every basket column, in basket order
pub fn basket_stats(
    returns: &AlignedReturns,
    risk_free_rate: f64,
    periodicity: Periodicity,
) -> Vec<AssetStats> {
    let stats: Vec<AssetStats> = returns
        .symbols()
        .iter()
        .zip(returns.columns())
        .map(|(symbol, column)| asset_stats(symbol, column, risk_free_rate, periodicity))
        .collect();

    for s in &stats {
        debug!(
            symbol = %s.symbol,
            annualized_return = s.annualized_return,
            annualized_volatility = s.annualized_volatility,
            sharpe = s.sharpe,
            "asset statistics"
        );
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol::parse(name).unwrap()
    }

    #[test]
    fn test_std_devs() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std_dev(&values) - 2.0).abs() < 1e-12);
        assert!((sample_std_dev(&values) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std_dev(&[1.0]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
    }

    #[test]
    fn test_constant_returns_have_zero_sharpe() {
        let returns = vec![0.01; 10];
        let stats = asset_stats(&sym("AAA"), &returns, 0.0, Periodicity::Daily);
        assert!((stats.annualized_return - 2.52).abs() < 1e-9);
        assert_eq!(stats.annualized_volatility, 0.0);
        assert_eq!(stats.sharpe, 0.0);
    }

    #[test]
    fn test_sharpe_uses_excess_return() {
        let returns = [0.01, -0.01, 0.02, 0.0];
        let stats = asset_stats(&sym("AAA"), &returns, 0.02, Periodicity::Monthly);
        let expected_ret = mean(&returns) * 12.0;
        let expected_vol = sample_std_dev(&returns) * 12f64.sqrt();
        assert!((stats.annualized_return - expected_ret).abs() < 1e-12);
        assert!((stats.annualized_volatility - expected_vol).abs() < 1e-12);
        assert!((stats.sharpe - (expected_ret - 0.02) / expected_vol).abs() < 1e-12);
    }

    #[test]
    fn test_clean_volatility() {
        assert_eq!(clean_volatility(1e-17), 0.0);
        assert_eq!(clean_volatility(f64::NAN), 0.0);
        assert_eq!(clean_volatility(0.15), 0.15);
    }
}
