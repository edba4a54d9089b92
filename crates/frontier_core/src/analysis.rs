//! End-to-end pipeline: prices in, `AnalysisResult` out
//!
//! Stages run strictly forward and never touch each other's output:
//! align -> asset stats + covariance -> simulation -> downside -> assemble.

use tracing::{debug, info_span};

use crate::config::AnalysisConfig;
use crate::correlation::{correlation_matrix, correlation_summary, covariance_matrix};
use crate::downside::downside_metrics;
use crate::error::Result;
use crate::model::{
    AnalysisResult, Basket, CovarianceMatrix, HistoryWindow, OptimalPortfolio, PortfolioWeights,
    PriceSeries,
};
use crate::provider::QuoteProvider;
use crate::returns::align_prices;
use crate::simulation::{SimulationProgress, simulate_portfolios};
use crate::statistics::{basket_stats, clean_volatility};

/// Run the whole analysis over in-memory price series.
pub fn analyze(
    basket: &Basket,
    prices: &[PriceSeries],
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    run(basket, prices, config, None)
}

/// Same as [`analyze`], reporting progress and honoring cancellation.
pub fn analyze_with_progress(
    basket: &Basket,
    prices: &[PriceSeries],
    config: &AnalysisConfig,
    progress: &SimulationProgress,
) -> Result<AnalysisResult> {
    run(basket, prices, config, Some(progress))
}

/// Fetch the basket's series through `provider`, then analyze.
pub fn analyze_with_provider<P: QuoteProvider + ?Sized>(
    provider: &P,
    basket: &Basket,
    config: &AnalysisConfig,
    progress: Option<&SimulationProgress>,
) -> Result<AnalysisResult> {
    config.validate()?;
    let prices = provider.basket_series(basket)?;
    run(basket, &prices, config, progress)
}

/// `sum(w_i * sigma_i) / sigma_p`, `None` for a zero-volatility portfolio
pub fn diversification_ratio(
    weights: &[f64],
    covariance: &CovarianceMatrix,
    portfolio_volatility: f64,
) -> Option<f64> {
    if portfolio_volatility <= 0.0 {
        return None;
    }
    let weighted: f64 = weights
        .iter()
        .zip(covariance.volatilities())
        .map(|(w, sigma)| w * clean_volatility(sigma))
        .sum();
    Some(weighted / portfolio_volatility)
}

fn run(
    basket: &Basket,
    prices: &[PriceSeries],
    config: &AnalysisConfig,
    progress: Option<&SimulationProgress>,
) -> Result<AnalysisResult> {
    let _span = info_span!("analyze", assets = basket.len(), seed = config.seed).entered();
    config.validate()?;

    let returns = align_prices(basket, prices)?;
    let periodicity = config.periodicity;

    let asset_stats = basket_stats(&returns, config.risk_free_rate, periodicity);
    let covariance = covariance_matrix(&returns, periodicity);
    let correlation = correlation_matrix(&covariance);
    let correlation_summary = correlation_summary(&correlation);

    let outcome = simulate_portfolios(&returns, &covariance, config, progress)?;

    let downside = downside_metrics(
        &outcome.best_weights,
        &returns,
        config.risk_free_rate,
        periodicity,
    );
    let diversification_ratio =
        diversification_ratio(&outcome.best_weights, &covariance, outcome.best.volatility);
    let weights = PortfolioWeights::new(basket.symbols().to_vec(), outcome.best_weights)?;

    let optimal = OptimalPortfolio {
        weights,
        expected_return: outcome.best.expected_return,
        volatility: outcome.best.volatility,
        sharpe: outcome.best.sharpe,
        sample_index: outcome.best_index,
        diversification_ratio,
        downside,
    };

    let history = HistoryWindow {
        start: returns.base_date(),
        end: returns.dates()[returns.len() - 1],
        periods: returns.len(),
    };

    debug!(
        periods = history.periods,
        sharpe = optimal.sharpe,
        "analysis assembled"
    );

    Ok(AnalysisResult {
        basket: basket.clone(),
        config: config.clone(),
        history,
        asset_stats,
        correlation,
        correlation_summary,
        covariance,
        optimal,
        population: outcome.population,
    })
}
