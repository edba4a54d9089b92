//! Portfolio analytics and Monte Carlo allocation engine
//!
//! This crate turns historical price series for a basket of assets into:
//! - Per-asset annualized return, volatility and Sharpe ratio
//! - Correlation and covariance matrices across the basket
//! - A maximum-Sharpe long-only allocation found by randomized search
//! - Drawdown, worst-period and Sortino figures for that allocation
//!
//! Runs are pure and reproducible: the seed and periodicity live in an explicit
//! [`AnalysisConfig`], and the simulation output does not depend on how many
//! threads evaluate it.
//!
//! ```ignore
//! use frontier_core::{AnalysisConfig, Basket, InMemoryQuotes, analyze_with_provider};
//!
//! let quotes: InMemoryQuotes = load_series().into_iter().collect();
//! let basket = Basket::parse(["aapl", "msft", "tlt"])?;
//! let config = AnalysisConfig::default().with_simulations(10_000).with_seed(7);
//!
//! let result = analyze_with_provider(&quotes, &basket, &config, None)?;
//! println!("{:?}", result.optimal.weights.to_map());
//! ```

#![warn(clippy::all)]

// ============================================================================
// Pipeline stages
// ============================================================================

pub mod analysis;
pub mod correlation;
pub mod downside;
pub mod returns;
pub mod simulation;
pub mod statistics;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod error;
pub mod model;
pub mod provider;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{analyze, analyze_with_progress, analyze_with_provider};
pub use config::{AnalysisConfig, Periodicity, SimulationBounds, WeightSampling};
pub use error::{FrontierError, InsufficientDataCause, Result};
pub use model::{AnalysisResult, Basket, PricePoint, PriceSeries, Symbol};
pub use provider::{InMemoryQuotes, QuoteProvider};
pub use simulation::SimulationProgress;
