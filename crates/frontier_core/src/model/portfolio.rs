//! Portfolio-level types: weights, simulated candidates, the chosen allocation
//! and its downside profile.

use std::collections::BTreeMap;

use jiff::civil::Date;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ids::Symbol;
use super::keyed::SymbolEntries;
use crate::error::{FrontierError, Result};

/// Tolerance for the fully-invested constraint
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Per-asset risk/return profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStats {
    pub symbol: Symbol,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe: f64,
}

/// Long-only, fully-invested allocation.
///
/// Serializes as `{symbol: weight}` in basket order.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioWeights {
    symbols: Vec<Symbol>,
    weights: Vec<f64>,
}

impl PortfolioWeights {
    pub fn new(symbols: Vec<Symbol>, weights: Vec<f64>) -> Result<Self> {
        if symbols.len() != weights.len() {
            return Err(FrontierError::invalid_input(
                "weights",
                format!("{} symbols but {} weights", symbols.len(), weights.len()),
            ));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(FrontierError::invalid_input(
                "weights",
                format!("weight {w} is negative or non-finite"),
            ));
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(FrontierError::invalid_input(
                "weights",
                format!("weights sum to {total}, expected 1"),
            ));
        }
        Ok(Self { symbols, weights })
    }

    pub fn equal(symbols: Vec<Symbol>) -> Result<Self> {
        if symbols.is_empty() {
            return Err(FrontierError::EmptyBasket);
        }
        let w = 1.0 / symbols.len() as f64;
        let weights = vec![w; symbols.len()];
        Ok(Self { symbols, weights })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.weights[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, f64)> {
        self.symbols.iter().zip(self.weights.iter().copied())
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn to_map(&self) -> BTreeMap<Symbol, f64> {
        self.iter().map(|(s, w)| (s.clone(), w)).collect()
    }
}

impl Serialize for PortfolioWeights {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.symbols.len()))?;
        for (symbol, weight) in self.iter() {
            map.serialize_entry(symbol, &weight)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PortfolioWeights {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let SymbolEntries(entries) = SymbolEntries::<f64>::deserialize(deserializer)?;
        let (symbols, weights): (Vec<Symbol>, Vec<f64>) = entries.into_iter().unzip();
        Self::new(symbols, weights).map_err(serde::de::Error::custom)
    }
}

/// (return, volatility, sharpe) of one simulated candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPoint {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe: f64,
}

/// Every simulated candidate, in sample order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationPopulation {
    pub points: Vec<PortfolioPoint>,
}

impl SimulationPopulation {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_sharpe(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.sharpe)
            .fold(None, |acc, s| Some(acc.map_or(s, |a: f64| a.max(s))))
    }

    /// Candidates not dominated in (volatility, return), by ascending volatility.
    ///
    /// A point stays when no other point has lower-or-equal volatility and a
    /// higher return.
    pub fn efficient_frontier(&self) -> Vec<PortfolioPoint> {
        let mut sorted = self.points.clone();
        sorted.sort_by(|a, b| {
            a.volatility.total_cmp(&b.volatility).then_with(|| {
                // Higher return first so ties at equal volatility keep the best one
                b.expected_return.total_cmp(&a.expected_return)
            })
        });

        let mut frontier = Vec::new();
        let mut best_return = f64::NEG_INFINITY;
        for point in sorted {
            if point.expected_return > best_return {
                best_return = point.expected_return;
                frontier.push(point);
            }
        }
        frontier
    }

    /// Evenly strided subset of at most `max_points` candidates, for plotting.
    pub fn sample(&self, max_points: usize) -> SimulationPopulation {
        if max_points == 0 {
            return SimulationPopulation::default();
        }
        if self.points.len() <= max_points {
            return self.clone();
        }
        let stride = self.points.len().div_ceil(max_points);
        SimulationPopulation {
            points: self.points.iter().step_by(stride).copied().collect(),
        }
    }
}

/// Drawdown and worst-period figures for a realized return path.
///
/// A field is `None` when the history is too short to compute it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownsideMetrics {
    /// Most negative `equity / running_peak - 1` (never positive)
    pub max_drawdown: Option<f64>,
    pub worst_month_return: Option<f64>,
    /// Last return date inside the worst month
    pub worst_month_date: Option<Date>,
    pub worst_year_return: Option<f64>,
    pub worst_year: Option<i16>,
    pub downside_deviation_annual: Option<f64>,
    pub sortino: Option<f64>,
    /// Compound annual growth rate of the equity curve
    pub annual_return_geom: Option<f64>,
    /// Arithmetic-mean annualized return of the path (the Sortino numerator input)
    pub annualized_return: Option<f64>,
    pub total_return: Option<f64>,
}

/// The maximum-Sharpe candidate of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalPortfolio {
    pub weights: PortfolioWeights,
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe: f64,
    /// Position of this candidate in the simulated population
    pub sample_index: usize,
    /// `sum(w_i * sigma_i) / sigma_p`; `None` when the portfolio volatility is 0
    pub diversification_ratio: Option<f64>,
    pub downside: DownsideMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syms(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|n| Symbol::parse(n).unwrap()).collect()
    }

    fn point(expected_return: f64, volatility: f64) -> PortfolioPoint {
        PortfolioPoint {
            expected_return,
            volatility,
            sharpe: if volatility > 0.0 {
                expected_return / volatility
            } else {
                0.0
            },
        }
    }

    #[test]
    fn test_weights_validation() {
        assert!(PortfolioWeights::new(syms(&["A", "B"]), vec![0.4, 0.6]).is_ok());
        assert!(PortfolioWeights::new(syms(&["A", "B"]), vec![0.4, 0.5]).is_err());
        assert!(PortfolioWeights::new(syms(&["A", "B"]), vec![-0.1, 1.1]).is_err());
        assert!(PortfolioWeights::new(syms(&["A"]), vec![0.5, 0.5]).is_err());
    }

    #[test]
    fn test_weights_lookup() {
        let weights = PortfolioWeights::equal(syms(&["A", "B", "C", "D"])).unwrap();
        assert_eq!(weights.get(&Symbol::parse("c").unwrap()), Some(0.25));
        assert!((weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert_eq!(weights.to_map().len(), 4);
    }

    #[test]
    fn test_weights_serialize_as_symbol_map() {
        let weights = PortfolioWeights::new(syms(&["MSFT", "AAPL"]), vec![0.75, 0.25]).unwrap();
        let json = serde_json::to_string(&weights).unwrap();
        assert_eq!(json, r#"{"MSFT":0.75,"AAPL":0.25}"#);

        let back: PortfolioWeights = serde_json::from_str(&json).unwrap();
        assert_eq!(back, weights);
        assert!(serde_json::from_str::<PortfolioWeights>(r#"{"MSFT":0.75,"AAPL":0.5}"#).is_err());
        assert!(serde_json::from_str::<PortfolioWeights>(r#"{"MSFT":1.5,"AAPL":-0.5}"#).is_err());
    }

    #[test]
    fn test_efficient_frontier_drops_dominated_points() {
        let population = SimulationPopulation {
            points: vec![
                point(0.10, 0.20),
                point(0.05, 0.25), // dominated by (0.10, 0.20)
                point(0.12, 0.30),
                point(0.04, 0.10),
                point(0.03, 0.10), // same vol, lower return
            ],
        };
        let frontier = population.efficient_frontier();
        let returns: Vec<f64> = frontier.iter().map(|p| p.expected_return).collect();
        assert_eq!(returns, vec![0.04, 0.10, 0.12]);
    }

    #[test]
    fn test_sample_respects_limit() {
        let population = SimulationPopulation {
            points: (0..1000).map(|i| point(i as f64, 1.0)).collect(),
        };
        let sampled = population.sample(300);
        assert!(sampled.len() <= 300);
        assert_eq!(sampled.points[0].expected_return, 0.0);
        assert_eq!(population.sample(5000).len(), 1000);
        assert!(population.sample(0).is_empty());
    }

    #[test]
    fn test_max_sharpe() {
        assert_eq!(SimulationPopulation::default().max_sharpe(), None);
        let population = SimulationPopulation {
            points: vec![point(0.1, 0.2), point(0.3, 0.2), point(0.0, 0.0)],
        };
        let best = population.max_sharpe().unwrap();
        assert!((best - 1.5).abs() < 1e-12);
    }
}
