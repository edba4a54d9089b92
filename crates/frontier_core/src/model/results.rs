//! Assembled output of one analysis run

use serde::{Deserialize, Serialize};

use super::ids::{Basket, Symbol};
use super::keyed::SymbolEntries;
use super::matrix::{CorrelationMatrix, CorrelationSummary, CovarianceMatrix};
use super::portfolio::{AssetStats, OptimalPortfolio, SimulationPopulation};
use crate::config::AnalysisConfig;

/// Span of the aligned history a run was computed from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub start: jiff::civil::Date,
    pub end: jiff::civil::Date,
    pub periods: usize,
}

/// Everything a run produces, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub basket: Basket,
    pub config: AnalysisConfig,
    pub history: HistoryWindow,
    /// One entry per basket symbol, in basket order; `{symbol: stats}` on the wire
    #[serde(with = "stats_by_symbol")]
    pub asset_stats: Vec<AssetStats>,
    pub correlation: CorrelationMatrix,
    pub correlation_summary: CorrelationSummary,
    pub covariance: CovarianceMatrix,
    pub optimal: OptimalPortfolio,
    pub population: SimulationPopulation,
}

mod stats_by_symbol {
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{AssetStats, SymbolEntries};

    #[derive(Serialize, Deserialize)]
    struct Fields {
        annualized_return: f64,
        annualized_volatility: f64,
        sharpe: f64,
    }

    pub fn serialize<S>(stats: &[AssetStats], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(stats.len()))?;
        for s in stats {
            let fields = Fields {
                annualized_return: s.annualized_return,
                annualized_volatility: s.annualized_volatility,
                sharpe: s.sharpe,
            };
            map.serialize_entry(&s.symbol, &fields)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<AssetStats>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let SymbolEntries(entries) = SymbolEntries::<Fields>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|(symbol, f)| AssetStats {
                symbol,
                annualized_return: f.annualized_return,
                annualized_volatility: f.annualized_volatility,
                sharpe: f.sharpe,
            })
            .collect())
    }
}

impl AnalysisResult {
    pub fn stats_for(&self, symbol: &Symbol) -> Option<&AssetStats> {
        self.asset_stats.iter().find(|s| &s.symbol == symbol)
    }

    /// Copy of the result with the population down-sampled for plotting
    #[must_use]
    pub fn with_population_limit(mut self, max_points: usize) -> Self {
        self.population = self.population.sample(max_points);
        self
    }
}
