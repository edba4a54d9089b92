mod ids;
mod keyed;
mod matrix;
mod portfolio;
mod prices;
mod results;
mod returns;

pub use ids::{Basket, MAX_BASKET_SIZE, Symbol};
pub use matrix::{CorrelationMatrix, CorrelationSummary, CovarianceMatrix, SymbolPair};
pub use portfolio::{
    AssetStats, DownsideMetrics, OptimalPortfolio, PortfolioPoint, PortfolioWeights,
    SimulationPopulation, WEIGHT_SUM_TOLERANCE,
};
pub use prices::{PricePoint, PriceSeries};
pub use results::{AnalysisResult, HistoryWindow};
pub use returns::AlignedReturns;
