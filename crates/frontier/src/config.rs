//! Run file loading and command-line overrides
//!
//! ```yaml
//! tickers: [AAPL, MSFT, TLT]
//! risk_free: 0.03
//! simulations: 20000
//! seed: 7
//! periodicity: daily
//! sampling:
//!   dirichlet:
//!     alpha: 1.0
//! frontier_points: 2000
//! ```

use std::path::Path;

use color_eyre::eyre::{WrapErr, bail};
use frontier_core::{AnalysisConfig, Basket, Periodicity, SimulationBounds, WeightSampling};
use serde::{Deserialize, Serialize};

/// Contents of a YAML run file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunFile {
    pub tickers: Vec<String>,
    pub risk_free: Option<f64>,
    pub simulations: Option<usize>,
    pub seed: Option<u64>,
    pub periodicity: Option<Periodicity>,
    pub sampling: Option<WeightSampling>,
    pub min_simulations: Option<usize>,
    pub max_simulations: Option<usize>,
    /// Down-sample the reported population to at most this many points
    pub frontier_points: Option<usize>,
}

impl RunFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read run file {}", path.display()))?;
        Self::from_yaml(&content)
            .wrap_err_with(|| format!("failed to parse run file {}", path.display()))
    }
}

/// Values given on the command line; they win over the run file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub tickers: Option<Vec<String>>,
    pub risk_free: Option<f64>,
    pub simulations: Option<usize>,
    pub seed: Option<u64>,
}

/// Everything needed to start a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub basket: Basket,
    pub config: AnalysisConfig,
    pub frontier_points: Option<usize>,
}

impl RunFile {
    pub fn resolve(self, overrides: Overrides) -> color_eyre::Result<RunPlan> {
        let tickers = overrides.tickers.unwrap_or(self.tickers);
        if tickers.is_empty() {
            bail!("no tickers given: pass --tickers or list them in the run file");
        }
        let basket = Basket::parse(&tickers)?;

        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            risk_free_rate: overrides
                .risk_free
                .or(self.risk_free)
                .unwrap_or(defaults.risk_free_rate),
            simulations: overrides
                .simulations
                .or(self.simulations)
                .unwrap_or(defaults.simulations),
            seed: overrides.seed.or(self.seed).unwrap_or(defaults.seed),
            periodicity: self.periodicity.unwrap_or(defaults.periodicity),
            sampling: self.sampling.unwrap_or(defaults.sampling),
            bounds: SimulationBounds {
                min: self.min_simulations.unwrap_or(defaults.bounds.min),
                max: self.max_simulations.unwrap_or(defaults.bounds.max),
            },
        };
        config.validate()?;

        Ok(RunPlan {
            basket,
            config,
            frontier_points: self.frontier_points,
        })
    }
}
