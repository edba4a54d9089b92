//! Per-run configuration
//!
//! Everything that influences the numbers of a run (risk-free rate, sample
//! count, seed, periodicity, sampling policy) is carried explicitly in an
//! `AnalysisConfig`. There is no process-wide state, so two runs with equal
//! configs and equal inputs produce equal results.
//!
//! ```ignore
//! use frontier_core::config::{AnalysisConfig, Periodicity, WeightSampling};
//!
//! let config = AnalysisConfig::default()
//!     .with_risk_free_rate(0.03)
//!     .with_simulations(20_000)
//!     .with_seed(7)
//!     .with_periodicity(Periodicity::Monthly)
//!     .with_sampling(WeightSampling::Dirichlet { alpha: 1.0 });
//! config.validate()?;
//! ```

mod policy;

pub use policy::{Periodicity, WeightSampling};

use serde::{Deserialize, Serialize};

use crate::error::{FrontierError, Result};

fn default_risk_free_rate() -> f64 {
    0.02
}

fn default_simulations() -> usize {
    5_000
}

fn default_seed() -> u64 {
    42
}

/// Inclusive range of accepted simulation counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationBounds {
    pub min: usize,
    pub max: usize,
}

impl SimulationBounds {
    pub const DEFAULT_MIN: usize = 500;
    pub const DEFAULT_MAX: usize = 50_000;

    /// Reject (never clamp) a requested count outside the range.
    pub fn check(&self, requested: usize) -> Result<()> {
        if requested < self.min || requested > self.max {
            return Err(FrontierError::SimulationBoundsExceeded {
                requested,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for SimulationBounds {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Configuration of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Annual risk-free rate as a decimal. Negative values are allowed for
    /// stress scenarios but must be finite.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    /// Number of random portfolios to evaluate
    #[serde(default = "default_simulations")]
    pub simulations: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub periodicity: Periodicity,

    #[serde(default)]
    pub sampling: WeightSampling,

    #[serde(default)]
    pub bounds: SimulationBounds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            simulations: default_simulations(),
            seed: default_seed(),
            periodicity: Periodicity::default(),
            sampling: WeightSampling::default(),
            bounds: SimulationBounds::default(),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    #[must_use]
    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_periodicity(mut self, periodicity: Periodicity) -> Self {
        self.periodicity = periodicity;
        self
    }

    #[must_use]
    pub fn with_sampling(mut self, sampling: WeightSampling) -> Self {
        self.sampling = sampling;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, min: usize, max: usize) -> Self {
        self.bounds = SimulationBounds { min, max };
        self
    }

    pub fn periods_per_year(&self) -> f64 {
        self.periodicity.periods_per_year()
    }

    /// Check everything that can be checked before touching data.
    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(FrontierError::invalid_input(
                "risk_free_rate",
                format!("must be finite, got {}", self.risk_free_rate),
            ));
        }
        if self.bounds.min == 0 || self.bounds.min > self.bounds.max {
            return Err(FrontierError::invalid_input(
                "bounds",
                format!(
                    "simulation bounds [{}, {}] are not a valid range",
                    self.bounds.min, self.bounds.max
                ),
            ));
        }
        self.bounds.check(self.simulations)?;
        match self.sampling {
            WeightSampling::Dirichlet { alpha } if !alpha.is_finite() || alpha <= 0.0 => {
                Err(FrontierError::invalid_input(
                    "sampling.alpha",
                    format!("Dirichlet concentration must be positive and finite, got {alpha}"),
                ))
            }
            _ => Ok(()),
        }
    }
}
