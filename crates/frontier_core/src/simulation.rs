//! Monte Carlo search for the maximum-Sharpe allocation
//!
//! Samples are drawn in fixed-size batches. Batch `b` owns a `SmallRng`
//! seeded from `(seed, b)` and nothing else, so the population and the winner
//! are identical whether the batches run on one thread or many.
//!
//! Within a batch the weight vectors are laid out as one row-major
//! `len x k` matrix and evaluated against the flattened covariance together.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::distr::{Distribution, OpenClosed01};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::Gamma;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::{AnalysisConfig, WeightSampling};
use crate::error::{FrontierError, Result};
use crate::model::{AlignedReturns, CovarianceMatrix, PortfolioPoint, SimulationPopulation};
use crate::statistics::{clean_volatility, mean, sharpe_ratio};

/// Samples per batch. Part of the seeding scheme: changing it changes results.
pub const BATCH_SIZE: usize = 100;

/// Shared progress and cancellation handle for a running simulation
#[derive(Debug, Clone)]
pub struct SimulationProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl SimulationProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Samples evaluated so far
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Fraction done in [0, 1]
    #[must_use]
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.completed() as f64 / total as f64).min(1.0)
    }

    fn add(&self, samples: usize) {
        self.completed.fetch_add(samples, Ordering::Relaxed);
    }

    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for SimulationProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Draws long-only weight vectors on the simplex
#[derive(Debug, Clone)]
pub enum WeightSampler {
    Uniform,
    Dirichlet(Gamma<f64>),
}

impl WeightSampler {
    pub fn new(sampling: WeightSampling) -> Result<Self> {
        match sampling {
            WeightSampling::UniformNormalized => Ok(Self::Uniform),
            WeightSampling::Dirichlet { alpha } => Gamma::new(alpha, 1.0)
                .map(Self::Dirichlet)
                .map_err(|e| {
                    FrontierError::invalid_input(
                        "sampling.alpha",
                        format!("invalid Dirichlet concentration {alpha}: {e}"),
                    )
                }),
        }
    }

    /// Fill `out` with one weight vector.
    ///
    /// A draw whose sum is not positive (possible with a tiny Dirichlet
    /// alpha) falls back to equal weights.
    pub fn fill<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [f64]) {
        match self {
            Self::Uniform => {
                for w in out.iter_mut() {
                    *w = OpenClosed01.sample(rng);
                }
            }
            Self::Dirichlet(gamma) => {
                for w in out.iter_mut() {
                    *w = gamma.sample(rng);
                }
            }
        }

        let total: f64 = out.iter().sum();
        if total > 0.0 && total.is_finite() {
            for w in out.iter_mut() {
                *w /= total;
            }
        } else {
            let equal = 1.0 / out.len() as f64;
            out.fill(equal);
        }
    }
}

/// Inputs shared by every batch of one run
#[derive(Debug, Clone)]
pub struct PortfolioModel {
    /// Mean periodic return of each asset
    pub mean_returns: Vec<f64>,
    /// Annualized covariance, row-major `k x k`
    pub covariance: Vec<f64>,
    pub periods_per_year: f64,
    pub risk_free_rate: f64,
}

impl PortfolioModel {
    pub fn new(
        returns: &AlignedReturns,
        covariance: &CovarianceMatrix,
        config: &AnalysisConfig,
    ) -> Result<Self> {
        let k = returns.num_assets();
        if k == 0 {
            return Err(FrontierError::EmptyBasket);
        }
        if covariance.len() != k {
            return Err(FrontierError::invalid_input(
                "covariance",
                format!("{n}x{n} covariance for {k} assets", n = covariance.len()),
            ));
        }
        Ok(Self {
            mean_returns: returns.columns().iter().map(|c| mean(c)).collect(),
            covariance: covariance.to_flat(),
            periods_per_year: config.periods_per_year(),
            risk_free_rate: config.risk_free_rate,
        })
    }

    pub fn num_assets(&self) -> usize {
        self.mean_returns.len()
    }

    /// Return, volatility and Sharpe ratio of one weight vector.
    ///
    /// `None` when the model has no assets or `weights` is not one weight
    /// per asset.
    pub fn evaluate(&self, weights: &[f64]) -> Option<PortfolioPoint> {
        let k = self.num_assets();
        if k == 0 || weights.len() != k || self.covariance.len() != k * k {
            return None;
        }
        let mut points = Vec::with_capacity(1);
        let mut scratch = vec![0.0; k];
        self.evaluate_batch(weights, &mut scratch, &mut points);
        points.pop()
    }

    /// Evaluate every row of a row-major `len x k` weight matrix.
    ///
    /// `scratch` must hold `len x k` values; it receives `W * Sigma`. A
    /// model without assets evaluates nothing.
    pub fn evaluate_batch(
        &self,
        weights: &[f64],
        scratch: &mut [f64],
        out: &mut Vec<PortfolioPoint>,
    ) {
        let k = self.num_assets();
        if k == 0 {
            return;
        }
        let rows = weights.len() / k;
        debug_assert_eq!(weights.len(), rows * k);
        debug_assert!(scratch.len() >= rows * k);

        // scratch = W * Sigma
        for r in 0..rows {
            let w = &weights[r * k..(r + 1) * k];
            let ws = &mut scratch[r * k..(r + 1) * k];
            ws.fill(0.0);
            for (i, wi) in w.iter().enumerate() {
                if *wi == 0.0 {
                    continue;
                }
                let sigma_row = &self.covariance[i * k..(i + 1) * k];
                for (acc, s) in ws.iter_mut().zip(sigma_row) {
                    *acc += wi * s;
                }
            }
        }

        for r in 0..rows {
            let w = &weights[r * k..(r + 1) * k];
            let ws = &scratch[r * k..(r + 1) * k];
            let periodic: f64 = w.iter().zip(&self.mean_returns).map(|(a, b)| a * b).sum();
            let expected_return = periodic * self.periods_per_year;
            // Round-off can push a near-zero quadratic form below 0
            let variance: f64 = w.iter().zip(ws).map(|(a, b)| a * b).sum::<f64>().max(0.0);
            let volatility = clean_volatility(variance.sqrt());
            out.push(PortfolioPoint {
                expected_return,
                volatility,
                sharpe: sharpe_ratio(expected_return, volatility, self.risk_free_rate),
            });
        }
    }
}

/// Best sample seen so far; ordered by (sharpe, lower index)
#[derive(Debug, Clone)]
struct Candidate {
    index: usize,
    point: PortfolioPoint,
    weights: Vec<f64>,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        match self.point.sharpe.total_cmp(&other.point.sharpe) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.index < other.index,
        }
    }
}

fn merge(a: Option<Candidate>, b: Option<Candidate>) -> Option<Candidate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.beats(&a) { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

#[derive(Debug)]
struct BatchResult {
    points: Vec<PortfolioPoint>,
    best: Option<Candidate>,
}

/// Per-batch seed: splitmix64 over the run seed and the batch index
fn batch_seed(seed: u64, batch: usize) -> u64 {
    let mut z = seed ^ (batch as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

struct BatchContext<'a> {
    model: &'a PortfolioModel,
    sampler: WeightSampler,
    seed: u64,
    simulations: usize,
    progress: Option<&'a SimulationProgress>,
}

fn run_batch(ctx: &BatchContext<'_>, batch: usize) -> Result<BatchResult> {
    if ctx.progress.is_some_and(SimulationProgress::is_cancelled) {
        return Err(FrontierError::Cancelled);
    }

    let k = ctx.model.num_assets();
    let start = batch * BATCH_SIZE;
    let len = BATCH_SIZE.min(ctx.simulations - start);

    let mut rng = SmallRng::seed_from_u64(batch_seed(ctx.seed, batch));
    let mut weights = vec![0.0; len * k];
    for row in weights.chunks_exact_mut(k) {
        ctx.sampler.fill(&mut rng, row);
    }

    let mut scratch = vec![0.0; len * k];
    let mut points = Vec::with_capacity(len);
    ctx.model.evaluate_batch(&weights, &mut scratch, &mut points);

    let mut best: Option<Candidate> = None;
    for (offset, point) in points.iter().enumerate() {
        let candidate_better = best
            .as_ref()
            .is_none_or(|b| point.sharpe.total_cmp(&b.point.sharpe).is_gt());
        if candidate_better {
            best = Some(Candidate {
                index: start + offset,
                point: *point,
                weights: weights[offset * k..(offset + 1) * k].to_vec(),
            });
        }
    }

    if let Some(progress) = ctx.progress {
        progress.add(len);
    }
    trace!(batch, samples = len, "simulated batch");

    Ok(BatchResult { points, best })
}

/// The winning sample and the whole population
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    /// Position of the winner in sample order
    pub best_index: usize,
    pub best_weights: Vec<f64>,
    pub best: PortfolioPoint,
    pub population: SimulationPopulation,
}

/// Sample `config.simulations` random portfolios and keep the max-Sharpe one.
///
/// Ties in Sharpe go to the lowest sample index. Fails with
/// `SimulationBoundsExceeded` for an out-of-range count (never clamped) and
/// with `Cancelled` when `progress` is cancelled before the last batch starts.
pub fn simulate_portfolios(
    returns: &AlignedReturns,
    covariance: &CovarianceMatrix,
    config: &AnalysisConfig,
    progress: Option<&SimulationProgress>,
) -> Result<SimulationOutcome> {
    let model = PortfolioModel::new(returns, covariance, config)?;
    config.bounds.check(config.simulations)?;
    let sampler = WeightSampler::new(config.sampling)?;

    let simulations = config.simulations;
    let num_batches = simulations.div_ceil(BATCH_SIZE);
    if let Some(progress) = progress {
        progress.reset(simulations);
    }

    debug!(
        simulations,
        batches = num_batches,
        assets = model.num_assets(),
        seed = config.seed,
        sampling = ?config.sampling,
        "starting portfolio simulation"
    );

    let ctx = BatchContext {
        model: &model,
        sampler,
        seed: config.seed,
        simulations,
        progress,
    };

    #[cfg(feature = "parallel")]
    let batches: Vec<BatchResult> = (0..num_batches)
        .into_par_iter()
        .map(|b| run_batch(&ctx, b))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let batches: Vec<BatchResult> = (0..num_batches)
        .map(|b| run_batch(&ctx, b))
        .collect::<Result<Vec<_>>>()?;

    let mut points = Vec::with_capacity(simulations);
    let mut best = None;
    for batch in batches {
        points.extend(batch.points);
        best = merge(best, batch.best);
    }

    let best = best.ok_or_else(|| {
        FrontierError::invalid_input("simulations", "no portfolios were sampled")
    })?;

    debug!(
        best_index = best.index,
        sharpe = best.point.sharpe,
        expected_return = best.point.expected_return,
        volatility = best.point.volatility,
        "simulation complete"
    );

    Ok(SimulationOutcome {
        best_index: best.index,
        best_weights: best.weights,
        best: best.point,
        population: SimulationPopulation { points },
    })
}
