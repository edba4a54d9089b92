//! Covariance and correlation of aligned returns

use tracing::debug;

use crate::config::Periodicity;
use crate::model::{
    AlignedReturns, CorrelationMatrix, CorrelationSummary, CovarianceMatrix, SymbolPair,
};
use crate::statistics::{clean_volatility, mean};

/// Annualized sample covariance (n - 1) of every column pair.
///
/// The matrix is built from the upper triangle and mirrored, so it is exactly
/// symmetric.
pub fn covariance_matrix(returns: &AlignedReturns, periodicity: Periodicity) -> CovarianceMatrix {
    let k = returns.num_assets();
    let n = returns.len();
    let ppy = periodicity.periods_per_year();
    let means: Vec<f64> = returns.columns().iter().map(|c| mean(c)).collect();

    let mut rows = vec![vec![0.0; k]; k];
    if n >= 2 {
        for i in 0..k {
            let ci = returns.column(i);
            for j in i..k {
                let cj = returns.column(j);
                let cross: f64 = ci
                    .iter()
                    .zip(cj)
                    .map(|(a, b)| (a - means[i]) * (b - means[j]))
                    .sum();
                let cov = cross / (n - 1) as f64 * ppy;
                rows[i][j] = cov;
                rows[j][i] = cov;
            }
        }
    }

    CovarianceMatrix {
        symbols: returns.symbols().to_vec(),
        rows,
    }
}

/// Correlation derived from an annualized covariance matrix.
///
/// Diagonal is exactly 1.0. A pair involving a zero-volatility asset is 0.
pub fn correlation_matrix(covariance: &CovarianceMatrix) -> CorrelationMatrix {
    let k = covariance.len();
    let sigmas: Vec<f64> = covariance
        .volatilities()
        .into_iter()
        .map(clean_volatility)
        .collect();

    let mut rows = vec![vec![0.0; k]; k];
    for i in 0..k {
        rows[i][i] = 1.0;
        for j in (i + 1)..k {
            let rho = if sigmas[i] > 0.0 && sigmas[j] > 0.0 {
                (covariance.get(i, j) / (sigmas[i] * sigmas[j])).clamp(-1.0, 1.0)
            } else {
                0.0
            };
            rows[i][j] = rho;
            rows[j][i] = rho;
        }
    }

    CorrelationMatrix {
        symbols: covariance.symbols.clone(),
        rows,
    }
}

/// Most/least correlated pairs and the average pairwise correlation.
///
/// Ties keep the first pair in row-major upper-triangle order.
pub fn correlation_summary(correlation: &CorrelationMatrix) -> CorrelationSummary {
    let k = correlation.len();
    if k < 2 {
        return CorrelationSummary::default();
    }

    let mut most: Option<(usize, usize, f64)> = None;
    let mut least: Option<(usize, usize, f64)> = None;
    let mut total = 0.0;
    let mut pairs = 0usize;

    for i in 0..k {
        for j in (i + 1)..k {
            let rho = correlation.get(i, j);
            total += rho;
            pairs += 1;
            if most.is_none_or(|(_, _, best)| rho > best) {
                most = Some((i, j, rho));
            }
            if least.is_none_or(|(_, _, worst)| rho < worst) {
                least = Some((i, j, rho));
            }
        }
    }

    let to_pair = |(i, j, rho): (usize, usize, f64)| SymbolPair {
        first: correlation.symbols[i].clone(),
        second: correlation.symbols[j].clone(),
        correlation: rho,
    };
    let average = total / pairs as f64;

    debug!(pairs, average_pairwise = average, "correlation summary");

    CorrelationSummary {
        most_correlated: most.map(to_pair),
        least_correlated: least.map(to_pair),
        average_pairwise: Some(average),
        diversification_score: Some(1.0 - average),
    }
}
