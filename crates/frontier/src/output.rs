//! JSON report rendering

use std::io::Write;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use frontier_core::AnalysisResult;
use frontier_core::model::PortfolioPoint;
use serde::Serialize;

use crate::util::atomic_write;

/// The analysis plus its efficient frontier.
///
/// The frontier is taken from the full population, before any down-sampling.
#[derive(Debug, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub efficient_frontier: Vec<PortfolioPoint>,
}

impl Report {
    pub fn new(result: AnalysisResult, frontier_points: Option<usize>) -> Self {
        let efficient_frontier = result.population.efficient_frontier();
        let result = match frontier_points {
            Some(limit) => result.with_population_limit(limit),
            None => result,
        };
        Self {
            result,
            efficient_frontier,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Write the report to `path` atomically, or to stdout when `path` is `None`.
pub fn write_report(report: &Report, path: Option<&Path>) -> color_eyre::Result<()> {
    let json = report.to_json().wrap_err("failed to serialize report")?;
    match path {
        Some(path) => {
            atomic_write(path, json.as_bytes())
                .wrap_err_with(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = json.len(), "report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
