use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use frontier::{CsvQuotes, Overrides, Report, RunFile, init_logging, write_report};
use frontier_core::{SimulationProgress, analyze_with_provider};

#[derive(Parser, Debug)]
#[command(name = "frontier")]
#[command(about = "Monte Carlo max-Sharpe portfolio analysis over historical prices")]
struct Args {
    /// CSV of prices with a `symbol,date,close` header
    #[arg(short, long)]
    prices: PathBuf,

    /// YAML run file (tickers, rates, sampling policy, ...)
    #[arg(short, long)]
    run: Option<PathBuf>,

    /// Comma-separated tickers; replaces the run file's list
    #[arg(short, long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// Annual risk-free rate as a decimal, e.g. 0.02
    #[arg(long, allow_negative_numbers = true)]
    risk_free: Option<f64>,

    /// Number of random portfolios to evaluate
    #[arg(short = 'n', long)]
    simulations: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Report path; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Cancel the simulation after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write logs to `frontier.log` in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Cancel `progress` once `timeout` elapses, unless the run already finished.
fn spawn_watchdog(progress: SimulationProgress, timeout: Duration) {
    thread::spawn(move || {
        thread::sleep(timeout);
        if progress.completed() < progress.total() {
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                completed = progress.completed(),
                total = progress.total(),
                "timeout reached, cancelling simulation"
            );
            progress.cancel();
        }
    });
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.log_dir.as_deref(), &args.log_level)?;

    let run_file = match &args.run {
        Some(path) => RunFile::load(path)?,
        None => RunFile::default(),
    };
    let plan = run_file.resolve(Overrides {
        tickers: args.tickers,
        risk_free: args.risk_free,
        simulations: args.simulations,
        seed: args.seed,
    })?;

    let quotes = CsvQuotes::from_path(&args.prices)?;

    let progress = SimulationProgress::new(plan.config.simulations);
    if let Some(secs) = args.timeout_secs {
        spawn_watchdog(progress.clone(), Duration::from_secs(secs));
    }

    tracing::info!(
        tickers = plan.basket.len(),
        simulations = plan.config.simulations,
        seed = plan.config.seed,
        "starting analysis"
    );

    let result = analyze_with_provider(&quotes, &plan.basket, &plan.config, Some(&progress))
        .wrap_err("analysis failed")?;

    tracing::info!(
        sharpe = result.optimal.sharpe,
        expected_return = result.optimal.expected_return,
        volatility = result.optimal.volatility,
        "analysis complete"
    );

    let report = Report::new(result, plan.frontier_points);
    write_report(&report, args.output.as_deref())?;

    Ok(())
}
