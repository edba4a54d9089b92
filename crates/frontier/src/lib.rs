//! Command-line front end for the frontier analytics engine
//!
//! Loads a run file and a CSV of prices, runs the analysis and writes a JSON
//! report.

pub mod config;
pub mod logging;
pub mod output;
pub mod quotes;
pub mod util;

pub use config::{Overrides, RunFile, RunPlan};
pub use logging::init_logging;
pub use output::{Report, write_report};
pub use quotes::CsvQuotes;
