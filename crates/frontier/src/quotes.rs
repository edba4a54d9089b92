//! CSV-backed quote provider
//!
//! Expects a header row and one observation per line:
//!
//! ```text
//! symbol,date,close
//! AAPL,2024-01-02,185.64
//! MSFT,2024-01-02,370.87
//! ```
//!
//! Rows may come in any order; each symbol's rows are sorted by date.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use color_eyre::eyre::{WrapErr, bail};
use frontier_core::model::{PricePoint, PriceSeries, Symbol};
use frontier_core::{InMemoryQuotes, QuoteProvider};
use jiff::civil::Date;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct QuoteRow {
    symbol: String,
    date: Date,
    close: f64,
}

/// Price histories loaded from a CSV file
#[derive(Debug, Clone, Default)]
pub struct CsvQuotes {
    quotes: InMemoryQuotes,
}

impl CsvQuotes {
    pub fn from_path(path: &Path) -> color_eyre::Result<Self> {
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to open price file {}", path.display()))?;
        let quotes = Self::from_reader(file)
            .wrap_err_with(|| format!("failed to load prices from {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            symbols = quotes.len(),
            "loaded price file"
        );
        Ok(quotes)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> color_eyre::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut by_symbol: BTreeMap<Symbol, Vec<PricePoint>> = BTreeMap::new();
        for (line, row) in reader.deserialize::<QuoteRow>().enumerate() {
            // +2: one for the header, one for 1-based numbering
            let row = row.wrap_err_with(|| format!("malformed row on line {}", line + 2))?;
            let symbol = Symbol::parse(&row.symbol)
                .wrap_err_with(|| format!("bad symbol on line {}", line + 2))?;
            by_symbol
                .entry(symbol)
                .or_default()
                .push(PricePoint::new(row.date, row.close));
        }

        if by_symbol.is_empty() {
            bail!("price file contains no rows");
        }

        let mut quotes = InMemoryQuotes::new();
        for (symbol, points) in by_symbol {
            tracing::debug!(symbol = %symbol, points = points.len(), "price series");
            quotes.insert(PriceSeries::from_unsorted(symbol, points)?);
        }
        Ok(Self { quotes })
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl QuoteProvider for CsvQuotes {
    fn price_series(&self, symbol: &Symbol) -> frontier_core::Result<PriceSeries> {
        self.quotes.price_series(symbol)
    }
}
