//! Historical price input
//!
//! A `PriceSeries` is the only thing the engine needs from a market-data
//! source: a date-sorted run of positive adjusted closes for one symbol.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::ids::Symbol;
use crate::error::{FrontierError, Result};

/// One adjusted close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: Date,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: Date, close: f64) -> Self {
        Self { date, close }
    }
}

/// Immutable, validated price history for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct PriceSeries {
    symbol: Symbol,
    points: Vec<PricePoint>,
}

/// Unvalidated wire form of a `PriceSeries`
#[derive(Deserialize)]
struct RawSeries {
    symbol: Symbol,
    points: Vec<PricePoint>,
}

impl TryFrom<RawSeries> for PriceSeries {
    type Error = FrontierError;

    fn try_from(raw: RawSeries) -> Result<Self> {
        Self::new(raw.symbol, raw.points)
    }
}

impl PriceSeries {
    /// Validate and wrap a price history.
    ///
    /// Dates must be strictly increasing and every close positive and finite.
    pub fn new(symbol: Symbol, points: Vec<PricePoint>) -> Result<Self> {
        for window in points.windows(2) {
            if window[1].date <= window[0].date {
                return Err(FrontierError::invalid_input(
                    format!("prices[{symbol}]"),
                    format!(
                        "dates must be strictly increasing ({} then {})",
                        window[0].date, window[1].date
                    ),
                ));
            }
        }
        if let Some(bad) = points
            .iter()
            .find(|p| !p.close.is_finite() || p.close <= 0.0)
        {
            return Err(FrontierError::invalid_input(
                format!("prices[{symbol}]"),
                format!("non-positive or non-finite close {} on {}", bad.close, bad.date),
            ));
        }
        Ok(Self { symbol, points })
    }

    /// Build from unsorted observations, sorting by date first.
    ///
    /// Duplicate dates are still rejected.
    pub fn from_unsorted(symbol: Symbol, mut points: Vec<PricePoint>) -> Result<Self> {
        points.sort_by_key(|p| p.date);
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<Date> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|p| p.date)
    }
}
