//! Aligned periodic returns for a basket
//!
//! All columns share one sorted date index. `dates[t]` is the period-end date
//! of the return in row `t`; `base_date` is the date of the first aligned
//! price, i.e. the start of the first period.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::ids::Symbol;
use crate::error::{FrontierError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedReturns {
    symbols: Vec<Symbol>,
    base_date: Date,
    dates: Vec<Date>,
    /// One column per symbol, each `dates.len()` long
    columns: Vec<Vec<f64>>,
}

impl AlignedReturns {
    pub fn new(
        symbols: Vec<Symbol>,
        base_date: Date,
        dates: Vec<Date>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if symbols.len() != columns.len() {
            return Err(FrontierError::invalid_input(
                "returns",
                format!(
                    "{} symbols but {} return columns",
                    symbols.len(),
                    columns.len()
                ),
            ));
        }
        if let Some((symbol, column)) = symbols
            .iter()
            .zip(&columns)
            .find(|(_, c)| c.len() != dates.len())
        {
            return Err(FrontierError::invalid_input(
                format!("returns[{symbol}]"),
                format!("{} returns for {} dates", column.len(), dates.len()),
            ));
        }
        let mut previous = base_date;
        for &date in &dates {
            if date <= previous {
                return Err(FrontierError::invalid_input(
                    "returns",
                    format!("date index not strictly increasing at {date}"),
                ));
            }
            previous = date;
        }
        Ok(Self {
            symbols,
            base_date,
            dates,
            columns,
        })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn base_date(&self) -> Date {
        self.base_date
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of return periods
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn num_assets(&self) -> usize {
        self.symbols.len()
    }

    pub fn column(&self, asset: usize) -> &[f64] {
        &self.columns[asset]
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column_for(&self, symbol: &Symbol) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.columns[i].as_slice())
    }

    /// Realized return of a fixed-weight portfolio in each period.
    ///
    /// `weights` is indexed like `symbols`.
    pub fn weighted_path(&self, weights: &[f64]) -> Vec<f64> {
        debug_assert_eq!(weights.len(), self.columns.len());
        (0..self.dates.len())
            .map(|t| {
                self.columns
                    .iter()
                    .zip(weights)
                    .map(|(column, w)| w * column[t])
                    .sum()
            })
            .collect()
    }
}
