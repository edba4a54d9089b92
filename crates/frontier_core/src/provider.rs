//! Quote provider seam
//!
//! The engine never fetches data itself. Callers hand it a `QuoteProvider`
//! that yields one validated `PriceSeries` per symbol.

use rustc_hash::FxHashMap;

use crate::error::{FrontierError, Result};
use crate::model::{Basket, PriceSeries, Symbol};

pub trait QuoteProvider {
    /// Adjusted close history for `symbol`
    fn price_series(&self, symbol: &Symbol) -> Result<PriceSeries>;

    /// One series per basket symbol, in basket order
    fn basket_series(&self, basket: &Basket) -> Result<Vec<PriceSeries>> {
        basket.iter().map(|s| self.price_series(s)).collect()
    }
}

/// Provider over series already held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuotes {
    series: FxHashMap<Symbol, PriceSeries>,
}

impl InMemoryQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the series for its symbol
    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().clone(), series);
    }

    #[must_use]
    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.series.keys()
    }
}

impl FromIterator<PriceSeries> for InMemoryQuotes {
    fn from_iter<T: IntoIterator<Item = PriceSeries>>(iter: T) -> Self {
        let mut quotes = Self::new();
        for series in iter {
            quotes.insert(series);
        }
        quotes
    }
}

impl QuoteProvider for InMemoryQuotes {
    fn price_series(&self, symbol: &Symbol) -> Result<PriceSeries> {
        self.series.get(symbol).cloned().ok_or_else(|| {
            FrontierError::invalid_input(format!("prices[{symbol}]"), "no price history available")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PricePoint;
    use jiff::civil::date;

    fn series(symbol: &str) -> PriceSeries {
        PriceSeries::new(
            Symbol::parse(symbol).unwrap(),
            vec![
                PricePoint::new(date(2024, 1, 2), 10.0),
                PricePoint::new(date(2024, 1, 3), 11.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_basket_series_in_basket_order() {
        let quotes: InMemoryQuotes = [series("AAA"), series("BBB")].into_iter().collect();
        let basket = Basket::parse(["bbb", "aaa"]).unwrap();
        let out = quotes.basket_series(&basket).unwrap();
        assert_eq!(out[0].symbol().as_str(), "BBB");
        assert_eq!(out[1].symbol().as_str(), "AAA");
    }

    #[test]
    fn test_unknown_symbol() {
        let quotes = InMemoryQuotes::new().with_series(series("AAA"));
        let err = quotes
            .price_series(&Symbol::parse("ZZZ").unwrap())
            .unwrap_err();
        assert!(matches!(err, FrontierError::InvalidInput { .. }));
    }
}
