//! Cross-module tests for the analysis pipeline
//!
//! Tests are organized by topic:
//! - `scenarios` - Hand-computable price histories with known answers
//! - `determinism` - Seeded reproducibility and partition independence
//! - `boundaries` - Simulation bounds, empty and single-ticker baskets
//! - `properties` - Invariants that must hold for any input

mod boundaries;

use jiff::civil::Date;

use crate::model::{PricePoint, PriceSeries, Symbol};

/// Consecutive calendar days starting at `start`
pub(crate) fn daily_dates(start: Date, count: usize) -> Vec<Date> {
    let mut dates = Vec::with_capacity(count);
    let mut date = start;
    for _ in 0..count {
        dates.push(date);
        date = date.tomorrow().unwrap();
    }
    dates
}

/// Last day of `count` consecutive months starting at `(year, month)`
pub(crate) fn month_ends(year: i16, month: i8, count: usize) -> Vec<Date> {
    let first = jiff::civil::date(year, month, 1);
    (0..count)
        .map(|i| {
            first
                .checked_add(jiff::Span::new().months(i as i64))
                .unwrap()
                .last_of_month()
        })
        .collect()
}

pub(crate) fn series(symbol: &str, dates: &[Date], closes: &[f64]) -> PriceSeries {
    assert_eq!(dates.len(), closes.len());
    PriceSeries::new(
        Symbol::parse(symbol).unwrap(),
        dates
            .iter()
            .zip(closes)
            .map(|(&d, &c)| PricePoint::new(d, c))
            .collect(),
    )
    .unwrap()
}

/// Prices compounding `returns` from `start`
pub(crate) fn prices_from_returns(start: f64, returns: &[f64]) -> Vec<f64> {
    let mut prices = Vec::with_capacity(returns.len() + 1);
    let mut price = start;
    prices.push(price);
    for r in returns {
        price *= 1.0 + r;
        prices.push(price);
    }
    prices
}

/// A small, irregular three-asset history used by several topics
pub(crate) fn three_asset_history() -> Vec<PriceSeries> {
    let dates = daily_dates(jiff::civil::date(2024, 1, 1), 60);
    let a: Vec<f64> = (0..60)
        .map(|t| 0.004 + 0.02 * ((t as f64) * 0.7).sin())
        .collect();
    let b: Vec<f64> = (0..60)
        .map(|t| 0.001 + 0.01 * ((t as f64) * 1.3).cos())
        .collect();
    let c: Vec<f64> = (0..60)
        .map(|t| 0.002 - 0.015 * ((t as f64) * 0.4).sin())
        .collect();
    vec![
        series("AAA", &dates, &prices_from_returns(100.0, &a[1..])),
        series("BBB", &dates, &prices_from_returns(50.0, &b[1..])),
        series("CCC", &dates, &prices_from_returns(20.0, &c[1..])),
    ]
}
