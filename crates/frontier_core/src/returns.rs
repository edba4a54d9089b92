//! Return series builder
//!
//! Aligns the price series of a basket on the dates every series shares and
//! turns the aligned prices into simple periodic returns.

use jiff::civil::Date;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::error::{FrontierError, InsufficientDataCause, Result};
use crate::model::{AlignedReturns, Basket, PriceSeries};

/// `P_t / P_{t-1} - 1` for consecutive prices
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Build the aligned return history for `basket` from `series`.
///
/// `series` may come in any order and may contain symbols outside the basket;
/// the output columns follow basket order.
pub fn align_prices(basket: &Basket, series: &[PriceSeries]) -> Result<AlignedReturns> {
    let mut ordered: Vec<&PriceSeries> = Vec::with_capacity(basket.len());
    for symbol in basket.iter() {
        let found = series
            .iter()
            .find(|s| s.symbol() == symbol)
            .ok_or_else(|| {
                FrontierError::invalid_input(
                    format!("prices[{symbol}]"),
                    "no price series supplied",
                )
            })?;
        if found.len() < 2 {
            return Err(FrontierError::insufficient_data(
                InsufficientDataCause::SinglePointSeries {
                    symbol: symbol.to_string(),
                    points: found.len(),
                },
            ));
        }
        ordered.push(found);
    }

    let dates = shared_dates(&ordered);
    if dates.len() < 2 {
        return Err(FrontierError::insufficient_data(
            InsufficientDataCause::NoOverlap {
                aligned_dates: dates.len(),
            },
        ));
    }

    let columns: Vec<Vec<f64>> = ordered
        .iter()
        .map(|s| {
            let closes: FxHashMap<Date, f64> =
                s.points().iter().map(|p| (p.date, p.close)).collect();
            // Every date in `dates` is present in every series
            let aligned: Vec<f64> = dates.iter().map(|d| closes[d]).collect();
            simple_returns(&aligned)
        })
        .collect();

    debug!(
        assets = basket.len(),
        aligned_dates = dates.len(),
        start = %dates[0],
        end = %dates[dates.len() - 1],
        "aligned price history"
    );

    AlignedReturns::new(
        basket.symbols().to_vec(),
        dates[0],
        dates[1..].to_vec(),
        columns,
    )
}

/// Sorted dates present in every series
fn shared_dates(series: &[&PriceSeries]) -> Vec<Date> {
    let Some((first, rest)) = series.split_first() else {
        return Vec::new();
    };

    let mut common: FxHashSet<Date> = first.points().iter().map(|p| p.date).collect();
    for s in rest {
        let dates: FxHashSet<Date> = s.points().iter().map(|p| p.date).collect();
        common.retain(|d| dates.contains(d));
        if common.is_empty() {
            break;
        }
    }

    // Series dates are already strictly increasing; filtering keeps the order
    first
        .points()
        .iter()
        .map(|p| p.date)
        .filter(|d| common.contains(d))
        .collect()
}
