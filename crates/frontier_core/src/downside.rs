//! Downside risk of a fixed-weight portfolio over the aligned history
//!
//! The realized path `r_p,t = sum_i w_i r_i,t` is compounded into an equity
//! curve that starts at 1.0. Every figure here is derived from that path.

use jiff::civil::{Date, Weekday};
use tracing::debug;

use crate::config::Periodicity;
use crate::model::{AlignedReturns, DownsideMetrics};
use crate::statistics::{mean, population_std_dev};

/// Equity values `[1.0, (1 + r_1), (1 + r_1)(1 + r_2), ...]`
pub fn equity_curve(path: &[f64]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(path.len() + 1);
    let mut equity = 1.0;
    curve.push(equity);
    for r in path {
        equity *= 1.0 + r;
        curve.push(equity);
    }
    curve
}

/// Most negative `equity / running_peak - 1`.
///
/// `None` for fewer than two equity observations. Never positive.
pub fn max_drawdown(equity: &[f64]) -> Option<f64> {
    if equity.len() < 2 {
        return None;
    }
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    for &value in equity {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.min(value / peak - 1.0);
        }
    }
    Some(worst)
}

/// Calendar granularity for worst-period figures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarPeriod {
    Month,
    Year,
}

impl CalendarPeriod {
    fn key(self, date: Date) -> (i16, i8) {
        match self {
            CalendarPeriod::Month => (date.year(), date.month()),
            CalendarPeriod::Year => (date.year(), 0),
        }
    }

    /// True when only weekend days remain between `date` and the end of its
    /// month or year.
    fn reaches_end(self, date: Date) -> bool {
        let end = match self {
            CalendarPeriod::Month => date.last_of_month(),
            CalendarPeriod::Year => date.last_of_year(),
        };
        let mut day = date;
        while day < end {
            day = match day.tomorrow() {
                Ok(next) => next,
                Err(_) => return true,
            };
            if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
                return false;
            }
        }
        true
    }
}

/// Compounded return of one calendar bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarBucket {
    /// Last return date inside the bucket
    pub last_date: Date,
    pub compound_return: f64,
    /// The bucket's first return is measured from a price in an earlier bucket
    pub complete_start: bool,
    /// A later bucket follows, or the data runs to the bucket's last weekday
    pub complete_end: bool,
}

impl CalendarBucket {
    /// Covers its whole month or year
    pub fn is_full(&self) -> bool {
        self.complete_start && self.complete_end
    }
}

/// Group the path by calendar bucket of each period-end date.
///
/// `base_date` is the date of the price the first return is measured from.
/// The final bucket is only complete when the data reaches its last weekday.
pub fn calendar_buckets(
    base_date: Date,
    dates: &[Date],
    path: &[f64],
    period: CalendarPeriod,
) -> Vec<CalendarBucket> {
    debug_assert_eq!(dates.len(), path.len());
    let mut buckets: Vec<CalendarBucket> = Vec::new();
    let mut previous = base_date;

    for (&date, &r) in dates.iter().zip(path) {
        let key = period.key(date);
        match buckets.last_mut() {
            Some(bucket) if period.key(bucket.last_date) == key => {
                bucket.compound_return = (1.0 + bucket.compound_return) * (1.0 + r) - 1.0;
                bucket.last_date = date;
            }
            _ => {
                if let Some(bucket) = buckets.last_mut() {
                    bucket.complete_end = true;
                }
                buckets.push(CalendarBucket {
                    last_date: date,
                    compound_return: r,
                    complete_start: period.key(previous) < key,
                    complete_end: false,
                });
            }
        }
        previous = date;
    }
    if let Some(bucket) = buckets.last_mut() {
        bucket.complete_end = period.reaches_end(bucket.last_date);
    }
    buckets
}

fn worst_bucket(buckets: &[CalendarBucket]) -> Option<&CalendarBucket> {
    buckets
        .iter()
        .filter(|b| b.is_full())
        .fold(None, |worst: Option<&CalendarBucket>, b| match worst {
            Some(w) if w.compound_return <= b.compound_return => Some(w),
            _ => Some(b),
        })
}

/// Worst compounded calendar-month return and the month's last return date
pub fn worst_month(base_date: Date, dates: &[Date], path: &[f64]) -> Option<(f64, Date)> {
    let buckets = calendar_buckets(base_date, dates, path, CalendarPeriod::Month);
    worst_bucket(&buckets).map(|b| (b.compound_return, b.last_date))
}

/// Worst compounded calendar-year return and its year
pub fn worst_year(base_date: Date, dates: &[Date], path: &[f64]) -> Option<(f64, i16)> {
    let buckets = calendar_buckets(base_date, dates, path, CalendarPeriod::Year);
    worst_bucket(&buckets).map(|b| (b.compound_return, b.last_date.year()))
}

/// Population standard deviation of the negative returns, annualized.
/// 0 when fewer than two returns are negative.
pub fn downside_deviation_annual(path: &[f64], periodicity: Periodicity) -> f64 {
    let negatives: Vec<f64> = path.iter().copied().filter(|r| *r < 0.0).collect();
    if negatives.len() < 2 {
        return 0.0;
    }
    population_std_dev(&negatives) * periodicity.periods_per_year().sqrt()
}

/// `(annualized_return - risk_free) / downside_deviation`, 0 when the
/// deviation is 0
pub fn sortino(annualized_return: f64, downside_deviation: f64, risk_free_rate: f64) -> f64 {
    if downside_deviation > 0.0 {
        (annualized_return - risk_free_rate) / downside_deviation
    } else {
        0.0
    }
}

/// `equity_final^(periods_per_year / periods) - 1`; `None` if undefined
pub fn annual_return_geom(equity_final: f64, periods: usize, periodicity: Periodicity) -> Option<f64> {
    if periods == 0 || equity_final < 0.0 {
        return None;
    }
    let growth = equity_final.powf(periodicity.periods_per_year() / periods as f64) - 1.0;
    growth.is_finite().then_some(growth)
}

/// Full downside profile of `weights` held over `returns`
pub fn downside_metrics(
    weights: &[f64],
    returns: &AlignedReturns,
    risk_free_rate: f64,
    periodicity: Periodicity,
) -> DownsideMetrics {
    if returns.is_empty() {
        return DownsideMetrics::default();
    }

    let path = returns.weighted_path(weights);
    let equity = equity_curve(&path);
    let equity_final = equity[equity.len() - 1];

    let annualized_return = mean(&path) * periodicity.periods_per_year();
    let downside_dev = downside_deviation_annual(&path, periodicity);
    let month = worst_month(returns.base_date(), returns.dates(), &path);
    let year = worst_year(returns.base_date(), returns.dates(), &path);

    let metrics = DownsideMetrics {
        max_drawdown: max_drawdown(&equity),
        worst_month_return: month.map(|(r, _)| r),
        worst_month_date: month.map(|(_, d)| d),
        worst_year_return: year.map(|(r, _)| r),
        worst_year: year.map(|(_, y)| y),
        downside_deviation_annual: Some(downside_dev),
        sortino: Some(sortino(annualized_return, downside_dev, risk_free_rate)),
        annual_return_geom: annual_return_geom(equity_final, path.len(), periodicity),
        annualized_return: Some(annualized_return),
        total_return: Some(equity_final - 1.0),
    };

    debug!(
        periods = path.len(),
        max_drawdown = ?metrics.max_drawdown,
        worst_month = ?metrics.worst_month_return,
        worst_year = ?metrics.worst_year_return,
        sortino = ?metrics.sortino,
        "downside metrics"
    );
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_equity_and_drawdown() {
        let equity = equity_curve(&[0.10, -0.50, 0.20]);
        assert_eq!(equity.len(), 4);
        assert!((equity[3] - 1.1 * 0.5 * 1.2).abs() < 1e-12);
        let dd = max_drawdown(&equity).unwrap();
        assert!((dd + 0.5).abs() < 1e-12);
        assert_eq!(max_drawdown(&[1.0]), None);
        assert_eq!(max_drawdown(&equity_curve(&[0.01, 0.02])), Some(0.0));
    }

    #[test]
    fn test_partial_first_month_is_excluded() {
        // Base date mid-January: January's first return comes from a January price
        let base = date(2024, 1, 15);
        let dates = [
            date(2024, 1, 16),
            date(2024, 1, 31),
            date(2024, 2, 15),
            date(2024, 2, 29),
        ];
        let path = [-0.30, -0.10, 0.05, -0.02];
        let (ret, when) = worst_month(base, &dates, &path).unwrap();
        assert!((ret - (1.05 * 0.98 - 1.0)).abs() < 1e-12);
        assert_eq!(when, date(2024, 2, 29));
    }

    #[test]
    fn test_month_starting_at_previous_month_end_qualifies() {
        let base = date(2023, 12, 29);
        let dates = [date(2024, 1, 5), date(2024, 1, 31)];
        let path = [-0.10, 0.05];
        let (ret, when) = worst_month(base, &dates, &path).unwrap();
        assert!((ret - (0.9 * 1.05 - 1.0)).abs() < 1e-12);
        assert_eq!(when, date(2024, 1, 31));
    }

    #[test]
    fn test_no_qualifying_month() {
        let base = date(2024, 3, 1);
        let dates = [date(2024, 3, 4), date(2024, 3, 5)];
        assert_eq!(worst_month(base, &dates, &[0.01, -0.02]), None);
    }

    #[test]
    fn test_partial_trailing_period_is_excluded() {
        // One trading day into February and into 2025
        assert_eq!(worst_month(date(2024, 1, 31), &[date(2024, 2, 1)], &[-0.05]), None);
        assert_eq!(worst_year(date(2024, 12, 31), &[date(2025, 1, 2)], &[-0.05]), None);

        // January is full, the stub of February is not
        let dates = [date(2024, 1, 15), date(2024, 1, 31), date(2024, 2, 1)];
        let (ret, when) = worst_month(date(2023, 12, 29), &dates, &[0.01, 0.02, -0.30]).unwrap();
        assert!((ret - (1.01 * 1.02 - 1.0)).abs() < 1e-12);
        assert_eq!(when, date(2024, 1, 31));
    }

    #[test]
    fn test_trailing_month_ending_before_weekend_is_full() {
        // 2024-03-29 is a Friday; March 30 and 31 fall on the weekend
        let base = date(2024, 2, 29);
        let dates = [date(2024, 3, 15), date(2024, 3, 29)];
        let buckets = calendar_buckets(base, &dates, &[-0.02, -0.03], CalendarPeriod::Month);
        assert_eq!(buckets.len(), 1);
        assert!(buckets[0].is_full());

        let short = calendar_buckets(base, &dates[..1], &[-0.02], CalendarPeriod::Month);
        assert!(short[0].complete_start);
        assert!(!short[0].complete_end);
    }

    #[test]
    fn test_worst_year() {
        let base = date(2021, 12, 31);
        let dates = [
            date(2022, 6, 30),
            date(2022, 12, 30),
            date(2023, 6, 30),
            date(2023, 12, 29),
        ];
        let path = [-0.10, -0.10, 0.05, 0.05];
        let (ret, year) = worst_year(base, &dates, &path).unwrap();
        assert!((ret - (0.81 - 1.0)).abs() < 1e-12);
        assert_eq!(year, 2022);
    }

    #[test]
    fn test_downside_deviation() {
        let path = [0.02, -0.01, 0.03, -0.03];
        let dd = downside_deviation_annual(&path, Periodicity::Monthly);
        assert!((dd - 0.01 * 12f64.sqrt()).abs() < 1e-12);
        assert_eq!(downside_deviation_annual(&[0.01, 0.02], Periodicity::Daily), 0.0);
        assert_eq!(sortino(0.1, 0.0, 0.02), 0.0);
    }

    #[test]
    fn test_annual_return_geom() {
        let g = annual_return_geom(1.21, 24, Periodicity::Monthly).unwrap();
        assert!((g - 0.10).abs() < 1e-12);
        assert_eq!(annual_return_geom(1.0, 0, Periodicity::Daily), None);
    }
}
