//! Policy knobs that change numbers, not plumbing

use serde::{Deserialize, Serialize};

/// Sampling frequency of the input prices.
///
/// Fixes `periods_per_year` for every annualization in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Periodicity {
    pub const TRADING_DAYS_PER_YEAR: u32 = 252;

    pub fn periods_per_year(self) -> f64 {
        match self {
            Periodicity::Daily => f64::from(Self::TRADING_DAYS_PER_YEAR),
            Periodicity::Weekly => 52.0,
            Periodicity::Monthly => 12.0,
        }
    }
}

/// How random long-only weight vectors are drawn from the simplex
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSampling {
    /// k independent draws from (0, 1], divided by their sum
    #[default]
    UniformNormalized,
    /// Symmetric Dirichlet: k Gamma(alpha, 1) draws divided by their sum.
    /// `alpha = 1` is uniform over the simplex; larger values pull toward
    /// equal weights, smaller values toward corners.
    Dirichlet { alpha: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periods_per_year() {
        assert_eq!(Periodicity::default().periods_per_year(), 252.0);
        assert_eq!(Periodicity::Weekly.periods_per_year(), 52.0);
        assert_eq!(Periodicity::Monthly.periods_per_year(), 12.0);
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&Periodicity::Monthly).unwrap();
        assert_eq!(json, "\"monthly\"");

        let sampling: WeightSampling =
            serde_json::from_str(r#"{"dirichlet":{"alpha":0.5}}"#).unwrap();
        assert_eq!(sampling, WeightSampling::Dirichlet { alpha: 0.5 });

        let sampling: WeightSampling = serde_json::from_str("\"uniform_normalized\"").unwrap();
        assert_eq!(sampling, WeightSampling::UniformNormalized);
    }
}
