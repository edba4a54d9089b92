//! Symbol-indexed square matrices
//!
//! Both matrices are indexed by the basket's symbols in basket order and
//! serialize as nested `{a: {b: value}}` maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ids::Symbol;
use super::keyed::{deserialize_matrix, serialize_matrix};

/// Pairwise correlation of periodic returns.
///
/// Diagonal entries are exactly 1.0 and off-diagonal entries lie in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub symbols: Vec<Symbol>,
    pub rows: Vec<Vec<f64>>,
}

/// Annualized sample covariance of periodic returns
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    pub symbols: Vec<Symbol>,
    pub rows: Vec<Vec<f64>>,
}

impl Serialize for CorrelationMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_matrix(&self.symbols, &self.rows, serializer)
    }
}

impl<'de> Deserialize<'de> for CorrelationMatrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (symbols, rows) = deserialize_matrix(deserializer)?;
        Ok(Self { symbols, rows })
    }
}

impl Serialize for CovarianceMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_matrix(&self.symbols, &self.rows, serializer)
    }
}

impl<'de> Deserialize<'de> for CovarianceMatrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (symbols, rows) = deserialize_matrix(deserializer)?;
        Ok(Self { symbols, rows })
    }
}

fn lookup(symbols: &[Symbol], rows: &[Vec<f64>], a: &Symbol, b: &Symbol) -> Option<f64> {
    let i = symbols.iter().position(|s| s == a)?;
    let j = symbols.iter().position(|s| s == b)?;
    Some(rows[i][j])
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    pub fn get_by_symbol(&self, a: &Symbol, b: &Symbol) -> Option<f64> {
        lookup(&self.symbols, &self.rows, a, b)
    }

    /// Nested `{a: {b: rho}}` view for presentation code
    pub fn to_nested_map(&self) -> BTreeMap<Symbol, BTreeMap<Symbol, f64>> {
        self.symbols
            .iter()
            .zip(&self.rows)
            .map(|(a, row)| {
                let inner = self.symbols.iter().cloned().zip(row.iter().copied()).collect();
                (a.clone(), inner)
            })
            .collect()
    }
}

impl CovarianceMatrix {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    pub fn get_by_symbol(&self, a: &Symbol, b: &Symbol) -> Option<f64> {
        lookup(&self.symbols, &self.rows, a, b)
    }

    /// Row-major copy used by the batched quadratic form
    pub fn to_flat(&self) -> Vec<f64> {
        self.rows.iter().flatten().copied().collect()
    }

    /// Annualized volatility of each asset (square root of the diagonal)
    pub fn volatilities(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.rows[i][i].max(0.0).sqrt())
            .collect()
    }
}

/// Two basket members and their correlation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolPair {
    pub first: Symbol,
    pub second: Symbol,
    pub correlation: f64,
}

/// Pair-level view of the correlation matrix.
///
/// Every field is `None` for a single-symbol basket, where no pairs exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSummary {
    pub most_correlated: Option<SymbolPair>,
    pub least_correlated: Option<SymbolPair>,
    pub average_pairwise: Option<f64>,
    /// `1 - average_pairwise`, so 0 means every pair moves in lockstep
    pub diversification_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    #[test]
    fn test_nested_map_and_lookup() {
        let corr = CorrelationMatrix {
            symbols: vec![sym("AAA"), sym("BBB")],
            rows: vec![vec![1.0, 0.25], vec![0.25, 1.0]],
        };
        let nested = corr.to_nested_map();
        assert_eq!(nested[&sym("AAA")][&sym("BBB")], 0.25);
        assert_eq!(corr.get_by_symbol(&sym("BBB"), &sym("BBB")), Some(1.0));
        assert_eq!(corr.get_by_symbol(&sym("AAA"), &sym("CCC")), None);
    }

    #[test]
    fn test_covariance_flat_and_volatilities() {
        let cov = CovarianceMatrix {
            symbols: vec![sym("AAA"), sym("BBB")],
            rows: vec![vec![0.04, 0.01], vec![0.01, 0.09]],
        };
        assert_eq!(cov.to_flat(), vec![0.04, 0.01, 0.01, 0.09]);
        let vols = cov.volatilities();
        assert!((vols[0] - 0.2).abs() < 1e-12);
        assert!((vols[1] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_serializes_keyed_by_symbol() {
        let corr = CorrelationMatrix {
            symbols: vec![sym("BBB"), sym("AAA")],
            rows: vec![vec![1.0, -0.5], vec![-0.5, 1.0]],
        };
        let json = serde_json::to_string(&corr).unwrap();
        assert_eq!(json, r#"{"BBB":{"BBB":1.0,"AAA":-0.5},"AAA":{"BBB":-0.5,"AAA":1.0}}"#);

        let back: CorrelationMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, corr);

        // Inner order is free, but every row must name every symbol
        let shuffled: CovarianceMatrix =
            serde_json::from_str(r#"{"AAA":{"BBB":0.01,"AAA":0.04},"BBB":{"AAA":0.01,"BBB":0.09}}"#)
                .unwrap();
        assert_eq!(shuffled.rows, vec![vec![0.04, 0.01], vec![0.01, 0.09]]);
        assert!(
            serde_json::from_str::<CovarianceMatrix>(r#"{"AAA":{"AAA":0.04},"BBB":{"BBB":0.09}}"#)
                .is_err()
        );
    }
}
