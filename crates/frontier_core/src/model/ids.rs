//! Ticker identifiers and the requested basket
//!
//! Symbols are normalized once, at the boundary, so every later stage can
//! compare them byte-for-byte.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FrontierError, Result};

/// Largest basket a single run accepts
pub const MAX_BASKET_SIZE: usize = 50;

/// A normalized ticker symbol (upper-case ASCII letters, `.` and `-`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Trim, upper-case and validate a raw identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(FrontierError::invalid_input("ticker", "empty symbol"));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == '.' || c == '-')
        {
            return Err(FrontierError::invalid_input(
                "ticker",
                format!("invalid symbol {normalized:?}"),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = FrontierError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// Non-empty, de-duplicated, ordered list of symbols for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct Basket(Vec<Symbol>);

impl Basket {
    /// Normalize a raw ticker list.
    ///
    /// Blank entries are skipped and duplicates keep their first position.
    /// Any remaining malformed symbol rejects the whole basket.
    pub fn parse<I, S>(tickers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut symbols: Vec<Symbol> = Vec::new();
        let mut bad = Vec::new();

        for raw in tickers {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }
            match Symbol::parse(raw) {
                Ok(symbol) => {
                    if !symbols.contains(&symbol) {
                        symbols.push(symbol);
                    }
                }
                Err(_) => bad.push(raw.trim().to_string()),
            }
        }

        if !bad.is_empty() {
            return Err(FrontierError::invalid_input(
                "tickers",
                format!("invalid ticker symbols: {}", bad.join(", ")),
            ));
        }

        Self::from_symbols(symbols)
    }

    /// Build from already-normalized symbols, rejecting duplicates.
    pub fn from_symbols(symbols: Vec<Symbol>) -> Result<Self> {
        if symbols.is_empty() {
            return Err(FrontierError::EmptyBasket);
        }
        if symbols.len() > MAX_BASKET_SIZE {
            return Err(FrontierError::invalid_input(
                "tickers",
                format!(
                    "too many tickers ({}, max {MAX_BASKET_SIZE})",
                    symbols.len()
                ),
            ));
        }
        for (i, symbol) in symbols.iter().enumerate() {
            if symbols[..i].contains(symbol) {
                return Err(FrontierError::invalid_input(
                    "tickers",
                    format!("duplicate symbol {symbol}"),
                ));
            }
        }
        Ok(Self(symbols))
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed basket; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, symbol: &Symbol) -> Option<usize> {
        self.0.iter().position(|s| s == symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.0.iter()
    }
}

impl TryFrom<Vec<Symbol>> for Basket {
    type Error = FrontierError;

    fn try_from(symbols: Vec<Symbol>) -> Result<Self> {
        Self::from_symbols(symbols)
    }
}

impl From<Basket> for Vec<Symbol> {
    fn from(basket: Basket) -> Self {
        basket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(Symbol::parse("  aapl ").unwrap().as_str(), "AAPL");
        assert_eq!(Symbol::parse("brk.b").unwrap().as_str(), "BRK.B");
        assert_eq!(Symbol::parse("rds-a").unwrap().as_str(), "RDS-A");
        assert!(Symbol::parse("A1").is_err());
        assert!(Symbol::parse("   ").is_err());
    }

    #[test]
    fn test_basket_dedup_preserves_order() {
        let basket = Basket::parse(["msft", "AAPL", " MSFT", "", "tsla"]).unwrap();
        let names: Vec<&str> = basket.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["MSFT", "AAPL", "TSLA"]);
    }

    #[test]
    fn test_empty_basket_rejected() {
        let empty: [&str; 0] = [];
        assert_eq!(Basket::parse(empty), Err(FrontierError::EmptyBasket));
        assert_eq!(Basket::parse(["", "  "]), Err(FrontierError::EmptyBasket));
    }

    #[test]
    fn test_invalid_symbols_reported_together() {
        let err = Basket::parse(["AAPL", "BAD$", "1X"]).unwrap_err();
        match err {
            FrontierError::InvalidInput { reason, .. } => {
                assert!(reason.contains("BAD$"));
                assert!(reason.contains("1X"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_basket_size_limit() {
        let names: Vec<String> = (0..=MAX_BASKET_SIZE)
            .map(|i| {
                let a = (b'A' + (i / 26) as u8) as char;
                let b = (b'A' + (i % 26) as u8) as char;
                format!("{a}{b}")
            })
            .collect();
        assert!(Basket::parse(&names).is_err());
        assert!(Basket::parse(&names[..MAX_BASKET_SIZE]).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let basket: Basket = serde_json::from_str(r#"["msft", "AAPL"]"#).unwrap();
        assert_eq!(serde_json::to_string(&basket).unwrap(), r#"["MSFT","AAPL"]"#);

        assert!(serde_json::from_str::<Basket>("[]").is_err());
        assert!(serde_json::from_str::<Basket>(r#"["AAPL", "aapl"]"#).is_err());
        assert!(serde_json::from_str::<Symbol>(r#""BAD$""#).is_err());
    }
}
