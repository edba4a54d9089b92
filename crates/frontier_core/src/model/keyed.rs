//! Symbol-keyed wire forms
//!
//! Weights and matrices are stored as parallel vectors in basket order but
//! cross the serde boundary as `{symbol: value}` and `{a: {b: value}}` maps.
//! Map entries are written in basket order and read back in document order.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ids::{MAX_BASKET_SIZE, Symbol};

/// `{symbol: value}` entries in document order; duplicate keys are rejected
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SymbolEntries<V>(pub Vec<(Symbol, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for SymbolEntries<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = SymbolEntries<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map keyed by ticker symbol")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let capacity = map.size_hint().unwrap_or(0).min(MAX_BASKET_SIZE);
                let mut entries: Vec<(Symbol, V)> = Vec::with_capacity(capacity);
                while let Some(symbol) = map.next_key::<Symbol>()? {
                    if entries.iter().any(|(s, _)| *s == symbol) {
                        return Err(de::Error::custom(format!("duplicate symbol {symbol}")));
                    }
                    let value = map.next_value()?;
                    entries.push((symbol, value));
                }
                Ok(SymbolEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// One matrix row as `{column symbol: value}`
struct RowView<'a> {
    symbols: &'a [Symbol],
    values: &'a [f64],
}

impl Serialize for RowView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.symbols.len()))?;
        for (symbol, value) in self.symbols.iter().zip(self.values) {
            map.serialize_entry(symbol, value)?;
        }
        map.end()
    }
}

pub(crate) fn serialize_matrix<S>(
    symbols: &[Symbol],
    rows: &[Vec<f64>],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(symbols.len()))?;
    for (symbol, row) in symbols.iter().zip(rows) {
        map.serialize_entry(symbol, &RowView { symbols, values: row })?;
    }
    map.end()
}

/// Read `{a: {b: value}}` back into basket-ordered rows.
///
/// Every row must name exactly the outer symbols; inner order is free.
pub(crate) fn deserialize_matrix<'de, D>(
    deserializer: D,
) -> Result<(Vec<Symbol>, Vec<Vec<f64>>), D::Error>
where
    D: Deserializer<'de>,
{
    let SymbolEntries(outer) = SymbolEntries::<SymbolEntries<f64>>::deserialize(deserializer)?;
    let symbols: Vec<Symbol> = outer.iter().map(|(s, _)| s.clone()).collect();

    let mut rows = Vec::with_capacity(outer.len());
    for (row_symbol, SymbolEntries(inner)) in outer {
        if inner.len() != symbols.len() {
            return Err(de::Error::custom(format!(
                "row {row_symbol} has {} entries, expected {}",
                inner.len(),
                symbols.len()
            )));
        }
        let row = symbols
            .iter()
            .map(|column| {
                inner
                    .iter()
                    .find(|(s, _)| s == column)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| {
                        de::Error::custom(format!("row {row_symbol} is missing column {column}"))
                    })
            })
            .collect::<Result<Vec<f64>, D::Error>>()?;
        rows.push(row);
    }
    Ok((symbols, rows))
}
