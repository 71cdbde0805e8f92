//! In-memory provider for tests, benches, and offline runs.

use super::provider::{bars_in_range, DataError, DataProvider, DataSource, FetchResult};
use crate::domain::DailyBar;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    bars: HashMap<String, Vec<DailyBar>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the full history of a symbol.
    pub fn insert(&mut self, symbol: &str, bars: Vec<DailyBar>) {
        self.bars.insert(symbol.to_uppercase(), bars);
    }

    pub fn with_symbol(mut self, symbol: &str, bars: Vec<DailyBar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.bars.keys().map(String::as_str)
    }
}

impl DataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self
            .bars
            .get(&symbol.to_uppercase())
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        Ok(FetchResult {
            symbol: symbol.to_uppercase(),
            bars: bars_in_range(bars, start, end),
            source: DataSource::InMemory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::daily_bars;

    #[test]
    fn lookups_are_case_insensitive() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let provider = InMemoryProvider::new().with_symbol("spy", daily_bars(start, &[1.0, 2.0]));
        let result = provider
            .fetch("SPY", start, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
            .unwrap();
        assert_eq!(result.symbol, "SPY");
        assert_eq!(result.bars.len(), 2);
        assert_eq!(result.source, DataSource::InMemory);
    }

    #[test]
    fn empty_range_is_not_an_error() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let provider = InMemoryProvider::new().with_symbol("SPY", daily_bars(start, &[1.0]));
        let before = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(provider.fetch("SPY", before, before).unwrap().bars.is_empty());
    }
}
