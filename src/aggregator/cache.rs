use std::collections::HashMap;

use chrono::NaiveDate;

use crate::model::{DateRange, PriceField, ResamplePeriod, SeriesTable};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    ticker: String,
    start: NaiveDate,
    end: NaiveDate,
    period: ResamplePeriod,
    field: PriceField,
}

impl CacheKey {
    pub(crate) fn new(
        ticker: &str,
        range: DateRange,
        period: ResamplePeriod,
        field: PriceField,
    ) -> Self {
        Self {
            ticker: ticker.to_string(),
            start: range.start(),
            end: range.end(),
            period,
            field,
        }
    }
}

/// Memoized resampled tables. Advisory only: a miss just means another fetch.
#[derive(Debug, Default)]
pub(crate) struct SeriesCache {
    entries: HashMap<CacheKey, SeriesTable>,
    hits: u64,
    misses: u64,
}

impl SeriesCache {
    pub(crate) fn get(&mut self, key: &CacheKey) -> Option<SeriesTable> {
        match self.entries.get(key) {
            Some(table) => {
                self.hits += 1;
                Some(table.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub(crate) fn insert(&mut self, key: CacheKey, table: SeriesTable) {
        self.entries.insert(key, table);
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}
