mod cache;

use serde_json::json;

use crate::error::{SourceError, Warning};
use crate::logging;
use crate::model::{DateRange, PriceField, ResamplePeriod, SeriesTable, SymbolBook};
use crate::resample::resample_last;
use crate::source::MarketDataSource;

use cache::{CacheKey, SeriesCache};

pub use cache::CacheStats;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub period: ResamplePeriod,
    pub field: PriceField,
    pub cache_enabled: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            period: ResamplePeriod::default(),
            field: PriceField::default(),
            cache_enabled: true,
        }
    }
}

/// Concatenated table plus the per-symbol problems met while building it.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub table: SeriesTable,
    pub warnings: Vec<Warning>,
}

/// Fetches, resamples and concatenates price series for a symbol book.
pub struct TimeSeriesAggregator<S> {
    source: S,
    config: AggregatorConfig,
    cache: SeriesCache,
}

impl<S: MarketDataSource> TimeSeriesAggregator<S> {
    pub fn new(source: S, config: AggregatorConfig) -> Self {
        Self {
            source,
            config,
            cache: SeriesCache::default(),
        }
    }

    pub fn config(&self) -> AggregatorConfig {
        self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Resampled series for one ticker. Empty data is returned as an empty table.
    pub async fn fetch_series(
        &mut self,
        ticker: &str,
        range: DateRange,
    ) -> Result<SeriesTable, SourceError> {
        let key = CacheKey::new(ticker, range, self.config.period, self.config.field);
        if self.config.cache_enabled {
            if let Some(table) = self.cache.get(&key) {
                logging::info(
                    "cache.hit",
                    "Serving resampled series from cache",
                    json!({ "ticker": ticker, "rows": table.len() }),
                );
                return Ok(table);
            }
        }

        let bars = self.source.retrieve(ticker, range).await?;
        let table = resample_last(ticker, &bars, range, self.config.period, self.config.field);
        logging::info(
            "aggregate.fetch",
            "Fetched and resampled series",
            json!({
                "ticker": ticker,
                "daily_rows": bars.len(),
                "resampled_rows": table.len(),
                "period": self.config.period.to_string(),
            }),
        );

        if self.config.cache_enabled {
            self.cache.insert(key, table.clone());
        }
        Ok(table)
    }

    /// One fetch per book entry, concatenated in book order. Failures become warnings.
    pub async fn aggregate(&mut self, symbols: &SymbolBook, range: DateRange) -> Aggregation {
        let mut aggregation = Aggregation::default();

        for ticker in symbols.tickers() {
            match self.fetch_series(ticker, range).await {
                Ok(table) if table.is_empty() => {
                    aggregation.warnings.push(Warning::EmptyRange {
                        ticker: ticker.to_string(),
                    });
                }
                Ok(table) => aggregation.table.append(table),
                Err(err) => aggregation
                    .warnings
                    .push(Warning::from_source_error(ticker, &err)),
            }
        }

        aggregation
    }
}
