use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::SourceError;
use crate::model::{DailyBar, DateRange};

use super::MarketDataSource;

/// Fixture-backed source: serves fixed bars per ticker and counts calls.
#[derive(Debug, Default)]
pub struct InMemorySource {
    series: HashMap<String, Vec<DailyBar>>,
    offline: bool,
    calls: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, ticker: impl Into<String>, bars: Vec<DailyBar>) -> Self {
        self.series.insert(ticker.into(), bars);
        self
    }

    /// Fail every retrieval with a network error.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl MarketDataSource for InMemorySource {
    async fn retrieve(&self, ticker: &str, range: DateRange) -> Result<Vec<DailyBar>, SourceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.offline {
            return Err(SourceError::Network(format!(
                "connection refused while fetching {ticker}"
            )));
        }

        let bars = self
            .series
            .get(ticker)
            .ok_or_else(|| SourceError::NotFound(ticker.to_string()))?;

        Ok(bars
            .iter()
            .filter(|bar| range.contains(bar.date))
            .copied()
            .collect())
    }
}
