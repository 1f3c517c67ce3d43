//! Market-data collaborators.
//!
//! A source turns `(ticker, range)` into daily bars. The aggregator treats it as
//! opaque: an empty result is data, `NotFound`/`Network` are failures.

mod memory;
mod synthetic;
mod yahoo;

use std::future::Future;

use clap::ValueEnum;

use crate::error::SourceError;
use crate::model::{DailyBar, DateRange};

pub use memory::InMemorySource;
pub use synthetic::SyntheticSource;
pub use yahoo::YahooSource;

pub trait MarketDataSource {
    /// Daily observations for `ticker` within `range`, both ends inclusive.
    fn retrieve(
        &self,
        ticker: &str,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<DailyBar>, SourceError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceKind {
    /// Yahoo Finance chart API
    #[default]
    Yahoo,
    /// Seeded offline random walk
    Synthetic,
}

/// Runtime choice between the network and offline sources.
pub enum AnySource {
    Yahoo(YahooSource),
    Synthetic(SyntheticSource),
}

impl AnySource {
    pub fn from_kind(kind: SourceKind) -> Result<Self, SourceError> {
        match kind {
            SourceKind::Yahoo => Ok(AnySource::Yahoo(YahooSource::with_defaults()?)),
            SourceKind::Synthetic => Ok(AnySource::Synthetic(SyntheticSource::new())),
        }
    }
}

impl MarketDataSource for AnySource {
    async fn retrieve(&self, ticker: &str, range: DateRange) -> Result<Vec<DailyBar>, SourceError> {
        match self {
            AnySource::Yahoo(source) => source.retrieve(ticker, range).await,
            AnySource::Synthetic(source) => source.retrieve(ticker, range).await,
        }
    }
}
