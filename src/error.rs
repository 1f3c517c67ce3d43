use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Failure kinds reported by a market-data source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Ticker is unknown or delisted
    #[error("ticker not found: {0}")]
    NotFound(String),

    /// Transport failure or unexpected HTTP status
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be interpreted
    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// Non-fatal conditions surfaced to the user alongside a render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    InvalidTicker { ticker: String, reason: String },
    EmptyRange { ticker: String },
    ZeroBase { ticker: String },
    Network { ticker: String, message: String },
    FetchFailed { ticker: String, message: String },
    UnknownSelection { name: String },
}

impl Warning {
    /// Map a retrieval failure for an already known symbol onto a warning.
    pub fn from_source_error(ticker: &str, err: &SourceError) -> Self {
        match err {
            SourceError::Network(message) => Warning::Network {
                ticker: ticker.to_string(),
                message: message.clone(),
            },
            other => Warning::FetchFailed {
                ticker: ticker.to_string(),
                message: other.to_string(),
            },
        }
    }

    pub fn event(&self) -> &'static str {
        match self {
            Warning::InvalidTicker { .. } => "ticker.rejected",
            Warning::EmptyRange { .. } => "aggregate.empty_range",
            Warning::ZeroBase { .. } => "normalize.zero_base",
            Warning::Network { .. } => "aggregate.network_error",
            Warning::FetchFailed { .. } => "aggregate.fetch_failed",
            Warning::UnknownSelection { .. } => "select.unknown",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::InvalidTicker { ticker, reason } => write!(
                f,
                "Failed to fetch data for {ticker}. Please make sure it's a valid ticker symbol ({reason})"
            ),
            Warning::EmptyRange { ticker } => {
                write!(f, "No data for {ticker} in the selected date range")
            }
            Warning::ZeroBase { ticker } => write!(
                f,
                "{ticker} starts at zero and cannot be normalized; it is left out of the chart"
            ),
            Warning::Network { ticker, message } => write!(
                f,
                "Could not reach the market data service for {ticker}, try again later ({message})"
            ),
            Warning::FetchFailed { ticker, message } => {
                write!(f, "Failed to load {ticker}: {message}")
            }
            Warning::UnknownSelection { name } => {
                write!(f, "{name} is not in the symbol list and was ignored")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_failures_stay_retryable() {
        let warning = Warning::from_source_error("AAPL", &SourceError::Network("timeout".into()));
        assert!(matches!(warning, Warning::Network { .. }));
        assert_eq!(warning.event(), "aggregate.network_error");
    }

    #[test]
    fn warnings_serialize_with_kind_tag() {
        let warning = Warning::EmptyRange {
            ticker: "TSLA".into(),
        };
        let value = serde_json::to_value(&warning).expect("serialize warning");
        assert_eq!(value["kind"], "empty_range");
        assert_eq!(value["ticker"], "TSLA");
    }
}
