use std::time::Duration;

use chrono::{DateTime, NaiveTime};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::constants::{HTTP_TIMEOUT_SECS, HTTP_USER_AGENT, YAHOO_BASE_URL};
use crate::error::SourceError;
use crate::logging;
use crate::model::{DailyBar, DateRange};

use super::MarketDataSource;

/// Daily bars from the Yahoo Finance v8 chart endpoint.
pub struct YahooSource {
    base_url: String,
    client: reqwest::Client,
}

impl YahooSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SourceError::Network(format!(
                "invalid base url '{base_url}': must start with http:// or https://"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(HTTP_USER_AGENT)
            .build()
            .map_err(|err| SourceError::Network(format!("failed to create HTTP client: {err}")))?;

        Ok(Self { base_url, client })
    }

    pub fn with_defaults() -> Result<Self, SourceError> {
        Self::new(YAHOO_BASE_URL, Duration::from_secs(HTTP_TIMEOUT_SECS))
    }

    fn chart_url(&self, ticker: &str, range: DateRange) -> String {
        // period2 is exclusive upstream, so push it one day past the inclusive end.
        let period1 = range.start().and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = range
            .end()
            .succ_opt()
            .unwrap_or(range.end())
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();

        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplit&includeAdjustedClose=true",
            self.base_url,
            urlencoding::encode(ticker),
            period1,
            period2
        )
    }
}

impl MarketDataSource for YahooSource {
    async fn retrieve(&self, ticker: &str, range: DateRange) -> Result<Vec<DailyBar>, SourceError> {
        let url = self.chart_url(ticker, range);
        logging::info(
            "yahoo.request",
            "Requesting daily chart",
            json!({ "ticker": ticker, "url": url }),
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| SourceError::Network(format!("request for {ticker} failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SourceError::Network(format!("reading body for {ticker} failed: {err}")))?;

        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(ticker.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Network(format!(
                "unexpected status {} for {ticker}",
                status.as_u16()
            )));
        }

        decode_chart(ticker, &body)
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Vec<AdjCloseBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn decode_chart(ticker: &str, body: &str) -> Result<Vec<DailyBar>, SourceError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|err| SourceError::Decode(format!("chart payload for {ticker}: {err}")))?;

    if let Some(error) = envelope.chart.error {
        if error.code.eq_ignore_ascii_case("not found") {
            return Err(SourceError::NotFound(ticker.to_string()));
        }
        return Err(SourceError::Decode(format!(
            "{}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = envelope.chart.result.and_then(|results| results.into_iter().next())
    else {
        return Ok(Vec::new());
    };

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|block| block.close)
        .unwrap_or_default();
    let adjusted = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|block| block.adjclose)
        .unwrap_or_default();

    let offset = result.meta.gmtoffset;
    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(idx, ts)| {
            let close = closes.get(idx).copied().flatten()?;
            let adj_close = adjusted.get(idx).copied().flatten().unwrap_or(close);
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(DailyBar::new(date, close, adj_close))
        })
        .collect();

    Ok(bars)
}
