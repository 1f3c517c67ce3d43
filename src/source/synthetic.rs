use chrono::{Datelike, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::error::SourceError;
use crate::model::{DailyBar, DateRange};

use super::MarketDataSource;

const MAX_TICKER_LEN: usize = 12;
const DAILY_VOLATILITY: f64 = 0.015;
const DAILY_DRIFT: f64 = 0.0003;
const DIVIDEND_DRAG: f64 = 0.9998;

/// Offline geometric random walk, reproducible per (ticker, range).
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    seed: u64,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    pub fn generate(&self, ticker: &str, range: DateRange) -> Result<Vec<DailyBar>, SourceError> {
        if !is_plausible_ticker(ticker) {
            return Err(SourceError::NotFound(ticker.to_string()));
        }

        let mut rng = StdRng::seed_from_u64(self.seed ^ fnv1a(ticker));
        let mut price: f64 = rng.gen_range(80.0..150.0);
        let mut adjustment = 1.0;
        let mut bars = Vec::new();

        for date in range.start().iter_days() {
            if date > range.end() {
                break;
            }
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }

            let shock: f64 = rng.sample(StandardNormal);
            price = (price * (1.0 + DAILY_DRIFT + shock * DAILY_VOLATILITY)).max(0.01);
            adjustment *= DIVIDEND_DRAG;
            bars.push(DailyBar::new(date, price, price * adjustment));
        }

        Ok(bars)
    }
}

impl MarketDataSource for SyntheticSource {
    async fn retrieve(&self, ticker: &str, range: DateRange) -> Result<Vec<DailyBar>, SourceError> {
        self.generate(ticker, range)
    }
}

fn is_plausible_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && ticker.len() <= MAX_TICKER_LEN
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-'))
}

fn fnv1a(input: &str) -> u64 {
    input.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}
