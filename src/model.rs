use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use clap::ValueEnum;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SYMBOLS;
use crate::error::{ModelError, Warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ResamplePeriod {
    #[default]
    Monthly,
    Quarterly,
}

impl ResamplePeriod {
    /// Last calendar day of the month or quarter containing `date`.
    pub fn bucket_end(self, date: NaiveDate) -> Option<NaiveDate> {
        let month = match self {
            ResamplePeriod::Monthly => date.month(),
            ResamplePeriod::Quarterly => date.month0() / 3 * 3 + 3,
        };
        last_day_of_month(date.year(), month)
    }
}

impl fmt::Display for ResamplePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResamplePeriod::Monthly => "Monthly",
            ResamplePeriod::Quarterly => "Quarterly",
        };
        f.write_str(label)
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Which price column feeds resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Close,
    #[default]
    AdjClose,
}

impl PriceField {
    pub fn pick(self, bar: &DailyBar) -> f64 {
        match self {
            PriceField::Close => bar.close,
            PriceField::AdjClose => bar.adj_close,
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PriceField::Close => "Close",
            PriceField::AdjClose => "Adjusted close",
        };
        f.write_str(label)
    }
}

/// Inclusive calendar range; `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ModelError> {
        if start > end {
            return Err(ModelError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days ending at `today`.
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        let start = today
            .checked_sub_signed(Duration::days(days.max(0)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One row of the collaborator's daily price table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub close: f64,
    pub adj_close: f64,
}

impl DailyBar {
    pub fn new(date: NaiveDate, close: f64, adj_close: f64) -> Self {
        Self {
            date,
            close,
            adj_close,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: f64,
    pub symbol: String,
}

/// Rows keyed by (symbol, date), kept in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeriesTable {
    rows: Vec<PricePoint>,
}

impl SeriesTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[PricePoint] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.rows.iter()
    }

    pub fn append(&mut self, other: SeriesTable) {
        self.rows.extend(other.rows);
    }

    /// Distinct symbols in order of first appearance.
    pub fn symbols(&self) -> Vec<&str> {
        let mut seen = IndexSet::new();
        for row in &self.rows {
            seen.insert(row.symbol.as_str());
        }
        seen.into_iter().collect()
    }
}

impl From<Vec<PricePoint>> for SeriesTable {
    fn from(rows: Vec<PricePoint>) -> Self {
        Self { rows }
    }
}

impl FromIterator<PricePoint> for SeriesTable {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SeriesTable {
    type Item = PricePoint;
    type IntoIter = std::vec::IntoIter<PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a SeriesTable {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Display name to ticker mapping. Grows only; insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolBook {
    entries: IndexMap<String, String>,
}

impl SymbolBook {
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        DEFAULT_SYMBOLS.iter().copied().collect()
    }

    /// Insert a new entry. Existing names are never overwritten and a ticker is held by at
    /// most one name, so every symbol is fetched once per aggregation.
    pub fn insert(&mut self, name: impl Into<String>, ticker: impl Into<String>) -> bool {
        let name = name.into();
        let ticker = ticker.into();
        if self.entries.contains_key(&name) || self.contains_ticker(&ticker) {
            return false;
        }
        self.entries.insert(name, ticker);
        true
    }

    pub fn ticker_for(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn name_for(&self, ticker: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, code)| code.as_str() == ticker)
            .map(|(name, _)| name.as_str())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn contains_ticker(&self, ticker: &str) -> bool {
        self.entries.values().any(|code| code == ticker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, ticker)| (name.as_str(), ticker.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }
}

impl Default for SymbolBook {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<N: Into<String>, T: Into<String>> FromIterator<(N, T)> for SymbolBook {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut book = SymbolBook::empty();
        for (name, ticker) in iter {
            book.insert(name, ticker);
        }
        book
    }
}

/// Display names the user chose to chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    names: IndexSet<String>,
}

impl SelectionState {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all(book: &SymbolBook) -> Self {
        book.names().collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Map chosen names to ticker codes. Names missing from the book are reported, not resolved.
    pub fn resolve(&self, book: &SymbolBook) -> (HashSet<String>, Vec<Warning>) {
        let mut codes = HashSet::with_capacity(self.names.len());
        let mut warnings = Vec::new();
        for name in &self.names {
            match book.ticker_for(name) {
                Some(ticker) => {
                    codes.insert(ticker.to_string());
                }
                None => warnings.push(Warning::UnknownSelection { name: name.clone() }),
            }
        }
        (codes, warnings)
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
