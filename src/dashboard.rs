use serde::Serialize;
use serde_json::json;

use crate::aggregator::{AggregatorConfig, TimeSeriesAggregator};
use crate::error::{SourceError, Warning};
use crate::logging;
use crate::model::{DateRange, SelectionState, SeriesTable, SymbolBook};
use crate::pipeline::{self, PlotSeries};
use crate::source::MarketDataSource;

/// Outcome of trying to add a user-entered ticker to the symbol book.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerValidation {
    Added,
    AlreadyPresent,
    Empty,
    Failed(SourceError),
}

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub range: DateRange,
    pub selection: SelectionState,
    pub normalize: bool,
}

/// Everything the presentation layer needs for one redraw.
#[derive(Debug, Clone, Serialize)]
pub struct Render {
    pub selected: Vec<String>,
    pub table: SeriesTable,
    pub plot: PlotSeries,
    pub warnings: Vec<Warning>,
}

impl Render {
    pub fn header(&self) -> String {
        format!("You selected: {}", self.selected.join(", "))
    }
}

/// Session state: the growing symbol book plus the aggregator that feeds every render.
pub struct Dashboard<S> {
    book: SymbolBook,
    aggregator: TimeSeriesAggregator<S>,
    warnings: Vec<Warning>,
}

impl<S: MarketDataSource> Dashboard<S> {
    pub fn new(source: S, config: AggregatorConfig) -> Self {
        Self::with_book(source, config, SymbolBook::with_defaults())
    }

    pub fn with_book(source: S, config: AggregatorConfig, book: SymbolBook) -> Self {
        Self {
            book,
            aggregator: TimeSeriesAggregator::new(source, config),
            warnings: Vec::new(),
        }
    }

    pub fn book(&self) -> &SymbolBook {
        &self.book
    }

    pub fn aggregator(&self) -> &TimeSeriesAggregator<S> {
        &self.aggregator
    }

    /// Warnings recorded outside a render, such as rejected tickers.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Validate `input` against the source and add it under its own name when it has data.
    pub async fn add_ticker(&mut self, input: &str, range: DateRange) -> TickerValidation {
        let ticker = input.trim().to_uppercase();
        if ticker.is_empty() {
            return self.reject(input.trim(), TickerValidation::Empty, "ticker is blank");
        }
        if self.book.contains_name(&ticker) || self.book.contains_ticker(&ticker) {
            return TickerValidation::AlreadyPresent;
        }

        match self.aggregator.fetch_series(&ticker, range).await {
            Ok(table) if table.is_empty() => {
                self.reject(&ticker, TickerValidation::Empty, "no data returned")
            }
            Ok(table) => {
                self.book.insert(ticker.clone(), ticker.clone());
                logging::info(
                    "ticker.added",
                    "User ticker added to symbol book",
                    json!({ "ticker": ticker, "rows": table.len(), "book_size": self.book.len() }),
                );
                TickerValidation::Added
            }
            Err(err @ SourceError::Network(_)) => {
                let warning = Warning::from_source_error(&ticker, &err);
                self.record(warning, TickerValidation::Failed(err))
            }
            Err(err) => {
                let reason = err.to_string();
                self.reject(&ticker, TickerValidation::Failed(err), &reason)
            }
        }
    }

    fn reject(&mut self, ticker: &str, outcome: TickerValidation, reason: &str) -> TickerValidation {
        let warning = Warning::InvalidTicker {
            ticker: ticker.to_string(),
            reason: reason.to_string(),
        };
        self.record(warning, outcome)
    }

    fn record(&mut self, warning: Warning, outcome: TickerValidation) -> TickerValidation {
        log_warning(&warning);
        self.warnings.push(warning);
        outcome
    }

    /// Run fetch, normalize, select and partition end to end. Never fails; problems become
    /// warnings, including any recorded by earlier ticker validation.
    pub async fn render(&mut self, request: &RenderRequest) -> Render {
        let aggregation = self.aggregator.aggregate(&self.book, request.range).await;
        let mut warnings = aggregation.warnings;

        let table = if request.normalize {
            let (normalized, skipped) = pipeline::normalize(&aggregation.table);
            warnings.extend(skipped);
            normalized
        } else {
            aggregation.table
        };

        let (chosen, unknown) = request.selection.resolve(&self.book);
        warnings.extend(unknown);
        let selected_table = pipeline::select(&table, &chosen);
        let plot = pipeline::to_plot_series(&selected_table);

        for warning in &warnings {
            log_warning(warning);
        }
        let mut pending = self.take_warnings();
        pending.extend(warnings);
        let warnings = pending;

        let selected: Vec<String> = self
            .book
            .names()
            .filter(|name| request.selection.names().any(|chosen| chosen == *name))
            .map(str::to_string)
            .collect();

        let stats = self.aggregator.cache_stats();
        logging::info(
            "render.complete",
            "Dashboard render finished",
            json!({
                "symbols": self.book.len(),
                "selected": selected.len(),
                "rows": selected_table.len(),
                "series": plot.len(),
                "normalized": request.normalize,
                "warnings": warnings.len(),
                "cache_hits": stats.hits,
                "cache_misses": stats.misses,
            }),
        );

        Render {
            selected,
            table: selected_table,
            plot,
            warnings,
        }
    }
}

fn log_warning(warning: &Warning) {
    logging::warn(
        warning.event(),
        &warning.to_string(),
        serde_json::to_value(warning).unwrap_or_else(|_| logging::metadata_object()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DailyBar;
    use crate::source::InMemorySource;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(date(2020, 1, 1), date(2020, 6, 30)).unwrap()
    }

    fn bars(start: f64) -> Vec<DailyBar> {
        vec![
            DailyBar::new(date(2020, 1, 15), start, start),
            DailyBar::new(date(2020, 2, 14), start * 2.0, start * 2.0),
        ]
    }

    fn dashboard() -> Dashboard<InMemorySource> {
        let source = InMemorySource::new()
            .with_series("AAPL", bars(10.0))
            .with_series("MSFT", bars(20.0))
            .with_series("NVDA", bars(5.0))
            .with_series("HOLLOW", Vec::new());
        let book: SymbolBook = [("Apple", "AAPL"), ("Microsoft", "MSFT")]
            .into_iter()
            .collect();
        Dashboard::with_book(source, AggregatorConfig::default(), book)
    }

    #[tokio::test]
    async fn valid_ticker_is_added_under_its_own_name() {
        let mut dashboard = dashboard();
        let outcome = dashboard.add_ticker(" nvda ", range()).await;
        assert_eq!(outcome, TickerValidation::Added);
        assert_eq!(dashboard.book().ticker_for("NVDA"), Some("NVDA"));
        assert!(dashboard.warnings().is_empty());
    }

    #[tokio::test]
    async fn empty_ticker_result_is_rejected_with_warning() {
        let mut dashboard = dashboard();
        let before = dashboard.book().len();
        let outcome = dashboard.add_ticker("HOLLOW", range()).await;
        assert_eq!(outcome, TickerValidation::Empty);
        assert_eq!(dashboard.book().len(), before);
        assert!(matches!(
            dashboard.warnings(),
            [Warning::InvalidTicker { ticker, .. }] if ticker == "HOLLOW"
        ));
    }

    #[tokio::test]
    async fn unknown_ticker_is_rejected_with_typed_error() {
        let mut dashboard = dashboard();
        let outcome = dashboard.add_ticker("GHOST", range()).await;
        assert_eq!(
            outcome,
            TickerValidation::Failed(SourceError::NotFound("GHOST".into()))
        );
        assert_eq!(dashboard.book().len(), 2);
        assert_eq!(dashboard.take_warnings().len(), 1);
        assert!(dashboard.warnings().is_empty());
    }

    #[tokio::test]
    async fn network_failure_is_not_blamed_on_the_ticker() {
        let book: SymbolBook = [("Apple", "AAPL")].into_iter().collect();
        let mut dashboard =
            Dashboard::with_book(InMemorySource::new().offline(), AggregatorConfig::default(), book);

        let outcome = dashboard.add_ticker("nvda", range()).await;
        assert!(matches!(
            outcome,
            TickerValidation::Failed(SourceError::Network(_))
        ));
        assert_eq!(dashboard.book().len(), 1);
        assert!(matches!(
            dashboard.warnings(),
            [Warning::Network { ticker, .. }] if ticker == "NVDA"
        ));
        assert!(dashboard.warnings()[0].to_string().contains("try again later"));
    }

    #[tokio::test]
    async fn duplicate_and_blank_tickers_never_fetch() {
        let mut dashboard = dashboard();
        assert_eq!(
            dashboard.add_ticker("aapl", range()).await,
            TickerValidation::AlreadyPresent
        );
        assert_eq!(
            dashboard.add_ticker("   ", range()).await,
            TickerValidation::Empty
        );
        assert_eq!(dashboard.aggregator().source().calls(), 0);
    }

    #[tokio::test]
    async fn render_normalizes_and_filters_selection() {
        let mut dashboard = dashboard();
        let request = RenderRequest {
            range: range(),
            selection: ["Microsoft"].into_iter().collect(),
            normalize: true,
        };
        let render = dashboard.render(&request).await;

        assert_eq!(render.header(), "You selected: Microsoft");
        assert_eq!(render.plot.len(), 1);
        let values: Vec<f64> = render.plot["MSFT"].iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![100.0, 200.0]);
        assert!(render.warnings.is_empty());
    }

    #[tokio::test]
    async fn render_with_no_selection_draws_nothing() {
        let mut dashboard = dashboard();
        let request = RenderRequest {
            range: range(),
            selection: SelectionState::none(),
            normalize: false,
        };
        let render = dashboard.render(&request).await;
        assert!(render.plot.is_empty());
        assert!(render.table.is_empty());
        assert_eq!(render.header(), "You selected: ");
    }
}
