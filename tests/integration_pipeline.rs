use std::collections::HashSet;

use chrono::NaiveDate;
use market_dashboard::aggregator::{AggregatorConfig, TimeSeriesAggregator};
use market_dashboard::dashboard::{Dashboard, RenderRequest, TickerValidation};
use market_dashboard::error::Warning;
use market_dashboard::model::{DailyBar, DateRange, PriceField, ResamplePeriod, SymbolBook};
use market_dashboard::pipeline::{normalize, select, to_plot_series};
use market_dashboard::source::InMemorySource;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn close_config(period: ResamplePeriod) -> AggregatorConfig {
    AggregatorConfig {
        period,
        field: PriceField::Close,
        cache_enabled: true,
    }
}

fn daily(from: NaiveDate, days: u32, start: f64) -> Vec<DailyBar> {
    from.iter_days()
        .take(days as usize)
        .enumerate()
        .map(|(idx, day)| {
            let price = start + idx as f64;
            DailyBar::new(day, price, price)
        })
        .collect()
}

fn full_range() -> DateRange {
    DateRange::new(date(2019, 1, 1), date(2021, 12, 31)).expect("range")
}

#[tokio::test]
async fn aggregate_row_count_is_sum_of_symbol_counts() {
    let source = InMemorySource::new()
        .with_series("A", daily(date(2019, 1, 1), 90, 10.0))
        .with_series("B", daily(date(2021, 1, 1), 200, 50.0));
    let book: SymbolBook = [("A", "A"), ("B", "B")].into_iter().collect();
    let mut aggregator = TimeSeriesAggregator::new(source, close_config(ResamplePeriod::Monthly));

    let a = aggregator.fetch_series("A", full_range()).await.expect("A");
    let b = aggregator.fetch_series("B", full_range()).await.expect("B");
    let aggregation = aggregator.aggregate(&book, full_range()).await;

    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 7);
    assert_eq!(aggregation.table.len(), a.len() + b.len());
    assert!(aggregation.warnings.is_empty());
}

#[tokio::test]
async fn normalized_single_symbol_starts_at_hundred() {
    let source = InMemorySource::new().with_series("S", daily(date(2020, 3, 10), 400, 37.5));
    let mut aggregator =
        TimeSeriesAggregator::new(source, close_config(ResamplePeriod::Quarterly));
    let table = aggregator.fetch_series("S", full_range()).await.expect("S");

    let (normalized, warnings) = normalize(&table);
    assert!(warnings.is_empty());
    assert!((normalized.rows()[0].value - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn selection_and_partitioning_respect_the_table() {
    let source = InMemorySource::new()
        .with_series("A", daily(date(2020, 1, 1), 120, 1.0))
        .with_series("B", daily(date(2020, 2, 1), 120, 2.0));
    let book: SymbolBook = [("A", "A"), ("B", "B")].into_iter().collect();
    let mut aggregator = TimeSeriesAggregator::new(source, close_config(ResamplePeriod::Monthly));
    let table = aggregator.aggregate(&book, full_range()).await.table;

    assert!(select(&table, &HashSet::new()).is_empty());

    let everyone: HashSet<String> = ["A".to_string(), "B".to_string()].into_iter().collect();
    let plot = to_plot_series(&select(&table, &everyone));

    let mut union: Vec<(String, NaiveDate, f64)> = plot
        .iter()
        .flat_map(|(symbol, points)| {
            assert!(points.windows(2).all(|pair| pair[0].0 < pair[1].0));
            points
                .iter()
                .map(move |(day, value)| (symbol.clone(), *day, *value))
        })
        .collect();
    let mut rows: Vec<(String, NaiveDate, f64)> = table
        .iter()
        .map(|row| (row.symbol.clone(), row.date, row.value))
        .collect();
    union.sort_by(|l, r| (&l.0, l.1).cmp(&(&r.0, r.1)));
    rows.sort_by(|l, r| (&l.0, l.1).cmp(&(&r.0, r.1)));
    assert_eq!(union, rows);
}

#[tokio::test]
async fn monthly_last_then_normalize_end_to_end() {
    let source = InMemorySource::new().with_series(
        "X",
        vec![
            DailyBar::new(date(2020, 1, 1), 10.0, 10.0),
            DailyBar::new(date(2020, 1, 15), 20.0, 20.0),
            DailyBar::new(date(2020, 2, 1), 30.0, 30.0),
        ],
    );
    let book: SymbolBook = [("X", "X")].into_iter().collect();
    let mut dashboard =
        Dashboard::with_book(source, close_config(ResamplePeriod::Monthly), book);

    let raw = dashboard
        .render(&RenderRequest {
            range: full_range(),
            selection: ["X"].into_iter().collect(),
            normalize: false,
        })
        .await;
    assert_eq!(
        raw.plot["X"],
        vec![(date(2020, 1, 31), 20.0), (date(2020, 2, 29), 30.0)]
    );

    let normalized = dashboard
        .render(&RenderRequest {
            range: full_range(),
            selection: ["X"].into_iter().collect(),
            normalize: true,
        })
        .await;
    let values: Vec<f64> = normalized.plot["X"].iter().map(|(_, v)| *v).collect();
    assert!((values[0] - 100.0).abs() < 1e-9);
    assert!((values[1] - 150.0).abs() < 1e-9);
    assert_eq!(dashboard.aggregator().source().calls(), 1);
}

#[tokio::test]
async fn empty_ticker_is_rejected_and_warning_reaches_render() {
    let source = InMemorySource::new()
        .with_series("AAPL", daily(date(2020, 1, 1), 60, 100.0))
        .with_series("VOID", Vec::new());
    let mut dashboard = Dashboard::new(source, close_config(ResamplePeriod::Monthly));
    let before = dashboard.book().len();

    let outcome = dashboard.add_ticker("void", full_range()).await;
    assert_eq!(outcome, TickerValidation::Empty);
    assert_eq!(dashboard.book().len(), before);
    assert_eq!(dashboard.warnings().len(), 1);

    let render = dashboard
        .render(&RenderRequest {
            range: full_range(),
            selection: ["Apple"].into_iter().collect(),
            normalize: false,
        })
        .await;
    assert!(matches!(
        render.warnings.first(),
        Some(Warning::InvalidTicker { ticker, .. }) if ticker == "VOID"
    ));
    assert_eq!(render.plot.len(), 1);
    assert!(dashboard.warnings().is_empty());
}
