use std::collections::HashSet;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use market_dashboard::{
    logging,
    model::{DateRange, PriceField, ResamplePeriod, SeriesTable},
    pipeline::{normalize, select, to_plot_series},
    resample::resample_last,
    source::SyntheticSource,
};

const TICKERS: [&str; 8] = ["AAPL", "GOOGL", "TSLA", "MSFT", "^GSPC", "NVDA", "AMZN", "META"];

fn bench_pipeline(c: &mut Criterion) {
    logging::set_silent(true);

    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2004, 1, 1).expect("start date"),
        NaiveDate::from_ymd_opt(2023, 12, 31).expect("end date"),
    )
    .expect("valid range");
    let source = SyntheticSource::with_seed(0xBADF00D);
    let daily: Vec<_> = TICKERS
        .iter()
        .map(|ticker| {
            let bars = source.generate(ticker, range).expect("synthetic bars");
            (*ticker, bars)
        })
        .collect();
    let total_bars: usize = daily.iter().map(|(_, bars)| bars.len()).sum();
    let chosen: HashSet<String> = TICKERS.iter().take(4).map(|t| t.to_string()).collect();

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(total_bars as u64));

    for period in [ResamplePeriod::Monthly, ResamplePeriod::Quarterly] {
        group.bench_function(format!("resample_normalize_plot/{period}"), |b| {
            b.iter(|| {
                let mut table = SeriesTable::new();
                for (ticker, bars) in &daily {
                    table.append(resample_last(ticker, bars, range, period, PriceField::AdjClose));
                }
                let (normalized, warnings) = normalize(&table);
                assert!(warnings.is_empty(), "synthetic prices never start at zero");
                to_plot_series(&select(&normalized, &chosen))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
