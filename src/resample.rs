use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{DailyBar, DateRange, PriceField, PricePoint, ResamplePeriod, SeriesTable};

/// Reduce daily bars to the last observation of each period, tagged with `ticker`.
///
/// Rows are labelled with the period's closing calendar day, so a January
/// bucket reads `YYYY-01-31` even when the last trading day was earlier.
/// Bars outside `range` and non-finite prices are dropped.
pub fn resample_last(
    ticker: &str,
    bars: &[DailyBar],
    range: DateRange,
    period: ResamplePeriod,
    field: PriceField,
) -> SeriesTable {
    let mut buckets: BTreeMap<NaiveDate, (NaiveDate, f64)> = BTreeMap::new();

    for bar in bars {
        if !range.contains(bar.date) {
            continue;
        }
        let value = field.pick(bar);
        if !value.is_finite() {
            continue;
        }
        let Some(bucket) = period.bucket_end(bar.date) else {
            continue;
        };

        buckets
            .entry(bucket)
            .and_modify(|latest| {
                if bar.date >= latest.0 {
                    *latest = (bar.date, value);
                }
            })
            .or_insert((bar.date, value));
    }

    buckets
        .into_iter()
        .map(|(bucket, (_, value))| PricePoint {
            date: bucket,
            value,
            symbol: ticker.to_string(),
        })
        .collect()
}
