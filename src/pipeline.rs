use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::constants::NORMALIZE_BASE;
use crate::error::Warning;
use crate::model::{PricePoint, SeriesTable};

/// One line per symbol, each ordered by date ascending.
pub type PlotSeries = IndexMap<String, Vec<(NaiveDate, f64)>>;

/// Rescale every symbol so its earliest value reads 100.
///
/// Symbols whose base is zero or non-finite are dropped and reported; the
/// remaining rows keep their original order.
pub fn normalize(table: &SeriesTable) -> (SeriesTable, Vec<Warning>) {
    let mut bases: HashMap<&str, (NaiveDate, f64)> = HashMap::new();
    for row in table {
        bases
            .entry(row.symbol.as_str())
            .and_modify(|base| {
                if row.date < base.0 {
                    *base = (row.date, row.value);
                }
            })
            .or_insert((row.date, row.value));
    }

    let mut warnings = Vec::new();
    for symbol in table.symbols() {
        let base = bases.get(symbol).map(|(_, value)| *value).unwrap_or_default();
        if base == 0.0 || !base.is_finite() {
            warnings.push(Warning::ZeroBase {
                ticker: symbol.to_string(),
            });
        }
    }

    let normalized = table
        .iter()
        .filter_map(|row| {
            let base = bases.get(row.symbol.as_str())?.1;
            if base == 0.0 || !base.is_finite() {
                return None;
            }
            Some(PricePoint {
                value: row.value / base * NORMALIZE_BASE,
                ..row.clone()
            })
        })
        .collect();

    (normalized, warnings)
}

/// Rows whose symbol is in `chosen`, order preserved.
pub fn select(table: &SeriesTable, chosen: &HashSet<String>) -> SeriesTable {
    table
        .iter()
        .filter(|row| chosen.contains(&row.symbol))
        .cloned()
        .collect()
}

pub fn to_plot_series(table: &SeriesTable) -> PlotSeries {
    let mut series = PlotSeries::new();
    for row in table {
        series
            .entry(row.symbol.clone())
            .or_default()
            .push((row.date, row.value));
    }
    for points in series.values_mut() {
        points.sort_by_key(|(date, _)| *date);
    }
    series
}
