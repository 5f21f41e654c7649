//! Chart-ready aggregations over pipeline rows.
//!
//! Every function takes the rows it should summarize, so callers decide
//! whether a chart reads the filtered rows or the sampled display rows.
use serde::Serialize;
use std::collections::BTreeMap;

use evdash_core::{VehicleRecord, VehicleType};

use crate::output::PipelineOutput;
use crate::page::ChartKind;

/// Makes shown in the heatmap.
pub const HEATMAP_TOP_MAKES: usize = 10;
/// Vehicle types shown in the box plot.
pub const BOX_PLOT_TOP_TYPES: usize = 5;
pub const LEADERBOARD_TOP_MAKES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeAverage {
    pub vehicle_type: VehicleType,
    pub mean_range: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatCell {
    pub make: String,
    pub model_year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub model_year: i32,
    pub electric_range: f64,
    pub vehicle_type: VehicleType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub model_year: i32,
    pub mean_range: f64,
}

/// Five-number summary of known electric ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSummary {
    pub vehicle_type: VehicleType,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Counts per key, most frequent first; ties break on key order.
pub fn value_counts<K, F>(records: &[&VehicleRecord], key: F) -> Vec<(K, usize)>
where
    K: Ord,
    F: Fn(&VehicleRecord) -> K,
{
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(key(record)).or_default() += 1;
    }
    let mut out: Vec<(K, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

pub fn type_counts(records: &[&VehicleRecord]) -> Vec<(VehicleType, usize)> {
    value_counts(records, |r| r.vehicle_type)
}

pub fn top_makes(records: &[&VehicleRecord], n: usize) -> Vec<(String, usize)> {
    let mut counts = value_counts(records, |r| r.make.clone());
    counts.truncate(n);
    counts
}

/// Mean over known ranges; types with no known range are omitted.
pub fn average_range_by_type(records: &[&VehicleRecord]) -> Vec<RangeAverage> {
    let mut sums: BTreeMap<VehicleType, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(range) = record.electric_range {
            let entry = sums.entry(record.vehicle_type).or_default();
            entry.0 += range;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(vehicle_type, (sum, count))| RangeAverage { vehicle_type, mean_range: sum / count as f64, count })
        .collect()
}

/// Counts per (make, model year) for the `top_n` most common makes.
pub fn make_year_counts(records: &[&VehicleRecord], top_n: usize) -> Vec<HeatCell> {
    let top: Vec<String> = top_makes(records, top_n).into_iter().map(|(make, _)| make).collect();
    let mut cells: BTreeMap<(&str, i32), usize> = BTreeMap::new();
    for record in records.iter().filter(|r| top.contains(&r.make)) {
        *cells.entry((record.make.as_str(), record.model_year)).or_default() += 1;
    }
    cells
        .into_iter()
        .map(|((make, model_year), count)| HeatCell { make: make.to_string(), model_year, count })
        .collect()
}

/// Mean known range per model year for one vehicle type, oldest year first.
pub fn range_trend(records: &[&VehicleRecord], vehicle_type: VehicleType) -> Vec<TrendPoint> {
    let mut by_year: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for record in records.iter().filter(|r| r.vehicle_type == vehicle_type) {
        if let Some(range) = record.electric_range {
            let entry = by_year.entry(record.model_year).or_default();
            entry.0 += range;
            entry.1 += 1;
        }
    }
    by_year
        .into_iter()
        .map(|(model_year, (sum, count))| TrendPoint { model_year, mean_range: sum / count as f64 })
        .collect()
}

pub fn scatter_points(records: &[&VehicleRecord]) -> Vec<ScatterPoint> {
    records
        .iter()
        .filter_map(|r| {
            r.electric_range.map(|electric_range| ScatterPoint {
                model_year: r.model_year,
                electric_range,
                vehicle_type: r.vehicle_type,
            })
        })
        .collect()
}

/// Box-plot statistics for the `top_n` most common vehicle types.
pub fn range_summary_by_type(records: &[&VehicleRecord], top_n: usize) -> Vec<RangeSummary> {
    type_counts(records)
        .into_iter()
        .take(top_n)
        .filter_map(|(vehicle_type, _)| {
            let mut ranges: Vec<f64> =
                records.iter().filter(|r| r.vehicle_type == vehicle_type).filter_map(|r| r.electric_range).collect();
            if ranges.is_empty() {
                return None;
            }
            ranges.sort_by(f64::total_cmp);
            Some(RangeSummary {
                vehicle_type,
                count: ranges.len(),
                min: ranges[0],
                q1: quantile(&ranges, 0.25),
                median: quantile(&ranges, 0.5),
                q3: quantile(&ranges, 0.75),
                max: ranges[ranges.len() - 1],
            })
        })
        .collect()
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Data for one chart, ready to serialize for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart", content = "data", rename_all = "snake_case")]
pub enum ChartData {
    TypeCounts(Vec<(VehicleType, usize)>),
    RangeScatter(Vec<ScatterPoint>),
    RangeBoxPlot(Vec<RangeSummary>),
    MakeYearHeatmap(Vec<HeatCell>),
    AverageRangeByType(Vec<RangeAverage>),
    /// One series per vehicle type.
    RangeTrend(Vec<(VehicleType, Vec<TrendPoint>)>),
    TopMakes(Vec<(String, usize)>),
}

impl ChartData {
    pub fn compute(kind: ChartKind, output: &PipelineOutput<'_>) -> Self {
        let rows: Vec<&VehicleRecord> = if kind.uses_display_rows() {
            output.display_records().collect()
        } else {
            output.filtered_records().collect()
        };
        match kind {
            ChartKind::TypeCounts => ChartData::TypeCounts(type_counts(&rows)),
            ChartKind::RangeScatter => ChartData::RangeScatter(scatter_points(&rows)),
            ChartKind::RangeBoxPlot => ChartData::RangeBoxPlot(range_summary_by_type(&rows, BOX_PLOT_TOP_TYPES)),
            ChartKind::MakeYearHeatmap => ChartData::MakeYearHeatmap(make_year_counts(&rows, HEATMAP_TOP_MAKES)),
            ChartKind::AverageRangeByType => ChartData::AverageRangeByType(average_range_by_type(&rows)),
            ChartKind::RangeTrend => ChartData::RangeTrend(
                type_counts(&rows).into_iter().map(|(vehicle_type, _)| (vehicle_type, range_trend(&rows, vehicle_type))).collect(),
            ),
            ChartKind::TopMakes => ChartData::TopMakes(top_makes(&rows, LEADERBOARD_TOP_MAKES)),
        }
    }
}
