//! CSV loader for the EV population export, plus a process-wide load cache.
//!
//! Rows missing make, model year or vehicle type are dropped. Electric range
//! and base price become `None` when empty, unparsable or (by default) zero,
//! since the registration data uses 0 for "not researched".
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::types::{VehicleRecord, VehicleType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    pub zero_as_unknown: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { zero_as_unknown: true }
    }
}

/// Row accounting for one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    #[serde(rename = "Make")]
    make: Option<String>,
    #[serde(rename = "Model")]
    model: Option<String>,
    #[serde(rename = "Model Year")]
    model_year: Option<String>,
    #[serde(rename = "Electric Vehicle Type")]
    vehicle_type: Option<String>,
    #[serde(rename = "Electric Range")]
    electric_range: Option<String>,
    #[serde(rename = "Base MSRP")]
    base_price: Option<String>,
    #[serde(rename = "County")]
    county: Option<String>,
    #[serde(rename = "City")]
    city: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    options: LoaderOptions,
}

impl CsvLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn load_path(&self, path: &Path) -> Result<(Dataset, LoadReport)> {
        let origin = path.display().to_string();
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| Error::Csv { origin: origin.clone(), source })?;
        self.load_from(reader, &origin)
    }

    pub fn load_reader<R: io::Read>(&self, reader: R) -> Result<(Dataset, LoadReport)> {
        let reader = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
        self.load_from(reader, "<reader>")
    }

    fn load_from<R: io::Read>(&self, mut reader: csv::Reader<R>, origin: &str) -> Result<(Dataset, LoadReport)> {
        let mut report = LoadReport::default();
        let mut records = Vec::new();
        for row in reader.deserialize::<RawRow>() {
            report.rows_read += 1;
            let row = match row {
                Ok(row) => row,
                Err(source) if source.is_io_error() => {
                    return Err(Error::Csv { origin: origin.to_string(), source });
                }
                Err(e) => {
                    debug!(origin, row = report.rows_read, error = %e, "skipping malformed row");
                    report.rows_dropped += 1;
                    continue;
                }
            };
            match self.normalize(row) {
                Some(record) => records.push(record),
                None => report.rows_dropped += 1,
            }
        }
        report.rows_kept = records.len();
        if report.rows_dropped > 0 {
            warn!(origin, dropped = report.rows_dropped, "dropped rows missing make, model year or vehicle type");
        }
        info!(origin, rows = report.rows_kept, "loaded vehicle records");
        Ok((Dataset::from_records(records), report))
    }

    fn normalize(&self, row: RawRow) -> Option<VehicleRecord> {
        let make = non_empty(row.make)?;
        let model_year = parse_number(row.model_year.as_deref())
            .filter(|y| y.fract() == 0.0 && *y >= f64::from(i32::MIN) && *y <= f64::from(i32::MAX))
            .map(|y| y as i32)?;
        let vehicle_type: VehicleType = row.vehicle_type.as_deref()?.parse().ok()?;
        Some(VehicleRecord {
            make,
            model: non_empty(row.model).unwrap_or_default(),
            model_year,
            vehicle_type,
            electric_range: self.measured(row.electric_range.as_deref()),
            base_price: self.measured(row.base_price.as_deref()),
            county: non_empty(row.county).unwrap_or_default(),
            city: non_empty(row.city).unwrap_or_default(),
        })
    }

    fn measured(&self, raw: Option<&str>) -> Option<f64> {
        parse_number(raw)
            .filter(|v| *v >= 0.0)
            .filter(|v| !(self.options.zero_as_unknown && *v == 0.0))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Memoizes the dataset for the process lifetime.
///
/// The first successful load wins; later calls return the same `Arc` without
/// touching the file, whatever path they pass.
#[derive(Debug, Default)]
pub struct DatasetCache {
    cell: OnceLock<(Arc<Dataset>, LoadReport)>,
}

impl DatasetCache {
    pub const fn new() -> Self {
        Self { cell: OnceLock::new() }
    }

    pub fn get_or_load(&self, path: &Path, loader: &CsvLoader) -> Result<Arc<Dataset>> {
        if let Some((dataset, _)) = self.cell.get() {
            debug!(path = %path.display(), "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }
        let (dataset, report) = loader.load_path(path)?;
        let (dataset, _) = self.cell.get_or_init(|| (Arc::new(dataset), report));
        Ok(Arc::clone(dataset))
    }

    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.cell.get().map(|(dataset, _)| Arc::clone(dataset))
    }

    /// Row accounting from the load that filled the cache.
    pub fn report(&self) -> Option<LoadReport> {
        self.cell.get().map(|(_, report)| *report)
    }
}
