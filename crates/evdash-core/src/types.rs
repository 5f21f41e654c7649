//! Domain types shared by the filter, sampler and selection crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Powertrain class as reported in the registration data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    BatteryElectric,
    PluginHybrid,
}

impl VehicleType {
    pub const ALL: [VehicleType; 2] = [VehicleType::BatteryElectric, VehicleType::PluginHybrid];

    /// The label used by the source CSV.
    pub fn label(self) -> &'static str {
        match self {
            VehicleType::BatteryElectric => "Battery Electric Vehicle (BEV)",
            VehicleType::PluginHybrid => "Plug-in Hybrid Electric Vehicle (PHEV)",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            VehicleType::BatteryElectric => "BEV",
            VehicleType::PluginHybrid => "PHEV",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for VehicleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        VehicleType::ALL
            .into_iter()
            .find(|t| s.eq_ignore_ascii_case(t.label()) || s.eq_ignore_ascii_case(t.short_name()))
            .ok_or_else(|| Error::UnknownValue { dimension: "vehicle type", value: s.to_string() })
    }
}

/// Numeric dimensions that accept range constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NumericField {
    ModelYear,
    Price,
    ElectricRange,
}

impl NumericField {
    pub const ALL: [NumericField; 3] = [NumericField::ModelYear, NumericField::Price, NumericField::ElectricRange];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::ModelYear => "model year",
            NumericField::Price => "price",
            NumericField::ElectricRange => "electric range",
        }
    }

    pub fn dimension(self) -> Dimension {
        match self {
            NumericField::ModelYear => Dimension::ModelYear,
            NumericField::Price => Dimension::Price,
            NumericField::ElectricRange => Dimension::ElectricRange,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every dimension a page may expose as a filter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    ModelYear,
    Price,
    ElectricRange,
    Make,
    VehicleType,
    County,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::ModelYear,
        Dimension::Price,
        Dimension::ElectricRange,
        Dimension::Make,
        Dimension::VehicleType,
        Dimension::County,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dimension::ModelYear => "model-year",
            Dimension::Price => "price",
            Dimension::ElectricRange => "electric-range",
            Dimension::Make => "make",
            Dimension::VehicleType => "vehicle-type",
            Dimension::County => "county",
        }
    }

    pub fn numeric_field(self) -> Option<NumericField> {
        match self {
            Dimension::ModelYear => Some(NumericField::ModelYear),
            Dimension::Price => Some(NumericField::Price),
            Dimension::ElectricRange => Some(NumericField::ElectricRange),
            Dimension::Make | Dimension::VehicleType | Dimension::County => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let normalized = match normalized.as_str() {
            "year" => "model-year",
            "range" => "electric-range",
            "type" => "vehicle-type",
            other => other,
        };
        Dimension::ALL
            .into_iter()
            .find(|d| d.name() == normalized)
            .ok_or_else(|| Error::UnknownValue { dimension: "dimension", value: s.to_string() })
    }
}

/// Inclusive numeric interval `min <= x <= max`.
///
/// Only constructed through [`Bounds::new`], so `min <= max` and neither
/// endpoint is NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    pub fn new(field: NumericField, min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(Error::InvalidRange { field, min, max });
        }
        Ok(Self { min, max })
    }

    /// A single point, e.g. one model year picked from a chart.
    pub fn point(field: NumericField, value: f64) -> Result<Self> {
        Self::new(field, value, value)
    }

    /// One model year; infallible since every `i32` is a finite `f64`.
    pub fn year(year: i32) -> Self {
        let y = f64::from(year);
        Self { min: y, max: y }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Whether the two intervals share at least one point.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Clamp `self` into `extent`. Returns the clamped bounds and whether
    /// either endpoint moved. Only meaningful when the two overlap; callers
    /// check [`Bounds::overlaps`] first.
    pub fn clamp_to(&self, extent: &Bounds) -> (Bounds, bool) {
        let min = self.min.clamp(extent.min, extent.max);
        let max = self.max.clamp(extent.min, extent.max);
        let clamped = Bounds { min, max };
        (clamped, clamped != *self)
    }

    /// Grow to include `value`.
    pub fn widen(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// One normalized row of the EV registration dataset. Never mutated after load.
///
/// `electric_range` and `base_price` are `None` when the source value is
/// missing or unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub make: String,
    pub model: String,
    pub model_year: i32,
    pub vehicle_type: VehicleType,
    pub electric_range: Option<f64>,
    pub base_price: Option<f64>,
    pub county: String,
    pub city: String,
}

impl VehicleRecord {
    pub fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::ModelYear => Some(f64::from(self.model_year)),
            NumericField::Price => self.base_price,
            NumericField::ElectricRange => self.electric_range,
        }
    }
}
