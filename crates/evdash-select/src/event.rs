use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use evdash_core::{Bounds, Dimension, Error, NumericField, Result, VehicleType};
use evdash_filter::{Constraint, SetFilter};

/// What the renderer reports when a user clicks or brushes a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SelectionEvent {
    Make(String),
    VehicleType(VehicleType),
    County(String),
    ModelYear(i32),
    /// Interval selection dragged across a numeric axis.
    Brush { field: NumericField, bounds: Bounds },
}

impl SelectionEvent {
    pub fn brush(field: NumericField, min: f64, max: f64) -> Result<Self> {
        Ok(SelectionEvent::Brush { field, bounds: Bounds::new(field, min, max)? })
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            SelectionEvent::Make(_) => Dimension::Make,
            SelectionEvent::VehicleType(_) => Dimension::VehicleType,
            SelectionEvent::County(_) => Dimension::County,
            SelectionEvent::ModelYear(_) => Dimension::ModelYear,
            SelectionEvent::Brush { field, .. } => field.dimension(),
        }
    }

    /// A clicked category narrows to exactly that value.
    pub fn to_constraint(&self) -> Constraint {
        match self {
            SelectionEvent::Make(make) => Constraint::Makes(SetFilter::only(make.clone())),
            SelectionEvent::VehicleType(kind) => Constraint::VehicleTypes(SetFilter::only(*kind)),
            SelectionEvent::County(county) => Constraint::Counties(SetFilter::only(county.clone())),
            SelectionEvent::ModelYear(year) => {
                Constraint::Range { field: NumericField::ModelYear, bounds: Bounds::year(*year) }
            }
            SelectionEvent::Brush { field, bounds } => Constraint::Range { field: *field, bounds: *bounds },
        }
    }

    /// Parse a renderer-reported value for `dimension`. Numeric dimensions
    /// accept `lo..hi` as a brush; model year also accepts a single year.
    pub fn parse(dimension: Dimension, value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::UnknownValue { dimension: "selection", value: value.to_string() });
        }
        match dimension {
            Dimension::Make => Ok(SelectionEvent::Make(value.to_string())),
            Dimension::County => Ok(SelectionEvent::County(value.to_string())),
            Dimension::VehicleType => Ok(SelectionEvent::VehicleType(value.parse()?)),
            Dimension::ModelYear | Dimension::Price | Dimension::ElectricRange => {
                let field = dimension.numeric_field().unwrap_or(NumericField::ModelYear);
                if let Some((lo, hi)) = value.split_once("..") {
                    return SelectionEvent::brush(field, parse_number(field, lo)?, parse_number(field, hi)?);
                }
                if field == NumericField::ModelYear {
                    return value
                        .parse::<i32>()
                        .map(SelectionEvent::ModelYear)
                        .map_err(|_| Error::UnknownValue { dimension: field.name(), value: value.to_string() });
                }
                Err(Error::UnknownValue { dimension: field.name(), value: value.to_string() })
            }
        }
    }
}

fn parse_number(field: NumericField, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::UnknownValue { dimension: field.name(), value: raw.to_string() })
}

impl fmt::Display for SelectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionEvent::Make(v) | SelectionEvent::County(v) => write!(f, "{}={}", self.dimension(), v),
            SelectionEvent::VehicleType(v) => write!(f, "{}={}", self.dimension(), v),
            SelectionEvent::ModelYear(y) => write!(f, "{}={}", self.dimension(), y),
            SelectionEvent::Brush { bounds, .. } => {
                write!(f, "{}={}..{}", self.dimension(), bounds.min(), bounds.max())
            }
        }
    }
}

/// `dimension=value`, e.g. `county=King` or `electric-range=50..200`.
impl FromStr for SelectionEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (dimension, value) = s
            .split_once('=')
            .ok_or_else(|| Error::UnknownValue { dimension: "selection", value: s.to_string() })?;
        SelectionEvent::parse(dimension.parse()?, value)
    }
}
