//! Read-only record collection and its observed numeric extents.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::types::{Bounds, NumericField, VehicleRecord};

/// Observed min/max per numeric field, over known values only.
///
/// A field with no known values has no extent and can never be range-filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DatasetExtents {
    pub model_year: Option<Bounds>,
    pub price: Option<Bounds>,
    pub electric_range: Option<Bounds>,
}

impl DatasetExtents {
    pub fn from_records(records: &[VehicleRecord]) -> Self {
        let mut extents = Self::default();
        for record in records {
            for field in NumericField::ALL {
                if let Some(value) = record.numeric(field).filter(|v| !v.is_nan()) {
                    let slot = extents.slot_mut(field);
                    *slot = match *slot {
                        Some(mut bounds) => {
                            bounds.widen(value);
                            Some(bounds)
                        }
                        None => Bounds::point(field, value).ok(),
                    };
                }
            }
        }
        extents
    }

    pub fn get(&self, field: NumericField) -> Option<Bounds> {
        match field {
            NumericField::ModelYear => self.model_year,
            NumericField::Price => self.price,
            NumericField::ElectricRange => self.electric_range,
        }
    }

    fn slot_mut(&mut self, field: NumericField) -> &mut Option<Bounds> {
        match field {
            NumericField::ModelYear => &mut self.model_year,
            NumericField::Price => &mut self.price,
            NumericField::ElectricRange => &mut self.electric_range,
        }
    }
}

/// The loaded vehicle table. Shared across sessions behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<VehicleRecord>,
    extents: DatasetExtents,
}

impl Dataset {
    pub fn from_records(records: Vec<VehicleRecord>) -> Self {
        let extents = DatasetExtents::from_records(&records);
        Self { records, extents }
    }

    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&VehicleRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn extents(&self) -> &DatasetExtents {
        &self.extents
    }

    /// Sorted distinct makes, for sidebar multiselects.
    pub fn makes(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.make.as_str()))
    }

    /// Sorted distinct counties.
    pub fn counties(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.county.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    values.filter(|v| !v.is_empty()).collect::<BTreeSet<_>>().into_iter().collect()
}
