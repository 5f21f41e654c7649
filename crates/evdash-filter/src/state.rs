use serde::Serialize;
use tracing::{debug, warn};

use evdash_core::{Bounds, DatasetExtents, NumericField, Result, VehicleType};

use crate::constraint::{Constraint, SetFilter};

/// How a requested range was stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeUpdate {
    Applied(Bounds),
    /// The request reached past the dataset extent and was clamped into it.
    Clamped { requested: Bounds, applied: Bounds },
    /// The request misses the dataset extent entirely. Stored as asked, so
    /// no record with a known value can pass it.
    OutsideExtent(Bounds),
}

impl RangeUpdate {
    pub fn applied(&self) -> Bounds {
        match self {
            RangeUpdate::Applied(bounds)
            | RangeUpdate::Clamped { applied: bounds, .. }
            | RangeUpdate::OutsideExtent(bounds) => *bounds,
        }
    }
}

/// Sidebar constraints for one session.
///
/// Ranges default to the dataset's full extent and are only emitted as
/// constraints once narrowed, so the default state admits every record,
/// including those with unknown prices or ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterState {
    #[serde(skip)]
    extents: DatasetExtents,
    year: Option<Bounds>,
    price: Option<Bounds>,
    electric_range: Option<Bounds>,
    makes: SetFilter<String>,
    vehicle_types: SetFilter<VehicleType>,
    counties: SetFilter<String>,
}

impl FilterState {
    pub fn new(extents: DatasetExtents) -> Self {
        Self {
            extents,
            year: None,
            price: None,
            electric_range: None,
            makes: SetFilter::Any,
            vehicle_types: SetFilter::Any,
            counties: SetFilter::Any,
        }
    }

    pub fn extents(&self) -> &DatasetExtents {
        &self.extents
    }

    /// Current bounds for `field`: the narrowed range, else the full extent.
    pub fn range(&self, field: NumericField) -> Option<Bounds> {
        self.narrowed(field).or_else(|| self.extents.get(field))
    }

    pub fn is_range_active(&self, field: NumericField) -> bool {
        self.narrowed(field).is_some()
    }

    /// Validate and store a range. `min > max` and NaN are rejected. A request
    /// overlapping the extent is clamped into it and reported as
    /// [`RangeUpdate::Clamped`]; one missing it entirely is kept unchanged and
    /// reported as [`RangeUpdate::OutsideExtent`].
    pub fn set_range(&mut self, field: NumericField, min: f64, max: f64) -> Result<RangeUpdate> {
        let requested = Bounds::new(field, min, max)?;
        let extent = self.extents.get(field);
        let update = match extent {
            Some(extent) if !requested.overlaps(&extent) => {
                warn!(%field, %requested, %extent, "range lies outside the data; nothing will match");
                RangeUpdate::OutsideExtent(requested)
            }
            Some(extent) => {
                let (applied, moved) = requested.clamp_to(&extent);
                if moved {
                    warn!(%field, %requested, %applied, "range clamped to dataset extent");
                    RangeUpdate::Clamped { requested, applied }
                } else {
                    RangeUpdate::Applied(applied)
                }
            }
            None => RangeUpdate::Applied(requested),
        };
        let applied = update.applied();
        *self.slot_mut(field) = if Some(applied) == extent { None } else { Some(applied) };
        debug!(%field, %applied, "range updated");
        Ok(update)
    }

    pub fn set_year_range(&mut self, min: i32, max: i32) -> Result<RangeUpdate> {
        self.set_range(NumericField::ModelYear, f64::from(min), f64::from(max))
    }

    pub fn clear_range(&mut self, field: NumericField) {
        *self.slot_mut(field) = None;
    }

    pub fn makes(&self) -> &SetFilter<String> {
        &self.makes
    }

    pub fn vehicle_types(&self) -> &SetFilter<VehicleType> {
        &self.vehicle_types
    }

    pub fn counties(&self) -> &SetFilter<String> {
        &self.counties
    }

    /// An empty selection lifts the restriction.
    pub fn set_makes<I, S>(&mut self, makes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.makes = SetFilter::from_selection(makes.into_iter().map(Into::into));
    }

    pub fn set_vehicle_types<I: IntoIterator<Item = VehicleType>>(&mut self, types: I) {
        self.vehicle_types = SetFilter::from_selection(types);
    }

    pub fn set_counties<I, S>(&mut self, counties: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.counties = SetFilter::from_selection(counties.into_iter().map(Into::into));
    }

    pub fn is_default(&self) -> bool {
        *self == Self::new(self.extents)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.extents);
    }

    /// Active constraints only.
    pub fn constraints(&self) -> Vec<Constraint> {
        let mut out: Vec<Constraint> = NumericField::ALL
            .into_iter()
            .filter_map(|field| self.narrowed(field).map(|bounds| Constraint::Range { field, bounds }))
            .collect();
        if !self.makes.is_any() {
            out.push(Constraint::Makes(self.makes.clone()));
        }
        if !self.vehicle_types.is_any() {
            out.push(Constraint::VehicleTypes(self.vehicle_types.clone()));
        }
        if !self.counties.is_any() {
            out.push(Constraint::Counties(self.counties.clone()));
        }
        out
    }

    fn narrowed(&self, field: NumericField) -> Option<Bounds> {
        match field {
            NumericField::ModelYear => self.year,
            NumericField::Price => self.price,
            NumericField::ElectricRange => self.electric_range,
        }
    }

    fn slot_mut(&mut self, field: NumericField) -> &mut Option<Bounds> {
        match field {
            NumericField::ModelYear => &mut self.year,
            NumericField::Price => &mut self.price,
            NumericField::ElectricRange => &mut self.electric_range,
        }
    }
}
