use serde::Serialize;
use std::borrow::Borrow;
use std::collections::BTreeSet;

use evdash_core::{Bounds, Dimension, NumericField, VehicleRecord, VehicleType};

/// A categorical constraint.
///
/// `Any` places no restriction. `OneOf` admits exactly the listed values, so
/// `OneOf` with an empty set admits nothing. Build from user input with
/// [`SetFilter::from_selection`], which maps an empty selection to `Any`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SetFilter<T: Ord> {
    Any,
    OneOf(BTreeSet<T>),
}

impl<T: Ord> Default for SetFilter<T> {
    fn default() -> Self {
        SetFilter::Any
    }
}

impl<T: Ord> SetFilter<T> {
    pub fn from_selection<I: IntoIterator<Item = T>>(values: I) -> Self {
        let set: BTreeSet<T> = values.into_iter().collect();
        if set.is_empty() {
            SetFilter::Any
        } else {
            SetFilter::OneOf(set)
        }
    }

    pub fn only(value: T) -> Self {
        SetFilter::OneOf(BTreeSet::from([value]))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, SetFilter::Any)
    }

    pub fn allows<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self {
            SetFilter::Any => true,
            SetFilter::OneOf(set) => set.contains(value),
        }
    }
}

/// Outcome of testing one record against one constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// The record has no value for the constrained field.
    Unknown,
}

/// One active, row-local predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Constraint {
    Range { field: NumericField, bounds: Bounds },
    Makes(SetFilter<String>),
    VehicleTypes(SetFilter<VehicleType>),
    Counties(SetFilter<String>),
}

impl Constraint {
    pub fn dimension(&self) -> Dimension {
        match self {
            Constraint::Range { field, .. } => field.dimension(),
            Constraint::Makes(_) => Dimension::Make,
            Constraint::VehicleTypes(_) => Dimension::VehicleType,
            Constraint::Counties(_) => Dimension::County,
        }
    }

    pub fn check(&self, record: &VehicleRecord) -> Verdict {
        let pass = match self {
            Constraint::Range { field, bounds } => match record.numeric(*field) {
                Some(value) => bounds.contains(value),
                None => return Verdict::Unknown,
            },
            Constraint::Makes(makes) => makes.allows(record.make.as_str()),
            Constraint::VehicleTypes(types) => types.allows(&record.vehicle_type),
            Constraint::Counties(counties) => counties.allows(record.county.as_str()),
        };
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}
