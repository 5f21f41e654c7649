use tracing::debug;

use evdash_core::{Dataset, VehicleRecord};

use crate::constraint::{Constraint, Verdict};
use crate::state::FilterState;

/// Records that passed every constraint, as positions into the dataset.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
    excluded_unknown: usize,
}

impl<'a> FilteredView<'a> {
    /// The whole dataset, unfiltered.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self { dataset, rows: (0..dataset.len()).collect(), excluded_unknown: 0 }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records rejected only because an active range had no value to test.
    pub fn excluded_unknown(&self) -> usize {
        self.excluded_unknown
    }

    pub fn records(&self) -> impl Iterator<Item = &'a VehicleRecord> + '_ {
        let records = self.dataset.records();
        self.rows.iter().map(move |&i| &records[i])
    }
}

pub fn apply<'a>(dataset: &'a Dataset, state: &FilterState) -> FilteredView<'a> {
    apply_constraints(dataset, &state.constraints())
}

/// Keep each record that passes every constraint. A record with an unknown
/// value for an actively constrained field does not pass that constraint.
pub fn apply_constraints<'a>(dataset: &'a Dataset, constraints: &[Constraint]) -> FilteredView<'a> {
    if constraints.is_empty() {
        return FilteredView::all(dataset);
    }
    let mut rows = Vec::new();
    let mut excluded_unknown = 0usize;
    for (i, record) in dataset.records().iter().enumerate() {
        let mut saw_unknown = false;
        let mut failed = false;
        for constraint in constraints {
            match constraint.check(record) {
                Verdict::Pass => {}
                Verdict::Unknown => saw_unknown = true,
                Verdict::Fail => {
                    failed = true;
                    break;
                }
            }
        }
        if failed {
            continue;
        }
        if saw_unknown {
            excluded_unknown += 1;
        } else {
            rows.push(i);
        }
    }
    debug!(
        constraints = constraints.len(),
        total = dataset.len(),
        kept = rows.len(),
        excluded_unknown,
        "filter pass"
    );
    FilteredView { dataset, rows, excluded_unknown }
}
