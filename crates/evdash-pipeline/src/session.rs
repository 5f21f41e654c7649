use std::sync::Arc;
use tracing::{debug, info};

use evdash_core::{Bounds, Dataset, NumericField, Result, VehicleType};
use evdash_filter::{apply_constraints, Constraint, FilterState, RangeUpdate};
use evdash_sample::{sample_positions, SampleSettings};
use evdash_select::{LinkageGroup, SelectionBus, SelectionEvent};

use crate::output::PipelineOutput;
use crate::page::PageConfig;
use crate::render::{Interaction, ViewRenderer};

/// Every input the dashboard core accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetRange { field: NumericField, min: f64, max: f64 },
    ClearRange(NumericField),
    SetMakes(Vec<String>),
    SetVehicleTypes(Vec<VehicleType>),
    SetCounties(Vec<String>),
    Select { group: LinkageGroup, event: SelectionEvent },
    ClearSelection(LinkageGroup),
    SetSampleMode(bool),
    SetSampleSize(usize),
    /// Clear sidebar filters and every selection, and restore sample defaults.
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Applied,
    RangeClamped { field: NumericField, requested: Bounds, applied: Bounds },
    /// The range misses every known value, so the next run is empty.
    RangeOutsideData { field: NumericField, requested: Bounds },
    /// The group's previous selection was displaced.
    SelectionReplaced(SelectionEvent),
}

/// One user's dashboard state. The dataset is shared; everything else is
/// owned by the session and never shared across sessions.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Arc<Dataset>,
    filters: FilterState,
    selections: SelectionBus,
    sampling: SampleSettings,
    default_sampling: SampleSettings,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>, sampling: SampleSettings) -> Self {
        let filters = FilterState::new(*dataset.extents());
        Self { dataset, filters, selections: SelectionBus::new(), sampling, default_sampling: sampling }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn selections(&self) -> &SelectionBus {
        &self.selections
    }

    pub fn sampling(&self) -> &SampleSettings {
        &self.sampling
    }

    pub fn is_default(&self) -> bool {
        self.filters.is_default() && self.selections.is_empty() && self.sampling == self.default_sampling
    }

    /// Apply one input. Rejected input (an inverted range, a zero sample
    /// size) returns an error and leaves the session unchanged.
    pub fn apply(&mut self, action: Action) -> Result<ActionOutcome> {
        debug!(?action, "applying action");
        let outcome = match action {
            Action::SetRange { field, min, max } => match self.filters.set_range(field, min, max)? {
                RangeUpdate::Applied(_) => ActionOutcome::Applied,
                RangeUpdate::Clamped { requested, applied } => ActionOutcome::RangeClamped { field, requested, applied },
                RangeUpdate::OutsideExtent(requested) => ActionOutcome::RangeOutsideData { field, requested },
            },
            Action::ClearRange(field) => {
                self.filters.clear_range(field);
                ActionOutcome::Applied
            }
            Action::SetMakes(makes) => {
                self.filters.set_makes(makes);
                ActionOutcome::Applied
            }
            Action::SetVehicleTypes(types) => {
                self.filters.set_vehicle_types(types);
                ActionOutcome::Applied
            }
            Action::SetCounties(counties) => {
                self.filters.set_counties(counties);
                ActionOutcome::Applied
            }
            Action::Select { group, event } => match self.selections.record(&group, event) {
                Some(previous) => ActionOutcome::SelectionReplaced(previous),
                None => ActionOutcome::Applied,
            },
            Action::ClearSelection(group) => {
                self.selections.clear(&group);
                ActionOutcome::Applied
            }
            Action::SetSampleMode(enabled) => {
                self.sampling.set_enabled(enabled);
                ActionOutcome::Applied
            }
            Action::SetSampleSize(size) => {
                self.sampling.set_target_size(size)?;
                ActionOutcome::Applied
            }
            Action::Reset => {
                self.reset();
                ActionOutcome::Applied
            }
        };
        Ok(outcome)
    }

    /// Return to the default state: full ranges, no set restrictions, no
    /// selection in any group, default sample settings.
    pub fn reset(&mut self) {
        self.filters.reset();
        self.selections.clear_all();
        self.sampling = self.default_sampling;
        info!("session reset");
    }

    /// Constraints in force for `page`: the sidebar filters it shows, plus
    /// its linkage group's selection.
    pub fn constraints_for(&self, page: &PageConfig) -> Vec<Constraint> {
        let mut constraints: Vec<Constraint> =
            self.filters.constraints().into_iter().filter(|c| page.honors(c.dimension())).collect();
        if let Some(group) = page.group() {
            constraints.extend(self.selections.current_filters(group));
        }
        constraints
    }

    /// Full recompute: filter, then sample.
    pub fn run(&self, page: &PageConfig) -> PipelineOutput<'_> {
        let constraints = self.constraints_for(page);
        let filtered = apply_constraints(&self.dataset, &constraints);
        let sampled = sample_positions(filtered.len(), &self.sampling)
            .map(|positions| positions.into_iter().map(|p| filtered.rows()[p]).collect());
        let output = PipelineOutput::new(filtered, sampled);
        debug!(page = page.id(), summary = %output.summary(), "pipeline pass");
        output
    }

    /// Run the pipeline, hand the result to `renderer`, and feed its
    /// interactions back into the page's linkage group. Interactions on a
    /// standalone page are ignored. Returns how many were applied.
    pub fn render(&mut self, page: &PageConfig, renderer: &mut dyn ViewRenderer) -> anyhow::Result<usize> {
        let interactions = {
            let output = self.run(page);
            renderer.render(page, &output)?
        };
        let Some(group) = page.group() else {
            if !interactions.is_empty() {
                debug!(page = page.id(), ignored = interactions.len(), "standalone page; interactions ignored");
            }
            return Ok(0);
        };
        let applied = interactions.len();
        for interaction in interactions {
            match interaction {
                Interaction::Select(event) => {
                    self.selections.record(group, event);
                }
                Interaction::ClearSelection => {
                    self.selections.clear(group);
                }
            }
        }
        Ok(applied)
    }
}
