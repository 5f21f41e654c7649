//! Filter State and the row-local Filter Engine.
//!
//! Every constraint is a predicate over a single record; the engine ANDs them.
pub mod constraint;
pub mod engine;
pub mod state;

pub use constraint::{Constraint, SetFilter, Verdict};
pub use engine::{apply, apply_constraints, FilteredView};
pub use state::{FilterState, RangeUpdate};
