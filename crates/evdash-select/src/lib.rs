//! Cross-chart selection: chart clicks and brushes become filter constraints.
pub mod bus;
pub mod event;

pub use bus::{LinkageGroup, SelectionBus};
pub use event::SelectionEvent;
