use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use evdash_filter::Constraint;

use crate::event::SelectionEvent;

/// Name of a set of charts that filter one another.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LinkageGroup(String);

impl LinkageGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkageGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LinkageGroup {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One selection slot per linkage group; a new event replaces the old one,
/// whatever dimension either of them is on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionBus {
    slots: BTreeMap<LinkageGroup, SelectionEvent>,
}

impl SelectionBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the group's selection, returning the displaced event.
    pub fn record(&mut self, group: &LinkageGroup, event: SelectionEvent) -> Option<SelectionEvent> {
        debug!(%group, %event, "selection recorded");
        self.slots.insert(group.clone(), event)
    }

    pub fn current(&self, group: &LinkageGroup) -> Option<&SelectionEvent> {
        self.slots.get(group)
    }

    /// Constraints contributed by the group's selection; empty when nothing is selected.
    pub fn current_filters(&self, group: &LinkageGroup) -> Vec<Constraint> {
        self.current(group).map(SelectionEvent::to_constraint).into_iter().collect()
    }

    pub fn clear(&mut self, group: &LinkageGroup) -> Option<SelectionEvent> {
        let cleared = self.slots.remove(group);
        if cleared.is_some() {
            debug!(%group, "selection cleared");
        }
        cleared
    }

    pub fn clear_all(&mut self) {
        self.slots.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &LinkageGroup> {
        self.slots.keys()
    }
}
