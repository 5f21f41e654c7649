use evdash_select::SelectionEvent;

use crate::output::PipelineOutput;
use crate::page::PageConfig;

/// What a user did on a rendered page.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// A chart element was clicked or brushed.
    Select(SelectionEvent),
    /// The page's selection was cleared (e.g. a click on empty chart space).
    ClearSelection,
}

/// The drawing layer. Receives each pass's output and reports back any
/// interactions, which the session feeds into the page's linkage group.
pub trait ViewRenderer {
    fn render(&mut self, page: &PageConfig, output: &PipelineOutput<'_>) -> anyhow::Result<Vec<Interaction>>;
}
