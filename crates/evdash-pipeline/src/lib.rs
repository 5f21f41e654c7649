//! The shared dashboard pipeline: sidebar filters and chart selections feed
//! the Filter Engine, the Sampler bounds the result, and pages declare which
//! filters they honor and which linkage group their charts share.
pub mod aggregate;
pub mod output;
pub mod page;
pub mod render;
pub mod session;

pub use output::{PipelineOutput, RecordCounts};
pub use page::{ChartKind, Linkage, PageConfig};
pub use render::{Interaction, ViewRenderer};
pub use session::{Action, ActionOutcome, Session};
