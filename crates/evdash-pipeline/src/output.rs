use serde::Serialize;

use evdash_core::{Dataset, VehicleRecord};
use evdash_filter::FilteredView;

/// Numbers behind the "showing N of M records" indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    pub total: usize,
    pub filtered: usize,
    pub displayed: usize,
    pub excluded_unknown: usize,
    pub sampled: bool,
}

/// One pipeline pass: the filtered rows and the (possibly sampled) rows handed
/// to the renderer. Rebuilt on every pass; never cached.
#[derive(Debug, Clone)]
pub struct PipelineOutput<'a> {
    filtered: FilteredView<'a>,
    sampled: Option<Vec<usize>>,
}

impl<'a> PipelineOutput<'a> {
    pub(crate) fn new(filtered: FilteredView<'a>, sampled: Option<Vec<usize>>) -> Self {
        Self { filtered, sampled }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.filtered.dataset()
    }

    pub fn filtered(&self) -> &FilteredView<'a> {
        &self.filtered
    }

    /// Dataset positions of the display rows, in source order.
    pub fn display_rows(&self) -> &[usize] {
        self.sampled.as_deref().unwrap_or_else(|| self.filtered.rows())
    }

    pub fn display_records(&self) -> impl Iterator<Item = &'a VehicleRecord> + '_ {
        let records = self.dataset().records();
        self.display_rows().iter().map(move |&i| &records[i])
    }

    pub fn filtered_records(&self) -> impl Iterator<Item = &'a VehicleRecord> + '_ {
        self.filtered.records()
    }

    pub fn is_sampled(&self) -> bool {
        self.sampled.is_some()
    }

    pub fn counts(&self) -> RecordCounts {
        RecordCounts {
            total: self.dataset().len(),
            filtered: self.filtered.len(),
            displayed: self.display_rows().len(),
            excluded_unknown: self.filtered.excluded_unknown(),
            sampled: self.is_sampled(),
        }
    }

    pub fn summary(&self) -> String {
        let counts = self.counts();
        let mut line = if counts.sampled {
            format!(
                "Showing a sample of {} of {} filtered records ({} total)",
                thousands(counts.displayed),
                thousands(counts.filtered),
                thousands(counts.total)
            )
        } else {
            format!("Showing all {} filtered records ({} total)", thousands(counts.filtered), thousands(counts.total))
        };
        if counts.excluded_unknown > 0 {
            line.push_str(&format!("; {} excluded for unknown values", thousands(counts.excluded_unknown)));
        }
        line
    }
}

/// `1234567` -> `"1,234,567"`.
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
