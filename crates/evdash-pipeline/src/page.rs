use serde::Serialize;
use std::collections::BTreeSet;

use evdash_core::{Dimension, Error, Result};
use evdash_select::LinkageGroup;

/// Whether a page's charts filter one another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Linkage {
    Standalone,
    Linked(LinkageGroup),
}

/// Chart types drawn from pipeline output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    /// Vehicle count per vehicle type (bar; clicking emits a selection).
    TypeCounts,
    /// Model year vs electric range, drawn from the display rows.
    RangeScatter,
    /// Electric range distribution for the most common vehicle types.
    RangeBoxPlot,
    /// Counts by make and model year for the top makes.
    MakeYearHeatmap,
    AverageRangeByType,
    /// Mean electric range per model year for one vehicle type.
    RangeTrend,
    TopMakes,
}

impl ChartKind {
    /// Only the scatter plots individual rows, so only it reads the sample.
    pub fn uses_display_rows(self) -> bool {
        matches!(self, ChartKind::RangeScatter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageConfig {
    id: String,
    title: String,
    filters: BTreeSet<Dimension>,
    linkage: Linkage,
    charts: Vec<ChartKind>,
}

impl PageConfig {
    pub fn builder(id: impl Into<String>, title: impl Into<String>) -> PageConfigBuilder {
        PageConfigBuilder {
            page: PageConfig {
                id: id.into(),
                title: title.into(),
                filters: BTreeSet::new(),
                linkage: Linkage::Standalone,
                charts: Vec::new(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn linkage(&self) -> &Linkage {
        &self.linkage
    }

    pub fn group(&self) -> Option<&LinkageGroup> {
        match &self.linkage {
            Linkage::Linked(group) => Some(group),
            Linkage::Standalone => None,
        }
    }

    pub fn charts(&self) -> &[ChartKind] {
        &self.charts
    }

    /// Whether the page shows a sidebar control for `dimension`.
    pub fn honors(&self, dimension: Dimension) -> bool {
        self.filters.contains(&dimension)
    }

    pub fn filters(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.filters.iter().copied()
    }
}

pub struct PageConfigBuilder {
    page: PageConfig,
}

impl PageConfigBuilder {
    pub fn filters<I: IntoIterator<Item = Dimension>>(mut self, dimensions: I) -> Self {
        self.page.filters.extend(dimensions);
        self
    }

    pub fn linked(mut self, group: impl Into<LinkageGroup>) -> Self {
        self.page.linkage = Linkage::Linked(group.into());
        self
    }

    pub fn chart(mut self, chart: ChartKind) -> Self {
        self.page.charts.push(chart);
        self
    }

    pub fn build(self) -> PageConfig {
        self.page
    }
}

/// The dashboard's built-in pages.
pub fn catalog() -> Vec<PageConfig> {
    vec![
        PageConfig::builder("executive", "Executive Dashboard")
            .filters(Dimension::ALL)
            .linked("executive")
            .chart(ChartKind::TypeCounts)
            .chart(ChartKind::RangeScatter)
            .chart(ChartKind::RangeBoxPlot)
            .chart(ChartKind::MakeYearHeatmap)
            .build(),
        PageConfig::builder("range-trends", "Electric Range Trends")
            .filters([Dimension::VehicleType, Dimension::ModelYear])
            .linked("range-trends")
            .chart(ChartKind::RangeTrend)
            .build(),
        PageConfig::builder("top-manufacturers", "Top Manufacturers")
            .filters(Dimension::ALL)
            .chart(ChartKind::TopMakes)
            .build(),
        PageConfig::builder("average-stats", "Average Range by Vehicle Type")
            .filters([Dimension::ModelYear, Dimension::Make])
            .chart(ChartKind::AverageRangeByType)
            .build(),
    ]
}

pub fn find(id: &str) -> Result<PageConfig> {
    catalog()
        .into_iter()
        .find(|page| page.id == id)
        .ok_or_else(|| Error::NotFound(format!("page '{id}'")))
}
