//! Cost reports
//!
//! Rollups over one dataset for the spreadsheet-style outputs: an executive
//! summary and a monthly timeline, each printable and exportable as CSV.

pub mod summary;
pub mod timeline;

pub use summary::{ExecutiveSummary, ServiceSummaryRow};
pub use timeline::{MonthlyTimeline, TimelineRow};

use crate::models::ModelData;

/// Both report sheets for one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct CostReport {
    pub title: String,
    pub summary: ExecutiveSummary,
    pub timeline: MonthlyTimeline,
}

impl CostReport {
    pub fn build(title: impl Into<String>, data: &ModelData) -> Self {
        Self {
            title: title.into(),
            summary: ExecutiveSummary::build(data),
            timeline: MonthlyTimeline::build(data),
        }
    }

    pub fn format_terminal(&self, currency: &str) -> String {
        format!(
            "{}\n{}",
            self.summary.format_terminal(&self.title, currency),
            self.timeline.format_terminal(&self.title, currency)
        )
    }
}
