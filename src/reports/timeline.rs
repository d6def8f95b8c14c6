//! Monthly timeline
//!
//! Service x month cost grid with column totals and month-over-month deltas.

use std::io::Write;

use crate::display::{format_currency, format_signed_currency};
use crate::error::{WorkbookError, WorkbookResult};
use crate::models::{ModelData, ServiceId, MONTHS};
use crate::services::cost::{month_totals, monthly_costs};

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow {
    pub service_id: ServiceId,
    pub name: String,
    pub monthly: [f64; MONTHS],
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTimeline {
    pub labels: Vec<String>,
    pub rows: Vec<TimelineRow>,
    pub column_totals: [f64; MONTHS],
}

impl MonthlyTimeline {
    pub fn build(data: &ModelData) -> Self {
        let rows = data
            .services
            .iter()
            .map(|service| {
                let monthly = data
                    .budget(service.id)
                    .map(|budget| monthly_costs(service, budget))
                    .unwrap_or([0.0; MONTHS]);
                TimelineRow {
                    service_id: service.id,
                    name: service.name.clone(),
                    total: monthly.iter().sum(),
                    monthly,
                }
            })
            .collect();

        Self {
            labels: data.budget_config.labels(),
            rows,
            column_totals: month_totals(data),
        }
    }

    /// Change of the column total against the previous month; `None` for month 0
    pub fn month_over_month(&self, month: usize) -> Option<f64> {
        if month == 0 || month >= MONTHS {
            return None;
        }
        Some(self.column_totals[month] - self.column_totals[month - 1])
    }

    /// Relative change in percent; `None` when the previous month is 0
    pub fn month_over_month_percent(&self, month: usize) -> Option<f64> {
        let delta = self.month_over_month(month)?;
        let previous = self.column_totals[month - 1];
        if previous == 0.0 {
            None
        } else {
            Some(delta / previous * 100.0)
        }
    }

    pub fn grand_total(&self) -> f64 {
        self.column_totals.iter().sum()
    }

    /// Months as rows, which fits a terminal better than twelve columns
    pub fn format_terminal(&self, title: &str, currency: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Monthly Timeline - {}\n", title));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>15} {:>15} {:>10}\n",
            "Month", "Total", "Change", "Change %"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for (month, label) in self.labels.iter().enumerate() {
            let change = self
                .month_over_month(month)
                .map(|d| format_signed_currency(d, currency))
                .unwrap_or_default();
            let percent = self
                .month_over_month_percent(month)
                .map(|p| format!("{:+.1}%", p))
                .unwrap_or_default();

            output.push_str(&format!(
                "{:<10} {:>15} {:>15} {:>10}\n",
                label,
                format_currency(self.column_totals[month], currency),
                change,
                percent
            ));
        }

        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>15}\n",
            "TOTAL",
            format_currency(self.grand_total(), currency)
        ));

        output
    }

    /// Service rows, a column total row and a month-over-month row
    pub fn export_csv<W: Write>(&self, writer: W) -> WorkbookResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let export_err = |e: csv::Error| WorkbookError::Export(e.to_string());

        let mut header = vec!["Service".to_string()];
        header.extend(self.labels.iter().cloned());
        header.push("Total".to_string());
        csv.write_record(&header).map_err(export_err)?;

        for row in &self.rows {
            let mut record = vec![row.name.clone()];
            record.extend(row.monthly.iter().map(|v| format!("{:.2}", v)));
            record.push(format!("{:.2}", row.total));
            csv.write_record(&record).map_err(export_err)?;
        }

        let mut totals = vec!["TOTAL".to_string()];
        totals.extend(self.column_totals.iter().map(|v| format!("{:.2}", v)));
        totals.push(format!("{:.2}", self.grand_total()));
        csv.write_record(&totals).map_err(export_err)?;

        let mut deltas = vec!["MoM Change".to_string()];
        deltas.extend(
            (0..MONTHS).map(|m| {
                self.month_over_month(m)
                    .map(|d| format!("{:.2}", d))
                    .unwrap_or_default()
            }),
        );
        deltas.push(String::new());
        csv.write_record(&deltas).map_err(export_err)?;

        csv.flush()
            .map_err(|e| WorkbookError::Export(e.to_string()))
    }
}
