//! Executive summary
//!
//! Grand total, monthly average and each service's share of the annual cost.

use std::io::Write;

use crate::display::format_currency;
use crate::error::{WorkbookError, WorkbookResult};
use crate::models::{ModelData, ServiceId, MONTHS};
use crate::services::cost::{grand_total, service_annual_cost};

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSummaryRow {
    pub service_id: ServiceId,
    pub name: String,
    pub unit_type: String,
    pub annual_cost: f64,
    pub monthly_average: f64,
    /// Share of the grand total, 0 when the grand total is 0
    pub share_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutiveSummary {
    pub grand_total: f64,
    pub monthly_average: f64,
    pub services: Vec<ServiceSummaryRow>,
}

impl ExecutiveSummary {
    pub fn build(data: &ModelData) -> Self {
        let total = grand_total(data);

        let services = data
            .services
            .iter()
            .map(|service| {
                let annual_cost = service_annual_cost(data, service);
                ServiceSummaryRow {
                    service_id: service.id,
                    name: service.name.clone(),
                    unit_type: service.unit_type.clone(),
                    annual_cost,
                    monthly_average: annual_cost / MONTHS as f64,
                    share_percent: if total > 0.0 {
                        annual_cost / total * 100.0
                    } else {
                        0.0
                    },
                }
            })
            .collect();

        Self {
            grand_total: total,
            monthly_average: total / MONTHS as f64,
            services,
        }
    }

    /// The most expensive service, if any has a cost
    pub fn top_service(&self) -> Option<&ServiceSummaryRow> {
        self.services
            .iter()
            .filter(|row| row.annual_cost > 0.0)
            .max_by(|a, b| a.annual_cost.total_cmp(&b.annual_cost))
    }

    pub fn format_terminal(&self, title: &str, currency: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Executive Summary - {}\n", title));
        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "Annual Total:     {}\n",
            format_currency(self.grand_total, currency)
        ));
        output.push_str(&format!(
            "Monthly Average:  {}\n\n",
            format_currency(self.monthly_average, currency)
        ));

        if self.services.is_empty() {
            output.push_str("No services defined.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<28} {:>15} {:>15} {:>10}\n",
            "Service", "Annual", "Monthly Avg", "Share"
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');

        for row in &self.services {
            output.push_str(&format!(
                "{:<28} {:>15} {:>15} {:>9.1}%\n",
                row.name,
                format_currency(row.annual_cost, currency),
                format_currency(row.monthly_average, currency),
                row.share_percent
            ));
        }

        output
    }

    /// One row per service, then a total row
    pub fn export_csv<W: Write>(&self, writer: W) -> WorkbookResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let export_err = |e: csv::Error| WorkbookError::Export(e.to_string());

        csv.write_record(["Service", "Unit", "Annual Cost", "Monthly Average", "Share %"])
            .map_err(export_err)?;

        for row in &self.services {
            csv.write_record([
                row.name.clone(),
                row.unit_type.clone(),
                format!("{:.2}", row.annual_cost),
                format!("{:.2}", row.monthly_average),
                format!("{:.2}", row.share_percent),
            ])
            .map_err(export_err)?;
        }

        csv.write_record([
            "TOTAL".to_string(),
            String::new(),
            format!("{:.2}", self.grand_total),
            format!("{:.2}", self.monthly_average),
            if self.grand_total > 0.0 {
                "100.00".to_string()
            } else {
                "0.00".to_string()
            },
        ])
        .map_err(export_err)?;

        csv.flush()
            .map_err(|e| WorkbookError::Export(e.to_string()))
    }
}
