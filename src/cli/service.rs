//! Service CLI commands
//!
//! Manage the service catalogue of the active model.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_currency, format_service_details, format_service_list};
use crate::error::{WorkbookError, WorkbookResult};
use crate::models::{ConsumptionRamp, ServiceChanges, ServiceDefinition};
use crate::state::{Action, Workbook};

use super::{resolve_active_service, resolve_model_or_active};

#[derive(Subcommand)]
pub enum ServiceCommands {
    /// List services of the active model
    List,
    /// Show one service
    Show {
        /// Service name or ID
        service: String,
    },
    /// Add a service to the active model
    Add {
        /// Service name
        name: String,
        /// Unit label (e.g. "vCPU hours")
        #[arg(short, long, default_value = "units")]
        unit: String,
        /// Price per unit
        #[arg(short, long)]
        cost: f64,
        /// Allow the discount field to apply
        #[arg(long)]
        discount_eligible: bool,
        /// Efficiency seeded into new months (percent)
        #[arg(long, default_value = "100")]
        efficiency: f64,
        /// Overhead seeded into new months (percent)
        #[arg(long, default_value = "0")]
        overhead: f64,
        /// Seed consumption of the first month
        #[arg(long)]
        ramp_base: Option<f64>,
        /// Consumption added per month after the first
        #[arg(long, requires = "ramp_base")]
        ramp_growth: Option<f64>,
    },
    /// Change fields of a service
    Update {
        /// Service name or ID
        service: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        unit: Option<String>,
        #[arg(short, long)]
        cost: Option<f64>,
        #[arg(long)]
        discount_eligible: Option<bool>,
        #[arg(long)]
        efficiency: Option<f64>,
        #[arg(long)]
        overhead: Option<f64>,
    },
    /// Delete a service and its budget row
    Delete {
        /// Service name or ID
        service: String,
    },
}

pub fn handle_service_command(
    workbook: &mut Workbook,
    settings: &Settings,
    cmd: ServiceCommands,
) -> WorkbookResult<()> {
    let currency = settings.currency_symbol.as_str();

    match cmd {
        ServiceCommands::List => {
            let model = resolve_model_or_active(workbook, None)?;
            println!("Model: {}", model.name);
            print!("{}", format_service_list(&model.data, currency));
        }

        ServiceCommands::Show { service } => {
            let found = resolve_active_service(workbook, &service)?;
            print!("{}", format_service_details(found, currency));
        }

        ServiceCommands::Add {
            name,
            unit,
            cost,
            discount_eligible,
            efficiency,
            overhead,
            ramp_base,
            ramp_growth,
        } => {
            let model = resolve_model_or_active(workbook, None)?;
            if model.data.find_service_by_name(&name).is_some() {
                return Err(WorkbookError::Validation(format!(
                    "Service '{}' already exists in '{}'",
                    name, model.name
                )));
            }

            let definition = ServiceDefinition {
                name: name.trim().to_string(),
                unit_type: unit,
                unit_cost: cost,
                discount_eligible,
                default_efficiency: efficiency,
                default_overhead: overhead,
            };
            definition
                .validate()
                .map_err(|e| WorkbookError::Validation(e.to_string()))?;

            let ramp = ramp_base.map(|base| ConsumptionRamp {
                base,
                growth: ramp_growth.unwrap_or(0.0),
            });

            println!("Added service: {}", definition.name);
            println!(
                "  Unit Cost: {} per {}",
                format_currency(cost, currency),
                definition.unit_type
            );
            workbook.dispatch(Action::AddService { definition, ramp });
        }

        ServiceCommands::Update {
            service,
            name,
            unit,
            cost,
            discount_eligible,
            efficiency,
            overhead,
        } => {
            let found = resolve_active_service(workbook, &service)?;
            let service_id = found.id;

            if let Some(name) = &name {
                if name.trim().is_empty() {
                    return Err(WorkbookError::Validation(
                        "Service name cannot be empty".to_string(),
                    ));
                }
            }
            if let Some(cost) = cost {
                if cost <= 0.0 || !cost.is_finite() {
                    return Err(WorkbookError::Validation(
                        "Unit cost must be a positive number".to_string(),
                    ));
                }
            }

            let changes = ServiceChanges {
                name: name.map(|n| n.trim().to_string()),
                unit_type: unit,
                unit_cost: cost,
                discount_eligible,
                default_efficiency: efficiency,
                default_overhead: overhead,
            };

            if changes == ServiceChanges::default() {
                println!("No changes specified. Use --name, --unit, --cost or another flag.");
                return Ok(());
            }

            if workbook.dispatch(Action::UpdateService {
                service_id,
                changes,
            }) {
                let updated = resolve_model_or_active(workbook, None)?
                    .data
                    .service(service_id)
                    .map(|s| s.name.clone())
                    .unwrap_or(service);
                println!("Updated service: {}", updated);
            } else {
                println!("Service '{}' already has those values.", service);
            }
        }

        ServiceCommands::Delete { service } => {
            let found = resolve_active_service(workbook, &service)?;
            let (service_id, name) = (found.id, found.name.clone());

            workbook.dispatch(Action::DeleteService { service_id });
            println!("Deleted service: {}", name);
        }
    }

    Ok(())
}
