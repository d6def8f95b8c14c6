//! Budget CLI commands
//!
//! Edit a service's twelve-month budget row in the active model. Months are
//! numbered 1-12 on the command line; month 1 is the baseline the others
//! inherit from.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_budget_grid, format_currency, format_signed_currency, format_value};
use crate::error::{WorkbookError, WorkbookResult};
use crate::models::{BudgetConfig, BudgetField};
use crate::services::cost::monthly_costs;
use crate::session::BulkAdjust;
use crate::state::{Action, Workbook};

use super::{parse_month, resolve_active_service, resolve_model_or_active};

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Show a service's budget grid
    Show {
        /// Service name or ID
        service: String,
    },
    /// Set one field of one month (month 1 propagates)
    Set {
        /// Service name or ID
        service: String,
        /// Month number (1-12)
        month: usize,
        /// consumption, efficiency, overhead or discount
        field: BudgetField,
        value: f64,
    },
    /// Reattach a month to month 1's value
    Clear {
        /// Service name or ID
        service: String,
        /// Month number (2-12)
        month: usize,
        field: BudgetField,
    },
    /// Scale a field by a percentage from a month onward
    Adjust {
        /// Service name or ID
        service: String,
        field: BudgetField,
        /// Percentage change, e.g. 10 or -5
        #[arg(allow_hyphen_values = true)]
        percent: f64,
        /// First month to adjust (1-12)
        #[arg(long, default_value = "1")]
        from: usize,
        /// Apply the percentage once per month, compounding
        #[arg(long)]
        compound: bool,
        /// Lowest value a month can be adjusted to
        #[arg(long, default_value = "0")]
        floor: f64,
        /// Preview without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Change the calendar anchor of the active model
    Config {
        /// First month of the budget year (1-12)
        #[arg(long)]
        start_month: Option<usize>,
        /// Year of the first month
        #[arg(long)]
        start_year: Option<i32>,
    },
}

pub fn handle_budget_command(
    workbook: &mut Workbook,
    settings: &Settings,
    cmd: BudgetCommands,
) -> WorkbookResult<()> {
    let currency = settings.currency_symbol.as_str();

    match cmd {
        BudgetCommands::Show { service } => {
            let model = resolve_model_or_active(workbook, None)?;
            let found = resolve_active_service(workbook, &service)?;
            let budget = model
                .data
                .budget(found.id)
                .ok_or_else(|| WorkbookError::service_not_found(&service))?;

            let labels = model.data.budget_config.labels();
            print!("{}", format_budget_grid(found, budget, &labels, currency));
        }

        BudgetCommands::Set {
            service,
            month,
            field,
            value,
        } => {
            let month = parse_month(month)?;
            if !value.is_finite() {
                return Err(WorkbookError::Validation(format!("Invalid value: {}", value)));
            }
            let found = resolve_active_service(workbook, &service)?;
            let (service_id, name) = (found.id, found.name.clone());

            workbook.dispatch(Action::SetBudgetField {
                service_id,
                month,
                field,
                value,
            });

            if month == 0 {
                println!(
                    "Set {} {} to {} (months without overrides follow)",
                    name,
                    field,
                    format_value(value)
                );
            } else {
                println!(
                    "Set {} {} for {} to {}",
                    name,
                    field,
                    month_label(workbook, month)?,
                    format_value(value)
                );
            }
        }

        BudgetCommands::Clear {
            service,
            month,
            field,
        } => {
            let month = parse_month(month)?;
            if month == 0 {
                return Err(WorkbookError::Validation(
                    "Month 1 is the baseline and cannot be overridden".to_string(),
                ));
            }
            let found = resolve_active_service(workbook, &service)?;
            let (service_id, name) = (found.id, found.name.clone());

            workbook.dispatch(Action::ClearOverride {
                service_id,
                month,
                field,
            });
            println!(
                "Cleared {} override for {} in {}",
                field,
                name,
                month_label(workbook, month)?
            );
        }

        BudgetCommands::Adjust {
            service,
            field,
            percent,
            from,
            compound,
            floor,
            dry_run,
        } => {
            let from_month = parse_month(from)?;
            if !percent.is_finite() || percent <= -100.0 {
                return Err(WorkbookError::Validation(format!(
                    "Invalid percentage: {}. Must be greater than -100",
                    percent
                )));
            }

            let found = resolve_active_service(workbook, &service)?.clone();
            let mut session = workbook
                .open_session(found.id, settings.undo_depth)
                .ok_or_else(|| WorkbookError::service_not_found(&service))?;

            let before: f64 = monthly_costs(&found, session.current()).iter().sum();
            let mut adjust = BulkAdjust::percent(field, from_month, percent).with_floor(floor);
            if compound {
                adjust = adjust.compounding();
            }
            session.bulk_adjust(adjust);
            let after: f64 = monthly_costs(&found, session.current()).iter().sum();

            let labels = resolve_model_or_active(workbook, None)?
                .data
                .budget_config
                .labels();
            print!(
                "{}",
                format_budget_grid(&found, session.current(), &labels, currency)
            );
            println!(
                "Annual cost: {} -> {} ({})",
                format_currency(before, currency),
                format_currency(after, currency),
                format_signed_currency(after - before, currency)
            );

            if dry_run {
                println!("Dry run; nothing saved.");
            } else if workbook.accept_session(session) {
                println!("Adjusted {} for {}", field, found.name);
            } else {
                println!("No values changed.");
            }
        }

        BudgetCommands::Config {
            start_month,
            start_year,
        } => {
            let current = resolve_model_or_active(workbook, None)?.data.budget_config;
            if start_month.is_none() && start_year.is_none() {
                println!("Budget period: {} - {}", current.label(0), current.label(11));
                return Ok(());
            }

            let start_month = match start_month {
                Some(month) => parse_month(month)? as u32,
                None => current.start_month,
            };
            let budget_config =
                BudgetConfig::new(start_month, start_year.unwrap_or(current.start_year));

            workbook.dispatch(Action::SetBudgetConfig { budget_config });
            println!(
                "Budget period: {} - {}",
                budget_config.label(0),
                budget_config.label(11)
            );
        }
    }

    Ok(())
}

fn month_label(workbook: &Workbook, month: usize) -> WorkbookResult<String> {
    Ok(resolve_model_or_active(workbook, None)?
        .data
        .budget_config
        .label(month))
}
