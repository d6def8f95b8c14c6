//! Model CLI commands
//!
//! Create, switch between and inspect independent budget models.

use clap::{Subcommand, ValueEnum};

use crate::config::Settings;
use crate::display::{format_model_details, format_model_list};
use crate::error::{WorkbookError, WorkbookResult};
use crate::models::BudgetConfig;
use crate::state::{Action, Workbook};

use super::{parse_month, resolve_model, resolve_model_or_active};

/// Output format for `model show`
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ShowFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum ModelCommands {
    /// List all models
    List,
    /// Create a new model and make it active
    Create {
        /// Model name
        name: String,
        /// First month of the budget year (1-12)
        #[arg(long)]
        start_month: Option<usize>,
        /// Year of the first month
        #[arg(long)]
        start_year: Option<i32>,
    },
    /// Rename a model
    Rename {
        /// Model name or ID
        model: String,
        /// New name
        name: String,
    },
    /// Delete a model and its versions
    Delete {
        /// Model name or ID
        model: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Make a model active
    Switch {
        /// Model name or ID
        model: String,
    },
    /// Copy a model's working data into a new model without versions
    Duplicate {
        /// Model name or ID
        model: String,
        /// Name of the copy
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show a model (the active one by default)
    Show {
        /// Model name or ID
        model: Option<String>,
        #[arg(short, long, value_enum, default_value = "text")]
        format: ShowFormat,
    },
}

pub fn handle_model_command(
    workbook: &mut Workbook,
    settings: &Settings,
    cmd: ModelCommands,
) -> WorkbookResult<()> {
    let currency = settings.currency_symbol.as_str();

    match cmd {
        ModelCommands::List => {
            print!("{}", format_model_list(workbook.state(), currency));
        }

        ModelCommands::Create {
            name,
            start_month,
            start_year,
        } => {
            let name = validate_name(&name)?;
            let defaults = settings.default_budget_config();
            let start_month = match start_month {
                Some(month) => parse_month(month)? as u32,
                None => defaults.start_month,
            };
            let budget_config =
                BudgetConfig::new(start_month, start_year.unwrap_or(defaults.start_year));

            workbook.dispatch(Action::CreateModel {
                name: name.clone(),
                budget_config,
            });
            println!("Created model: {}", name);
            println!(
                "  Period: {} - {}",
                budget_config.label(0),
                budget_config.label(11)
            );
        }

        ModelCommands::Rename { model, name } => {
            let name = validate_name(&name)?;
            let found = resolve_model(workbook, &model)?;
            let (model_id, old_name) = (found.id, found.name.clone());

            if workbook.dispatch(Action::RenameModel {
                model_id,
                name: name.clone(),
            }) {
                println!("Renamed model: {} -> {}", old_name, name);
            } else {
                println!("Model '{}' already has that name.", old_name);
            }
        }

        ModelCommands::Delete { model, force } => {
            let found = resolve_model(workbook, &model)?;
            let (model_id, name, versions) = (found.id, found.name.clone(), found.versions.len());

            if !force {
                println!(
                    "This will delete model '{}' and its {} saved version(s).",
                    name, versions
                );
                println!("To proceed, run again with --force flag:");
                println!("  workbook model delete \"{}\" --force", name);
                return Ok(());
            }

            workbook.dispatch(Action::DeleteModel { model_id });
            println!("Deleted model: {}", name);
            match workbook.active_model() {
                Some(active) => println!("Active model: {}", active.name),
                None => println!("No models left. Create one with 'workbook model create'."),
            }
        }

        ModelCommands::Switch { model } => {
            let found = resolve_model(workbook, &model)?;
            let (model_id, name) = (found.id, found.name.clone());

            if workbook.dispatch(Action::SwitchModel { model_id }) {
                println!("Switched to model: {}", name);
            } else {
                println!("Model '{}' is already active.", name);
            }
        }

        ModelCommands::Duplicate { model, name } => {
            let found = resolve_model(workbook, &model)?;
            let model_id = found.id;
            let name = name.as_deref().map(validate_name).transpose()?;

            workbook.dispatch(Action::DuplicateModel { model_id, name });
            if let Some(copy) = workbook.active_model() {
                println!("Created copy: {}", copy.name);
            }
        }

        ModelCommands::Show { model, format } => {
            let found = resolve_model_or_active(workbook, model.as_deref())?;
            match format {
                ShowFormat::Text => print!("{}", format_model_details(found, currency)),
                ShowFormat::Json => println!("{}", serde_json::to_string_pretty(found)?),
                ShowFormat::Yaml => {
                    let yaml = serde_yaml::to_string(found)
                        .map_err(|e| WorkbookError::Export(e.to_string()))?;
                    print!("{}", yaml);
                }
            }
        }
    }

    Ok(())
}

fn validate_name(name: &str) -> WorkbookResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(WorkbookError::Validation(
            "Model name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
