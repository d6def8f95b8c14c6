//! CLI command handlers
//!
//! This module bridges clap argument parsing with the store. Names and ids
//! typed by the user are resolved here, so every dispatched action carries a
//! reference that exists.

pub mod archive;
pub mod budget;
pub mod compare;
pub mod history;
pub mod model;
pub mod report;
pub mod service;
pub mod version;

pub use archive::{handle_export_command, handle_import_command};
pub use budget::{handle_budget_command, BudgetCommands};
pub use compare::handle_compare_command;
pub use history::handle_history_command;
pub use model::{handle_model_command, ModelCommands};
pub use report::{handle_report_command, ReportCommands};
pub use service::{handle_service_command, ServiceCommands};
pub use version::{handle_version_command, VersionCommands};

use crate::error::{WorkbookError, WorkbookResult};
use crate::models::{BudgetModel, ModelData, Service, MONTHS};
use crate::state::Workbook;

/// Find a model by name, full id or short `mdl-` id
pub fn resolve_model<'a>(
    workbook: &'a Workbook,
    identifier: &str,
) -> WorkbookResult<&'a BudgetModel> {
    if let Some(model) = workbook.find_model_by_name(identifier) {
        return Ok(model);
    }
    workbook
        .state()
        .models
        .iter()
        .find(|m| m.id.matches(identifier))
        .ok_or_else(|| WorkbookError::model_not_found(identifier))
}

/// The named model, or the active one when no name is given
pub fn resolve_model_or_active<'a>(
    workbook: &'a Workbook,
    identifier: Option<&str>,
) -> WorkbookResult<&'a BudgetModel> {
    match identifier {
        Some(identifier) => resolve_model(workbook, identifier),
        None => workbook
            .active_model()
            .ok_or_else(|| WorkbookError::model_not_found("(active)")),
    }
}

/// Find a service in a dataset by name, full id or short `svc-` id
pub fn resolve_service<'a>(data: &'a ModelData, identifier: &str) -> WorkbookResult<&'a Service> {
    if let Some(service) = data.find_service_by_name(identifier) {
        return Ok(service);
    }
    data.services
        .iter()
        .find(|s| s.id.matches(identifier))
        .ok_or_else(|| WorkbookError::service_not_found(identifier))
}

/// Find a service in the active model
pub fn resolve_active_service<'a>(
    workbook: &'a Workbook,
    identifier: &str,
) -> WorkbookResult<&'a Service> {
    let model = resolve_model_or_active(workbook, None)?;
    resolve_service(&model.data, identifier)
}

/// Convert a 1-based month number to a month index
pub fn parse_month(month: usize) -> WorkbookResult<usize> {
    if (1..=MONTHS).contains(&month) {
        Ok(month - 1)
    } else {
        Err(WorkbookError::Validation(format!(
            "Invalid month: {}. Use 1-{}",
            month, MONTHS
        )))
    }
}
