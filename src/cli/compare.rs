//! Compare CLI command

use crate::config::Settings;
use crate::display::format_comparison;
use crate::error::{WorkbookError, WorkbookResult};
use crate::state::{DataRef, Workbook};

use super::resolve_model_or_active;

/// Compare two datasets of a model; `older`/`newer` are version numbers or
/// "working"
pub fn handle_compare_command(
    workbook: &Workbook,
    settings: &Settings,
    model: Option<&str>,
    older: &str,
    newer: &str,
    verbose: bool,
) -> WorkbookResult<()> {
    let model = resolve_model_or_active(workbook, model)?;
    let older_ref = parse_ref(older)?;
    let newer_ref = parse_ref(newer)?;

    let comparison = workbook
        .compare(model.id, older_ref, newer_ref)
        .ok_or_else(|| {
            let missing = [older_ref, newer_ref]
                .into_iter()
                .find(|r| workbook.dataset(model.id, *r).is_none())
                .unwrap_or(older_ref);
            WorkbookError::version_not_found(missing.to_string())
        })?;

    println!("Model: {}", model.name);
    print!(
        "{}",
        format_comparison(
            &comparison,
            &older_ref.to_string(),
            &newer_ref.to_string(),
            &model.data.budget_config.labels(),
            &settings.currency_symbol,
            verbose,
        )
    );

    Ok(())
}

fn parse_ref(value: &str) -> WorkbookResult<DataRef> {
    value.parse().map_err(WorkbookError::Validation)
}
