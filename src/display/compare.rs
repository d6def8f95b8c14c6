//! Comparison display formatting

use crate::services::compare::{Comparison, DiffStatus};

use super::{format_currency, format_percent, format_signed_currency, format_value};

/// Per-service cost deltas, then the changed cells of each changed service
///
/// `labels` names month indices; `verbose` adds the cell-level listing.
pub fn format_comparison(
    comparison: &Comparison,
    older: &str,
    newer: &str,
    labels: &[String],
    currency: &str,
    verbose: bool,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Comparing {} -> {}\n\n", older, newer));

    if comparison.services.is_empty() {
        output.push_str("Both datasets are empty.\n");
        return output;
    }

    let name_width = comparison
        .services
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(7)
        .max(7);

    output.push_str(&format!(
        "{:<name_width$}  {:<9}  {:>14}  {:>14}  {:>14}\n",
        "Service",
        "Status",
        "Before",
        "After",
        "Change",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<9}  {:->14}  {:->14}  {:->14}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for diff in &comparison.services {
        output.push_str(&format!(
            "{:<name_width$}  {:<9}  {:>14}  {:>14}  {:>14}\n",
            diff.name,
            diff.status.to_string(),
            format_currency(diff.old_total_cost, currency),
            format_currency(diff.new_total_cost, currency),
            format_signed_currency(diff.cost_delta(), currency),
            name_width = name_width,
        ));
    }

    output.push_str(&format!(
        "{:-<name_width$}  {:-<9}  {:->14}  {:->14}  {:->14}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:<name_width$}  {:<9}  {:>14}  {:>14}  {:>14}\n",
        "TOTAL",
        format_percent(comparison.grand_total_change_percent()),
        format_currency(comparison.old_grand_total, currency),
        format_currency(comparison.new_grand_total, currency),
        format_signed_currency(comparison.grand_total_delta(), currency),
        name_width = name_width,
    ));

    output.push_str(&format!(
        "\n{} added, {} removed, {} changed, {} unchanged\n",
        comparison.count(DiffStatus::Added),
        comparison.count(DiffStatus::Removed),
        comparison.count(DiffStatus::Changed),
        comparison.count(DiffStatus::Unchanged),
    ));

    if verbose {
        for diff in comparison
            .services
            .iter()
            .filter(|d| d.status == DiffStatus::Changed)
        {
            output.push_str(&format!("\n{}:\n", diff.name));
            for cell in &diff.field_diffs {
                let label = labels
                    .get(cell.month)
                    .cloned()
                    .unwrap_or_else(|| format!("M{}", cell.month + 1));
                output.push_str(&format!(
                    "  {:<10} {:<12} {} -> {}\n",
                    label,
                    cell.field.to_string(),
                    format_value(cell.old_value),
                    format_value(cell.new_value),
                ));
            }
        }
    }

    output
}
