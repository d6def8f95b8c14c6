//! Model and version display formatting

use crate::models::{AppState, BudgetModel};
use crate::services::cost::grand_total;

use super::format_currency;

/// Table of all models; the active one is marked with `*`
pub fn format_model_list(state: &AppState, currency: &str) -> String {
    if state.models.is_empty() {
        return "No models found.\n".to_string();
    }

    let name_width = state
        .models
        .iter()
        .map(|m| m.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "  {:<12}  {:<name_width$}  {:>8}  {:>8}  {:>14}  {}\n",
        "ID",
        "Name",
        "Services",
        "Versions",
        "Annual Cost",
        "Updated",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "  {:-<12}  {:-<name_width$}  {:->8}  {:->8}  {:->14}  {:-<16}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for model in &state.models {
        let marker = if state.active_model_id == Some(model.id) {
            "*"
        } else {
            " "
        };
        output.push_str(&format!(
            "{} {:<12}  {:<name_width$}  {:>8}  {:>8}  {:>14}  {}\n",
            marker,
            model.id.to_string(),
            model.name,
            model.data.services.len(),
            model.versions.len(),
            format_currency(grand_total(&model.data), currency),
            model.updated_at.format("%Y-%m-%d %H:%M"),
            name_width = name_width,
        ));
    }

    output
}

pub fn format_model_details(model: &BudgetModel, currency: &str) -> String {
    let mut output = String::new();
    let config = &model.data.budget_config;

    output.push_str(&format!("Model: {}\n", model.name));
    output.push_str(&format!("  ID:          {}\n", model.id.as_uuid()));
    output.push_str(&format!(
        "  Period:      {} - {}\n",
        config.label(0),
        config.label(11)
    ));
    output.push_str(&format!("  Services:    {}\n", model.data.services.len()));
    output.push_str(&format!(
        "  Versions:    {} ({} shared)\n",
        model.versions.len(),
        model.shared_version_count()
    ));
    output.push_str(&format!(
        "  Annual Cost: {}\n",
        format_currency(grand_total(&model.data), currency)
    ));
    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        model.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        model.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

/// Version history of a model, oldest first
pub fn format_version_list(model: &BudgetModel, currency: &str) -> String {
    if model.versions.is_empty() {
        return format!("No versions saved for '{}'.\n", model.name);
    }

    let name_width = model
        .versions
        .iter()
        .map(|v| v.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>4}  {:<name_width$}  {:<16}  {:>6}  {:>14}\n",
        "#",
        "Name",
        "Saved",
        "Shared",
        "Annual Cost",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:->4}  {:-<name_width$}  {:-<16}  {:->6}  {:->14}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for version in &model.versions {
        output.push_str(&format!(
            "{:>4}  {:<name_width$}  {:<16}  {:>6}  {:>14}\n",
            format!("v{}", version.number),
            version.name,
            version.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            if version.shared { "yes" } else { "no" },
            format_currency(grand_total(&version.data), currency),
            name_width = name_width,
        ));
    }

    output
}
