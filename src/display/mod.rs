//! Display formatting for terminal output
//!
//! Plain-text tables for models, services, budget grids, versions and
//! comparisons, plus the number formatting they share.

pub mod budget;
pub mod compare;
pub mod model;

pub use budget::{format_budget_grid, format_service_details, format_service_list};
pub use compare::format_comparison;
pub use model::{format_model_details, format_model_list, format_version_list};

/// Format an amount with two decimals, e.g. "$10.50" or "-$3.00"
pub fn format_currency(amount: f64, symbol: &str) -> String {
    // Keeps -0.001 from printing as "-$0.00"
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded < 0.0 {
        format!("-{}{:.2}", symbol, rounded.abs())
    } else {
        format!("{}{:.2}", symbol, rounded.abs())
    }
}

/// Like [`format_currency`] but always signed, for deltas
pub fn format_signed_currency(amount: f64, symbol: &str) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded > 0.0 {
        format!("+{}", format_currency(rounded, symbol))
    } else {
        format_currency(rounded, symbol)
    }
}

/// Signed percentage with one decimal, or "n/a"
pub fn format_percent(percent: Option<f64>) -> String {
    match percent {
        Some(p) => format!("{:+.1}%", p),
        None => "n/a".to_string(),
    }
}

/// Cell value without trailing zeros: "50", "12.5"
pub fn format_value(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
