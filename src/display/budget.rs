//! Service and budget grid display formatting
//!
//! Overridden cells are suffixed with `*`; everything else follows month 0.

use crate::models::{BudgetField, ModelData, Service, ServiceBudget};
use crate::services::cost::{monthly_costs, service_annual_cost};

use super::{format_currency, format_value};

/// Table of a dataset's services with their annual cost
pub fn format_service_list(data: &ModelData, currency: &str) -> String {
    if data.services.is_empty() {
        return "No services found.\n".to_string();
    }

    let name_width = data
        .services
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    let unit_width = data
        .services
        .iter()
        .map(|s| s.unit_type.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<name_width$}  {:<unit_width$}  {:>10}  {:>8}  {:>14}\n",
        "ID",
        "Name",
        "Unit",
        "Unit Cost",
        "Discount",
        "Annual Cost",
        name_width = name_width,
        unit_width = unit_width,
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<name_width$}  {:-<unit_width$}  {:->10}  {:->8}  {:->14}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
        unit_width = unit_width,
    ));

    let mut total = 0.0;
    for service in &data.services {
        let annual = service_annual_cost(data, service);
        total += annual;
        output.push_str(&format!(
            "{:<12}  {:<name_width$}  {:<unit_width$}  {:>10}  {:>8}  {:>14}\n",
            service.id.to_string(),
            service.name,
            service.unit_type,
            format_currency(service.unit_cost, currency),
            if service.discount_eligible { "yes" } else { "no" },
            format_currency(annual, currency),
            name_width = name_width,
            unit_width = unit_width,
        ));
    }

    output.push_str(&format!(
        "{:<12}  {:<name_width$}  {:<unit_width$}  {:>10}  {:>8}  {:>14}\n",
        "TOTAL",
        "",
        "",
        "",
        "",
        format_currency(total, currency),
        name_width = name_width,
        unit_width = unit_width,
    ));

    output
}

pub fn format_service_details(service: &Service, currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Service: {}\n", service.name));
    output.push_str(&format!("  ID:                 {}\n", service.id.as_uuid()));
    output.push_str(&format!("  Unit:               {}\n", service.unit_type));
    output.push_str(&format!(
        "  Unit Cost:          {}\n",
        format_currency(service.unit_cost, currency)
    ));
    output.push_str(&format!(
        "  Discount Eligible:  {}\n",
        if service.discount_eligible { "Yes" } else { "No" }
    ));
    output.push_str(&format!(
        "  Default Efficiency: {}%\n",
        format_value(service.default_efficiency)
    ));
    output.push_str(&format!(
        "  Default Overhead:   {}%\n",
        format_value(service.default_overhead)
    ));
    output.push_str(&format!(
        "  Created:            {}\n",
        service.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

/// Twelve-month grid of one service's budget row with monthly cost
pub fn format_budget_grid(
    service: &Service,
    budget: &ServiceBudget,
    labels: &[String],
    currency: &str,
) -> String {
    let costs = monthly_costs(service, budget);
    let mut output = String::new();

    output.push_str(&format!("Budget: {} ({})\n", service.name, service.unit_type));
    output.push_str(&format!(
        "{:<10}  {:>12}  {:>11}  {:>10}  {:>10}  {:>14}\n",
        "Month", "Consumption", "Efficiency", "Overhead", "Discount", "Cost"
    ));
    output.push_str(&format!(
        "{:-<10}  {:->12}  {:->11}  {:->10}  {:->10}  {:->14}\n",
        "", "", "", "", "", ""
    ));

    for (index, entry) in budget.months().iter().enumerate() {
        let cell = |field: BudgetField| {
            let value = entry.field(field);
            let marker = if value.is_overridden { "*" } else { " " };
            format!("{}{}", format_value(value.value), marker)
        };
        let label = labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("M{}", index + 1));

        output.push_str(&format!(
            "{:<10}  {:>12}  {:>11}  {:>10}  {:>10}  {:>14}\n",
            label,
            cell(BudgetField::Consumption),
            cell(BudgetField::Efficiency),
            cell(BudgetField::Overhead),
            cell(BudgetField::Discount),
            format_currency(costs[index], currency),
        ));
    }

    output.push_str(&format!(
        "{:-<10}  {:->12}  {:->11}  {:->10}  {:->10}  {:->14}\n",
        "", "", "", "", "", ""
    ));
    output.push_str(&format!(
        "{:<10}  {:>12}  {:>11}  {:>10}  {:>10}  {:>14}\n",
        "TOTAL",
        "",
        "",
        "",
        "",
        format_currency(costs.iter().sum(), currency),
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetConfig, ServiceDefinition};
    use crate::services::propagation::set_field;
    use chrono::Utc;

    fn compute() -> (Service, ServiceBudget) {
        let service =
            Service::from_definition(ServiceDefinition::new("Compute", "hours", 10.0), Utc::now());
        let mut budget = ServiceBudget::seeded(100.0, 0.0);
        set_field(&mut budget, 0, BudgetField::Consumption, 50.0);
        set_field(&mut budget, 3, BudgetField::Consumption, 200.0);
        (service, budget)
    }

    #[test]
    fn test_budget_grid_marks_overrides() {
        let (service, budget) = compute();
        let labels = BudgetConfig::new(0, 2025).labels();
        let output = format_budget_grid(&service, &budget, &labels, "$");

        let april = output.lines().find(|l| l.starts_with("Apr 2025")).unwrap();
        assert!(april.contains("200*"));
        assert!(april.contains("$2000.00"));

        let january = output.lines().find(|l| l.starts_with("Jan 2025")).unwrap();
        assert!(!january.contains('*'));
        assert!(output.contains("$7500.00"));
    }

    #[test]
    fn test_service_list_total() {
        let (service, budget) = compute();
        let mut data = ModelData::new(BudgetConfig::new(0, 2025));
        data.insert_service(service, budget);

        let output = format_service_list(&data, "$");
        assert!(output.contains("Compute"));
        let total = output.lines().last().unwrap();
        assert!(total.starts_with("TOTAL"));
        assert!(total.ends_with("$7500.00"));
    }

    #[test]
    fn test_empty_service_list() {
        let data = ModelData::new(BudgetConfig::new(0, 2025));
        assert_eq!(format_service_list(&data, "$"), "No services found.\n");
    }

    #[test]
    fn test_service_details() {
        let (service, _) = compute();
        let output = format_service_details(&service, "$");
        assert!(output.contains("Service: Compute"));
        assert!(output.contains("Unit Cost:          $10.00"));
        assert!(output.contains("Default Efficiency: 100%"));
    }
}
