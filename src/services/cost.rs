//! Cost formula and rollups
//!
//! Turns one month's field values into a currency amount, and aggregates those
//! amounts per service and per dataset.

use crate::models::{ModelData, Service, ServiceBudget, MONTHS};

/// Cost of one month
///
/// Efficiency is floored at 1 and the result at 0; discount only applies when
/// the service is eligible. Nothing is rejected.
pub fn cost(
    consumption: f64,
    unit_cost: f64,
    efficiency: f64,
    overhead: f64,
    discount: f64,
    discount_eligible: bool,
) -> f64 {
    let effective_efficiency = efficiency.max(1.0);
    let effective_discount = if discount_eligible { discount } else { 0.0 };

    let raw = consumption * unit_cost * (1.0 + overhead / 100.0) / (effective_efficiency / 100.0)
        * (1.0 - effective_discount / 100.0);

    raw.max(0.0)
}

/// Cost of every month of a service's budget row
pub fn monthly_costs(service: &Service, budget: &ServiceBudget) -> [f64; MONTHS] {
    let mut out = [0.0; MONTHS];
    for (slot, entry) in out.iter_mut().zip(budget.months().iter()) {
        *slot = cost(
            entry.consumption.value,
            service.unit_cost,
            entry.efficiency.value,
            entry.overhead.value,
            entry.discount.value,
            service.discount_eligible,
        );
    }
    out
}

/// Annual cost of one service in a dataset; 0 if it has no budget row
pub fn service_annual_cost(data: &ModelData, service: &Service) -> f64 {
    data.budget(service.id)
        .map(|budget| monthly_costs(service, budget).iter().sum())
        .unwrap_or(0.0)
}

/// Per-month totals across all services
pub fn month_totals(data: &ModelData) -> [f64; MONTHS] {
    let mut totals = [0.0; MONTHS];
    for service in &data.services {
        if let Some(budget) = data.budget(service.id) {
            for (total, month) in totals.iter_mut().zip(monthly_costs(service, budget)) {
                *total += month;
            }
        }
    }
    totals
}

/// Sum of every service's annual cost
pub fn grand_total(data: &ModelData) -> f64 {
    data.services
        .iter()
        .map(|s| service_annual_cost(data, s))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_baseline_cost() {
        assert_eq!(cost(100.0, 2.0, 100.0, 0.0, 0.0, false), 200.0);
    }

    #[test]
    fn test_half_efficiency_doubles_cost() {
        assert_eq!(cost(100.0, 2.0, 50.0, 0.0, 0.0, false), 400.0);
    }

    #[test]
    fn test_discount_when_eligible() {
        assert_eq!(cost(100.0, 2.0, 100.0, 0.0, 50.0, true), 100.0);
    }

    #[test]
    fn test_discount_ignored_when_ineligible() {
        assert_eq!(cost(100.0, 2.0, 100.0, 0.0, 50.0, false), 200.0);
    }

    #[test]
    fn test_efficiency_floor() {
        assert_eq!(
            cost(100.0, 1.0, 0.0, 0.0, 0.0, false),
            cost(100.0, 1.0, 1.0, 0.0, 0.0, false)
        );
    }

    #[test]
    fn test_overhead() {
        assert_eq!(cost(100.0, 1.0, 100.0, 25.0, 0.0, false), 125.0);
    }

    #[test]
    fn test_discount_over_100_floors_at_zero() {
        assert_eq!(cost(100.0, 1.0, 100.0, 0.0, 150.0, true), 0.0);
    }

    proptest! {
        #[test]
        fn cost_is_never_negative(
            consumption in 0.0_f64..1e6,
            unit_cost in 0.0_f64..1e3,
            efficiency in -500.0_f64..500.0,
            overhead in 0.0_f64..500.0,
            discount in -500.0_f64..500.0,
            eligible in any::<bool>(),
        ) {
            let result = cost(consumption, unit_cost, efficiency, overhead, discount, eligible);
            prop_assert!(result >= 0.0);
        }
    }
}
