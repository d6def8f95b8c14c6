//! Month-0 propagation with per-month overrides
//!
//! Each field of a budget row is handled independently. Month 0 is the
//! baseline; months 1-11 follow it until explicitly overridden.

use crate::models::{BudgetField, PropagatedField, ServiceBudget, MONTHS};

/// Set one field of one month
///
/// Setting month 0 cascades the new value into every month that is not
/// overridden for that field; overridden months keep their stored values.
/// Setting a later month overrides it. Returns false for an out-of-range month.
pub fn set_field(budget: &mut ServiceBudget, month: usize, field: BudgetField, value: f64) -> bool {
    if month >= MONTHS {
        return false;
    }

    if month == 0 {
        for index in 0..MONTHS {
            if let Some(entry) = budget.month_mut(index) {
                let cell = entry.field_mut(field);
                if index == 0 || !cell.is_overridden {
                    *cell = PropagatedField::inherited(value);
                }
            }
        }
    } else if let Some(entry) = budget.month_mut(month) {
        *entry.field_mut(field) = PropagatedField::overridden(value);
    }

    true
}

/// Reattach a month to the baseline
///
/// The month takes month 0's current value and stops being overridden.
/// Month 0 and out-of-range months are left alone; returns whether anything
/// was touched.
pub fn clear_override(budget: &mut ServiceBudget, month: usize, field: BudgetField) -> bool {
    if month == 0 || month >= MONTHS {
        return false;
    }

    let baseline = match budget.month(0) {
        Some(entry) => entry.value(field),
        None => return false,
    };

    match budget.month_mut(month) {
        Some(entry) => {
            *entry.field_mut(field) = PropagatedField::inherited(baseline);
            true
        }
        None => false,
    }
}
