//! Dataset comparison
//!
//! Diffs two budget datasets (two versions, or a version against the working
//! data) service by service and cell by cell. Read-only over both inputs.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::models::{BudgetField, ModelData, Service, ServiceBudget, ServiceId, MONTHS};

use super::cost::{grand_total, service_annual_cost};

/// How a service differs between the two datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        };
        write!(f, "{}", label)
    }
}

/// One differing cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDiff {
    pub field: BudgetField,
    pub month: usize,
    pub old_value: f64,
    pub new_value: f64,
}

impl FieldDiff {
    pub fn delta(&self) -> f64 {
        self.new_value - self.old_value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDiff {
    pub service_id: ServiceId,
    pub name: String,
    pub status: DiffStatus,
    pub old_total_cost: f64,
    pub new_total_cost: f64,
    pub field_diffs: Vec<FieldDiff>,
}

impl ServiceDiff {
    pub fn cost_delta(&self) -> f64 {
        self.new_total_cost - self.old_total_cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub services: Vec<ServiceDiff>,
    pub old_grand_total: f64,
    pub new_grand_total: f64,
}

impl Comparison {
    pub fn grand_total_delta(&self) -> f64 {
        self.new_grand_total - self.old_grand_total
    }

    /// Percentage change of the grand total; `None` when the old total is 0
    pub fn grand_total_change_percent(&self) -> Option<f64> {
        if self.old_grand_total == 0.0 {
            None
        } else {
            Some(self.grand_total_delta() / self.old_grand_total * 100.0)
        }
    }

    pub fn count(&self, status: DiffStatus) -> usize {
        self.services.iter().filter(|s| s.status == status).count()
    }

    pub fn has_changes(&self) -> bool {
        self.services
            .iter()
            .any(|s| s.status != DiffStatus::Unchanged)
    }
}

/// Compare two datasets
///
/// Services are listed in `newer`'s order, followed by services only present
/// in `older`.
pub fn compare(older: &ModelData, newer: &ModelData) -> Comparison {
    let mut ordered: Vec<ServiceId> = newer.services.iter().map(|s| s.id).collect();
    let seen: BTreeSet<ServiceId> = ordered.iter().copied().collect();
    ordered.extend(
        older
            .services
            .iter()
            .map(|s| s.id)
            .filter(|id| !seen.contains(id)),
    );

    let services = ordered
        .into_iter()
        .filter_map(|id| diff_service(id, older, newer))
        .collect();

    Comparison {
        services,
        old_grand_total: grand_total(older),
        new_grand_total: grand_total(newer),
    }
}

fn diff_service(id: ServiceId, older: &ModelData, newer: &ModelData) -> Option<ServiceDiff> {
    match (older.service(id), newer.service(id)) {
        (None, Some(new)) => Some(ServiceDiff {
            service_id: id,
            name: new.name.clone(),
            status: DiffStatus::Added,
            old_total_cost: 0.0,
            new_total_cost: service_annual_cost(newer, new),
            field_diffs: Vec::new(),
        }),
        (Some(old), None) => Some(ServiceDiff {
            service_id: id,
            name: old.name.clone(),
            status: DiffStatus::Removed,
            old_total_cost: service_annual_cost(older, old),
            new_total_cost: 0.0,
            field_diffs: Vec::new(),
        }),
        (Some(old), Some(new)) => Some(diff_shared_service(old, new, older, newer)),
        (None, None) => None,
    }
}

fn diff_shared_service(
    old: &Service,
    new: &Service,
    older: &ModelData,
    newer: &ModelData,
) -> ServiceDiff {
    let field_diffs = diff_cells(older.budget(old.id), newer.budget(new.id));
    let status = if field_diffs.is_empty() {
        DiffStatus::Unchanged
    } else {
        DiffStatus::Changed
    };

    ServiceDiff {
        service_id: new.id,
        name: new.name.clone(),
        status,
        old_total_cost: service_annual_cost(older, old),
        new_total_cost: service_annual_cost(newer, new),
        field_diffs,
    }
}

fn diff_cells(old: Option<&ServiceBudget>, new: Option<&ServiceBudget>) -> Vec<FieldDiff> {
    let value_at = |budget: Option<&ServiceBudget>, month: usize, field: BudgetField| {
        budget
            .and_then(|b| b.month(month))
            .map(|entry| entry.value(field))
            .unwrap_or(0.0)
    };

    let mut diffs = Vec::new();
    for month in 0..MONTHS {
        for field in BudgetField::ALL {
            let old_value = value_at(old, month, field);
            let new_value = value_at(new, month, field);
            if old_value != new_value {
                diffs.push(FieldDiff {
                    field,
                    month,
                    old_value,
                    new_value,
                });
            }
        }
    }
    diffs
}
