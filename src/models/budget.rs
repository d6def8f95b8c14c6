//! Per-service monthly budget model
//!
//! Every service owns a twelve-month row of four propagated fields. Month 0 is
//! the baseline; later months inherit it until they are overridden.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of months in a budget row
pub const MONTHS: usize = 12;

/// One (service, month, field) cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagatedField {
    pub value: f64,
    #[serde(default)]
    pub is_overridden: bool,
}

impl PropagatedField {
    /// A value that follows the baseline
    pub fn inherited(value: f64) -> Self {
        Self {
            value,
            is_overridden: false,
        }
    }

    /// A value detached from the baseline
    pub fn overridden(value: f64) -> Self {
        Self {
            value,
            is_overridden: true,
        }
    }
}

/// The four editable fields of a budget month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetField {
    Consumption,
    Efficiency,
    Overhead,
    Discount,
}

impl BudgetField {
    /// All fields in display order
    pub const ALL: [BudgetField; 4] = [
        BudgetField::Consumption,
        BudgetField::Efficiency,
        BudgetField::Overhead,
        BudgetField::Discount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consumption => "consumption",
            Self::Efficiency => "efficiency",
            Self::Overhead => "overhead",
            Self::Discount => "discount",
        }
    }
}

impl fmt::Display for BudgetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consumption" | "c" => Ok(Self::Consumption),
            "efficiency" | "e" => Ok(Self::Efficiency),
            "overhead" | "o" => Ok(Self::Overhead),
            "discount" | "d" => Ok(Self::Discount),
            other => Err(format!("Unknown budget field: {}", other)),
        }
    }
}

/// The four propagated fields of one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetMonthEntry {
    pub consumption: PropagatedField,
    pub efficiency: PropagatedField,
    pub overhead: PropagatedField,
    pub discount: PropagatedField,
}

impl BudgetMonthEntry {
    /// An entry with the given baseline values, nothing overridden
    pub fn seeded(consumption: f64, efficiency: f64, overhead: f64, discount: f64) -> Self {
        Self {
            consumption: PropagatedField::inherited(consumption),
            efficiency: PropagatedField::inherited(efficiency),
            overhead: PropagatedField::inherited(overhead),
            discount: PropagatedField::inherited(discount),
        }
    }

    pub fn field(&self, field: BudgetField) -> &PropagatedField {
        match field {
            BudgetField::Consumption => &self.consumption,
            BudgetField::Efficiency => &self.efficiency,
            BudgetField::Overhead => &self.overhead,
            BudgetField::Discount => &self.discount,
        }
    }

    pub fn field_mut(&mut self, field: BudgetField) -> &mut PropagatedField {
        match field {
            BudgetField::Consumption => &mut self.consumption,
            BudgetField::Efficiency => &mut self.efficiency,
            BudgetField::Overhead => &mut self.overhead,
            BudgetField::Discount => &mut self.discount,
        }
    }

    /// Shorthand for `field(field).value`
    pub fn value(&self, field: BudgetField) -> f64 {
        self.field(field).value
    }
}

/// Linear consumption seed for a new service: `base + growth * month`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRamp {
    pub base: f64,
    pub growth: f64,
}

/// Twelve months of budget entries for one service
///
/// The fixed-size array keeps the "exactly twelve, no gaps" shape in the type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceBudget {
    months: [BudgetMonthEntry; MONTHS],
}

impl ServiceBudget {
    /// A row seeded from a service's default efficiency and overhead
    pub fn seeded(default_efficiency: f64, default_overhead: f64) -> Self {
        Self {
            months: [BudgetMonthEntry::seeded(0.0, default_efficiency, default_overhead, 0.0);
                MONTHS],
        }
    }

    /// Apply a linear consumption ramp
    ///
    /// Month 0 carries the base unoverridden; every later month deviates from
    /// a flat pattern and is marked overridden.
    pub fn with_ramp(mut self, ramp: ConsumptionRamp) -> Self {
        for (i, entry) in self.months.iter_mut().enumerate() {
            let value = ramp.base + ramp.growth * i as f64;
            entry.consumption = if i == 0 {
                PropagatedField::inherited(value)
            } else {
                PropagatedField::overridden(value)
            };
        }
        self
    }

    pub fn from_months(months: [BudgetMonthEntry; MONTHS]) -> Self {
        Self { months }
    }

    pub fn months(&self) -> &[BudgetMonthEntry; MONTHS] {
        &self.months
    }

    /// Entry for a month index, `None` when out of range
    pub fn month(&self, index: usize) -> Option<&BudgetMonthEntry> {
        self.months.get(index)
    }

    pub fn month_mut(&mut self, index: usize) -> Option<&mut BudgetMonthEntry> {
        self.months.get_mut(index)
    }

    /// Values of one field across all months
    pub fn series(&self, field: BudgetField) -> [f64; MONTHS] {
        let mut out = [0.0; MONTHS];
        for (slot, entry) in out.iter_mut().zip(self.months.iter()) {
            *slot = entry.value(field);
        }
        out
    }

    /// Number of overridden cells across all fields
    pub fn override_count(&self) -> usize {
        self.months
            .iter()
            .flat_map(|m| BudgetField::ALL.into_iter().map(move |f| m.field(f)))
            .filter(|cell| cell.is_overridden)
            .count()
    }
}
