//! Metered service model
//!
//! A service is a billable unit with a unit cost and seed values for new
//! budget rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ServiceId;

/// A metered service in a model's catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Unique identifier
    pub id: ServiceId,

    /// Display name
    pub name: String,

    /// Unit label shown next to consumption ("vCPU hours", "GB-month")
    #[serde(default)]
    pub unit_type: String,

    /// Price of one consumed unit
    pub unit_cost: f64,

    /// Whether the discount field applies to this service
    #[serde(default)]
    pub discount_eligible: bool,

    /// Efficiency seeded into new budget rows (percent)
    #[serde(default = "default_efficiency")]
    pub default_efficiency: f64,

    /// Overhead seeded into new budget rows (percent)
    #[serde(default)]
    pub default_overhead: f64,

    /// When this service was added
    pub created_at: DateTime<Utc>,
}

fn default_efficiency() -> f64 {
    100.0
}

impl Service {
    /// Build a service from its definition with a fresh id
    pub fn from_definition(definition: ServiceDefinition, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ServiceId::new(),
            name: definition.name,
            unit_type: definition.unit_type,
            unit_cost: definition.unit_cost,
            discount_eligible: definition.discount_eligible,
            default_efficiency: definition.default_efficiency,
            default_overhead: definition.default_overhead,
            created_at,
        }
    }

    /// Apply a partial update; returns true if anything changed
    pub fn apply(&mut self, changes: &ServiceChanges) -> bool {
        let before = self.clone();
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(unit_type) = &changes.unit_type {
            self.unit_type = unit_type.clone();
        }
        if let Some(unit_cost) = changes.unit_cost {
            self.unit_cost = unit_cost;
        }
        if let Some(eligible) = changes.discount_eligible {
            self.discount_eligible = eligible;
        }
        if let Some(efficiency) = changes.default_efficiency {
            self.default_efficiency = efficiency;
        }
        if let Some(overhead) = changes.default_overhead {
            self.default_overhead = overhead;
        }
        *self != before
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} per {})", self.name, self.unit_cost, self.unit_type)
    }
}

/// Caller-supplied fields for a new service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    pub unit_type: String,
    pub unit_cost: f64,
    pub discount_eligible: bool,
    pub default_efficiency: f64,
    pub default_overhead: f64,
}

impl ServiceDefinition {
    /// A definition with 100% efficiency, no overhead and no discount
    pub fn new(name: impl Into<String>, unit_type: impl Into<String>, unit_cost: f64) -> Self {
        Self {
            name: name.into(),
            unit_type: unit_type.into(),
            unit_cost,
            discount_eligible: false,
            default_efficiency: default_efficiency(),
            default_overhead: 0.0,
        }
    }

    /// Validate user input before it reaches the store
    pub fn validate(&self) -> Result<(), ServiceValidationError> {
        if self.name.trim().is_empty() {
            return Err(ServiceValidationError::EmptyName);
        }
        if self.unit_cost <= 0.0 || !self.unit_cost.is_finite() {
            return Err(ServiceValidationError::NonPositiveUnitCost);
        }
        Ok(())
    }
}

/// Partial update of a service; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceChanges {
    pub name: Option<String>,
    pub unit_type: Option<String>,
    pub unit_cost: Option<f64>,
    pub discount_eligible: Option<bool>,
    pub default_efficiency: Option<f64>,
    pub default_overhead: Option<f64>,
}

/// Validation errors for service definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceValidationError {
    EmptyName,
    NonPositiveUnitCost,
}

impl fmt::Display for ServiceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Service name cannot be empty"),
            Self::NonPositiveUnitCost => write!(f, "Unit cost must be a positive number"),
        }
    }
}

impl std::error::Error for ServiceValidationError {}
