//! Core data models for the workbook
//!
//! This module contains all the data structures that represent the budgeting
//! domain: services, monthly budget rows, models, versions and the root state.

pub mod app_state;
pub mod budget;
pub mod ids;
pub mod model;
pub mod service;

pub use app_state::{AppState, DEFAULT_MODEL_NAME, SCHEMA_VERSION};
pub use budget::{
    BudgetField, BudgetMonthEntry, ConsumptionRamp, PropagatedField, ServiceBudget, MONTHS,
};
pub use ids::{ModelId, ServiceId};
pub use model::{renumber_versions, BudgetConfig, BudgetModel, ModelData, Version};
pub use service::{Service, ServiceChanges, ServiceDefinition, ServiceValidationError};
