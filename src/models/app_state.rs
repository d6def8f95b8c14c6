//! Process-wide application state
//!
//! The root value owned by the store controller. It is only ever changed by
//! dispatching actions through the reducer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ModelId;
use super::model::{BudgetConfig, BudgetModel};

/// Current on-disk schema version
///
/// 1: flat `{services, budgetConfig, budgetData}` document.
/// 2: wrapped models with a separate `pointVersions` list.
/// 3: wrapped models with a single `versions` list carrying `shared`.
pub const SCHEMA_VERSION: u32 = 3;

/// Name given to the model created for an empty workbook
pub const DEFAULT_MODEL_NAME: &str = "Default Model";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub schema_version: u32,
    #[serde(default)]
    pub models: Vec<BudgetModel>,
    /// `None` only when `models` is empty
    #[serde(default)]
    pub active_model_id: Option<ModelId>,
}

impl AppState {
    /// A state with no models
    pub fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            models: Vec::new(),
            active_model_id: None,
        }
    }

    /// A state with a single active default model
    pub fn with_default_model(budget_config: BudgetConfig, now: DateTime<Utc>) -> Self {
        let model = BudgetModel::new(DEFAULT_MODEL_NAME, budget_config, now);
        Self {
            schema_version: SCHEMA_VERSION,
            active_model_id: Some(model.id),
            models: vec![model],
        }
    }

    pub fn model(&self, id: ModelId) -> Option<&BudgetModel> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn model_mut(&mut self, id: ModelId) -> Option<&mut BudgetModel> {
        self.models.iter_mut().find(|m| m.id == id)
    }

    /// Find a model by case-insensitive name
    pub fn find_model_by_name(&self, name: &str) -> Option<&BudgetModel> {
        self.models.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn active_model(&self) -> Option<&BudgetModel> {
        self.active_model_id.and_then(|id| self.model(id))
    }

    pub fn active_model_mut(&mut self) -> Option<&mut BudgetModel> {
        let id = self.active_model_id?;
        self.model_mut(id)
    }
}
