//! Dispatchable actions
//!
//! The closed set of state transitions accepted by the reducer. Model-scoped
//! service, budget and version actions always target the active model.

use crate::models::{
    AppState, BudgetConfig, BudgetField, BudgetModel, ConsumptionRamp, ModelId, ServiceBudget,
    ServiceChanges, ServiceDefinition, ServiceId,
};

/// How an imported model is folded into the local state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Replace a model with the same id, or append it
    Replace,
    /// Keep the local model and union in unseen versions
    Merge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateModel {
        name: String,
        budget_config: BudgetConfig,
    },
    RenameModel {
        model_id: ModelId,
        name: String,
    },
    DeleteModel {
        model_id: ModelId,
    },
    SwitchModel {
        model_id: ModelId,
    },
    /// `name` defaults to "<original> (Copy)"
    DuplicateModel {
        model_id: ModelId,
        name: Option<String>,
    },

    AddService {
        definition: ServiceDefinition,
        ramp: Option<ConsumptionRamp>,
    },
    UpdateService {
        service_id: ServiceId,
        changes: ServiceChanges,
    },
    DeleteService {
        service_id: ServiceId,
    },

    SetBudgetConfig {
        budget_config: BudgetConfig,
    },
    SetBudgetField {
        service_id: ServiceId,
        month: usize,
        field: BudgetField,
        value: f64,
    },
    ClearOverride {
        service_id: ServiceId,
        month: usize,
        field: BudgetField,
    },
    /// Wholesale replacement, used when an edit session is accepted
    SetServiceBudget {
        service_id: ServiceId,
        budget: ServiceBudget,
    },

    SaveVersion {
        name: String,
        shared: bool,
    },
    RestoreVersion {
        number: u32,
    },
    DeleteVersion {
        number: u32,
    },
    ToggleVersionShared {
        number: u32,
    },
    RenameVersion {
        number: u32,
        name: String,
    },

    ImportModel {
        model: Box<BudgetModel>,
        mode: ImportMode,
    },
    ResetState {
        state: Box<AppState>,
    },
}

impl Action {
    /// Stable name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateModel { .. } => "create_model",
            Self::RenameModel { .. } => "rename_model",
            Self::DeleteModel { .. } => "delete_model",
            Self::SwitchModel { .. } => "switch_model",
            Self::DuplicateModel { .. } => "duplicate_model",
            Self::AddService { .. } => "add_service",
            Self::UpdateService { .. } => "update_service",
            Self::DeleteService { .. } => "delete_service",
            Self::SetBudgetConfig { .. } => "set_budget_config",
            Self::SetBudgetField { .. } => "set_budget_field",
            Self::ClearOverride { .. } => "clear_override",
            Self::SetServiceBudget { .. } => "set_service_budget",
            Self::SaveVersion { .. } => "save_version",
            Self::RestoreVersion { .. } => "restore_version",
            Self::DeleteVersion { .. } => "delete_version",
            Self::ToggleVersionShared { .. } => "toggle_version_shared",
            Self::RenameVersion { .. } => "rename_version",
            Self::ImportModel { .. } => "import_model",
            Self::ResetState { .. } => "reset_state",
        }
    }
}
