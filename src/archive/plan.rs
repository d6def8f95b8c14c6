//! Conflict classification for imported models
//!
//! An imported model whose id already exists locally is a conflict. The plan
//! surfaces both sides; the caller picks a resolution, which turns the plan
//! into a store action.

use std::fmt;
use std::str::FromStr;

use crate::models::{AppState, BudgetModel, ModelId};
use crate::state::{Action, ImportMode};

/// Suffix marking a model imported alongside a local one with the same id
pub const IMPORTED_SUFFIX: &str = " (Imported)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Overwrite the local model wholesale
    Replace,
    /// Keep the local model, union in unseen versions
    MergeVersions,
    /// Keep both; the imported copy gets a fresh id
    ImportAsNew,
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::MergeVersions => write!(f, "merge"),
            Self::ImportAsNew => write!(f, "new"),
        }
    }
}

impl FromStr for ConflictResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" | "merge-versions" => Ok(Self::MergeVersions),
            "new" | "import-as-new" => Ok(Self::ImportAsNew),
            other => Err(format!(
                "Unknown resolution '{}': expected replace, merge or new",
                other
            )),
        }
    }
}

/// What importing a model would do to the local state
#[derive(Debug, Clone, PartialEq)]
pub enum ImportPlan {
    /// No local model shares the id
    New { model: BudgetModel },
    /// A local model shares the id
    Conflict {
        model: BudgetModel,
        local_name: String,
        local_versions: usize,
        imported_versions: usize,
    },
}

impl ImportPlan {
    pub fn classify(state: &AppState, model: BudgetModel) -> Self {
        match state.model(model.id) {
            Some(local) => Self::Conflict {
                local_name: local.name.clone(),
                local_versions: local.versions.len(),
                imported_versions: model.versions.len(),
                model,
            },
            None => Self::New { model },
        }
    }

    pub fn model(&self) -> &BudgetModel {
        match self {
            Self::New { model } | Self::Conflict { model, .. } => model,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// The action that carries out this plan
    ///
    /// A plan without a conflict always appends, whatever the resolution.
    pub fn into_action(self, resolution: ConflictResolution) -> Action {
        let (model, conflict) = match self {
            Self::New { model } => (model, false),
            Self::Conflict { model, .. } => (model, true),
        };

        match (conflict, resolution) {
            (true, ConflictResolution::MergeVersions) => Action::ImportModel {
                model: Box::new(model),
                mode: ImportMode::Merge,
            },
            (true, ConflictResolution::ImportAsNew) => Action::ImportModel {
                model: Box::new(as_new(model)),
                mode: ImportMode::Replace,
            },
            _ => Action::ImportModel {
                model: Box::new(model),
                mode: ImportMode::Replace,
            },
        }
    }
}

/// Fresh id and a provenance suffix on the name
fn as_new(mut model: BudgetModel) -> BudgetModel {
    model.id = ModelId::new();
    model.name.push_str(IMPORTED_SUFFIX);
    model
}
