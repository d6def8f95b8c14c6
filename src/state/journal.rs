//! Audit entries for dispatched actions
//!
//! An entry is drafted from the state before the action runs (names and old
//! values are still there) and finished afterwards, when ids of newly created
//! entities are known.

use chrono::{DateTime, Utc};

use crate::audit::{summarize_changes, AuditEntry, EntityType, Operation};
use crate::models::AppState;

use super::action::{Action, ImportMode};

/// Where the entity id comes from once the action has run
enum Subject {
    Known,
    ActiveModel,
    NewestService,
    NewestVersion,
}

pub(crate) struct DraftEntry {
    entry: AuditEntry,
    subject: Subject,
}

impl DraftEntry {
    fn known(entry: AuditEntry) -> Self {
        Self {
            entry,
            subject: Subject::Known,
        }
    }

    fn pending(entry: AuditEntry, subject: Subject) -> Self {
        Self { entry, subject }
    }

    /// Fill in ids that only exist after the action ran
    pub(crate) fn finish(self, state: &AppState) -> AuditEntry {
        let mut entry = self.entry;
        let active = state.active_model();

        match self.subject {
            Subject::Known => {}
            Subject::ActiveModel => {
                if let Some(model) = active {
                    entry.entity_id = model.id.to_string();
                }
            }
            Subject::NewestService => {
                if let Some(service) = active.and_then(|m| m.data.services.last()) {
                    entry.entity_id = service.id.to_string();
                }
            }
            Subject::NewestVersion => {
                let saved_at = entry.timestamp;
                if let Some(version) = active.and_then(|m| m.version_saved_at(saved_at)) {
                    entry.entity_id = format!("v{}", version.number);
                }
            }
        }
        entry
    }
}

/// Draft the audit entry for an action against the current state
pub(crate) fn draft(state: &AppState, action: &Action, now: DateTime<Utc>) -> Option<DraftEntry> {
    let active = state.active_model();
    let active_id = active.map(|m| m.id.to_string()).unwrap_or_default();
    let service_name = |id| {
        active
            .and_then(|m| m.data.service(id))
            .map(|s| s.name.clone())
    };
    let version_name = |number| {
        active
            .and_then(|m| m.version(number))
            .map(|v| v.name.clone())
    };
    let entry = |operation, entity_type, id: String, name: Option<String>| {
        AuditEntry::new(now, operation, entity_type, id, name)
    };

    let draft = match action {
        Action::CreateModel { name, .. } => DraftEntry::pending(
            entry(Operation::Create, EntityType::Model, String::new(), Some(name.clone())),
            Subject::ActiveModel,
        ),
        Action::RenameModel { model_id, name } => {
            let old = state.model(*model_id)?.name.clone();
            DraftEntry::known(
                entry(
                    Operation::Update,
                    EntityType::Model,
                    model_id.to_string(),
                    Some(name.clone()),
                )
                .with_details(format!("name: \"{}\" -> \"{}\"", old, name)),
            )
        }
        Action::DeleteModel { model_id } => DraftEntry::known(entry(
            Operation::Delete,
            EntityType::Model,
            model_id.to_string(),
            Some(state.model(*model_id)?.name.clone()),
        )),
        Action::SwitchModel { model_id } => DraftEntry::known(
            entry(
                Operation::Update,
                EntityType::Model,
                model_id.to_string(),
                Some(state.model(*model_id)?.name.clone()),
            )
            .with_details("made active"),
        ),
        Action::DuplicateModel { model_id, name } => {
            let source = state.model(*model_id)?;
            let copy_name = name
                .clone()
                .unwrap_or_else(|| format!("{} (Copy)", source.name));
            DraftEntry::pending(
                entry(Operation::Create, EntityType::Model, String::new(), Some(copy_name))
                    .with_details(format!("duplicated from {}", source.id)),
                Subject::ActiveModel,
            )
        }

        Action::AddService { definition, .. } => DraftEntry::pending(
            entry(
                Operation::Create,
                EntityType::Service,
                String::new(),
                Some(definition.name.clone()),
            ),
            Subject::NewestService,
        ),
        Action::UpdateService {
            service_id,
            changes,
        } => {
            let before = active?.data.service(*service_id)?;
            let mut after = before.clone();
            after.apply(changes);
            let mut drafted = entry(
                Operation::Update,
                EntityType::Service,
                service_id.to_string(),
                Some(after.name.clone()),
            );
            if let Some(details) = summarize_changes(before, &after) {
                drafted = drafted.with_details(details);
            }
            DraftEntry::known(drafted)
        }
        Action::DeleteService { service_id } => DraftEntry::known(entry(
            Operation::Delete,
            EntityType::Service,
            service_id.to_string(),
            service_name(*service_id),
        )),

        Action::SetBudgetConfig { budget_config } => {
            let mut drafted = entry(Operation::Update, EntityType::Config, active_id, None);
            if let Some(details) = summarize_changes(&active?.data.budget_config, budget_config) {
                drafted = drafted.with_details(details);
            }
            DraftEntry::known(drafted)
        }
        Action::SetBudgetField {
            service_id,
            month,
            field,
            value,
        } => {
            let old = active?
                .data
                .budget(*service_id)?
                .month(*month)
                .map(|m| m.value(*field))?;
            DraftEntry::known(
                entry(
                    Operation::Update,
                    EntityType::Budget,
                    service_id.to_string(),
                    service_name(*service_id),
                )
                .with_details(format!("{}[{}]: {} -> {}", field, month, old, value)),
            )
        }
        Action::ClearOverride {
            service_id,
            month,
            field,
        } => DraftEntry::known(
            entry(
                Operation::Update,
                EntityType::Budget,
                service_id.to_string(),
                service_name(*service_id),
            )
            .with_details(format!("{}[{}]: override cleared", field, month)),
        ),
        Action::SetServiceBudget { service_id, budget } => DraftEntry::known(
            entry(
                Operation::Update,
                EntityType::Budget,
                service_id.to_string(),
                service_name(*service_id),
            )
            .with_details(format!(
                "budget replaced ({} overridden cells)",
                budget.override_count()
            )),
        ),

        Action::SaveVersion { name, shared } => DraftEntry::pending(
            entry(
                Operation::Create,
                EntityType::Version,
                String::new(),
                Some(name.clone()),
            )
            .with_details(format!("shared: {}", shared)),
            Subject::NewestVersion,
        ),
        Action::RestoreVersion { number } => DraftEntry::known(
            entry(
                Operation::Restore,
                EntityType::Model,
                active_id,
                active.map(|m| m.name.clone()),
            )
            .with_details(format!(
                "working data replaced from v{} ({})",
                number,
                version_name(*number)?
            )),
        ),
        Action::DeleteVersion { number } => DraftEntry::known(entry(
            Operation::Delete,
            EntityType::Version,
            format!("v{}", number),
            version_name(*number),
        )),
        Action::ToggleVersionShared { number } => {
            let shared = active?.version(*number)?.shared;
            DraftEntry::known(
                entry(
                    Operation::Update,
                    EntityType::Version,
                    format!("v{}", number),
                    version_name(*number),
                )
                .with_details(format!("shared: {} -> {}", shared, !shared)),
            )
        }
        Action::RenameVersion { number, name } => DraftEntry::known(
            entry(
                Operation::Update,
                EntityType::Version,
                format!("v{}", number),
                Some(name.clone()),
            )
            .with_details(format!("name: \"{}\" -> \"{}\"", version_name(*number)?, name)),
        ),

        Action::ImportModel { model, mode } => {
            let mode = match mode {
                ImportMode::Replace => "replace",
                ImportMode::Merge => "merge",
            };
            DraftEntry::known(
                entry(
                    Operation::Import,
                    EntityType::Model,
                    model.id.to_string(),
                    Some(model.name.clone()),
                )
                .with_details(format!("mode: {}, versions: {}", mode, model.versions.len())),
            )
        }
        Action::ResetState { state: replacement } => DraftEntry::known(
            entry(Operation::Restore, EntityType::Model, "workbook".into(), None).with_details(
                format!("state reset to {} model(s)", replacement.models.len()),
            ),
        ),
    };

    Some(draft)
}
