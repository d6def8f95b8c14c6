//! The state transition function
//!
//! `reduce` applies one action to the application state in place. It is total:
//! an action naming a model, service or version that does not exist leaves the
//! state untouched and reports `false`.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::models::{
    renumber_versions, AppState, BudgetModel, ModelId, Service, ServiceBudget, Version,
};
use crate::services::propagation::{clear_override, set_field};

use super::action::{Action, ImportMode};

/// Apply `action` at time `now`; returns whether the state changed
pub fn reduce(state: &mut AppState, action: Action, now: DateTime<Utc>) -> bool {
    match action {
        Action::CreateModel {
            name,
            budget_config,
        } => {
            let model = BudgetModel::new(name, budget_config, now);
            state.active_model_id = Some(model.id);
            state.models.push(model);
            true
        }

        Action::RenameModel { model_id, name } => match state.model_mut(model_id) {
            Some(model) => {
                model.name = name;
                model.touch(now);
                true
            }
            None => false,
        },

        Action::DeleteModel { model_id } => delete_model(state, model_id),

        Action::SwitchModel { model_id } => {
            if state.model(model_id).is_none() || state.active_model_id == Some(model_id) {
                return false;
            }
            state.active_model_id = Some(model_id);
            true
        }

        Action::DuplicateModel { model_id, name } => {
            let copy = match state.model(model_id) {
                Some(source) => BudgetModel {
                    id: ModelId::new(),
                    name: name.unwrap_or_else(|| format!("{} (Copy)", source.name)),
                    created_at: now,
                    updated_at: now,
                    data: source.data.clone(),
                    versions: Vec::new(),
                },
                None => return false,
            };
            state.active_model_id = Some(copy.id);
            state.models.push(copy);
            true
        }

        Action::AddService { definition, ramp } => update_active(state, now, |model| {
            let service = Service::from_definition(definition, now);
            let mut budget =
                ServiceBudget::seeded(service.default_efficiency, service.default_overhead);
            if let Some(ramp) = ramp {
                budget = budget.with_ramp(ramp);
            }
            model.data.insert_service(service, budget);
            true
        }),

        Action::UpdateService {
            service_id,
            changes,
        } => update_active(state, now, |model| {
            model
                .data
                .service_mut(service_id)
                .map(|service| service.apply(&changes))
                .unwrap_or(false)
        }),

        Action::DeleteService { service_id } => update_active(state, now, |model| {
            model.data.remove_service(service_id)
        }),

        Action::SetBudgetConfig { budget_config } => update_active(state, now, |model| {
            let changed = model.data.budget_config != budget_config;
            model.data.budget_config = budget_config;
            changed
        }),

        Action::SetBudgetField {
            service_id,
            month,
            field,
            value,
        } => update_active(state, now, |model| {
            model
                .data
                .budget_mut(service_id)
                .map(|budget| set_field(budget, month, field, value))
                .unwrap_or(false)
        }),

        Action::ClearOverride {
            service_id,
            month,
            field,
        } => update_active(state, now, |model| {
            model
                .data
                .budget_mut(service_id)
                .map(|budget| clear_override(budget, month, field))
                .unwrap_or(false)
        }),

        Action::SetServiceBudget { service_id, budget } => update_active(state, now, |model| {
            match model.data.budget_mut(service_id) {
                Some(current) => {
                    *current = budget;
                    true
                }
                None => false,
            }
        }),

        Action::SaveVersion { name, shared } => update_active(state, now, |model| {
            let version = Version {
                number: model.next_version_number(),
                name,
                timestamp: now,
                shared,
                data: model.data.clone(),
            };
            model.versions.push(version);
            // A merged version may be dated after the local clock
            renumber_versions(&mut model.versions);
            true
        }),

        Action::RestoreVersion { number } => update_active(state, now, |model| {
            match model.version(number) {
                Some(version) => {
                    model.data = version.data.clone();
                    true
                }
                None => false,
            }
        }),

        Action::DeleteVersion { number } => update_active(state, now, |model| {
            let before = model.versions.len();
            model.versions.retain(|v| v.number != number);
            if model.versions.len() == before {
                return false;
            }
            renumber_versions(&mut model.versions);
            true
        }),

        Action::ToggleVersionShared { number } => update_active(state, now, |model| {
            match model.version_mut(number) {
                Some(version) => {
                    version.shared = !version.shared;
                    true
                }
                None => false,
            }
        }),

        Action::RenameVersion { number, name } => update_active(state, now, |model| {
            match model.version_mut(number) {
                Some(version) => {
                    version.name = name;
                    true
                }
                None => false,
            }
        }),

        Action::ImportModel { model, mode } => import_model(state, *model, mode, now),

        Action::ResetState { state: replacement } => {
            *state = *replacement;
            true
        }
    }
}

/// Run `f` on the active model and bump its `updated_at` if it reports a change
fn update_active<F>(state: &mut AppState, now: DateTime<Utc>, f: F) -> bool
where
    F: FnOnce(&mut BudgetModel) -> bool,
{
    match state.active_model_mut() {
        Some(model) => {
            let changed = f(model);
            if changed {
                model.touch(now);
            }
            changed
        }
        None => false,
    }
}

fn delete_model(state: &mut AppState, model_id: ModelId) -> bool {
    let before = state.models.len();
    state.models.retain(|m| m.id != model_id);
    if state.models.len() == before {
        return false;
    }

    if state.active_model_id == Some(model_id) {
        state.active_model_id = state.models.first().map(|m| m.id);
    }
    true
}

fn import_model(
    state: &mut AppState,
    model: BudgetModel,
    mode: ImportMode,
    now: DateTime<Utc>,
) -> bool {
    let model_id = model.id;

    match mode {
        ImportMode::Replace => {
            match state.models.iter_mut().find(|m| m.id == model_id) {
                Some(existing) => *existing = model,
                None => state.models.push(model),
            }
            state.active_model_id = Some(model_id);
            true
        }
        ImportMode::Merge => {
            let local = match state.model_mut(model_id) {
                Some(local) => local,
                None => return false,
            };
            let added = merge_versions(&mut local.versions, model.versions);
            if added > 0 {
                local.touch(now);
            }

            let switched = state.active_model_id != Some(model_id);
            state.active_model_id = Some(model_id);
            added > 0 || switched
        }
    }
}

/// Union imported versions into a local history
///
/// Timestamps are the identity of a version (numbers get reassigned), so an
/// imported version whose timestamp is already known is skipped. Merged-in
/// versions are marked shared. The result is sorted by timestamp and
/// renumbered from 1. Returns how many versions were added.
pub fn merge_versions(local: &mut Vec<Version>, imported: Vec<Version>) -> usize {
    let mut known: BTreeSet<DateTime<Utc>> = local.iter().map(|v| v.timestamp).collect();
    let mut added = 0;

    for mut version in imported {
        if known.insert(version.timestamp) {
            version.shared = true;
            local.push(version);
            added += 1;
        }
    }

    renumber_versions(local);
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BudgetConfig, BudgetField, ConsumptionRamp, PropagatedField, ServiceDefinition,
    };
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_735_689_600 + secs, 0).unwrap()
    }

    fn fresh_state() -> AppState {
        AppState::with_default_model(BudgetConfig::new(0, 2025), t(0))
    }

    fn add_service(state: &mut AppState, name: &str, unit_cost: f64) -> crate::models::ServiceId {
        reduce(
            state,
            Action::AddService {
                definition: ServiceDefinition::new(name, "units", unit_cost),
                ramp: None,
            },
            t(1),
        );
        state.active_model().unwrap().data.services.last().unwrap().id
    }

    fn version_numbers(state: &AppState) -> Vec<u32> {
        state
            .active_model()
            .unwrap()
            .versions
            .iter()
            .map(|v| v.number)
            .collect()
    }

    #[test]
    fn test_create_model_becomes_active() {
        let mut state = fresh_state();
        assert!(reduce(
            &mut state,
            Action::CreateModel {
                name: "Second".into(),
                budget_config: BudgetConfig::new(0, 2025),
            },
            t(1),
        ));

        assert_eq!(state.models.len(), 2);
        assert_eq!(state.active_model().unwrap().name, "Second");
    }

    #[test]
    fn test_delete_active_model_retargets_first() {
        let mut state = fresh_state();
        let first = state.models[0].id;
        reduce(
            &mut state,
            Action::CreateModel {
                name: "Second".into(),
                budget_config: BudgetConfig::new(0, 2025),
            },
            t(1),
        );
        let second = state.active_model_id.unwrap();

        assert!(reduce(&mut state, Action::DeleteModel { model_id: second }, t(2)));
        assert_eq!(state.active_model_id, Some(first));

        assert!(reduce(&mut state, Action::DeleteModel { model_id: first }, t(3)));
        assert_eq!(state.active_model_id, None);
        assert!(state.models.is_empty());
    }

    #[test]
    fn test_delete_inactive_model_keeps_active() {
        let mut state = fresh_state();
        let first = state.models[0].id;
        reduce(
            &mut state,
            Action::CreateModel {
                name: "Second".into(),
                budget_config: BudgetConfig::new(0, 2025),
            },
            t(1),
        );
        let second = state.active_model_id.unwrap();

        reduce(&mut state, Action::DeleteModel { model_id: first }, t(2));
        assert_eq!(state.active_model_id, Some(second));
    }

    #[test]
    fn test_missing_references_are_noops() {
        let mut state = fresh_state();
        let before = state.clone();

        let actions = vec![
            Action::RenameModel {
                model_id: ModelId::new(),
                name: "x".into(),
            },
            Action::DeleteModel {
                model_id: ModelId::new(),
            },
            Action::SwitchModel {
                model_id: ModelId::new(),
            },
            Action::DeleteService {
                service_id: crate::models::ServiceId::new(),
            },
            Action::SetBudgetField {
                service_id: crate::models::ServiceId::new(),
                month: 0,
                field: BudgetField::Consumption,
                value: 1.0,
            },
            Action::RestoreVersion { number: 9 },
            Action::DeleteVersion { number: 9 },
            Action::ToggleVersionShared { number: 9 },
        ];

        for action in actions {
            assert!(!reduce(&mut state, action, t(5)));
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_no_active_model_is_noop() {
        let mut state = AppState::empty();
        assert!(!reduce(
            &mut state,
            Action::SaveVersion {
                name: "v1".into(),
                shared: false,
            },
            t(1),
        ));
    }

    #[test]
    fn test_duplicate_is_independent() {
        let mut state = fresh_state();
        let service_id = add_service(&mut state, "Compute", 1.0);
        reduce(
            &mut state,
            Action::SaveVersion {
                name: "v1".into(),
                shared: false,
            },
            t(2),
        );
        let original = state.active_model_id.unwrap();

        reduce(
            &mut state,
            Action::DuplicateModel {
                model_id: original,
                name: None,
            },
            t(3),
        );
        let copy_id = state.active_model_id.unwrap();
        assert_ne!(copy_id, original);

        let copy = state.model(copy_id).unwrap();
        assert_eq!(copy.name, "Default Model (Copy)");
        assert!(copy.versions.is_empty());

        reduce(
            &mut state,
            Action::SetBudgetField {
                service_id,
                month: 0,
                field: BudgetField::Consumption,
                value: 77.0,
            },
            t(4),
        );
        let original_value = state
            .model(original)
            .unwrap()
            .data
            .budget(service_id)
            .unwrap()
            .month(0)
            .unwrap()
            .consumption
            .value;
        assert_eq!(original_value, 0.0);
    }

    #[test]
    fn test_add_service_seeds_budget() {
        let mut state = fresh_state();
        let mut definition = ServiceDefinition::new("Compute", "hours", 2.0);
        definition.default_efficiency = 80.0;
        definition.default_overhead = 15.0;

        reduce(
            &mut state,
            Action::AddService {
                definition,
                ramp: None,
            },
            t(1),
        );

        let data = &state.active_model().unwrap().data;
        assert!(data.is_consistent());
        let budget = data.budget(data.services[0].id).unwrap();
        for entry in budget.months() {
            assert_eq!(entry.consumption, PropagatedField::inherited(0.0));
            assert_eq!(entry.efficiency, PropagatedField::inherited(80.0));
            assert_eq!(entry.overhead, PropagatedField::inherited(15.0));
            assert_eq!(entry.discount, PropagatedField::inherited(0.0));
        }
    }

    #[test]
    fn test_add_service_with_ramp() {
        let mut state = fresh_state();
        reduce(
            &mut state,
            Action::AddService {
                definition: ServiceDefinition::new("Compute", "hours", 2.0),
                ramp: Some(ConsumptionRamp {
                    base: 10.0,
                    growth: 5.0,
                }),
            },
            t(1),
        );

        let data = &state.active_model().unwrap().data;
        let budget = data.budget(data.services[0].id).unwrap();
        assert_eq!(budget.month(0).unwrap().consumption, PropagatedField::inherited(10.0));
        assert_eq!(budget.month(4).unwrap().consumption, PropagatedField::overridden(30.0));
    }

    #[test]
    fn test_delete_service_removes_budget() {
        let mut state = fresh_state();
        let keep = add_service(&mut state, "Compute", 1.0);
        let drop = add_service(&mut state, "Storage", 1.0);

        assert!(reduce(&mut state, Action::DeleteService { service_id: drop }, t(2)));

        let data = &state.active_model().unwrap().data;
        assert!(data.is_consistent());
        assert!(data.budget(drop).is_none());
        assert!(data.budget(keep).is_some());
    }

    #[test]
    fn test_mutation_bumps_updated_at() {
        let mut state = fresh_state();
        add_service(&mut state, "Compute", 1.0);
        assert_eq!(state.active_model().unwrap().updated_at, t(1));

        reduce(
            &mut state,
            Action::SetBudgetConfig {
                budget_config: BudgetConfig::new(6, 2026),
            },
            t(9),
        );
        assert_eq!(state.active_model().unwrap().updated_at, t(9));
    }

    #[test]
    fn test_set_budget_config_does_not_move_data() {
        let mut state = fresh_state();
        let id = add_service(&mut state, "Compute", 1.0);
        reduce(
            &mut state,
            Action::SetBudgetField {
                service_id: id,
                month: 2,
                field: BudgetField::Consumption,
                value: 5.0,
            },
            t(2),
        );
        let before = *state.active_model().unwrap().data.budget(id).unwrap();

        reduce(
            &mut state,
            Action::SetBudgetConfig {
                budget_config: BudgetConfig::new(6, 2026),
            },
            t(3),
        );

        let data = &state.active_model().unwrap().data;
        assert_eq!(*data.budget(id).unwrap(), before);
        assert_eq!(data.budget_config, BudgetConfig::new(6, 2026));
    }

    #[test]
    fn test_save_and_restore_version() {
        let mut state = fresh_state();
        let id = add_service(&mut state, "Compute", 1.0);
        let set = |value| Action::SetBudgetField {
            service_id: id,
            month: 0,
            field: BudgetField::Consumption,
            value,
        };

        reduce(&mut state, set(10.0), t(2));
        reduce(
            &mut state,
            Action::SaveVersion {
                name: "baseline".into(),
                shared: true,
            },
            t(3),
        );
        reduce(&mut state, set(99.0), t(4));

        let model = state.active_model().unwrap();
        assert_eq!(model.versions.len(), 1);
        assert_eq!(model.versions[0].number, 1);
        assert!(model.versions[0].shared);
        assert_eq!(model.versions[0].timestamp, t(3));
        // Snapshot is not aliased to the working copy
        assert_eq!(
            model.versions[0].data.budget(id).unwrap().month(0).unwrap().consumption.value,
            10.0
        );

        assert!(reduce(&mut state, Action::RestoreVersion { number: 1 }, t(5)));
        let model = state.active_model().unwrap();
        assert_eq!(model.data.budget(id).unwrap().month(0).unwrap().consumption.value, 10.0);
    }

    #[test]
    fn test_delete_version_renumbers() {
        let mut state = fresh_state();
        for i in 0..3 {
            reduce(
                &mut state,
                Action::SaveVersion {
                    name: format!("v{}", i),
                    shared: false,
                },
                t(10 + i),
            );
        }

        reduce(&mut state, Action::DeleteVersion { number: 2 }, t(20));

        assert_eq!(version_numbers(&state), vec![1, 2]);
        let names: Vec<String> = state
            .active_model()
            .unwrap()
            .versions
            .iter()
            .map(|v| v.name.clone())
            .collect();
        assert_eq!(names, vec!["v0", "v2"]);

        reduce(
            &mut state,
            Action::SaveVersion {
                name: "v3".into(),
                shared: false,
            },
            t(21),
        );
        assert_eq!(version_numbers(&state), vec![1, 2, 3]);
    }

    #[test]
    fn test_toggle_and_rename_version() {
        let mut state = fresh_state();
        reduce(
            &mut state,
            Action::SaveVersion {
                name: "draft".into(),
                shared: false,
            },
            t(1),
        );

        reduce(&mut state, Action::ToggleVersionShared { number: 1 }, t(2));
        reduce(
            &mut state,
            Action::RenameVersion {
                number: 1,
                name: "final".into(),
            },
            t(3),
        );

        let version = &state.active_model().unwrap().versions[0];
        assert!(version.shared);
        assert_eq!(version.name, "final");
    }

    #[test]
    fn test_import_replace_appends_and_activates() {
        let mut state = fresh_state();
        let incoming = BudgetModel::new("Incoming", BudgetConfig::new(0, 2025), t(1));
        let incoming_id = incoming.id;

        reduce(
            &mut state,
            Action::ImportModel {
                model: Box::new(incoming.clone()),
                mode: ImportMode::Replace,
            },
            t(2),
        );
        assert_eq!(state.models.len(), 2);
        assert_eq!(state.active_model_id, Some(incoming_id));

        let mut renamed = incoming;
        renamed.name = "Replaced".into();
        reduce(
            &mut state,
            Action::ImportModel {
                model: Box::new(renamed),
                mode: ImportMode::Replace,
            },
            t(3),
        );
        assert_eq!(state.models.len(), 2);
        assert_eq!(state.model(incoming_id).unwrap().name, "Replaced");
    }

    #[test]
    fn test_import_merge_without_local_model_is_noop() {
        let mut state = fresh_state();
        let before = state.clone();
        let incoming = BudgetModel::new("Incoming", BudgetConfig::new(0, 2025), t(1));

        assert!(!reduce(
            &mut state,
            Action::ImportModel {
                model: Box::new(incoming),
                mode: ImportMode::Merge,
            },
            t(2),
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_import_merge_dedupes_by_timestamp() {
        let mut state = fresh_state();
        for i in 0..2 {
            reduce(
                &mut state,
                Action::SaveVersion {
                    name: format!("local{}", i),
                    shared: false,
                },
                t(10 + i * 10),
            );
        }
        let local = state.active_model().unwrap().clone();

        let mut incoming = local.clone();
        incoming.data.services.clear();
        incoming.versions = vec![
            Version {
                number: 1,
                ..local.versions[0].clone()
            },
            Version {
                number: 2,
                name: "remote".into(),
                timestamp: t(15),
                shared: false,
                data: local.data.clone(),
            },
        ];

        assert!(reduce(
            &mut state,
            Action::ImportModel {
                model: Box::new(incoming),
                mode: ImportMode::Merge,
            },
            t(40),
        ));

        let merged = state.active_model().unwrap();
        let names: Vec<&str> = merged.versions.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["local0", "remote", "local1"]);
        assert_eq!(version_numbers(&state), vec![1, 2, 3]);
        assert!(merged.versions[1].shared);
        // Local copies keep their own flags; working data is untouched
        assert!(!merged.versions[0].shared);
        assert_eq!(merged.data, local.data);
    }

    #[test]
    fn test_save_after_future_dated_merge_keeps_order() {
        let mut state = fresh_state();
        let mut remote = state.active_model().unwrap().clone();
        let data = remote.data.clone();
        remote.versions = vec![Version {
            number: 1,
            name: "remote".into(),
            timestamp: t(100),
            shared: true,
            data,
        }];

        assert!(reduce(
            &mut state,
            Action::ImportModel {
                model: Box::new(remote),
                mode: ImportMode::Merge,
            },
            t(10),
        ));
        reduce(
            &mut state,
            Action::SaveVersion {
                name: "local".into(),
                shared: false,
            },
            t(20),
        );

        let summary: Vec<(u32, &str)> = state
            .active_model()
            .unwrap()
            .versions
            .iter()
            .map(|v| (v.number, v.name.as_str()))
            .collect();
        assert_eq!(summary, vec![(1, "local"), (2, "remote")]);
    }

    proptest! {
        #[test]
        fn version_numbers_stay_dense(ops in proptest::collection::vec((0u8..3, 1u32..6), 1..40)) {
            let mut state = fresh_state();
            let mut clock = t(100);
            for (op, n) in ops {
                clock += Duration::seconds(1);
                let action = match op {
                    0 => Action::SaveVersion { name: "v".into(), shared: n % 2 == 0 },
                    1 => Action::DeleteVersion { number: n },
                    _ => {
                        let model = state.active_model().unwrap().clone();
                        let mut remote = model.clone();
                        remote.versions = vec![Version {
                            number: 1,
                            name: "remote".into(),
                            // Some remote clocks run ahead of ours
                            timestamp: clock + Duration::milliseconds(800 * (n as i64 - 3)),
                            shared: false,
                            data: model.data.clone(),
                        }];
                        Action::ImportModel { model: Box::new(remote), mode: ImportMode::Merge }
                    }
                };
                reduce(&mut state, action, clock);

                let versions = &state.active_model().unwrap().versions;
                for (i, v) in versions.iter().enumerate() {
                    prop_assert_eq!(v.number, i as u32 + 1);
                }
                prop_assert!(versions.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
            }
        }
    }
}
