//! Forward-only schema migration
//!
//! Persisted state and imported documents may come from older builds. The
//! helpers here rewrite those layouts into the current one at the JSON level
//! before anything is deserialized into typed values. Legacy knowledge lives
//! only in this module.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::error::ImportRejection;
use crate::models::{
    renumber_versions, AppState, BudgetConfig, BudgetField, BudgetModel, ModelData, ServiceBudget,
    ServiceId, DEFAULT_MODEL_NAME, SCHEMA_VERSION,
};

const TIMESTAMP_KEYS: [&str; 3] = ["timestamp", "createdAt", "updatedAt"];

/// How `shared` is assigned when point versions are folded into `versions`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SharedPolicy {
    /// Keep explicit flags; versions default to shared, point versions to not shared
    ByOrigin,
    /// Everything is shared
    AllShared,
}

/// Parse persisted state bytes and bring them to the current schema
pub fn migrate_state(raw: &str, now: DateTime<Utc>) -> Result<AppState, ImportRejection> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ImportRejection::Unparsable(e.to_string()))?;
    migrate_value(value, now)
}

/// Bring a parsed state document to the current schema
pub fn migrate_value(mut value: Value, now: DateTime<Utc>) -> Result<AppState, ImportRejection> {
    let schema = detect_state_schema(&value)?;
    if schema > SCHEMA_VERSION {
        return Err(ImportRejection::UnsupportedSchema(schema));
    }

    let mut state = if schema <= 1 {
        let data = flat_dataset(value, now)?;
        let mut model = BudgetModel::new(DEFAULT_MODEL_NAME, data.budget_config, now);
        model.data = data;
        AppState {
            schema_version: SCHEMA_VERSION,
            active_model_id: Some(model.id),
            models: vec![model],
        }
    } else {
        if let Some(root) = value.as_object_mut() {
            if schema < SCHEMA_VERSION {
                if let Some(Value::Array(models)) = root.get_mut("models") {
                    for model in models.iter_mut().filter_map(Value::as_object_mut) {
                        fold_point_versions(model, SharedPolicy::ByOrigin);
                    }
                }
            }
            root.insert("schemaVersion".into(), Value::from(SCHEMA_VERSION));
        }
        normalize_timestamps(&mut value);
        serde_json::from_value::<AppState>(value)
            .map_err(|e| ImportRejection::Unparsable(e.to_string()))?
    };

    for model in &mut state.models {
        repair_model(model);
    }
    if schema < SCHEMA_VERSION {
        for model in &mut state.models {
            renumber_versions(&mut model.versions);
        }
        tracing::info!(from = schema, to = SCHEMA_VERSION, "migrated workbook state");
    }

    let active_exists = state
        .active_model_id
        .map(|id| state.model(id).is_some())
        .unwrap_or(false);
    if !active_exists {
        state.active_model_id = state.models.first().map(|m| m.id);
    }

    Ok(state)
}

/// Schema tag first, structure as fallback
fn detect_state_schema(value: &Value) -> Result<u32, ImportRejection> {
    let root = value.as_object().ok_or(ImportRejection::NotRecognized)?;

    if let Some(tag) = root.get("schemaVersion") {
        return tag
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or(ImportRejection::NotRecognized);
    }
    if root.get("models").map(Value::is_array).unwrap_or(false) {
        return Ok(2);
    }
    if is_flat_dataset(root) {
        return Ok(1);
    }
    Err(ImportRejection::NotRecognized)
}

/// Bare `{services, budgetConfig, budgetData}` document
pub(crate) fn is_flat_dataset(root: &Map<String, Value>) -> bool {
    root.get("services").map(Value::is_array).unwrap_or(false)
        && root.get("budgetData").map(Value::is_object).unwrap_or(false)
}

/// Decode a flat legacy dataset
///
/// Missing calendar anchors default to the current month and missing service
/// creation times to `now`.
pub(crate) fn flat_dataset(
    mut value: Value,
    now: DateTime<Utc>,
) -> Result<ModelData, ImportRejection> {
    let root = value.as_object_mut().ok_or(ImportRejection::NotRecognized)?;
    if !is_flat_dataset(root) {
        return Err(ImportRejection::NotRecognized);
    }

    root.retain(|key, _| matches!(key.as_str(), "services" | "budgetConfig" | "budgetData"));
    if !root.contains_key("budgetConfig") {
        let config = serde_json::to_value(BudgetConfig::starting_at(now))
            .map_err(|e| ImportRejection::Unparsable(e.to_string()))?;
        root.insert("budgetConfig".into(), config);
    }
    if let Some(Value::Array(services)) = root.get_mut("services") {
        let stamp = Value::from(now.to_rfc3339_opts(SecondsFormat::AutoSi, true));
        for service in services.iter_mut().filter_map(Value::as_object_mut) {
            service.entry("createdAt").or_insert_with(|| stamp.clone());
        }
    }

    normalize_timestamps(&mut value);
    let mut data: ModelData =
        serde_json::from_value(value).map_err(|e| ImportRejection::Unparsable(e.to_string()))?;
    repair_dataset(&mut data);
    Ok(data)
}

/// Pair every service with exactly one budget row and unpin month 0
///
/// Stray rows are dropped, missing rows are seeded from the service defaults.
/// Month 0 is the baseline and never carries an override flag. Returns
/// whether anything was repaired.
pub(crate) fn repair_dataset(data: &mut ModelData) -> bool {
    let ids: BTreeSet<ServiceId> = data.services.iter().map(|s| s.id).collect();
    let rows_before = data.budget_data.len();
    data.budget_data.retain(|id, _| ids.contains(id));
    let mut repaired = data.budget_data.len() != rows_before;

    for service in &data.services {
        if !data.budget_data.contains_key(&service.id) {
            data.budget_data.insert(
                service.id,
                ServiceBudget::seeded(service.default_efficiency, service.default_overhead),
            );
            repaired = true;
        }
    }

    for baseline in data.budget_data.values_mut().filter_map(|b| b.month_mut(0)) {
        for field in BudgetField::ALL {
            let cell = baseline.field_mut(field);
            if cell.is_overridden {
                cell.is_overridden = false;
                repaired = true;
            }
        }
    }
    repaired
}

/// Repair the working data and every version of a model
pub(crate) fn repair_model(model: &mut BudgetModel) {
    let mut repaired = repair_dataset(&mut model.data);
    for version in &mut model.versions {
        repaired |= repair_dataset(&mut version.data);
    }
    if repaired {
        tracing::warn!(model_id = %model.id, "repaired inconsistent budget data");
    }
}

/// Merge a model's `pointVersions` side list into `versions`
///
/// Numbers are placeholders afterwards; callers renumber once the typed
/// versions are available.
pub(crate) fn fold_point_versions(model: &mut Map<String, Value>, policy: SharedPolicy) {
    let mut versions = take_array(model, "versions");
    let points = take_array(model, "pointVersions");

    for version in &mut versions {
        mark_shared(version, policy, true);
    }
    for mut point in points {
        mark_shared(&mut point, policy, false);
        if let Some(obj) = point.as_object_mut() {
            obj.entry("number").or_insert(Value::from(0));
        }
        versions.push(point);
    }

    model.insert("versions".into(), Value::Array(versions));
}

fn take_array(obj: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match obj.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn mark_shared(version: &mut Value, policy: SharedPolicy, default: bool) {
    if let Some(obj) = version.as_object_mut() {
        match policy {
            SharedPolicy::AllShared => {
                obj.insert("shared".into(), Value::Bool(true));
            }
            SharedPolicy::ByOrigin => {
                obj.entry("shared").or_insert(Value::Bool(default));
            }
        }
    }
}

/// Rewrite epoch-millisecond timestamps as RFC 3339 strings, recursively
pub(crate) fn normalize_timestamps(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            for (key, child) in obj.iter_mut() {
                if TIMESTAMP_KEYS.contains(&key.as_str()) {
                    if let Some(text) = epoch_millis_to_rfc3339(child) {
                        *child = Value::String(text);
                        continue;
                    }
                }
                normalize_timestamps(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_timestamps),
        _ => {}
    }
}

fn epoch_millis_to_rfc3339(value: &Value) -> Option<String> {
    let millis = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MODEL_ID: &str = "6f1c2b9e-3a55-4b8e-9c1d-0d6f0c1a2b3c";
    const SERVICE_ID: &str = "0b7e6a52-8f1d-4c39-a3f6-5e2d8c9b1a40";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn month(consumption: f64) -> Value {
        json!({
            "consumption": {"value": consumption, "isOverridden": false},
            "efficiency": {"value": 100.0, "isOverridden": false},
            "overhead": {"value": 0.0, "isOverridden": false},
            "discount": {"value": 0.0, "isOverridden": false}
        })
    }

    fn flat_data(consumption: f64) -> Value {
        let months: Vec<Value> = (0..12).map(|_| month(consumption)).collect();
        json!({
            "services": [{
                "id": SERVICE_ID,
                "name": "Compute",
                "unitType": "hours",
                "unitCost": 10.0,
                "createdAt": 1_735_689_600_000i64
            }],
            "budgetConfig": {"startMonth": 0, "startYear": 2025},
            "budgetData": { SERVICE_ID: months }
        })
    }

    fn version(ts: i64, name: &str) -> Value {
        json!({"number": 1, "name": name, "timestamp": ts, "data": flat_data(1.0)})
    }

    #[test]
    fn test_current_schema_passes_through() {
        let state = AppState::with_default_model(BudgetConfig::new(0, 2025), now());
        let raw = serde_json::to_string(&state).unwrap();

        assert_eq!(migrate_state(&raw, now()).unwrap(), state);
    }

    #[test]
    fn test_flat_state_wrapped_into_default_model() {
        let mut doc = flat_data(50.0);
        doc["services"][0].as_object_mut().unwrap().remove("createdAt");
        let raw = doc.to_string();
        let state = migrate_state(&raw, now()).unwrap();

        assert_eq!(state.schema_version, SCHEMA_VERSION);
        assert_eq!(state.models.len(), 1);
        let model = state.active_model().unwrap();
        assert_eq!(model.name, DEFAULT_MODEL_NAME);
        assert!(model.versions.is_empty());
        assert_eq!(model.data.services[0].created_at, now());
        assert!(model.data.is_consistent());
    }

    #[test]
    fn test_point_versions_merged_by_origin() {
        let doc = json!({
            "models": [{
                "id": MODEL_ID,
                "name": "Plan",
                "createdAt": 1_735_689_600_000i64,
                "updatedAt": 1_735_689_600_000i64,
                "data": flat_data(5.0),
                "versions": [version(1_735_700_000_000, "saved")],
                "pointVersions": [
                    version(1_735_600_000_000, "early point"),
                    version(1_735_800_000_000, "late point")
                ]
            }],
            "activeModelId": MODEL_ID
        });

        let state = migrate_value(doc, now()).unwrap();
        let model = &state.models[0];
        let summary: Vec<(u32, &str, bool)> = model
            .versions
            .iter()
            .map(|v| (v.number, v.name.as_str(), v.shared))
            .collect();

        assert_eq!(
            summary,
            vec![
                (1, "early point", false),
                (2, "saved", true),
                (3, "late point", false)
            ]
        );
        assert_eq!(model.created_at, Utc.timestamp_millis_opt(1_735_689_600_000).unwrap());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let doc = json!({"schemaVersion": SCHEMA_VERSION + 1, "models": []});
        assert_eq!(
            migrate_value(doc, now()),
            Err(ImportRejection::UnsupportedSchema(SCHEMA_VERSION + 1))
        );
    }

    #[test]
    fn test_unknown_shape_is_not_recognized() {
        assert_eq!(
            migrate_value(json!({"hello": "world"}), now()),
            Err(ImportRejection::NotRecognized)
        );
        assert_eq!(migrate_value(json!([1, 2]), now()), Err(ImportRejection::NotRecognized));
        assert!(matches!(
            migrate_state("not json", now()),
            Err(ImportRejection::Unparsable(_))
        ));
    }

    #[test]
    fn test_dangling_active_model_is_repaired() {
        let mut state = AppState::with_default_model(BudgetConfig::new(0, 2025), now());
        state.active_model_id = Some(crate::models::ModelId::new());
        let raw = serde_json::to_string(&state).unwrap();

        let migrated = migrate_state(&raw, now()).unwrap();
        assert_eq!(migrated.active_model_id, Some(migrated.models[0].id));
    }

    #[test]
    fn test_flat_dataset_prunes_orphan_rows() {
        let mut doc = flat_data(1.0);
        doc["budgetData"]["1d2c3b4a-0000-4000-8000-000000000000"] = doc["budgetData"][SERVICE_ID].clone();

        let data = flat_dataset(doc, now()).unwrap();
        assert_eq!(data.budget_data.len(), 1);
        assert!(data.is_consistent());
    }

    /// One row with a pinned baseline, one service without a row, one stray row
    fn damaged_data() -> (ModelData, ServiceId, ServiceId) {
        use crate::models::{PropagatedField, Service, ServiceDefinition};

        let mut data = ModelData::new(BudgetConfig::new(0, 2025));
        let kept = Service::from_definition(ServiceDefinition::new("Compute", "hours", 10.0), now());
        let missing = Service::from_definition(ServiceDefinition::new("Storage", "GB", 0.5), now());
        let (kept_id, missing_id) = (kept.id, missing.id);

        let mut row = ServiceBudget::seeded(100.0, 0.0);
        if let Some(baseline) = row.month_mut(0) {
            baseline.consumption = PropagatedField::overridden(40.0);
        }
        data.services.push(kept);
        data.services.push(missing);
        data.budget_data.insert(kept_id, row);
        data.budget_data.insert(ServiceId::new(), ServiceBudget::default());
        (data, kept_id, missing_id)
    }

    fn assert_repaired(data: &ModelData, kept: ServiceId, missing: ServiceId) {
        assert!(data.is_consistent());
        assert!(data.budget_data.contains_key(&missing));
        let baseline = data.budget(kept).unwrap().month(0).unwrap();
        assert_eq!(baseline.consumption.value, 40.0);
        assert!(BudgetField::ALL
            .iter()
            .all(|f| !baseline.field(*f).is_overridden));
    }

    #[test]
    fn test_current_schema_state_is_repaired() {
        let (data, kept, missing) = damaged_data();
        let mut state = AppState::with_default_model(BudgetConfig::new(0, 2025), now());
        let model = state.active_model_mut().unwrap();
        model.data = data.clone();
        model.versions.push(crate::models::Version {
            number: 1,
            name: "snapshot".into(),
            timestamp: now(),
            shared: false,
            data,
        });
        let raw = serde_json::to_string(&state).unwrap();

        let migrated = migrate_state(&raw, now()).unwrap();
        let model = migrated.active_model().unwrap();
        assert_repaired(&model.data, kept, missing);
        assert_repaired(&model.versions[0].data, kept, missing);
    }

    #[test]
    fn test_repair_reports_clean_data() {
        let (mut data, ..) = damaged_data();
        assert!(repair_dataset(&mut data));
        assert!(!repair_dataset(&mut data));
    }
}
