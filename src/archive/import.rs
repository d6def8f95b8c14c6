//! Model import
//!
//! Opens an archive, finds its data entry and runs the document through an
//! ordered chain of shape detectors. Either a whole model comes out or a
//! rejection does; nothing is partially imported.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io::{Cursor, Read};
use std::path::Path;

use crate::error::{ImportRejection, WorkbookError, WorkbookResult};
use crate::models::{renumber_versions, BudgetModel, SCHEMA_VERSION};

use super::export::{DATA_ENTRY, LEGACY_DATA_ENTRY};
use super::migrate::{
    flat_dataset, fold_point_versions, is_flat_dataset, normalize_timestamps, repair_model,
    SharedPolicy,
};

/// Name given to flat documents whose source file has no usable stem
const FALLBACK_MODEL_NAME: &str = "Imported Model";

/// A detector returns `None` when the document is not its shape
type Detector = fn(&Value, &str, DateTime<Utc>) -> Option<Result<BudgetModel, ImportRejection>>;

const DETECTORS: [Detector; 2] = [detect_wrapped_model, detect_flat_dataset];

/// Contents of the data entry, current name first
pub fn read_data_entry(bytes: &[u8]) -> Result<String, ImportRejection> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ImportRejection::Unparsable(e.to_string()))?;

    for name in [DATA_ENTRY, LEGACY_DATA_ENTRY] {
        let mut entry = match archive.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => continue,
            Err(e) => return Err(ImportRejection::Unparsable(e.to_string())),
        };
        let mut contents = String::new();
        entry
            .read_to_string(&mut contents)
            .map_err(|e| ImportRejection::Unparsable(e.to_string()))?;
        return Ok(contents);
    }

    Err(ImportRejection::MissingEntry)
}

/// Decode one data document into a current-schema model
///
/// `source_name` names a flat legacy document's new model.
pub fn decode_model(
    json: &str,
    source_name: &str,
    now: DateTime<Utc>,
) -> Result<BudgetModel, ImportRejection> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ImportRejection::Unparsable(e.to_string()))?;

    if let Some(tag) = value.get("schemaVersion").and_then(Value::as_u64) {
        if tag > u64::from(SCHEMA_VERSION) {
            return Err(ImportRejection::UnsupportedSchema(
                u32::try_from(tag).unwrap_or(u32::MAX),
            ));
        }
    }

    DETECTORS
        .iter()
        .find_map(|detect| detect(&value, source_name, now))
        .unwrap_or(Err(ImportRejection::NotRecognized))
}

/// Open archive bytes and decode the model inside
pub fn read_archive(
    bytes: &[u8],
    source_name: &str,
    now: DateTime<Utc>,
) -> Result<BudgetModel, ImportRejection> {
    let json = read_data_entry(bytes)?;
    let model = decode_model(&json, source_name, now)?;

    tracing::info!(
        model_id = %model.id,
        versions = model.versions.len(),
        "archive decoded"
    );
    Ok(model)
}

/// Read an archive from disk
pub fn read_archive_file(path: &Path, now: DateTime<Utc>) -> WorkbookResult<BudgetModel> {
    let bytes = std::fs::read(path)
        .map_err(|e| WorkbookError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(read_archive(&bytes, &source_name, now)?)
}

/// Model name derived from an archive's file name
pub fn model_name_from_source(source_name: &str) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .unwrap_or_default();

    if stem.is_empty() {
        FALLBACK_MODEL_NAME.to_string()
    } else {
        stem
    }
}

/// A full model document, possibly with a legacy `pointVersions` list
fn detect_wrapped_model(
    value: &Value,
    _source_name: &str,
    _now: DateTime<Utc>,
) -> Option<Result<BudgetModel, ImportRejection>> {
    let root = value.as_object()?;
    if !root.contains_key("id") || !root.get("data").map(Value::is_object).unwrap_or(false) {
        return None;
    }

    let mut root = root.clone();
    root.remove("schemaVersion");
    if root.contains_key("pointVersions") {
        // Anything that made it into an archive was meant to be shared
        fold_point_versions(&mut root, SharedPolicy::AllShared);
    }

    let mut document = Value::Object(root);
    normalize_timestamps(&mut document);

    Some(
        serde_json::from_value::<BudgetModel>(document)
            .map_err(|e| ImportRejection::Unparsable(e.to_string()))
            .map(|mut model| {
                renumber_versions(&mut model.versions);
                repair_model(&mut model);
                model
            }),
    )
}

/// A bare dataset without a model wrapper
fn detect_flat_dataset(
    value: &Value,
    source_name: &str,
    now: DateTime<Utc>,
) -> Option<Result<BudgetModel, ImportRejection>> {
    if !is_flat_dataset(value.as_object()?) {
        return None;
    }

    Some(flat_dataset(value.clone(), now).map(|data| {
        let mut model =
            BudgetModel::new(model_name_from_source(source_name), data.budget_config, now);
        model.data = data;
        model
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::export::{encode_archive, export_json};
    use crate::models::{BudgetConfig, Version};
    use chrono::TimeZone;
    use serde_json::json;
    use std::io::Write;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn zip_with(entry: &str, contents: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(entry, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn sample_model() -> BudgetModel {
        let mut model = BudgetModel::new("Plan", BudgetConfig::new(2, 2025), now());
        model.versions.push(Version {
            number: 1,
            name: "kept".into(),
            timestamp: now(),
            shared: true,
            data: model.data.clone(),
        });
        model
    }

    #[test]
    fn test_roundtrip_through_archive() {
        let model = sample_model();
        let bytes = encode_archive(&model).unwrap();

        let imported = read_archive(&bytes, "Plan-2025-06-01.zip", now()).unwrap();
        assert_eq!(imported, model);
    }

    #[test]
    fn test_legacy_entry_name_accepted() {
        let json = export_json(&sample_model()).unwrap();
        let bytes = zip_with(LEGACY_DATA_ENTRY, &json);

        assert!(read_archive(&bytes, "old.zip", now()).is_ok());
    }

    #[test]
    fn test_missing_entry() {
        let bytes = zip_with("notes.txt", "hello");
        assert_eq!(
            read_archive(&bytes, "x.zip", now()),
            Err(ImportRejection::MissingEntry)
        );
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            read_archive(b"plain text", "x.zip", now()),
            Err(ImportRejection::Unparsable(_))
        ));
    }

    #[test]
    fn test_unrecognized_document() {
        let bytes = zip_with(DATA_ENTRY, r#"{"foo": 1}"#);
        assert_eq!(
            read_archive(&bytes, "x.zip", now()),
            Err(ImportRejection::NotRecognized)
        );
    }

    #[test]
    fn test_newer_schema_rejected() {
        let doc = json!({"schemaVersion": 99, "id": "x", "data": {}});
        assert_eq!(
            decode_model(&doc.to_string(), "x.zip", now()),
            Err(ImportRejection::UnsupportedSchema(99))
        );
    }

    #[test]
    fn test_flat_document_named_from_file() {
        let doc = json!({
            "services": [],
            "budgetConfig": {"startMonth": 4, "startYear": 2024},
            "budgetData": {}
        });

        let model = decode_model(&doc.to_string(), "team budget.zip", now()).unwrap();
        assert_eq!(model.name, "team budget");
        assert!(model.versions.is_empty());
        assert_eq!(model.data.budget_config, BudgetConfig::new(4, 2024));
    }

    #[test]
    fn test_point_versions_all_become_shared() {
        let model = sample_model();
        let mut doc = serde_json::to_value(&model).unwrap();
        let mut point = serde_json::to_value(&model.versions[0]).unwrap();
        point["name"] = json!("point");
        point["shared"] = json!(false);
        point["timestamp"] = json!(1_600_000_000_000i64);
        doc["versions"][0]["shared"] = json!(false);
        doc["pointVersions"] = json!([point]);

        let imported = decode_model(&doc.to_string(), "x.zip", now()).unwrap();
        let summary: Vec<(u32, &str, bool)> = imported
            .versions
            .iter()
            .map(|v| (v.number, v.name.as_str(), v.shared))
            .collect();
        assert_eq!(summary, vec![(1, "point", true), (2, "kept", true)]);
    }

    #[test]
    fn test_sparse_numbers_are_renumbered() {
        let mut model = sample_model();
        model.versions[0].number = 4;

        let imported = decode_model(&export_json(&model).unwrap(), "x.zip", now()).unwrap();
        assert_eq!(imported.versions[0].number, 1);
    }

    #[test]
    fn test_wrapped_model_rows_are_repaired() {
        use crate::models::{PropagatedField, Service, ServiceBudget, ServiceDefinition, ServiceId};

        let mut model = sample_model();
        let service = Service::from_definition(ServiceDefinition::new("Compute", "hours", 10.0), now());
        let service_id = service.id;
        let stray = ServiceId::new();
        let mut row = ServiceBudget::seeded(100.0, 0.0);
        if let Some(baseline) = row.month_mut(0) {
            baseline.efficiency = PropagatedField::overridden(90.0);
        }
        model.data.budget_data.insert(stray, row);
        model.data.services.push(service);
        model.versions[0].data = model.data.clone();
        // Only the version keeps a row, with a pinned baseline
        model.versions[0].data.budget_data.insert(service_id, row);

        let imported = decode_model(&export_json(&model).unwrap(), "x.zip", now()).unwrap();
        for data in [&imported.data, &imported.versions[0].data] {
            assert!(data.is_consistent());
            assert!(!data.budget_data.contains_key(&stray));
            let baseline = data.budget(service_id).unwrap().month(0).unwrap();
            assert!(!baseline.efficiency.is_overridden);
        }
        let kept = imported.versions[0].data.budget(service_id).unwrap();
        assert_eq!(kept.month(0).unwrap().efficiency.value, 90.0);
    }

    #[test]
    fn test_model_name_from_source() {
        assert_eq!(model_name_from_source("budget.zip"), "budget");
        assert_eq!(model_name_from_source(""), "Imported Model");
    }
}
