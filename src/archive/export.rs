//! Model export
//!
//! An export archive is a zip container holding one JSON document: the model
//! with its working data and only the versions flagged as shared.

use chrono::NaiveDate;
use serde::Serialize;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use crate::error::{WorkbookError, WorkbookResult};
use crate::models::{BudgetModel, SCHEMA_VERSION};
use crate::storage::write_atomic;

/// Entry name written by this build
pub const DATA_ENTRY: &str = "budget-model.json";

/// Entry name used by older archives, accepted on import
pub const LEGACY_DATA_ENTRY: &str = "budget-data.json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    schema_version: u32,
    #[serde(flatten)]
    model: &'a BudgetModel,
}

/// The model as it will be shared: unshared versions removed
pub fn shareable_copy(model: &BudgetModel) -> BudgetModel {
    let mut copy = model.clone();
    copy.versions.retain(|v| v.shared);
    copy
}

/// Serialize the shareable copy of a model
pub fn export_json(model: &BudgetModel) -> WorkbookResult<String> {
    let shared = shareable_copy(model);
    let document = ExportDocument {
        schema_version: SCHEMA_VERSION,
        model: &shared,
    };
    serde_json::to_string_pretty(&document)
        .map_err(|e| WorkbookError::Export(format!("Failed to serialize model: {}", e)))
}

/// Build the archive bytes for a model
pub fn encode_archive(model: &BudgetModel) -> WorkbookResult<Vec<u8>> {
    let json = export_json(model)?;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    writer
        .start_file(DATA_ENTRY, options)
        .map_err(|e| WorkbookError::Archive(e.to_string()))?;
    writer
        .write_all(json.as_bytes())
        .map_err(|e| WorkbookError::Archive(e.to_string()))?;
    let cursor = writer
        .finish()
        .map_err(|e| WorkbookError::Archive(e.to_string()))?;

    Ok(cursor.into_inner())
}

/// Keep `[A-Za-z0-9-_ ]`, then turn whitespace runs into single hyphens
pub fn sanitize_file_stem(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .collect();
    let stem = kept.split_whitespace().collect::<Vec<_>>().join("-");

    if stem.is_empty() {
        "model".to_string()
    } else {
        stem
    }
}

/// `<sanitized-name>-<YYYY-MM-DD>.<ext>`
pub fn archive_file_name(model_name: &str, date: NaiveDate, extension: &str) -> String {
    format!(
        "{}-{}.{}",
        sanitize_file_stem(model_name),
        date.format("%Y-%m-%d"),
        extension.trim_start_matches('.')
    )
}

/// Write a model's archive into `dir` and return its path
pub fn export_model(
    model: &BudgetModel,
    dir: &Path,
    extension: &str,
    date: NaiveDate,
) -> WorkbookResult<PathBuf> {
    let path = dir.join(archive_file_name(&model.name, date, extension));
    write_archive(model, &path)?;
    Ok(path)
}

/// Write a model's archive to an explicit path
pub fn write_archive(model: &BudgetModel, path: &Path) -> WorkbookResult<()> {
    let bytes = encode_archive(model)?;
    write_atomic(path, &bytes)?;

    tracing::info!(
        model_id = %model.id,
        shared_versions = model.shared_version_count(),
        path = %path.display(),
        "model exported"
    );
    Ok(())
}
