//! User settings for the workbook
//!
//! Every field has a serde default so older or hand-edited config files keep
//! loading.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::paths::WorkbookPaths;
use crate::error::{WorkbookError, WorkbookResult};
use crate::models::BudgetConfig;
use crate::session::DEFAULT_UNDO_DEPTH;
use crate::storage::{write_json_atomic, DEFAULT_DEBOUNCE_MS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Coalescing window for state writes
    #[serde(default = "default_persist_debounce_ms")]
    pub persist_debounce_ms: u64,

    /// Undo steps kept by an edit session
    #[serde(default = "default_undo_depth")]
    pub undo_depth: usize,

    /// Currency symbol used in tables and reports
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Calendar anchor for new models (0 = January)
    #[serde(default = "default_start_month")]
    pub default_start_month: u32,

    #[serde(default = "default_start_year")]
    pub default_start_year: i32,

    /// File extension of export archives
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_persist_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_undo_depth() -> usize {
    DEFAULT_UNDO_DEPTH
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_start_month() -> u32 {
    Utc::now().month0()
}

fn default_start_year() -> i32 {
    Utc::now().year()
}

fn default_archive_extension() -> String {
    "zip".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self::anchored_at(Utc::now())
    }
}

impl Settings {
    /// Defaults with new models anchored at the month containing `now`
    pub fn anchored_at(now: DateTime<Utc>) -> Self {
        Self {
            schema_version: default_schema_version(),
            persist_debounce_ms: default_persist_debounce_ms(),
            undo_depth: default_undo_depth(),
            currency_symbol: default_currency(),
            default_start_month: now.month0(),
            default_start_year: now.year(),
            archive_extension: default_archive_extension(),
        }
    }

    /// Calendar anchor given to new models
    pub fn default_budget_config(&self) -> BudgetConfig {
        BudgetConfig::new(self.default_start_month, self.default_start_year)
    }

    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &WorkbookPaths) -> WorkbookResult<Self> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Not saved yet; the caller decides when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| WorkbookError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| WorkbookError::Config(format!("Failed to parse settings file: {}", e)))
    }

    pub fn save(&self, paths: &WorkbookPaths) -> WorkbookResult<()> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Set one setting from its textual key and value
    pub fn set(&mut self, key: &str, value: &str) -> WorkbookResult<()> {
        let invalid = |e: &dyn std::fmt::Display| {
            WorkbookError::Validation(format!("Invalid value for {}: {}", key, e))
        };

        match key {
            "persist_debounce_ms" => {
                self.persist_debounce_ms = value.parse::<u64>().map_err(|e| invalid(&e))?
            }
            "undo_depth" => {
                let depth = value.parse::<usize>().map_err(|e| invalid(&e))?;
                if depth == 0 {
                    return Err(invalid(&"must be at least 1"));
                }
                self.undo_depth = depth;
            }
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "default_start_month" => {
                let month = value.parse::<u32>().map_err(|e| invalid(&e))?;
                if !(1..=12).contains(&month) {
                    return Err(invalid(&"expected 1-12"));
                }
                self.default_start_month = month - 1;
            }
            "default_start_year" => {
                self.default_start_year = value.parse::<i32>().map_err(|e| invalid(&e))?
            }
            "archive_extension" => {
                let ext = value.trim_start_matches('.');
                if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(invalid(&"expected an alphanumeric extension"));
                }
                self.archive_extension = ext.to_string();
            }
            other => {
                return Err(WorkbookError::Validation(format!(
                    "Unknown setting: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let now = Utc.with_ymd_and_hms(2025, 11, 3, 0, 0, 0).unwrap();
        let settings = Settings::anchored_at(now);

        assert_eq!(settings.persist_debounce_ms, 300);
        assert_eq!(settings.undo_depth, 50);
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.archive_extension, "zip");
        assert_eq!(settings.default_budget_config(), BudgetConfig::new(10, 2025));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkbookPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.currency_symbol = "€".into();
        settings.undo_depth = 10;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"currency_symbol": "£"}"#).unwrap();
        assert_eq!(settings.currency_symbol, "£");
        assert_eq!(settings.persist_debounce_ms, 300);
        assert_eq!(settings.archive_extension, "zip");
    }

    #[test]
    fn test_set_by_key() {
        let mut settings = Settings::default();

        settings.set("default_start_month", "4").unwrap();
        settings.set("archive_extension", ".wbk").unwrap();
        assert_eq!(settings.default_start_month, 3);
        assert_eq!(settings.archive_extension, "wbk");

        assert!(settings.set("undo_depth", "0").is_err());
        assert!(settings.set("default_start_month", "13").is_err());
        assert!(settings.set("nonsense", "1").is_err());
    }
}
