//! Path management for the workbook
//!
//! ## Path Resolution Order
//!
//! 1. `WORKBOOK_DATA_DIR` environment variable (if set)
//! 2. The platform data directory reported by `directories`
//! 3. `~/.config/workbook`

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{WorkbookError, WorkbookResult};

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "WORKBOOK_DATA_DIR";

/// Manages all paths used by the workbook
#[derive(Debug, Clone)]
pub struct WorkbookPaths {
    base_dir: PathBuf,
}

impl WorkbookPaths {
    /// Resolve the base directory
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> WorkbookResult<Self> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Use a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Key-value records, one JSON file per key
    pub fn state_dir(&self) -> PathBuf {
        self.base_dir.join("state")
    }

    /// Default destination for export archives and reports
    pub fn exports_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Create the base, state and exports directories
    pub fn ensure_directories(&self) -> WorkbookResult<()> {
        for dir in [self.base_dir.clone(), self.state_dir(), self.exports_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                WorkbookError::Io(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }

    /// Whether settings have been written before
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> WorkbookResult<PathBuf> {
    if let Some(dirs) = ProjectDirs::from("", "", "workbook") {
        return Ok(dirs.data_dir().to_path_buf());
    }

    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config").join("workbook"))
        .ok_or_else(|| WorkbookError::Config("Could not determine home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkbookPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.state_dir(), temp_dir.path().join("state"));
        assert_eq!(paths.exports_dir(), temp_dir.path().join("exports"));
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.audit_log(), temp_dir.path().join("audit.log"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkbookPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.state_dir().exists());
        assert!(paths.exports_dir().exists());
        assert!(!paths.is_initialized());
    }
}
