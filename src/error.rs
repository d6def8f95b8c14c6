//! Custom error types for the workbook
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::fmt;

use thiserror::Error;

/// Why an imported archive was rejected
///
/// A rejection always means nothing was imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRejection {
    /// Neither the current nor the legacy data entry is in the archive
    MissingEntry,
    /// The archive or its data entry could not be decoded
    Unparsable(String),
    /// The document matches none of the known layouts
    NotRecognized,
    /// The document declares a schema newer than this build understands
    UnsupportedSchema(u32),
}

impl fmt::Display for ImportRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntry => write!(f, "archive does not contain budget data"),
            Self::Unparsable(reason) => write!(f, "archive could not be read: {}", reason),
            Self::NotRecognized => write!(f, "file format not recognized"),
            Self::UnsupportedSchema(v) => {
                write!(f, "schema version {} is newer than this application supports", v)
            }
        }
    }
}

/// The main error type for workbook operations
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Import rejected
    #[error("Import failed: {0}")]
    Import(ImportRejection),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Archive container errors
    #[error("Archive error: {0}")]
    Archive(String),
}

impl WorkbookError {
    /// Create a "not found" error for models
    pub fn model_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Model",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for services
    pub fn service_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Service",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for versions
    pub fn version_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Version",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an import rejection
    pub fn is_import(&self) -> bool {
        matches!(self, Self::Import(_))
    }
}

impl From<ImportRejection> for WorkbookError {
    fn from(rejection: ImportRejection) -> Self {
        Self::Import(rejection)
    }
}

impl From<std::io::Error> for WorkbookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WorkbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for workbook operations
pub type WorkbookResult<T> = Result<T, WorkbookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorkbookError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = WorkbookError::service_not_found("Compute");
        assert_eq!(err.to_string(), "Service not found: Compute");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_import_rejection_display() {
        let err: WorkbookError = ImportRejection::NotRecognized.into();
        assert!(err.is_import());
        assert_eq!(err.to_string(), "Import failed: file format not recognized");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WorkbookError = io_err.into();
        assert!(matches!(err, WorkbookError::Io(_)));
    }
}
