//! Audit log records
//!
//! One record per dispatched action that changed the workbook.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
    /// Arrived through an archive import
    Import,
    /// Working data replaced from a version
    Restore,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Import => "IMPORT",
            Self::Restore => "RESTORE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What kind of thing an entry is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Model,
    Service,
    /// Monthly values of one service
    Budget,
    Version,
    /// The model's budget period
    Config,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Serialized form is lowercase, on screen it reads as a title
        let label = match self {
            Self::Model => "Model",
            Self::Service => "Service",
            Self::Budget => "Budget",
            Self::Version => "Version",
            Self::Config => "Config",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,

    /// Short display id, or a version label such as `v3`
    pub entity_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// One-line change summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AuditEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp,
            operation,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// `[timestamp] OP Entity id (name)` plus an indented change line
    pub fn format_human_readable(&self) -> String {
        let mut line = format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type
        );
        if !self.entity_id.is_empty() {
            let _ = write!(line, " {}", self.entity_id);
        }
        if let Some(name) = &self.entity_name {
            let _ = write!(line, " ({})", name);
        }
        if let Some(details) = &self.details {
            let _ = write!(line, "\n  Changes: {}", details);
        }
        line
    }
}
