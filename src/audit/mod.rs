//! Audit logging for the workbook
//!
//! Every state-changing dispatch is recorded as one line in an append-only
//! JSONL audit log.
//!
//! # Architecture
//!
//! - `AuditEntry`: a single operation on a model, service, budget row,
//!   version or calendar config.
//! - `AuditLogger`: appends entries to the log file and reads them back.
//! - `summarize_changes`: one-line summaries of field changes for updates.

mod diff;
mod entry;
mod logger;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
