//! Append-only audit log
//!
//! Each entry is one JSON line appended as soon as a change is dispatched.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Lines, Write};
use std::path::PathBuf;

use crate::error::{WorkbookError, WorkbookResult};

use super::entry::AuditEntry;

/// Writes audit entries to a JSONL file
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new AuditLogger that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append one entry as a JSON line
    pub fn log(&self, entry: &AuditEntry) -> WorkbookResult<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| WorkbookError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| WorkbookError::Io(format!("Failed to open audit log: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| WorkbookError::Io(format!("Failed to write audit entry: {}", e)))
    }

    /// Read all entries, oldest first
    pub fn read_all(&self) -> WorkbookResult<Vec<AuditEntry>> {
        self.read_tail(usize::MAX)
    }

    /// Read the most recent `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> WorkbookResult<Vec<AuditEntry>> {
        self.read_tail(count)
    }

    /// Number of entries in the log
    pub fn entry_count(&self) -> WorkbookResult<usize> {
        let Some(lines) = self.lines()? else {
            return Ok(0);
        };
        Ok(lines
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count())
    }

    fn read_tail(&self, count: usize) -> WorkbookResult<Vec<AuditEntry>> {
        let Some(lines) = self.lines()? else {
            return Ok(Vec::new());
        };

        let mut tail = VecDeque::new();
        for (line_num, line) in lines.enumerate() {
            let line = line.map_err(|e| {
                WorkbookError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;
            if line.trim().is_empty() || count == 0 {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                WorkbookError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;
            if tail.len() == count {
                tail.pop_front();
            }
            tail.push_back(entry);
        }

        Ok(tail.into())
    }

    /// Lines of the log, or `None` before the first entry is written
    fn lines(&self) -> WorkbookResult<Option<Lines<BufReader<File>>>> {
        match File::open(&self.log_path) {
            Ok(file) => Ok(Some(BufReader::new(file).lines())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WorkbookError::Io(format!("Failed to open audit log: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{EntityType, Operation};
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path);
        (logger, temp_dir)
    }

    fn entry(id: impl Into<String>, operation: Operation) -> AuditEntry {
        AuditEntry::new(Utc::now(), operation, EntityType::Service, id, None)
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();

        logger.log(&entry("svc-1", Operation::Create)).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].entity_type, EntityType::Service);
    }

    #[test]
    fn test_count_ignores_blank_lines() {
        let (logger, temp) = create_test_logger();
        logger.log(&entry("svc-1", Operation::Update)).unwrap();

        let mut file = OpenOptions::new()
            .append(true)
            .open(temp.path().join("audit.log"))
            .unwrap();
        writeln!(file).unwrap();
        logger.log(&entry("svc-2", Operation::Delete)).unwrap();

        assert_eq!(logger.entry_count().unwrap(), 2);
        assert_eq!(logger.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_read_recent_zero() {
        let (logger, _temp) = create_test_logger();
        logger.log(&entry("svc-1", Operation::Update)).unwrap();

        assert!(logger.read_recent(0).unwrap().is_empty());
    }

    #[test]
    fn test_read_recent() {
        let (logger, _temp) = create_test_logger();

        for i in 0..10 {
            logger.log(&entry(format!("svc-{}", i), Operation::Update)).unwrap();
        }

        let recent = logger.read_recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].entity_id, "svc-7");
        assert_eq!(recent[2].entity_id, "svc-9");
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();

        assert_eq!(logger.entry_count().unwrap(), 0);
        assert!(logger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_survives_restart() {
        let (logger, temp) = create_test_logger();
        logger.log(&entry("mdl-1", Operation::Import)).unwrap();

        let logger2 = AuditLogger::new(temp.path().join("audit.log"));
        let entries = logger2.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Import);
    }
}
