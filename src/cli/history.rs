//! History CLI command

use crate::error::WorkbookResult;
use crate::state::Workbook;

/// Print the most recent audit entries, oldest first
pub fn handle_history_command(workbook: &Workbook, count: usize) -> WorkbookResult<()> {
    let Some(audit) = workbook.audit() else {
        println!("No history recorded.");
        return Ok(());
    };

    let entries = audit.read_recent(count)?;
    if entries.is_empty() {
        println!("No history recorded.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
